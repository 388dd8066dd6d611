//! Eligibility Filter: decides which popups qualify for a page view and
//! turns them into display descriptors and footer markup.

pub mod descriptor;
pub mod engine;
pub mod predicates;
pub mod render;

pub use descriptor::PopupDescriptor;
pub use engine::{select_eligible, EligibilityEngine};
pub use predicates::Exclusion;
pub use render::MarkupRenderer;
