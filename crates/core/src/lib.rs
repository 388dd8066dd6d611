pub mod config;
pub mod error;
pub mod record;
pub mod sanitize;
pub mod store;
pub mod types;
pub mod wire;

pub use config::AppConfig;
pub use error::{PopupError, PopupResult};
pub use record::PopupRecord;
pub use store::{InMemoryPopupStore, PopupStore};
pub use types::{PageContext, PopupDefinition, PopupId};
