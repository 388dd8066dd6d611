//! Presentation Controller: the client-side lifecycle of rendered popups.
//!
//! The controller is an explicit state machine driven by an injected clock
//! and injected DOM events, so it runs the same way in a browser binding and
//! in tests.
//!
//! # Modules
//!
//! - [`client`]: popup descriptors decoded from the rendered attributes
//! - [`state_machine`]: Hidden / Visible / Dismissed transitions
//! - [`document`]: the DOM seam (visibility, classes, element lookup)
//! - [`session`]: display-once session markers
//! - [`controller`]: triggers, timers and dismissal

pub mod client;
pub mod controller;
pub mod document;
pub mod session;
pub mod state_machine;

pub use client::{ClientPopup, ClientTrigger};
pub use controller::{DomEvent, PointerTarget, PresentationController};
pub use document::{Document, InMemoryDocument};
pub use session::{InMemorySessionMarkers, SessionMarkers};
pub use state_machine::{PopupState, PopupStateMachine};
