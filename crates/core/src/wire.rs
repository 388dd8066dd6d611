//! Attribute contract between the rendered markup and the client controller.
//!
//! Each rendered overlay carries these attributes; the controller reads them
//! back without access to the original popup definition.

pub const ATTR_TRIGGER_TYPE: &str = "data-trigger-type";
pub const ATTR_TRIGGER_VALUE: &str = "data-trigger-value";
pub const ATTR_SHOW_ANIMATION: &str = "data-show-animation";
pub const ATTR_HIDE_ANIMATION: &str = "data-hide-animation";
pub const ATTR_DISPLAY_ONCE: &str = "data-display-once";
pub const ATTR_POPUP_ID: &str = "data-popup-id";

pub const TRIGGER_IMMEDIATE: &str = "immediate";
pub const TRIGGER_DELAY: &str = "delay";
pub const TRIGGER_CLICK: &str = "click";

pub const FLAG_ON: &str = "1";
pub const FLAG_OFF: &str = "0";

/// `<prefix>-show-<name>`
pub fn show_token(prefix: &str, name: &str) -> String {
    format!("{prefix}-show-{name}")
}

/// `<prefix>-hide-<name>`
pub fn hide_token(prefix: &str, name: &str) -> String {
    format!("{prefix}-hide-{name}")
}

pub fn flag(value: bool) -> &'static str {
    if value {
        FLAG_ON
    } else {
        FLAG_OFF
    }
}
