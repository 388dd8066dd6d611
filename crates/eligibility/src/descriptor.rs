//! Display descriptors: the per-popup payload handed to the renderer.

use serde::{Deserialize, Serialize};

use popup_core::sanitize::sanitize_content;
use popup_core::types::{PopupDefinition, PopupId, Position, Trigger};
use popup_core::wire;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupDescriptor {
    pub id: PopupId,
    pub trigger: Trigger,
    /// Prefixed class token, e.g. `fpp-show-zoom-in`.
    pub show_animation: Option<String>,
    /// Prefixed class token, e.g. `fpp-hide-zoom-out`.
    pub hide_animation: Option<String>,
    pub position: Position,
    pub content: String,
    pub display_once: bool,
}

impl PopupDescriptor {
    pub fn from_definition(popup: &PopupDefinition, class_prefix: &str) -> Self {
        Self {
            id: popup.id,
            trigger: popup.trigger.clone(),
            show_animation: popup
                .show_animation
                .map(|a| wire::show_token(class_prefix, a.as_str())),
            hide_animation: popup
                .hide_animation
                .map(|a| wire::hide_token(class_prefix, a.as_str())),
            position: popup.position,
            content: sanitize_content(&popup.content),
            display_once: popup.display_once,
        }
    }

    pub fn trigger_type(&self) -> &'static str {
        match self.trigger {
            Trigger::Immediate => wire::TRIGGER_IMMEDIATE,
            Trigger::Delay(_) => wire::TRIGGER_DELAY,
            Trigger::ClickTarget(_) => wire::TRIGGER_CLICK,
        }
    }

    pub fn trigger_value(&self) -> String {
        match &self.trigger {
            Trigger::Immediate => String::new(),
            Trigger::Delay(seconds) => seconds.to_string(),
            Trigger::ClickTarget(element_id) => element_id.clone(),
        }
    }

    /// The wire attributes, unescaped, in rendering order.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![
            (wire::ATTR_TRIGGER_TYPE, self.trigger_type().to_string()),
            (wire::ATTR_TRIGGER_VALUE, self.trigger_value()),
            (
                wire::ATTR_SHOW_ANIMATION,
                self.show_animation.clone().unwrap_or_default(),
            ),
            (
                wire::ATTR_HIDE_ANIMATION,
                self.hide_animation.clone().unwrap_or_default(),
            ),
            (wire::ATTR_DISPLAY_ONCE, wire::flag(self.display_once).to_string()),
            (wire::ATTR_POPUP_ID, self.id.to_string()),
        ]
    }
}
