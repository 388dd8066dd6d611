//! Client-side view of a rendered popup, decoded from its wire attributes.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use popup_core::types::PopupId;
use popup_core::wire;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientTrigger {
    Immediate,
    Delay(Duration),
    /// Id of the element whose first click shows the popup.
    Click(String),
    /// Trigger tag the controller does not understand; the popup never shows.
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientPopup {
    pub id: PopupId,
    pub trigger: ClientTrigger,
    pub show_class: Option<String>,
    pub hide_class: Option<String>,
    pub display_once: bool,
}

impl ClientPopup {
    /// Decode one overlay's attributes. Returns `None` only when the popup id
    /// is missing or not a number; every other oddity degrades.
    pub fn from_attributes(attrs: &HashMap<String, String>) -> Option<Self> {
        let get = |name: &str| attrs.get(name).map(|v| v.trim()).unwrap_or("");

        let id = match get(wire::ATTR_POPUP_ID).parse::<PopupId>() {
            Ok(id) => id,
            Err(_) => {
                debug!(raw = get(wire::ATTR_POPUP_ID), "overlay without a usable popup id");
                return None;
            }
        };

        let value = get(wire::ATTR_TRIGGER_VALUE);
        let trigger = match get(wire::ATTR_TRIGGER_TYPE) {
            wire::TRIGGER_IMMEDIATE => ClientTrigger::Immediate,
            wire::TRIGGER_DELAY => ClientTrigger::Delay(parse_delay(value)),
            wire::TRIGGER_CLICK => ClientTrigger::Click(value.to_string()),
            other => ClientTrigger::Unsupported(other.to_string()),
        };

        Some(Self {
            id,
            trigger,
            show_class: non_empty(get(wire::ATTR_SHOW_ANIMATION)),
            hide_class: non_empty(get(wire::ATTR_HIDE_ANIMATION)),
            display_once: get(wire::ATTR_DISPLAY_ONCE) == wire::FLAG_ON,
        })
    }

    /// Decode from an ordered attribute list, as produced by the renderer.
    pub fn from_pairs<'a, I>(pairs: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let attrs: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self::from_attributes(&attrs)
    }
}

/// Leading whole seconds, like a lenient integer parse; anything else is 0.
fn parse_delay(raw: &str) -> Duration {
    let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
    Duration::from_secs(digits.parse::<u64>().unwrap_or(0))
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
