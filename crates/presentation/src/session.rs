//! Display-once session markers.
//!
//! A marker is written when a display-once popup is dismissed and is checked
//! before it is shown again. Markers are write-once per popup id and live for
//! the browsing session.

use std::collections::BTreeSet;

use popup_core::config::{PresentationConfig, DEFAULT_SESSION_MARKER_PREFIX};
use popup_core::types::PopupId;

pub trait SessionMarkers {
    fn is_marked(&self, popup_id: PopupId) -> bool;

    fn mark(&mut self, popup_id: PopupId);
}

/// Session markers held in memory, named like the cookies a browser binding
/// would write (`<prefix><id>=1`).
#[derive(Debug, Clone)]
pub struct InMemorySessionMarkers {
    prefix: String,
    names: BTreeSet<String>,
}

impl InMemorySessionMarkers {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            names: BTreeSet::new(),
        }
    }

    pub fn from_config(config: &PresentationConfig) -> Self {
        Self::new(config.session_marker_prefix.clone())
    }

    /// Rebuild the marker set from a `Cookie` request header. Cookies that do
    /// not carry the prefix, or whose value is not `1`, are ignored.
    pub fn from_cookie_header(prefix: impl Into<String>, header: &str) -> Self {
        let mut markers = Self::new(prefix);
        for pair in header.split(';') {
            let Some((name, value)) = pair.trim().split_once('=') else {
                continue;
            };
            if value.trim() == "1" && name.starts_with(markers.prefix.as_str()) {
                markers.names.insert(name.to_string());
            }
        }
        markers
    }

    pub fn marker_name(&self, popup_id: PopupId) -> String {
        format!("{}{popup_id}", self.prefix)
    }

    /// Markers in `Cookie` header form, sorted by name.
    pub fn cookie_header(&self) -> String {
        self.names
            .iter()
            .map(|name| format!("{name}=1"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for InMemorySessionMarkers {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_MARKER_PREFIX)
    }
}

impl SessionMarkers for InMemorySessionMarkers {
    fn is_marked(&self, popup_id: PopupId) -> bool {
        self.names.contains(&self.marker_name(popup_id))
    }

    fn mark(&mut self, popup_id: PopupId) {
        let name = self.marker_name(popup_id);
        self.names.insert(name);
    }
}
