//! The DOM seam. A browser binding implements [`Document`] over real
//! elements; [`InMemoryDocument`] records the same effects for headless use.

use std::collections::{BTreeSet, HashMap, HashSet};

use popup_core::types::PopupId;

pub trait Document {
    /// Whether an element with this id exists on the page.
    fn has_element(&self, element_id: &str) -> bool;

    /// Show or hide a popup's overlay layer.
    fn set_overlay_visible(&mut self, popup_id: PopupId, visible: bool);

    /// Add a class to a popup's content box.
    fn add_content_class(&mut self, popup_id: PopupId, class: &str);

    /// Remove a class from a popup's content box.
    fn remove_content_class(&mut self, popup_id: PopupId, class: &str);
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryDocument {
    elements: HashSet<String>,
    visible: HashMap<PopupId, bool>,
    classes: HashMap<PopupId, BTreeSet<String>>,
}

impl InMemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// A document containing elements with the given ids.
    pub fn with_elements<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            elements: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn is_visible(&self, popup_id: PopupId) -> bool {
        self.visible.get(&popup_id).copied().unwrap_or(false)
    }

    pub fn has_class(&self, popup_id: PopupId, class: &str) -> bool {
        self.classes
            .get(&popup_id)
            .is_some_and(|set| set.contains(class))
    }

    pub fn classes(&self, popup_id: PopupId) -> Vec<String> {
        self.classes
            .get(&popup_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl Document for InMemoryDocument {
    fn has_element(&self, element_id: &str) -> bool {
        self.elements.contains(element_id)
    }

    fn set_overlay_visible(&mut self, popup_id: PopupId, visible: bool) {
        self.visible.insert(popup_id, visible);
    }

    fn add_content_class(&mut self, popup_id: PopupId, class: &str) {
        self.classes
            .entry(popup_id)
            .or_default()
            .insert(class.to_string());
    }

    fn remove_content_class(&mut self, popup_id: PopupId, class: &str) {
        if let Some(set) = self.classes.get_mut(&popup_id) {
            set.remove(class);
        }
    }
}
