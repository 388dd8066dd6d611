//! Popup Store: read access to the popup catalog.
//!
//! The engine only needs `list` and `get_by_id`. `InMemoryPopupStore` backs
//! the service and tests; a database-backed store implements the same trait.

use std::path::Path;

use chrono::{FixedOffset, Offset, Utc};
use dashmap::DashMap;
use tracing::{info, warn};

use crate::error::PopupResult;
use crate::record::PopupRecord;
use crate::types::{PopupDefinition, PopupId};

pub trait PopupStore: Send + Sync {
    /// All popups, newest first.
    fn list(&self) -> Vec<PopupDefinition>;

    fn get_by_id(&self, id: PopupId) -> Option<PopupDefinition>;
}

/// Thread-safe in-memory popup catalog.
#[derive(Default)]
pub struct InMemoryPopupStore {
    popups: DashMap<PopupId, PopupDefinition>,
}

impl InMemoryPopupStore {
    pub fn new() -> Self {
        Self {
            popups: DashMap::new(),
        }
    }

    /// Decode raw records, skipping any that cannot be represented.
    /// Schedule dates are read as UTC.
    pub fn from_records(records: impl IntoIterator<Item = PopupRecord>) -> Self {
        Self::from_site_records(records, Utc.fix())
    }

    /// Like [`Self::from_records`], with schedule dates read as wall clock
    /// times at `site_offset`.
    pub fn from_site_records(
        records: impl IntoIterator<Item = PopupRecord>,
        site_offset: FixedOffset,
    ) -> Self {
        let store = Self::new();
        let mut skipped = 0usize;
        for record in records {
            match record.into_definition(site_offset) {
                Ok(popup) => store.insert(popup),
                Err(e) => {
                    skipped += 1;
                    warn!(error = %e, "Skipping popup record");
                }
            }
        }
        info!(loaded = store.len(), skipped, "Popup catalog loaded");
        store
    }

    /// Load a JSON array of popup records from disk.
    pub fn load_json_file(path: impl AsRef<Path>, site_offset: FixedOffset) -> PopupResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let records: Vec<PopupRecord> = serde_json::from_str(&raw)?;
        Ok(Self::from_site_records(records, site_offset))
    }

    pub fn insert(&self, popup: PopupDefinition) {
        self.popups.insert(popup.id, popup);
    }

    pub fn remove(&self, id: PopupId) -> bool {
        self.popups.remove(&id).is_some()
    }

    /// Flip the active flag. Returns the new value, or `None` if the popup
    /// does not exist.
    pub fn toggle_active(&self, id: PopupId) -> Option<bool> {
        self.popups.get_mut(&id).map(|mut entry| {
            let popup = entry.value_mut();
            popup.active = !popup.active;
            popup.active
        })
    }

    pub fn len(&self) -> usize {
        self.popups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.popups.is_empty()
    }
}

impl PopupStore for InMemoryPopupStore {
    fn list(&self) -> Vec<PopupDefinition> {
        let mut popups: Vec<PopupDefinition> =
            self.popups.iter().map(|r| r.value().clone()).collect();
        popups.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        popups
    }

    fn get_by_id(&self, id: PopupId) -> Option<PopupDefinition> {
        self.popups.get(&id).map(|r| r.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PopupError;
    use crate::types::ScheduleBound;
    use chrono::TimeZone;
    use std::io::Write;

    fn record(id: PopupId, created_day: u32) -> PopupRecord {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": format!("Popup {id}"),
            "created_at": Utc.with_ymd_and_hms(2026, 3, created_day, 12, 0, 0).unwrap(),
        }))
        .unwrap()
    }

    #[test]
    fn test_list_is_newest_first() {
        let store = InMemoryPopupStore::from_records(vec![
            record(1, 1),
            record(2, 3),
            record(3, 2),
        ]);
        let ids: Vec<PopupId> = store.list().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_same_timestamp_orders_by_id_descending() {
        let store = InMemoryPopupStore::from_records(vec![record(4, 5), record(9, 5)]);
        let ids: Vec<PopupId> = store.list().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![9, 4]);
    }

    #[test]
    fn test_invalid_records_are_skipped() {
        let mut bad = record(2, 1);
        bad.trigger_type = "exit-intent".into();
        let store = InMemoryPopupStore::from_records(vec![record(1, 1), bad]);
        assert_eq!(store.len(), 1);
        assert!(store.get_by_id(2).is_none());
        assert!(store.get_by_id(1).is_some());
    }

    #[test]
    fn test_toggle_and_remove() {
        let store = InMemoryPopupStore::from_records(vec![record(1, 1)]);
        assert_eq!(store.toggle_active(1), Some(false));
        assert!(!store.get_by_id(1).unwrap().active);
        assert_eq!(store.toggle_active(1), Some(true));
        assert_eq!(store.toggle_active(42), None);

        assert!(store.remove(1));
        assert!(!store.remove(1));
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 1, "title": "A", "display_pages": "homepage"}},
                {{"id": 2, "title": "B", "device_targeting": "desktop"}}]"#
        )
        .unwrap();

        let store = InMemoryPopupStore::load_json_file(file.path(), Utc.fix()).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_load_json_file_reads_dates_in_site_time() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 1, "title": "A", "start_datetime": "2026-06-01 09:00:00"}}]"#
        )
        .unwrap();

        let new_york = FixedOffset::west_opt(4 * 3600).unwrap();
        let store = InMemoryPopupStore::load_json_file(file.path(), new_york).unwrap();
        assert_eq!(
            store.get_by_id(1).unwrap().schedule.start,
            Some(ScheduleBound::At(Utc.with_ymd_and_hms(2026, 6, 1, 13, 0, 0).unwrap()))
        );
    }

    #[test]
    fn test_load_json_file_rejects_non_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"id": 1}}"#).unwrap();
        let err = InMemoryPopupStore::load_json_file(file.path(), Utc.fix())
            .err()
            .unwrap();
        assert!(matches!(err, PopupError::Serialization(_)));
    }
}
