//! Raw popup rows as persisted by the admin side, and their one-time
//! decoding into [`PopupDefinition`].

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PopupError, PopupResult};
use crate::sanitize::sanitize_content;
use crate::types::{
    DeviceRule, HideAnimation, LanguageRule, PageRule, PopupDefinition, PopupId, Position,
    Schedule, ScheduleBound, ShowAnimation, Trigger,
};

/// Accepted layouts for the start/end date columns, most specific first.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// One stored popup row, with the free-text columns still undecoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopupRecord {
    pub id: PopupId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_display_pages")]
    pub display_pages: String,
    #[serde(default)]
    pub display_once: bool,
    #[serde(default = "default_device_targeting")]
    pub device_targeting: String,
    #[serde(default = "default_trigger_type")]
    pub trigger_type: String,
    #[serde(default)]
    pub trigger_value: String,
    #[serde(default = "default_show_animation")]
    pub show_animation: String,
    #[serde(default = "default_hide_animation")]
    pub hide_animation: String,
    #[serde(default = "default_positioning")]
    pub positioning: String,
    #[serde(default)]
    pub start_datetime: Option<String>,
    #[serde(default)]
    pub end_datetime: Option<String>,
    #[serde(default)]
    pub display_always: bool,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default = "default_created_at")]
    pub created_at: DateTime<Utc>,
}

fn default_display_pages() -> String {
    "all".to_string()
}
fn default_device_targeting() -> String {
    "both".to_string()
}
fn default_trigger_type() -> String {
    "immediate".to_string()
}
fn default_show_animation() -> String {
    "zoom-in".to_string()
}
fn default_hide_animation() -> String {
    "zoom-out".to_string()
}
fn default_positioning() -> String {
    "center".to_string()
}
fn default_active() -> bool {
    true
}
// Undated rows sort oldest, with ties broken by id.
fn default_created_at() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

impl TryFrom<PopupRecord> for PopupDefinition {
    type Error = PopupError;

    /// Decode with schedule dates read as UTC.
    fn try_from(record: PopupRecord) -> PopupResult<Self> {
        record.into_definition(Utc.fix())
    }
}

impl PopupRecord {
    /// Decode the row. Schedule dates without an explicit offset are wall
    /// clock times at `site_offset`.
    pub fn into_definition(self, site_offset: FixedOffset) -> PopupResult<PopupDefinition> {
        let device_rule = DeviceRule::parse(&self.device_targeting).ok_or_else(|| {
            PopupError::invalid_record(
                self.id,
                format!("unknown device targeting '{}'", self.device_targeting),
            )
        })?;

        let trigger = Trigger::parse(&self.trigger_type, &self.trigger_value).ok_or_else(
            || {
                PopupError::invalid_record(
                    self.id,
                    format!("unknown trigger type '{}'", self.trigger_type),
                )
            },
        )?;

        let show_animation = ShowAnimation::parse(&self.show_animation);
        if show_animation.is_none() && !self.show_animation.trim().is_empty() {
            debug!(popup_id = self.id, name = %self.show_animation, "unknown show animation, dropping");
        }
        let hide_animation = HideAnimation::parse(&self.hide_animation);
        if hide_animation.is_none() && !self.hide_animation.trim().is_empty() {
            debug!(popup_id = self.id, name = %self.hide_animation, "unknown hide animation, dropping");
        }

        let position = Position::parse(&self.positioning).unwrap_or_else(|| {
            debug!(popup_id = self.id, positioning = %self.positioning, "unknown positioning, using center");
            Position::Center
        });

        Ok(PopupDefinition {
            id: self.id,
            title: self.title,
            content: sanitize_content(&self.content),
            page_rule: PageRule::parse(&self.display_pages),
            device_rule,
            trigger,
            show_animation,
            hide_animation,
            position,
            schedule: Schedule {
                start: parse_bound(self.start_datetime.as_deref(), site_offset),
                end: parse_bound(self.end_datetime.as_deref(), site_offset),
            },
            display_always: self.display_always,
            display_once: self.display_once,
            languages: LanguageRule::from_codes(&self.languages),
            active: self.active,
            created_at: self.created_at,
        })
    }
}

/// Blank means "no bound"; text that is not a date is kept as `Malformed`.
fn parse_bound(raw: Option<&str>, site_offset: FixedOffset) -> Option<ScheduleBound> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(ScheduleBound::At(dt.with_timezone(&Utc)));
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .and_then(|naive| site_offset.from_local_datetime(&naive).single())
        .map(|local| ScheduleBound::At(local.with_timezone(&Utc)))
        .or_else(|| Some(ScheduleBound::Malformed(raw.to_string())))
}
