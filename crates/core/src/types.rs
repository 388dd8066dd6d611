//! Popup definitions and the per-request page context they are matched against.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type PopupId = u64;

/// Language code that matches every locale.
pub const ALL_LANGUAGES: &str = "all";

/// Which pages a popup may appear on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageRule {
    All,
    HomepageOnly,
    SinglePage(u64),
    PageIdSet(BTreeSet<u64>),
    /// Raw value that could not be read as any of the above. Never matches.
    Unrecognized(String),
}

impl PageRule {
    /// Decode the free-text "display pages" field.
    ///
    /// `all` and `homepage` are matched literally, a plain number names a
    /// single page, and anything containing a comma is a list of page ids
    /// (blank or non-numeric entries are dropped). Everything else is kept as
    /// `Unrecognized` so it fails to match instead of erroring.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed {
            "all" => return Self::All,
            "homepage" => return Self::HomepageOnly,
            _ => {}
        }

        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return match trimmed.parse::<u64>() {
                Ok(id) => Self::SinglePage(id),
                Err(_) => Self::Unrecognized(trimmed.to_string()),
            };
        }

        if trimmed.contains(',') {
            let ids = trimmed
                .split(',')
                .filter_map(|part| part.trim().parse::<u64>().ok())
                .collect();
            return Self::PageIdSet(ids);
        }

        Self::Unrecognized(trimmed.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceRule {
    Both,
    DesktopOnly,
    MobileOnly,
}

impl DeviceRule {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "both" => Some(Self::Both),
            "desktop" => Some(Self::DesktopOnly),
            "mobile" => Some(Self::MobileOnly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Desktop,
    Mobile,
}

/// What makes a popup appear once the page has loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Immediate,
    Delay(u64),
    ClickTarget(String),
}

impl Trigger {
    /// Build a trigger from the stored type tag and its free-text value.
    /// A delay that is not a non-negative whole number of seconds becomes 0.
    pub fn parse(trigger_type: &str, value: &str) -> Option<Self> {
        match trigger_type.trim() {
            "immediate" => Some(Self::Immediate),
            "delay" => Some(Self::Delay(value.trim().parse::<u64>().unwrap_or(0))),
            "click" => Some(Self::ClickTarget(value.trim().to_string())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShowAnimation {
    ZoomIn,
    SlideLeft,
    SlideTop,
}

impl ShowAnimation {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "zoom-in" => Some(Self::ZoomIn),
            "slide-left" => Some(Self::SlideLeft),
            "slide-top" => Some(Self::SlideTop),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZoomIn => "zoom-in",
            Self::SlideLeft => "slide-left",
            Self::SlideTop => "slide-top",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HideAnimation {
    ZoomOut,
    SlideLeft,
    SlideTop,
}

impl HideAnimation {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "zoom-out" => Some(Self::ZoomOut),
            "slide-left" => Some(Self::SlideLeft),
            "slide-top" => Some(Self::SlideTop),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZoomOut => "zoom-out",
            Self::SlideLeft => "slide-left",
            Self::SlideTop => "slide-top",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    #[default]
    Center,
    Left,
    Right,
    Top,
    Bottom,
}

impl Position {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "center" => Some(Self::Center),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

/// One end of a schedule window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleBound {
    At(DateTime<Utc>),
    /// Stored text that is not a recognisable date. Fails the schedule check.
    Malformed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub start: Option<ScheduleBound>,
    pub end: Option<ScheduleBound>,
}

/// Locales a popup is shown for. `Only` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageRule {
    All,
    Only(BTreeSet<String>),
}

impl LanguageRule {
    /// An empty selection or one that includes `all` collapses to `All`.
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for code in codes {
            let code = code.as_ref().trim();
            if code.is_empty() {
                continue;
            }
            if code == ALL_LANGUAGES {
                return Self::All;
            }
            set.insert(code.to_string());
        }
        if set.is_empty() {
            Self::All
        } else {
            Self::Only(set)
        }
    }
}

impl Default for LanguageRule {
    fn default() -> Self {
        Self::All
    }
}

/// A popup as the engine sees it: decoded once at the store boundary and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupDefinition {
    pub id: PopupId,
    pub title: String,
    /// Sanitised rich markup.
    pub content: String,
    pub page_rule: PageRule,
    pub device_rule: DeviceRule,
    pub trigger: Trigger,
    pub show_animation: Option<ShowAnimation>,
    pub hide_animation: Option<HideAnimation>,
    pub position: Position,
    pub schedule: Schedule,
    /// Ignore `schedule` entirely.
    pub display_always: bool,
    pub display_once: bool,
    pub languages: LanguageRule,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Everything the engine needs to know about the page being rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContext {
    /// `None` on pages that are not backed by a single post (archives, search).
    pub page_id: Option<u64>,
    pub is_homepage: bool,
    pub device_class: DeviceClass,
    pub locale: String,
    pub now: DateTime<Utc>,
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Desktop => f.write_str("desktop"),
            Self::Mobile => f.write_str("mobile"),
        }
    }
}
