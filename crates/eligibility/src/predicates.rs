//! The individual display conditions, evaluated in a fixed order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use popup_core::types::{
    DeviceClass, DeviceRule, LanguageRule, PageContext, PageRule, PopupDefinition, Schedule,
    ScheduleBound,
};

/// The first condition a popup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusion {
    Inactive,
    Page,
    Device,
    Schedule,
    Language,
}

impl Exclusion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Page => "page",
            Self::Device => "device",
            Self::Schedule => "schedule",
            Self::Language => "language",
        }
    }
}

/// Run every condition against `popup`, stopping at the first failure.
/// The order is active, page, device, schedule, language.
pub fn check(popup: &PopupDefinition, ctx: &PageContext) -> Result<(), Exclusion> {
    if !popup.active {
        return Err(Exclusion::Inactive);
    }
    if !page_matches(&popup.page_rule, ctx) {
        return Err(Exclusion::Page);
    }
    if !device_matches(popup.device_rule, ctx.device_class) {
        return Err(Exclusion::Device);
    }
    if !popup.display_always && !schedule_permits(&popup.schedule, ctx.now) {
        return Err(Exclusion::Schedule);
    }
    if !language_matches(&popup.languages, &ctx.locale) {
        return Err(Exclusion::Language);
    }
    Ok(())
}

pub fn page_matches(rule: &PageRule, ctx: &PageContext) -> bool {
    match rule {
        PageRule::All => true,
        PageRule::HomepageOnly => ctx.is_homepage,
        PageRule::SinglePage(id) => ctx.page_id == Some(*id),
        PageRule::PageIdSet(ids) => ctx.page_id.is_some_and(|id| ids.contains(&id)),
        PageRule::Unrecognized(_) => false,
    }
}

pub fn device_matches(rule: DeviceRule, device: DeviceClass) -> bool {
    match rule {
        DeviceRule::Both => true,
        DeviceRule::DesktopOnly => device != DeviceClass::Mobile,
        DeviceRule::MobileOnly => device != DeviceClass::Desktop,
    }
}

/// Missing bounds impose nothing; a malformed bound always fails.
pub fn schedule_permits(schedule: &Schedule, now: DateTime<Utc>) -> bool {
    let after_start = match &schedule.start {
        None => true,
        Some(ScheduleBound::At(start)) => now >= *start,
        Some(ScheduleBound::Malformed(_)) => false,
    };
    let before_end = match &schedule.end {
        None => true,
        Some(ScheduleBound::At(end)) => now <= *end,
        Some(ScheduleBound::Malformed(_)) => false,
    };
    after_start && before_end
}

/// Exact code comparison; `en` does not match `en_US`.
pub fn language_matches(rule: &LanguageRule, locale: &str) -> bool {
    match rule {
        LanguageRule::All => true,
        LanguageRule::Only(codes) => codes.contains(locale),
    }
}
