//! Store → eligibility → rendered attributes → client controller.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use popup_core::config::PresentationConfig;
use popup_core::record::PopupRecord;
use popup_core::store::InMemoryPopupStore;
use popup_core::types::{DeviceClass, PageContext};
use popup_eligibility::{EligibilityEngine, MarkupRenderer, PopupDescriptor};
use popup_presentation::{
    ClientPopup, DomEvent, InMemoryDocument, InMemorySessionMarkers, PopupState,
    PresentationController,
};

fn store() -> InMemoryPopupStore {
    let records: Vec<PopupRecord> = serde_json::from_value(serde_json::json!([
        {
            "id": 1,
            "title": "Newsletter",
            "content": "<p>Subscribe</p>",
            "display_pages": "3,7,9",
            "trigger_type": "delay",
            "trigger_value": "5",
            "display_once": true,
            "created_at": "2026-05-02T00:00:00Z"
        },
        {
            "id": 2,
            "title": "Desktop only",
            "device_targeting": "desktop",
            "created_at": "2026-05-01T00:00:00Z"
        },
        {
            "id": 3,
            "title": "Coupon",
            "trigger_type": "click",
            "trigger_value": "coupon-link",
            "hide_animation": "",
            "created_at": "2026-04-30T00:00:00Z"
        }
    ]))
    .unwrap();
    InMemoryPopupStore::from_records(records)
}

fn mobile_ctx(page_id: u64) -> PageContext {
    PageContext {
        page_id: Some(page_id),
        is_homepage: false,
        device_class: DeviceClass::Mobile,
        locale: "en".into(),
        now: Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap(),
    }
}

fn decode(descriptors: &[PopupDescriptor]) -> Vec<ClientPopup> {
    descriptors
        .iter()
        .filter_map(|d| {
            let attrs = d.attributes();
            ClientPopup::from_pairs(attrs.iter().map(|(k, v)| (*k, v.as_str())))
        })
        .collect()
}

#[test]
fn test_page_load_lifecycle() {
    let engine = EligibilityEngine::new(Arc::new(store()), MarkupRenderer::new("fpp"));

    let descriptors = engine.descriptors(&mobile_ctx(7));
    let ids: Vec<u64> = descriptors.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![1, 3]);

    let popups = decode(&descriptors);
    let config = PresentationConfig::default();
    let mut page = PresentationController::new(
        popups.clone(),
        InMemoryDocument::with_elements(["coupon-link"]),
        InMemorySessionMarkers::from_config(&config),
    )
    .with_config(&config);
    page.initialize();

    page.advance(Duration::from_secs(4));
    assert_eq!(page.state(1), Some(PopupState::Hidden));
    page.advance(Duration::from_secs(1));
    assert_eq!(page.state(1), Some(PopupState::Visible));

    page.handle(DomEvent::Click {
        element_id: "coupon-link".into(),
    });
    assert_eq!(page.state(3), Some(PopupState::Visible));

    // No hide animation configured: gone at once.
    page.handle(DomEvent::CloseControl { popup_id: 3 });
    assert!(!page.document().is_visible(3));

    page.handle(DomEvent::CloseControl { popup_id: 1 });
    page.advance(Duration::from_millis(500));
    assert!(!page.document().is_visible(1));

    // Second page load, same session.
    let (_, markers) = page.into_parts();
    assert_eq!(markers.cookie_header(), "fpp_popup_shown_1=1");

    let mut next = PresentationController::new(popups, InMemoryDocument::new(), markers)
        .with_config(&config);
    next.initialize();
    next.advance(Duration::from_secs(10));
    assert_eq!(next.state(1), Some(PopupState::Hidden));
}

#[test]
fn test_rendered_markup_matches_descriptors() {
    let engine = EligibilityEngine::new(Arc::new(store()), MarkupRenderer::new("fpp"));
    let html = engine.render(&mobile_ctx(7));

    assert!(html.contains(r#"data-popup-id="1""#));
    assert!(html.contains(r#"data-trigger-type="delay""#));
    assert!(html.contains(r#"data-trigger-value="5""#));
    assert!(html.contains(r#"data-display-once="1""#));
    assert!(!html.contains(r#"data-popup-id="2""#));

    let off_list = engine.render(&mobile_ctx(8));
    assert!(!off_list.contains(r#"data-popup-id="1""#));
    assert!(off_list.contains(r#"data-popup-id="3""#));
}
