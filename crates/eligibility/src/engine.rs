//! Eligibility engine: filters the popup catalog for a single page view.

use std::sync::Arc;

use tracing::debug;

use popup_core::store::PopupStore;
use popup_core::types::{PageContext, PopupDefinition};

use crate::descriptor::PopupDescriptor;
use crate::predicates::check;
use crate::render::MarkupRenderer;

/// Popups from `popups` that qualify for `ctx`, in their original order.
///
/// Pure: no I/O, no shared state. Safe to call concurrently for independent
/// requests.
pub fn select_eligible(popups: &[PopupDefinition], ctx: &PageContext) -> Vec<PopupDefinition> {
    let eligible: Vec<PopupDefinition> = popups
        .iter()
        .filter(|popup| match check(popup, ctx) {
            Ok(()) => true,
            Err(reason) => {
                debug!(popup_id = popup.id, reason = reason.as_str(), "popup excluded");
                false
            }
        })
        .cloned()
        .collect();

    debug!(
        candidates = popups.len(),
        eligible = eligible.len(),
        page_id = ?ctx.page_id,
        device = %ctx.device_class,
        locale = %ctx.locale,
        "eligibility evaluated"
    );
    eligible
}

/// Couples a popup store with the filter and the renderer so a request
/// handler can go from a page context straight to descriptors or markup.
pub struct EligibilityEngine {
    store: Arc<dyn PopupStore>,
    renderer: MarkupRenderer,
}

impl EligibilityEngine {
    pub fn new(store: Arc<dyn PopupStore>, renderer: MarkupRenderer) -> Self {
        Self { store, renderer }
    }

    /// Snapshot the store once and filter it.
    pub fn eligible(&self, ctx: &PageContext) -> Vec<PopupDefinition> {
        let snapshot = self.store.list();
        select_eligible(&snapshot, ctx)
    }

    pub fn descriptors(&self, ctx: &PageContext) -> Vec<PopupDescriptor> {
        self.eligible(ctx)
            .iter()
            .map(|popup| PopupDescriptor::from_definition(popup, self.renderer.class_prefix()))
            .collect()
    }

    /// The footer block for this page view; empty when nothing qualifies.
    pub fn render(&self, ctx: &PageContext) -> String {
        self.renderer.render_block(&self.descriptors(ctx))
    }
}
