//! Presentation controller: drives each rendered popup from `Hidden` to
//! `Visible` on its trigger and from `Visible` to `Dismissed` on user
//! interaction.
//!
//! Time only moves when [`PresentationController::advance`] is called, and
//! DOM input arrives through [`PresentationController::handle`]. One popup's
//! misconfiguration never stops the others from being processed.

use std::time::Duration;

use tracing::{debug, warn};

use popup_core::config::{PresentationConfig, DEFAULT_HIDE_TRANSITION_MS};
use popup_core::types::PopupId;

use crate::client::{ClientPopup, ClientTrigger};
use crate::document::Document;
use crate::session::SessionMarkers;
use crate::state_machine::{PopupState, PopupStateMachine};

/// Delay between starting the hide animation and removing the overlay.
pub const DEFAULT_HIDE_TRANSITION: Duration = Duration::from_millis(DEFAULT_HIDE_TRANSITION_MS);

/// Where a pointer interaction on an overlay landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// The dimmed background around the content box.
    Background,
    /// Inside the content box.
    Content,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomEvent {
    /// A click on any element with an id.
    Click { element_id: String },
    /// The popup's close control was activated.
    CloseControl { popup_id: PopupId },
    OverlayPointer {
        popup_id: PopupId,
        target: PointerTarget,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TriggerSetup {
    /// Nothing to wait for beyond an already scheduled timer or an immediate show.
    Scheduled,
    /// Waiting for the first click on this element.
    Listening(String),
    /// The click listener already fired.
    Consumed,
    /// Click target absent at initialisation; the popup never shows.
    MissingTarget,
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Show,
    FinishHide,
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    due: Duration,
    seq: u64,
    index: usize,
    kind: TimerKind,
}

#[derive(Debug)]
struct PopupInstance {
    popup: ClientPopup,
    machine: PopupStateMachine,
    setup: TriggerSetup,
    suppressed: bool,
}

pub struct PresentationController<D: Document, S: SessionMarkers> {
    document: D,
    markers: S,
    instances: Vec<PopupInstance>,
    timers: Vec<Timer>,
    next_seq: u64,
    elapsed: Duration,
    hide_transition: Duration,
    initialized: bool,
}

impl<D: Document, S: SessionMarkers> PresentationController<D, S> {
    pub fn new(popups: Vec<ClientPopup>, document: D, markers: S) -> Self {
        let instances = popups
            .into_iter()
            .map(|popup| PopupInstance {
                popup,
                machine: PopupStateMachine::new(),
                setup: TriggerSetup::Scheduled,
                suppressed: false,
            })
            .collect();
        Self {
            document,
            markers,
            instances,
            timers: Vec::new(),
            next_seq: 0,
            elapsed: Duration::ZERO,
            hide_transition: DEFAULT_HIDE_TRANSITION,
            initialized: false,
        }
    }

    pub fn with_hide_transition(mut self, hide_transition: Duration) -> Self {
        self.hide_transition = hide_transition;
        self
    }

    /// Apply the site's presentation settings.
    pub fn with_config(self, config: &PresentationConfig) -> Self {
        self.with_hide_transition(config.hide_transition())
    }

    /// Wire up every popup's trigger. Immediate popups show now, delayed
    /// popups get one timer each, click popups start listening if their
    /// target exists. Calling this twice has no further effect.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;

        for index in 0..self.instances.len() {
            let trigger = self.instances[index].popup.trigger.clone();
            let popup_id = self.instances[index].popup.id;
            match trigger {
                ClientTrigger::Immediate => self.show(index),
                ClientTrigger::Delay(delay) => {
                    self.schedule(self.elapsed + delay, index, TimerKind::Show);
                }
                ClientTrigger::Click(element_id) => {
                    if !element_id.is_empty() && self.document.has_element(&element_id) {
                        self.instances[index].setup = TriggerSetup::Listening(element_id);
                    } else {
                        debug!(popup_id, element_id = %element_id, "click target missing, popup stays hidden");
                        self.instances[index].setup = TriggerSetup::MissingTarget;
                    }
                }
                ClientTrigger::Unsupported(tag) => {
                    warn!(popup_id, trigger = %tag, "unsupported trigger type, popup stays hidden");
                    self.instances[index].setup = TriggerSetup::Unsupported;
                }
            }
        }
    }

    /// Move the clock forward, firing every timer that falls due in order.
    pub fn advance(&mut self, by: Duration) {
        let target = self.elapsed + by;
        while let Some(pos) = self.next_due(target) {
            let timer = self.timers.remove(pos);
            self.elapsed = timer.due;
            match timer.kind {
                TimerKind::Show => self.show(timer.index),
                TimerKind::FinishHide => self.finish_hide(timer.index),
            }
        }
        self.elapsed = target;
    }

    pub fn handle(&mut self, event: DomEvent) {
        match event {
            DomEvent::Click { element_id } => {
                for index in 0..self.instances.len() {
                    let listening = matches!(
                        &self.instances[index].setup,
                        TriggerSetup::Listening(id) if *id == element_id
                    );
                    if listening {
                        self.instances[index].setup = TriggerSetup::Consumed;
                        self.show(index);
                    }
                }
            }
            DomEvent::CloseControl { popup_id } => self.dismiss_all(popup_id),
            DomEvent::OverlayPointer { popup_id, target } => match target {
                PointerTarget::Background => self.dismiss_all(popup_id),
                PointerTarget::Content => {}
            },
        }
    }

    /// Current state of the first popup with this id.
    pub fn state(&self, popup_id: PopupId) -> Option<PopupState> {
        self.instances
            .iter()
            .find(|i| i.popup.id == popup_id)
            .map(|i| i.machine.state)
    }

    /// Whether a display-once marker blocked this popup from showing.
    pub fn is_suppressed(&self, popup_id: PopupId) -> bool {
        self.instances
            .iter()
            .any(|i| i.popup.id == popup_id && i.suppressed)
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn markers(&self) -> &S {
        &self.markers
    }

    /// Tear down at page navigation, handing back the document and the
    /// session markers. Pending timers and listeners are discarded.
    pub fn into_parts(self) -> (D, S) {
        (self.document, self.markers)
    }

    fn schedule(&mut self, due: Duration, index: usize, kind: TimerKind) {
        self.timers.push(Timer {
            due,
            seq: self.next_seq,
            index,
            kind,
        });
        self.next_seq += 1;
    }

    fn next_due(&self, target: Duration) -> Option<usize> {
        self.timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= target)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(pos, _)| pos)
    }

    fn show(&mut self, index: usize) {
        let instance = &mut self.instances[index];
        let popup_id = instance.popup.id;

        if instance.machine.state != PopupState::Hidden || instance.suppressed {
            return;
        }
        if instance.popup.display_once && self.markers.is_marked(popup_id) {
            debug!(popup_id, "display-once marker present, popup suppressed");
            instance.suppressed = true;
            return;
        }
        if let Err(e) = instance.machine.transition(PopupState::Visible) {
            debug!(popup_id, error = %e, "show ignored");
            return;
        }

        self.document.set_overlay_visible(popup_id, true);
        if let Some(class) = &instance.popup.show_class {
            self.document.add_content_class(popup_id, class);
        }
        debug!(popup_id, at_ms = self.elapsed.as_millis() as u64, "popup visible");
    }

    fn dismiss_all(&mut self, popup_id: PopupId) {
        for index in 0..self.instances.len() {
            if self.instances[index].popup.id == popup_id {
                self.dismiss(index);
            }
        }
    }

    fn dismiss(&mut self, index: usize) {
        let instance = &mut self.instances[index];
        let popup_id = instance.popup.id;

        if instance.machine.transition(PopupState::Dismissed).is_err() {
            return;
        }

        match &instance.popup.hide_class {
            Some(hide_class) => {
                if let Some(show_class) = &instance.popup.show_class {
                    self.document.remove_content_class(popup_id, show_class);
                }
                self.document.add_content_class(popup_id, hide_class);
                let due = self.elapsed + self.hide_transition;
                self.schedule(due, index, TimerKind::FinishHide);
            }
            None => self.document.set_overlay_visible(popup_id, false),
        }

        if self.instances[index].popup.display_once {
            self.markers.mark(popup_id);
        }
        debug!(popup_id, "popup dismissed");
    }

    fn finish_hide(&mut self, index: usize) {
        let popup = &self.instances[index].popup;
        self.document.set_overlay_visible(popup.id, false);
        if let Some(hide_class) = &popup.hide_class {
            self.document.remove_content_class(popup.id, hide_class);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::InMemoryDocument;
    use crate::session::InMemorySessionMarkers;

    fn popup(id: PopupId, trigger: ClientTrigger) -> ClientPopup {
        ClientPopup {
            id,
            trigger,
            show_class: Some("fpp-show-zoom-in".into()),
            hide_class: Some("fpp-hide-zoom-out".into()),
            display_once: false,
        }
    }

    fn controller(
        popups: Vec<ClientPopup>,
        document: InMemoryDocument,
    ) -> PresentationController<InMemoryDocument, InMemorySessionMarkers> {
        PresentationController::new(popups, document, InMemorySessionMarkers::default())
    }

    #[test]
    fn test_immediate_shows_on_initialize() {
        let mut c = controller(vec![popup(1, ClientTrigger::Immediate)], InMemoryDocument::new());
        assert_eq!(c.state(1), Some(PopupState::Hidden));

        c.initialize();
        assert_eq!(c.state(1), Some(PopupState::Visible));
        assert!(c.document().is_visible(1));
        assert!(c.document().has_class(1, "fpp-show-zoom-in"));
    }

    #[test]
    fn test_delay_fires_no_earlier_than_configured() {
        let mut c = controller(
            vec![popup(1, ClientTrigger::Delay(Duration::from_secs(5)))],
            InMemoryDocument::new(),
        );
        c.initialize();
        assert_eq!(c.pending_timers(), 1);

        c.advance(Duration::from_millis(4_999));
        assert_eq!(c.state(1), Some(PopupState::Hidden));
        assert!(!c.document().is_visible(1));

        c.advance(Duration::from_millis(1));
        assert_eq!(c.state(1), Some(PopupState::Visible));
        assert_eq!(c.pending_timers(), 0);
    }

    #[test]
    fn test_delay_ignores_clicks_and_other_paths() {
        let mut c = controller(
            vec![popup(1, ClientTrigger::Delay(Duration::from_secs(5)))],
            InMemoryDocument::with_elements(["cta"]),
        );
        c.initialize();
        c.handle(DomEvent::Click { element_id: "cta".into() });
        c.handle(DomEvent::CloseControl { popup_id: 1 });
        c.advance(Duration::from_secs(2));
        assert_eq!(c.state(1), Some(PopupState::Hidden));

        c.advance(Duration::from_secs(3));
        assert_eq!(c.state(1), Some(PopupState::Visible));
    }

    #[test]
    fn test_zero_delay_fires_on_first_advance() {
        let mut c = controller(
            vec![popup(1, ClientTrigger::Delay(Duration::ZERO))],
            InMemoryDocument::new(),
        );
        c.initialize();
        assert_eq!(c.state(1), Some(PopupState::Hidden));
        c.advance(Duration::ZERO);
        assert_eq!(c.state(1), Some(PopupState::Visible));
    }

    #[test]
    fn test_click_trigger_fires_once() {
        let mut c = controller(
            vec![popup(1, ClientTrigger::Click("cta".into()))],
            InMemoryDocument::with_elements(["cta", "other"]),
        );
        c.initialize();

        c.handle(DomEvent::Click { element_id: "other".into() });
        assert_eq!(c.state(1), Some(PopupState::Hidden));

        c.handle(DomEvent::Click { element_id: "cta".into() });
        assert_eq!(c.state(1), Some(PopupState::Visible));

        c.handle(DomEvent::CloseControl { popup_id: 1 });
        c.handle(DomEvent::Click { element_id: "cta".into() });
        assert_eq!(c.state(1), Some(PopupState::Dismissed));
    }

    #[test]
    fn test_missing_click_target_never_shows() {
        let mut c = controller(
            vec![
                popup(1, ClientTrigger::Click("gone".into())),
                popup(2, ClientTrigger::Click(String::new())),
                popup(3, ClientTrigger::Unsupported("hover".into())),
                popup(4, ClientTrigger::Immediate),
            ],
            InMemoryDocument::new(),
        );
        c.initialize();
        c.handle(DomEvent::Click { element_id: "gone".into() });
        c.advance(Duration::from_secs(60));

        assert_eq!(c.state(1), Some(PopupState::Hidden));
        assert_eq!(c.state(2), Some(PopupState::Hidden));
        assert_eq!(c.state(3), Some(PopupState::Hidden));
        // The misconfigured popups do not block the healthy one.
        assert_eq!(c.state(4), Some(PopupState::Visible));
    }

    #[test]
    fn test_close_runs_hide_animation_then_hides() {
        let mut c = controller(vec![popup(1, ClientTrigger::Immediate)], InMemoryDocument::new());
        c.initialize();

        c.handle(DomEvent::CloseControl { popup_id: 1 });
        assert_eq!(c.state(1), Some(PopupState::Dismissed));
        assert!(c.document().is_visible(1));
        assert!(c.document().has_class(1, "fpp-hide-zoom-out"));
        assert!(!c.document().has_class(1, "fpp-show-zoom-in"));

        c.advance(Duration::from_millis(499));
        assert!(c.document().is_visible(1));

        c.advance(Duration::from_millis(1));
        assert!(!c.document().is_visible(1));
        assert!(c.document().classes(1).is_empty());
    }

    #[test]
    fn test_without_hide_animation_hides_at_once() {
        let mut p = popup(1, ClientTrigger::Immediate);
        p.hide_class = None;
        let mut c = controller(vec![p], InMemoryDocument::new());
        c.initialize();
        c.handle(DomEvent::CloseControl { popup_id: 1 });
        assert!(!c.document().is_visible(1));
        assert_eq!(c.pending_timers(), 0);
    }

    #[test]
    fn test_custom_hide_transition() {
        let mut c = controller(vec![popup(1, ClientTrigger::Immediate)], InMemoryDocument::new())
            .with_hide_transition(Duration::from_millis(200));
        c.initialize();
        c.handle(DomEvent::CloseControl { popup_id: 1 });
        c.advance(Duration::from_millis(200));
        assert!(!c.document().is_visible(1));
    }

    #[test]
    fn test_hide_transition_from_config() {
        let config = PresentationConfig {
            hide_transition_ms: 120,
            session_marker_prefix: "promo_".into(),
            ..PresentationConfig::default()
        };
        let mut popup = popup(1, ClientTrigger::Immediate);
        popup.display_once = true;
        let mut c = PresentationController::new(
            vec![popup],
            InMemoryDocument::new(),
            InMemorySessionMarkers::from_config(&config),
        )
        .with_config(&config);
        c.initialize();
        c.handle(DomEvent::CloseControl { popup_id: 1 });

        c.advance(Duration::from_millis(119));
        assert!(c.document().is_visible(1));
        c.advance(Duration::from_millis(1));
        assert!(!c.document().is_visible(1));
        assert_eq!(c.markers().cookie_header(), "promo_1=1");
    }

    #[test]
    fn test_overlay_pointer_only_dismisses_from_background() {
        let mut c = controller(vec![popup(1, ClientTrigger::Immediate)], InMemoryDocument::new());
        c.initialize();

        c.handle(DomEvent::OverlayPointer {
            popup_id: 1,
            target: PointerTarget::Content,
        });
        assert_eq!(c.state(1), Some(PopupState::Visible));

        c.handle(DomEvent::OverlayPointer {
            popup_id: 1,
            target: PointerTarget::Background,
        });
        assert_eq!(c.state(1), Some(PopupState::Dismissed));
    }

    #[test]
    fn test_dismiss_while_hidden_is_ignored() {
        let mut p = popup(1, ClientTrigger::Delay(Duration::from_secs(1)));
        p.display_once = true;
        let mut c = controller(vec![p], InMemoryDocument::new());
        c.initialize();
        c.handle(DomEvent::CloseControl { popup_id: 1 });
        assert_eq!(c.state(1), Some(PopupState::Hidden));
        assert!(c.markers().is_empty());
    }

    #[test]
    fn test_display_once_marker_written_on_dismissal() {
        let mut p = popup(7, ClientTrigger::Immediate);
        p.display_once = true;
        let mut c = controller(vec![p.clone()], InMemoryDocument::new());
        c.initialize();
        assert!(!c.markers().is_marked(7), "marker must not be written at show time");

        c.handle(DomEvent::CloseControl { popup_id: 7 });
        assert!(c.markers().is_marked(7));

        // Next page load in the same session.
        let (_, markers) = c.into_parts();
        let mut next = PresentationController::new(vec![p], InMemoryDocument::new(), markers);
        next.initialize();
        next.advance(Duration::from_secs(30));
        assert_eq!(next.state(7), Some(PopupState::Hidden));
        assert!(next.is_suppressed(7));
        assert!(!next.document().is_visible(7));
    }

    #[test]
    fn test_marker_ignored_for_repeatable_popups() {
        let mut markers = InMemorySessionMarkers::default();
        markers.mark(1);
        let mut c = PresentationController::new(
            vec![popup(1, ClientTrigger::Immediate)],
            InMemoryDocument::new(),
            markers,
        );
        c.initialize();
        assert_eq!(c.state(1), Some(PopupState::Visible));
    }

    #[test]
    fn test_timers_fire_in_due_order() {
        let mut c = controller(
            vec![
                popup(1, ClientTrigger::Delay(Duration::from_secs(3))),
                popup(2, ClientTrigger::Delay(Duration::from_secs(1))),
            ],
            InMemoryDocument::new(),
        );
        c.initialize();

        c.advance(Duration::from_secs(2));
        assert_eq!(c.state(1), Some(PopupState::Hidden));
        assert_eq!(c.state(2), Some(PopupState::Visible));
        assert_eq!(c.elapsed(), Duration::from_secs(2));

        // The hide timer (due at 2.5s) fires before popup 1's show timer.
        c.handle(DomEvent::CloseControl { popup_id: 2 });
        c.advance(Duration::from_secs(5));
        assert_eq!(c.state(1), Some(PopupState::Visible));
        assert!(!c.document().is_visible(2));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut c = controller(
            vec![popup(1, ClientTrigger::Delay(Duration::from_secs(1)))],
            InMemoryDocument::new(),
        );
        c.initialize();
        c.initialize();
        assert_eq!(c.pending_timers(), 1);
    }
}
