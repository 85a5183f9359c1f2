//! Popup facade
//!
//! [`Studio`] wires the store, the scheduler and the page link together and
//! exposes the operations the popup shell calls. State lives in `RefCell`s
//! that are never borrowed across an `.await`, so page replies arriving
//! late (for example an element list requested before selection started)
//! are applied to whatever the state is at that point.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ab_ipc::{AnimationType, CommandAck, ControllerEvent, SlideDirection, TargetElement};
use serde::{Deserialize, Serialize};

use crate::export::{self, ExportFormat};
use crate::{
    presets, AnimationConfig, AnimationStore, AnimationUpdate, AppState, PageLink, PlaybackSummary,
    StudioConfig, StudioError, TimelineScheduler, TimerHost,
};

/// Parameters for [`Studio::add_animation`]. Unset timing fields take the
/// [`StudioConfig`] defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimationRequest {
    pub preset_id: String,
    pub duration: Option<f64>,
    pub delay: Option<f64>,
    pub easing: Option<String>,
    pub direction: Option<SlideDirection>,
    /// Selected element to animate; `None` animates every selected element
    pub target: Option<String>,
}

pub struct Studio<L: PageLink + 'static, T: TimerHost> {
    link: Rc<L>,
    store: RefCell<AnimationStore>,
    scheduler: TimelineScheduler<L, T>,
    config: StudioConfig,
    page_elements: RefCell<Vec<TargetElement>>,
    selecting: Cell<bool>,
}

impl<L: PageLink + 'static, T: TimerHost> Studio<L, T> {
    pub fn new(link: Rc<L>, timers: T, config: StudioConfig) -> Self {
        Self {
            scheduler: TimelineScheduler::new(Rc::clone(&link), timers),
            link,
            store: RefCell::new(AnimationStore::new()),
            config,
            page_elements: RefCell::new(Vec::new()),
            selecting: Cell::new(false),
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Snapshot of the application state
    pub fn state(&self) -> AppState {
        self.store.borrow().state().clone()
    }

    pub fn is_selecting(&self) -> bool {
        self.selecting.get()
    }

    /// Elements from the last page scan
    pub fn page_elements(&self) -> Vec<TargetElement> {
        self.page_elements.borrow().clone()
    }

    // === Page interaction ===

    /// Rescan the page for candidate elements
    pub async fn load_page_elements(&self) -> Vec<TargetElement> {
        let elements = self.link.page_elements().await;
        tracing::debug!(count = elements.len(), "page elements loaded");
        *self.page_elements.borrow_mut() = elements.clone();
        elements
    }

    pub async fn start_selection(&self) -> CommandAck {
        let ack = self.link.start_element_selection().await;
        if ack.success {
            self.selecting.set(true);
        } else {
            tracing::warn!(error = ?ack.error, "could not start element selection");
        }
        ack
    }

    pub async fn stop_selection(&self) -> CommandAck {
        self.selecting.set(false);
        self.link.stop_element_selection().await
    }

    /// Apply an event relayed from the page
    pub fn handle_event(&self, event: ControllerEvent) -> bool {
        match event {
            ControllerEvent::ElementSelected { element } => self.on_element_selected(element),
        }
    }

    /// A click-selection completed on the page (selection mode has ended
    /// there). Returns whether the element was newly added.
    pub fn on_element_selected(&self, element: TargetElement) -> bool {
        self.selecting.set(false);
        self.store.borrow_mut().select_element(element)
    }

    pub fn deselect_element(&self, id: &str) -> Result<TargetElement, StudioError> {
        self.store.borrow_mut().deselect_element(id)
    }

    pub fn clear_selected_elements(&self) {
        self.store.borrow_mut().clear_selected_elements();
    }

    // === Editing ===

    /// Create one animation per target and preview each on the page.
    ///
    /// Previews honour the config's own delay. When a stagger preset is
    /// applied to every selected element, each successive element starts
    /// `stagger_step` seconds later. Returns the new animation ids.
    pub async fn add_animation(&self, request: &AnimationRequest) -> Result<Vec<String>, StudioError> {
        let preset = presets::preset(&request.preset_id)
            .ok_or_else(|| StudioError::UnknownPreset(request.preset_id.clone()))?;
        let duration = request.duration.unwrap_or(self.config.default_duration);
        let delay = request.delay.unwrap_or(self.config.default_delay);
        let easing = request
            .easing
            .clone()
            .unwrap_or_else(|| self.config.default_easing.clone());

        let configs = {
            let mut store = self.store.borrow_mut();
            let targets: Vec<TargetElement> = match &request.target {
                Some(id) => vec![store
                    .selected_element(id)
                    .cloned()
                    .ok_or_else(|| StudioError::UnknownElement(id.clone()))?],
                None => store.state().selected_elements.clone(),
            };
            if targets.is_empty() {
                return Err(StudioError::NoTargets);
            }

            let stagger = request.target.is_none() && preset.kind == AnimationType::Stagger;
            let mut configs = Vec::with_capacity(targets.len());
            for (index, element) in targets.iter().enumerate() {
                let offset = if stagger {
                    index as f64 * self.config.stagger_step
                } else {
                    0.0
                };
                let mut config =
                    AnimationConfig::new(element, preset.clone(), duration, delay + offset, easing.clone());
                config.direction = request.direction;
                config.validate()?;
                configs.push(config);
            }
            for config in &configs {
                store.add_animation(config.clone())?;
            }
            configs
        };

        for config in &configs {
            let ack = self
                .link
                .animate_element(&config.selector, &config.animation_data(config.delay))
                .await;
            if !ack.success {
                tracing::warn!(selector = %config.selector, error = ?ack.error, "preview failed");
            }
        }

        Ok(configs.into_iter().map(|c| c.id).collect())
    }

    pub fn remove_animation(&self, id: &str) -> Result<AnimationConfig, StudioError> {
        self.store.borrow_mut().remove_animation(id)
    }

    pub fn update_animation(&self, id: &str, update: &AnimationUpdate) -> Result<(), StudioError> {
        self.store.borrow_mut().update_animation(id, update)
    }

    pub fn move_timeline_item(&self, id: &str, start_time: f64) -> Result<(), StudioError> {
        self.store.borrow_mut().move_timeline_item(id, start_time)
    }

    /// Preview one existing animation with its own delay
    pub async fn preview(&self, id: &str) -> Result<CommandAck, StudioError> {
        let config = self
            .store
            .borrow()
            .animation(id)
            .cloned()
            .ok_or_else(|| StudioError::UnknownAnimation(id.to_string()))?;
        Ok(self
            .link
            .animate_element(&config.selector, &config.animation_data(config.delay))
            .await)
    }

    // === Playback ===

    /// Start timeline playback. An empty timeline leaves the state as is.
    ///
    /// `is_playing` stays set until [`Studio::playback_finished`],
    /// [`Studio::stop`] or [`Studio::reset`].
    pub fn play(&self) -> PlaybackSummary {
        let items = self.store.borrow().playback_items();
        let summary = self.scheduler.play(&items);
        if summary.scheduled > 0 {
            self.store.borrow_mut().mark_playing();
        }
        summary
    }

    /// Cancel dispatches that have not fired yet
    pub fn stop(&self) -> usize {
        let cancelled = self.scheduler.stop();
        self.store.borrow_mut().mark_stopped();
        cancelled
    }

    /// Stop playback and restore every animated element
    pub async fn reset(&self) {
        let animations = {
            let mut store = self.store.borrow_mut();
            store.mark_stopped();
            store.state().animations.clone()
        };
        self.scheduler.reset(&animations).await;
    }

    /// Called by the shell once `total_duration` has elapsed
    pub fn playback_finished(&self) {
        self.store.borrow_mut().mark_stopped();
    }

    pub fn pending_dispatches(&self) -> usize {
        self.scheduler.pending_count()
    }

    pub fn export(&self, format: ExportFormat) -> String {
        export::generate(&self.store.borrow().state().animations, format)
    }
}
