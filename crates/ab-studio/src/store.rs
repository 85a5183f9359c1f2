//! Application state store
//!
//! [`AnimationStore`] is the only writer of [`AppState`]. Every edit keeps
//! `timeline` in lock-step with `animations`: one item per config, same
//! order, rebuilt whenever its config changes.

use ab_ipc::TargetElement;

use crate::model::validate_timing;
use crate::{AnimationConfig, AnimationUpdate, AppState, StudioError, TimelineItem};

#[derive(Debug, Default)]
pub struct AnimationStore {
    state: AppState,
}

impl AnimationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn animation(&self, id: &str) -> Option<&AnimationConfig> {
        self.state.animations.iter().find(|a| a.id == id)
    }

    pub fn selected_element(&self, id: &str) -> Option<&TargetElement> {
        self.state.selected_elements.iter().find(|e| e.id == id)
    }

    // === Selection ===

    /// Add an element to the selection. Returns `false` if an element with
    /// the same id is already selected.
    pub fn select_element(&mut self, element: TargetElement) -> bool {
        if self.selected_element(&element.id).is_some() {
            tracing::debug!(id = %element.id, "element already selected");
            return false;
        }
        tracing::info!(id = %element.id, selector = %element.selector, "element selected");
        self.state.selected_elements.push(element);
        true
    }

    pub fn deselect_element(&mut self, id: &str) -> Result<TargetElement, StudioError> {
        let index = self
            .state
            .selected_elements
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StudioError::UnknownElement(id.to_string()))?;
        Ok(self.state.selected_elements.remove(index))
    }

    pub fn clear_selected_elements(&mut self) {
        self.state.selected_elements.clear();
    }

    // === Animations ===

    pub fn add_animation(&mut self, config: AnimationConfig) -> Result<(), StudioError> {
        config.validate()?;
        if self.animation(&config.id).is_some() {
            return Err(StudioError::DuplicateAnimation(config.id));
        }
        tracing::debug!(id = %config.id, preset = %config.preset.id, "animation added");
        self.state.timeline.push(TimelineItem::from_config(&config));
        self.state.animations.push(config);
        Ok(())
    }

    /// Remove one config and its timeline item
    pub fn remove_animation(&mut self, id: &str) -> Result<AnimationConfig, StudioError> {
        let index = self.index_of(id)?;
        self.state.timeline.retain(|item| item.animation.id != id);
        Ok(self.state.animations.remove(index))
    }

    /// Patch a config in place and rebuild its timeline item
    pub fn update_animation(&mut self, id: &str, update: &AnimationUpdate) -> Result<(), StudioError> {
        let index = self.index_of(id)?;
        let updated = update.applied_to(&self.state.animations[index]);
        updated.validate()?;
        self.replace(index, updated);
        Ok(())
    }

    /// Move an item on the timeline by changing its config's delay
    pub fn move_timeline_item(&mut self, id: &str, start_time: f64) -> Result<(), StudioError> {
        let index = self.index_of(id)?;
        let mut updated = self.state.animations[index].clone();
        validate_timing(updated.duration, start_time)?;
        updated.delay = start_time;
        self.replace(index, updated);
        Ok(())
    }

    /// Items to play: the timeline, or items derived from the configs when
    /// the timeline is empty
    pub fn playback_items(&self) -> Vec<TimelineItem> {
        if !self.state.timeline.is_empty() {
            return self.state.timeline.clone();
        }
        self.state
            .animations
            .iter()
            .map(TimelineItem::from_config)
            .collect()
    }

    // === Playback flags ===

    pub fn mark_playing(&mut self) {
        self.state.is_playing = true;
        self.state.current_time = 0.0;
    }

    pub fn mark_stopped(&mut self) {
        self.state.is_playing = false;
        self.state.current_time = 0.0;
    }

    fn index_of(&self, id: &str) -> Result<usize, StudioError> {
        self.state
            .animations
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| StudioError::UnknownAnimation(id.to_string()))
    }

    fn replace(&mut self, index: usize, config: AnimationConfig) {
        let item = TimelineItem::from_config(&config);
        match self
            .state
            .timeline
            .iter_mut()
            .find(|item| item.animation.id == config.id)
        {
            Some(slot) => *slot = item,
            None => self.state.timeline.push(item),
        }
        self.state.animations[index] = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;

    fn element(id: &str) -> TargetElement {
        TargetElement {
            id: id.to_string(),
            tag_name: "DIV".to_string(),
            class_name: String::new(),
            text_content: String::new(),
            selector: format!("#{}", id),
        }
    }

    fn config(element_id: &str, delay: f64) -> AnimationConfig {
        let preset = presets::preset("fade-in").unwrap();
        AnimationConfig::new(&element(element_id), preset, 1.0, delay, "ease")
    }

    #[test]
    fn test_select_is_unique_by_id() {
        let mut store = AnimationStore::new();
        assert!(store.select_element(element("a")));
        assert!(!store.select_element(element("a")));
        assert_eq!(store.state().selected_elements.len(), 1);

        store.deselect_element("a").unwrap();
        assert!(store.state().selected_elements.is_empty());
        assert_eq!(
            store.deselect_element("a"),
            Err(StudioError::UnknownElement("a".to_string()))
        );
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut store = AnimationStore::new();
        let configs: Vec<_> = ["a", "b", "c"].iter().map(|id| config(id, 0.0)).collect();
        for c in &configs {
            store.add_animation(c.clone()).unwrap();
        }

        store.remove_animation(&configs[1].id).unwrap();

        let animation_ids: Vec<_> = store.state().animations.iter().map(|a| a.id.clone()).collect();
        let timeline_ids: Vec<_> = store
            .state()
            .timeline
            .iter()
            .map(|i| i.animation.id.clone())
            .collect();
        assert_eq!(animation_ids, vec![configs[0].id.clone(), configs[2].id.clone()]);
        assert_eq!(timeline_ids, animation_ids);
        assert!(store.remove_animation(&configs[1].id).is_err());
    }

    #[test]
    fn test_update_rebuilds_timeline_item() {
        let mut store = AnimationStore::new();
        let c = config("a", 0.0);
        store.add_animation(c.clone()).unwrap();

        store
            .update_animation(
                &c.id,
                &AnimationUpdate {
                    delay: Some(0.5),
                    duration: Some(2.0),
                    ..AnimationUpdate::default()
                },
            )
            .unwrap();

        let item = &store.state().timeline[0];
        assert_eq!(item.start_time, 0.5);
        assert_eq!(item.end_time, 2.5);
        assert_eq!(item.animation, store.state().animations[0]);
    }

    #[test]
    fn test_invalid_edits_leave_state_untouched() {
        let mut store = AnimationStore::new();
        assert!(store.add_animation(config("a", -1.0)).is_err());
        assert!(store.state().animations.is_empty());

        let c = config("a", 0.0);
        store.add_animation(c.clone()).unwrap();
        let before = store.state().clone();
        let bad = AnimationUpdate {
            duration: Some(0.0),
            ..AnimationUpdate::default()
        };
        assert!(matches!(
            store.update_animation(&c.id, &bad),
            Err(StudioError::InvalidTiming { .. })
        ));
        assert!(store.move_timeline_item(&c.id, -0.5).is_err());
        assert_eq!(store.state(), &before);
        assert!(matches!(
            store.add_animation(c),
            Err(StudioError::DuplicateAnimation(_))
        ));
    }

    #[test]
    fn test_move_timeline_item() {
        let mut store = AnimationStore::new();
        let c = config("a", 0.0);
        store.add_animation(c.clone()).unwrap();
        store.move_timeline_item(&c.id, 1.5).unwrap();
        assert_eq!(store.state().animations[0].delay, 1.5);
        assert_eq!(store.state().timeline[0].start_time, 1.5);
        assert_eq!(store.state().timeline[0].end_time, 2.5);
    }
}
