//! Entrance animation executor
//!
//! An animation is two style writes separated by a forced layout:
//!
//! 1. Transition off, initial state applied (e.g. `opacity: 0`).
//! 2. After `delay` seconds, transition on and final state applied.
//!
//! The first time a selector is animated its inline `transform`, `opacity`
//! and `transition` are snapshotted; [`AnimationExecutor::reset`] writes them
//! back verbatim.

use std::collections::HashMap;
use std::rc::Rc;

use ab_hal::{PageHal, PageHalError, TimerId};
use ab_ipc::{AnimationData, AnimationType, SlideDirection};

/// Inline style values captured before the first animation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleSnapshot {
    pub transform: String,
    pub opacity: String,
    pub transition: String,
}

impl StyleSnapshot {
    fn capture<H: PageHal>(hal: &H, element: &H::Element) -> Self {
        Self {
            transform: hal.style_property(element, "transform"),
            opacity: hal.style_property(element, "opacity"),
            transition: hal.style_property(element, "transition"),
        }
    }

    fn restore<H: PageHal>(&self, hal: &H, element: &H::Element) {
        hal.set_style_property(element, "transform", &self.transform);
        hal.set_style_property(element, "opacity", &self.opacity);
        hal.set_style_property(element, "transition", &self.transition);
    }
}

/// Styles applied before the transition starts
#[derive(Clone, Debug, PartialEq)]
pub struct InitialState {
    pub opacity: String,
    /// `None` leaves transform cleared
    pub transform: Option<String>,
}

/// Initial state for an animation.
///
/// Slide without a direction travels up. Stagger animates like a slide and
/// text-reveal like a fade.
pub fn initial_state(animation: &AnimationData, slide_distance: f64) -> InitialState {
    let transform = match animation.kind {
        AnimationType::Fade | AnimationType::TextReveal => None,
        AnimationType::Slide | AnimationType::Stagger => {
            let direction = animation.direction.unwrap_or(SlideDirection::Up);
            let (x, y) = direction.start_offset(slide_distance);
            Some(if direction.is_vertical() {
                format!("translateY({}px)", y)
            } else {
                format!("translateX({}px)", x)
            })
        }
        AnimationType::Scale => Some("scale(0)".to_string()),
        AnimationType::Rotate => Some("rotate(-180deg)".to_string()),
    };
    InitialState {
        opacity: "0".to_string(),
        transform,
    }
}

/// Applies and reverts entrance animations
pub struct AnimationExecutor<H: PageHal> {
    hal: Rc<H>,
    slide_distance: f64,
    snapshots: HashMap<String, StyleSnapshot>,
    /// Final-state timers not yet cancelled, by selector
    pending: HashMap<String, TimerId>,
}

impl<H: PageHal> AnimationExecutor<H> {
    pub fn new(hal: Rc<H>, slide_distance: f64) -> Self {
        Self {
            hal,
            slide_distance,
            snapshots: HashMap::new(),
            pending: HashMap::new(),
        }
    }

    /// Animate the first element matching `selector`.
    ///
    /// Returns `Ok(false)` when nothing matches.
    pub fn animate(&mut self, selector: &str, animation: &AnimationData) -> Result<bool, PageHalError> {
        let Some(element) = self.hal.query_selector(selector)? else {
            tracing::warn!(selector, "animate: no element matches");
            return Ok(false);
        };

        if let Some(timer) = self.pending.remove(selector) {
            self.hal.clear_timeout(timer);
        }

        self.snapshots
            .entry(selector.to_string())
            .or_insert_with(|| StyleSnapshot::capture(&*self.hal, &element));

        let hal = &*self.hal;
        hal.set_style_property(&element, "transition", "none");
        hal.set_style_property(&element, "transform", "");
        hal.set_style_property(&element, "opacity", "");

        // Transition is already `none`, so the cleared values never render;
        // one flush after the initial state commits both steps
        let initial = initial_state(animation, self.slide_distance);
        hal.set_style_property(&element, "opacity", &initial.opacity);
        if let Some(transform) = &initial.transform {
            hal.set_style_property(&element, "transform", transform);
        }
        hal.force_reflow(&element);

        let transition = format!("all {}s {}", animation.duration, animation.easing);
        let delay_ms = (animation.delay.max(0.0)) * 1000.0;
        let task_hal = Rc::clone(&self.hal);
        let timer = hal.set_timeout(
            delay_ms,
            Box::new(move || {
                task_hal.set_style_property(&element, "transition", &transition);
                task_hal.set_style_property(&element, "transform", "");
                task_hal.set_style_property(&element, "opacity", "1");
            }),
        );
        self.pending.insert(selector.to_string(), timer);

        tracing::debug!(
            selector,
            kind = animation.kind.as_str(),
            duration = animation.duration,
            delay = animation.delay,
            "animation started"
        );
        Ok(true)
    }

    /// Cancel any pending final state and restore the snapshot.
    ///
    /// Returns `Ok(false)` when the selector matches nothing. A selector that
    /// was never animated is left untouched.
    pub fn reset(&mut self, selector: &str) -> Result<bool, PageHalError> {
        if let Some(timer) = self.pending.remove(selector) {
            self.hal.clear_timeout(timer);
        }

        let Some(element) = self.hal.query_selector(selector)? else {
            tracing::warn!(selector, "reset: no element matches");
            return Ok(false);
        };

        match self.snapshots.get(selector) {
            Some(snapshot) => {
                snapshot.restore(&*self.hal, &element);
                tracing::debug!(selector, "element reset");
            }
            None => tracing::debug!(selector, "reset: element was never animated"),
        }
        Ok(true)
    }

    /// Snapshot recorded for `selector`, if it was ever animated
    pub fn snapshot(&self, selector: &str) -> Option<&StyleSnapshot> {
        self.snapshots.get(selector)
    }

    /// Whether a final-state write is still scheduled for `selector`
    pub fn has_pending(&self, selector: &str) -> bool {
        self.pending.contains_key(selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ab_hal_mock::{ElementSpec, MockPage};

    fn data(kind: AnimationType, delay: f64) -> AnimationData {
        AnimationData {
            kind,
            duration: 0.8,
            delay,
            easing: "ease-out".to_string(),
            direction: None,
        }
    }

    #[test]
    fn test_initial_states() {
        let fade = initial_state(&data(AnimationType::Fade, 0.0), 50.0);
        assert_eq!(fade.opacity, "0");
        assert_eq!(fade.transform, None);

        let reveal = initial_state(&data(AnimationType::TextReveal, 0.0), 50.0);
        assert_eq!(reveal, fade);

        let slide = initial_state(&data(AnimationType::Slide, 0.0), 50.0);
        assert_eq!(slide.transform.as_deref(), Some("translateY(50px)"));

        let mut right = data(AnimationType::Slide, 0.0);
        right.direction = Some(SlideDirection::Right);
        assert_eq!(
            initial_state(&right, 50.0).transform.as_deref(),
            Some("translateX(-50px)")
        );

        let mut down = data(AnimationType::Stagger, 0.0);
        down.direction = Some(SlideDirection::Down);
        assert_eq!(
            initial_state(&down, 50.0).transform.as_deref(),
            Some("translateY(-50px)")
        );

        let scale = initial_state(&data(AnimationType::Scale, 0.0), 50.0);
        assert_eq!(scale.transform.as_deref(), Some("scale(0)"));
        assert_eq!(scale.opacity, "0");

        let rotate = initial_state(&data(AnimationType::Rotate, 0.0), 50.0);
        assert_eq!(rotate.transform.as_deref(), Some("rotate(-180deg)"));
    }

    #[test]
    fn test_fade_runs_to_final_state() {
        let page = Rc::new(MockPage::new());
        let el = page.append_to_body_spec(ElementSpec::new("h1").id("title"));
        let mut executor = AnimationExecutor::new(Rc::clone(&page), 50.0);

        assert!(executor.animate("#title", &data(AnimationType::Fade, 0.0)).unwrap());
        assert_eq!(page.style(&el, "opacity"), "0");
        assert_eq!(page.style(&el, "transition"), "none");
        assert_eq!(page.reflow_count(), 1);

        page.run_due_timers();
        assert_eq!(page.style(&el, "opacity"), "1");
        assert_eq!(page.style(&el, "transition"), "all 0.8s ease-out");
        assert_eq!(page.style(&el, "transform"), "");
    }

    #[test]
    fn test_single_flush_commits_cleared_and_initial_state() {
        let page = Rc::new(MockPage::new());
        let el = page.append_to_body_spec(
            ElementSpec::new("div")
                .id("card")
                .style("transform", "rotate(45deg)")
                .style("opacity", "0.3"),
        );
        let mut executor = AnimationExecutor::new(Rc::clone(&page), 50.0);

        executor.animate("#card", &data(AnimationType::Fade, 0.0)).unwrap();
        assert_eq!(page.reflow_count(), 1);
        assert_eq!(page.style(&el, "transition"), "none");
        assert_eq!(page.style(&el, "transform"), "");
        assert_eq!(page.style(&el, "opacity"), "0");
    }

    #[test]
    fn test_delay_defers_final_state() {
        let page = Rc::new(MockPage::new());
        let el = page.append_to_body_spec(ElementSpec::new("h1").id("title"));
        let mut executor = AnimationExecutor::new(Rc::clone(&page), 50.0);

        executor.animate("#title", &data(AnimationType::Rotate, 0.5)).unwrap();
        page.advance(499.0);
        assert_eq!(page.style(&el, "transform"), "rotate(-180deg)");
        page.advance(1.0);
        assert_eq!(page.style(&el, "transform"), "");
    }

    #[test]
    fn test_reset_restores_original_inline_styles() {
        let page = Rc::new(MockPage::new());
        let el = page.append_to_body_spec(
            ElementSpec::new("div")
                .id("card")
                .style("transform", "rotate(3deg)")
                .style("transition", "color 1s"),
        );
        let mut executor = AnimationExecutor::new(Rc::clone(&page), 50.0);

        executor.animate("#card", &data(AnimationType::Scale, 0.0)).unwrap();
        page.run_due_timers();
        executor.animate("#card", &data(AnimationType::Fade, 0.0)).unwrap();
        page.run_due_timers();

        assert!(executor.reset("#card").unwrap());
        assert_eq!(page.style(&el, "transform"), "rotate(3deg)");
        assert_eq!(page.style(&el, "opacity"), "");
        assert_eq!(page.style(&el, "transition"), "color 1s");
    }

    #[test]
    fn test_reset_cancels_pending_final_state() {
        let page = Rc::new(MockPage::new());
        let el = page.append_to_body_spec(ElementSpec::new("p").id("lead"));
        let mut executor = AnimationExecutor::new(Rc::clone(&page), 50.0);

        executor.animate("#lead", &data(AnimationType::Fade, 1.0)).unwrap();
        assert!(executor.has_pending("#lead"));
        executor.reset("#lead").unwrap();
        assert_eq!(page.pending_timer_count(), 0);

        page.advance(2000.0);
        assert_eq!(page.style(&el, "opacity"), "");
    }

    #[test]
    fn test_missing_element_is_not_an_error() {
        let page = Rc::new(MockPage::new());
        let mut executor = AnimationExecutor::new(Rc::clone(&page), 50.0);
        assert!(!executor.animate("#nope", &data(AnimationType::Fade, 0.0)).unwrap());
        assert!(!executor.reset("#nope").unwrap());
        assert_eq!(page.pending_timer_count(), 0);
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        let page = Rc::new(MockPage::new());
        let mut executor = AnimationExecutor::new(page, 50.0);
        assert!(matches!(
            executor.animate("div > p", &data(AnimationType::Fade, 0.0)),
            Err(PageHalError::InvalidSelector(_))
        ));
    }
}
