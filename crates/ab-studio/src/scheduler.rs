//! Timeline playback
//!
//! Each item gets its own timer at `start_time` seconds from play start.
//! The timeline offset already encodes the config delay, so dispatches go
//! out with an executor-level delay of zero. Timer handles are kept until
//! the next `play`, `stop` or `reset`, or until the scheduler is dropped,
//! all of which cancel whatever has not fired.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use futures::FutureExt;

use crate::{AnimationConfig, PageLink, TimelineItem, TimerHandle, TimerHost};

/// Outcome of [`TimelineScheduler::play`]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaybackSummary {
    /// Number of dispatches scheduled
    pub scheduled: usize,
    /// Latest end time over all items, in seconds
    pub total_duration: f64,
}

pub struct TimelineScheduler<L: PageLink + 'static, T: TimerHost> {
    link: Rc<L>,
    timers: T,
    pending: RefCell<Vec<TimerHandle>>,
}

impl<L: PageLink + 'static, T: TimerHost> TimelineScheduler<L, T> {
    pub fn new(link: Rc<L>, timers: T) -> Self {
        Self {
            link,
            timers,
            pending: RefCell::new(Vec::new()),
        }
    }

    /// Schedule one dispatch per item, in start-time order.
    ///
    /// Cancels any previous playback first. Returns immediately; an empty
    /// item list schedules nothing.
    pub fn play(&self, items: &[TimelineItem]) -> PlaybackSummary {
        self.stop();

        let mut sorted: Vec<(Duration, TimelineItem)> = items
            .iter()
            .filter_map(|item| match timer_delay(item.start_time) {
                Some(delay) => Some((delay, item.clone())),
                None => {
                    tracing::warn!(
                        selector = %item.animation.selector,
                        start_time = item.start_time,
                        "start time beyond timer range, skipping"
                    );
                    None
                }
            })
            .collect();
        sorted.sort_by(|a, b| a.1.start_time.total_cmp(&b.1.start_time));
        if sorted.is_empty() {
            tracing::debug!("no animations to play");
            return PlaybackSummary::default();
        }

        let total_duration = sorted
            .iter()
            .map(|(_, item)| item.end_time)
            .fold(f64::MIN, f64::max);

        let mut pending = self.pending.borrow_mut();
        for (delay, item) in &sorted {
            let link = Rc::clone(&self.link);
            let selector = item.animation.selector.clone();
            let animation = item.animation.animation_data(0.0);
            let start_time = item.start_time;
            let task = async move {
                tracing::debug!(selector = %selector, start_time, "dispatching animation");
                let ack = link.animate_element(&selector, &animation).await;
                if !ack.success {
                    tracing::warn!(selector = %selector, error = ?ack.error, "animation dispatch failed");
                }
            }
            .boxed_local();
            pending.push(self.timers.schedule(*delay, task));
        }

        tracing::info!(items = sorted.len(), total_duration, "timeline started");
        PlaybackSummary {
            scheduled: sorted.len(),
            total_duration,
        }
    }

    /// Cancel every dispatch that has not fired yet. Returns how many
    /// handles were released.
    pub fn stop(&self) -> usize {
        let handles: Vec<TimerHandle> = self.pending.borrow_mut().drain(..).collect();
        for handle in &handles {
            self.timers.cancel(*handle);
        }
        handles.len()
    }

    /// Cancel playback, then reset each animation's element one at a time
    pub async fn reset(&self, animations: &[AnimationConfig]) {
        self.stop();
        for animation in animations {
            let ack = self.link.reset_element(&animation.selector).await;
            if !ack.success {
                tracing::warn!(selector = %animation.selector, error = ?ack.error, "reset failed");
            }
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }
}

/// Host timers take a signed 32-bit millisecond delay
const MAX_TIMER_DELAY: Duration = Duration::from_millis(i32::MAX as u64);

fn timer_delay(start_time: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(start_time.max(0.0))
        .ok()
        .filter(|delay| *delay <= MAX_TIMER_DELAY)
}

impl<L: PageLink + 'static, T: TimerHost> Drop for TimelineScheduler<L, T> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{LinkCall, ManualTimers, RecordingLink};
    use crate::{presets, AnimationConfig};
    use ab_ipc::TargetElement;

    fn item(id: &str, delay: f64, duration: f64) -> TimelineItem {
        let element = TargetElement {
            id: id.to_string(),
            tag_name: "DIV".to_string(),
            class_name: String::new(),
            text_content: String::new(),
            selector: format!("#{}", id),
        };
        let preset = presets::preset("fade-in").unwrap();
        TimelineItem::from_config(&AnimationConfig::new(&element, preset, duration, delay, "ease"))
    }

    fn scheduler() -> (Rc<RecordingLink>, Rc<ManualTimers>, TimelineScheduler<RecordingLink, Rc<ManualTimers>>) {
        let link = Rc::new(RecordingLink::new());
        let timers = Rc::new(ManualTimers::new());
        let scheduler = TimelineScheduler::new(Rc::clone(&link), Rc::clone(&timers));
        (link, timers, scheduler)
    }

    fn animated(link: &RecordingLink) -> Vec<String> {
        link.calls()
            .into_iter()
            .filter_map(|call| match call {
                LinkCall::Animate { selector, .. } => Some(selector),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_dispatches_at_start_times() {
        let (link, timers, scheduler) = scheduler();
        let summary = scheduler.play(&[item("b", 0.5, 1.0), item("a", 0.0, 1.0)]);
        assert_eq!(summary.scheduled, 2);
        assert_eq!(summary.total_duration, 1.5);
        assert!(link.calls().is_empty());

        timers.advance(Duration::ZERO);
        assert_eq!(animated(&link), vec!["#a"]);
        timers.advance(Duration::from_millis(499));
        assert_eq!(animated(&link), vec!["#a"]);
        timers.advance(Duration::from_millis(1));
        assert_eq!(animated(&link), vec!["#a", "#b"]);

        for call in link.calls() {
            if let LinkCall::Animate { animation, .. } = call {
                assert_eq!(animation.delay, 0.0);
            }
        }
    }

    #[test]
    fn test_equal_start_times_keep_input_order() {
        let (link, timers, scheduler) = scheduler();
        scheduler.play(&[item("x", 0.2, 1.0), item("y", 0.2, 1.0), item("z", 0.1, 1.0)]);
        timers.advance(Duration::from_secs(1));
        assert_eq!(animated(&link), vec!["#z", "#x", "#y"]);
    }

    #[test]
    fn test_empty_play_schedules_nothing() {
        let (_, timers, scheduler) = scheduler();
        assert_eq!(scheduler.play(&[]), PlaybackSummary::default());
        assert_eq!(timers.pending_count(), 0);
    }

    #[test]
    fn test_out_of_range_start_time_is_skipped() {
        let (link, timers, scheduler) = scheduler();
        let summary = scheduler.play(&[item("far", 1e20, 1.0), item("near", 0.5, 1.0)]);
        assert_eq!(summary.scheduled, 1);
        assert_eq!(summary.total_duration, 1.5);
        assert_eq!(timers.pending_count(), 1);

        timers.advance(Duration::from_secs(1));
        assert_eq!(animated(&link), vec!["#near"]);
    }

    #[test]
    fn test_stop_and_replay_cancel_pending() {
        let (link, timers, scheduler) = scheduler();
        scheduler.play(&[item("a", 1.0, 1.0)]);
        scheduler.play(&[item("b", 1.0, 1.0)]);
        assert_eq!(timers.pending_count(), 1);

        assert_eq!(scheduler.stop(), 1);
        timers.advance(Duration::from_secs(5));
        assert!(link.calls().is_empty());
    }

    #[test]
    fn test_drop_cancels_pending() {
        let (link, timers, scheduler) = scheduler();
        scheduler.play(&[item("a", 0.3, 1.0)]);
        drop(scheduler);
        timers.advance(Duration::from_secs(1));
        assert!(link.calls().is_empty());
    }

    #[test]
    fn test_reset_runs_in_order() {
        let (link, _, scheduler) = scheduler();
        let configs: Vec<AnimationConfig> = [item("a", 0.0, 1.0), item("b", 0.0, 1.0)]
            .into_iter()
            .map(|i| i.animation)
            .collect();
        futures::executor::block_on(scheduler.reset(&configs));
        assert_eq!(
            link.calls(),
            vec![
                LinkCall::Reset {
                    selector: "#a".to_string()
                },
                LinkCall::Reset {
                    selector: "#b".to_string()
                },
            ]
        );
    }
}
