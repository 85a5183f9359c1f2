//! Controller-side logic for Animation Builder
//!
//! This crate runs in the popup. It owns the application state, turns it
//! into a timed sequence of page commands, and renders export code.
//!
//! ## Module Structure
//!
//! - `model` - Presets, animation configs, timeline items, app state
//! - `presets` - Built-in preset and easing catalogs
//! - `store` - [`AnimationStore`], the single owner of [`AppState`]
//! - `scheduler` - [`TimelineScheduler`], cancellable playback
//! - `export` - Framer Motion and GSAP code generation
//! - `link` / `timer` - Seams to the relay and the host's timers
//! - `studio` - [`Studio`], the facade the popup shell drives
//! - `testing` - Deterministic doubles for the seams

mod config;
mod error;
pub mod export;
mod link;
mod model;
pub mod presets;
mod scheduler;
mod store;
mod studio;
pub mod testing;
mod timer;

pub use config::StudioConfig;
pub use error::StudioError;
pub use export::ExportFormat;
pub use link::PageLink;
pub use model::{AnimationConfig, AnimationPreset, AnimationUpdate, AppState, EasingOption, TimelineItem};
pub use scheduler::{PlaybackSummary, TimelineScheduler};
pub use store::AnimationStore;
pub use studio::{AnimationRequest, Studio};
pub use timer::{TimerHandle, TimerHost};
