//! Page-realm logic for Animation Builder
//!
//! Everything in this crate runs inside the inspected page and talks to the
//! document only through [`ab_hal::PageHal`].
//!
//! ## Module Structure
//!
//! - `selector` - Stable selector and identity generation for elements
//! - `engine` - Selection mode state machine and hover overlay
//! - `executor` - Entrance animations via inline style mutation
//! - `scan` - Candidate element discovery for the popup
//! - `agent` - In-page broadcast dispatcher tying the above together
//! - `config` - Tunables shared by the page modules

mod agent;
mod config;
mod engine;
mod executor;
mod scan;
mod selector;

pub use agent::PageAgent;
pub use config::PageConfig;
pub use engine::{PointerOutcome, SelectionState, SelectorEngine};
pub use executor::{initial_state, AnimationExecutor, InitialState, StyleSnapshot};
pub use scan::scan_page;
pub use selector::{describe_element, element_identity, escape_ident, generate_selector, text_snippet};
