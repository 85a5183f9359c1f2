//! Studio configuration

use serde::{Deserialize, Serialize};

/// Defaults for newly created animations. Missing JSON fields keep their
/// defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Seconds
    pub default_duration: f64,
    /// Seconds
    pub default_delay: f64,
    pub default_easing: String,
    /// Extra delay per element when a stagger preset is applied to several
    /// elements, in seconds
    pub stagger_step: f64,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            default_duration: 0.8,
            default_delay: 0.0,
            default_easing: "ease-out".to_string(),
            stagger_step: 0.1,
        }
    }
}
