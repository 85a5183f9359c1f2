//! Controller view of the page

use ab_ipc::{AnimationData, CommandAck, TargetElement};
use async_trait::async_trait;

/// Commands the controller can send toward the active page.
///
/// Implementations swallow delivery failures: acks report `success: false`
/// and element queries return an empty list.
#[async_trait(?Send)]
pub trait PageLink {
    async fn start_element_selection(&self) -> CommandAck;

    async fn stop_element_selection(&self) -> CommandAck;

    /// Animate the element matching `selector`
    async fn animate_element(&self, selector: &str, animation: &AnimationData) -> CommandAck;

    async fn reset_element(&self, selector: &str) -> CommandAck;

    /// Candidate elements on the page (at most 50)
    async fn page_elements(&self) -> Vec<TargetElement>;
}
