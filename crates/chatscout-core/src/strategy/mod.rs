//! Detection strategies.
//!
//! Three interchangeable ways to fill a [`SelectorSet`](crate::model::SelectorSet):
//! - [`AutoDetect`]: catalog heuristics with structural inference
//! - [`ClickLearn`]: the user clicks each element
//! - [`ManualSelectors`]: selectors supplied by the caller
//!
//! Callers hold a `Box<dyn DetectionStrategy>` and never branch on the kind.

pub mod auto;
pub mod click;
pub mod manual;

pub use auto::{AutoDetect, SmartAutoDetect, detect_framework};
pub use click::ClickLearn;
pub use manual::ManualSelectors;

use crate::model::{DetectionResult, SelectorInfo};
use async_trait::async_trait;

#[async_trait]
pub trait DetectionStrategy: Send + Sync {
    /// Short name used in logs and CLI output.
    fn name(&self) -> &'static str;

    /// Run the full detection for every role the strategy handles.
    async fn detect(&self) -> DetectionResult;

    async fn detect_textarea(&self) -> Option<SelectorInfo>;

    async fn detect_submit_button(&self) -> Option<SelectorInfo>;

    async fn detect_bot_messages(&self) -> Option<SelectorInfo>;

    /// Optional role; strategies without support return `None`.
    async fn detect_thread_container(&self) -> Option<SelectorInfo> {
        None
    }
}
