//! Click capture
//!
//! A capture injects one page routine that races three completion sources:
//! the next click (captured before page handlers, default prevented), the
//! Escape key, and a timer. Whichever fires first settles the routine, which
//! removes all three before resolving, so later clicks reach the page
//! untouched.
//!
//! Host-side the evaluation is bounded by the capture timeout plus a grace
//! period. If the bound elapses, the evaluation fails, or the future is
//! dropped mid-capture, a cancel routine is sent to the page so no listener
//! survives the call. Each capture carries a session id and its cancel only
//! settles that session.

pub mod synthesis;

pub use synthesis::{CapturedElement, HIGHLIGHT_CLASS, build_info, css_escape, generate_alternatives, synthesize_selector};

use crate::page::PageDriver;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

const CAPTURE_JS: &str = include_str!("capture.js");
const HIGHLIGHT_JS: &str = include_str!("highlight.js");
const HIGHLIGHT_CLEANUP_JS: &str = include_str!("cleanup.js");
pub const HIGHLIGHT_CSS: &str = include_str!("highlight.css");

static NEXT_CAPTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Default time the user has to click.
pub const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_secs(30);

/// Extra host-side wait on top of the capture timeout before giving up on
/// the page.
pub const DEFAULT_HOST_GRACE: Duration = Duration::from_secs(5);

/// How a capture settled.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    Clicked(CapturedElement),
    Escaped,
    TimedOut,
    /// Superseded by a newer capture, or the page could not be reached.
    Cancelled,
}

impl CaptureOutcome {
    pub fn into_element(self) -> Option<CapturedElement> {
        match self {
            CaptureOutcome::Clicked(element) => Some(element),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ElementPayload {
    tag_name: String,
    #[serde(default)]
    class_name: String,
    #[serde(default)]
    id_attr: String,
    #[serde(default)]
    text_content: String,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
}

#[derive(Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum CaptureReply {
    Click { element: ElementPayload },
    Escape,
    Timeout,
    Cancelled,
}

impl From<CaptureReply> for CaptureOutcome {
    fn from(reply: CaptureReply) -> Self {
        match reply {
            CaptureReply::Click { element } => CaptureOutcome::Clicked(CapturedElement::new(
                &element.tag_name,
                &element.class_name,
                &element.id_attr,
                &element.text_content,
                element.attributes,
            )),
            CaptureReply::Escape => CaptureOutcome::Escaped,
            CaptureReply::Timeout => CaptureOutcome::TimedOut,
            CaptureReply::Cancelled => CaptureOutcome::Cancelled,
        }
    }
}

/// Page routine for one capture session with the given timeout.
pub fn capture_script(timeout: Duration, id: u64) -> String {
    CAPTURE_JS
        .replace("__TIMEOUT_MS__", &timeout.as_millis().to_string())
        .replace("__CAPTURE_ID__", &id.to_string())
}

/// Settles capture session `id` as cancelled. A no-op once that session has
/// settled or a newer one has replaced it.
pub fn cancel_script(id: u64) -> String {
    format!(
        "(function () {{ const s = window.__chatscoutCapture; \
         if (s && s.id === {}) {{ s.cancel(); return true; }} return false; }})()",
        id
    )
}

/// Cancels the in-page capture unless released after the page settled it.
struct ArmedCapture {
    page: Option<Arc<dyn PageDriver>>,
    id: u64,
}

impl ArmedCapture {
    fn new(page: Arc<dyn PageDriver>, id: u64) -> Self {
        Self {
            page: Some(page),
            id,
        }
    }

    /// The page settled the routine on its own; nothing left to tear down.
    fn settled(mut self) {
        self.page = None;
    }

    /// Tear down now and wait for the page to acknowledge.
    async fn cancel(mut self) {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.evaluate(&cancel_script(self.id)).await {
                debug!("capture cancel failed: {}", e);
            }
        }
    }
}

impl Drop for ArmedCapture {
    fn drop(&mut self) {
        let Some(page) = self.page.take() else {
            return;
        };
        // Dropped mid-await: the caller abandoned the capture.
        let script = cancel_script(self.id);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let _ = page.evaluate(&script).await;
            });
        }
    }
}

/// Single-shot click capture against one page.
#[derive(Clone)]
pub struct ClickCapture {
    page: Arc<dyn PageDriver>,
    host_grace: Duration,
}

impl ClickCapture {
    pub fn new(page: Arc<dyn PageDriver>) -> Self {
        Self {
            page,
            host_grace: DEFAULT_HOST_GRACE,
        }
    }

    pub fn with_host_grace(mut self, grace: Duration) -> Self {
        self.host_grace = grace;
        self
    }

    /// Wait for the next click, Escape, or timeout, whichever comes first.
    pub async fn capture_outcome(&self, timeout: Duration) -> CaptureOutcome {
        let id = NEXT_CAPTURE_ID.fetch_add(1, Ordering::Relaxed);
        let script = capture_script(timeout, id);
        let guard = ArmedCapture::new(self.page.clone(), id);

        match tokio::time::timeout(timeout + self.host_grace, self.page.evaluate(&script)).await {
            Ok(Ok(value)) => match serde_json::from_value::<CaptureReply>(value) {
                Ok(reply) => {
                    guard.settled();
                    let outcome = CaptureOutcome::from(reply);
                    debug!("capture settled: {:?}", outcome);
                    outcome
                }
                Err(e) => {
                    warn!("unexpected capture reply: {}", e);
                    guard.cancel().await;
                    CaptureOutcome::Cancelled
                }
            },
            Ok(Err(e)) => {
                warn!("capture evaluation failed: {}", e);
                guard.cancel().await;
                CaptureOutcome::Cancelled
            }
            Err(_) => {
                warn!("capture host bound of {:?} elapsed", timeout + self.host_grace);
                guard.cancel().await;
                CaptureOutcome::TimedOut
            }
        }
    }

    /// The clicked element, or `None` on Escape, timeout or failure.
    pub async fn capture(&self, timeout: Duration) -> Option<CapturedElement> {
        self.capture_outcome(timeout).await.into_element()
    }

    /// Install the hover highlight used during guided learning.
    pub async fn install_highlight(&self) {
        if let Err(e) = self.page.inject_style(HIGHLIGHT_CSS).await {
            debug!("highlight style not injected: {}", e);
        }
        match self.page.evaluate(HIGHLIGHT_JS).await {
            Ok(_) => info!("hover highlight installed"),
            Err(e) => warn!("hover highlight not installed: {}", e),
        }
    }

    /// Remove highlight classes, hover listeners and the injected style.
    pub async fn remove_highlight(&self) {
        if let Err(e) = self.page.evaluate(HIGHLIGHT_CLEANUP_JS).await {
            warn!("highlight cleanup failed: {}", e);
        }
    }
}
