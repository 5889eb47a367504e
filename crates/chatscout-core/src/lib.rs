pub mod capture;
pub mod catalog;
pub mod config;
pub mod error;
pub mod inference;
pub mod matcher;
pub mod model;
pub mod page;
pub mod reporter;
pub mod strategy;
pub mod validator;

pub use capture::{CaptureOutcome, CapturedElement, ClickCapture};
pub use error::PageError;
pub use model::{ConfidenceTier, DetectionMethod, DetectionResult, Role, SelectorInfo, SelectorSet};
pub use page::{Locator, PageDriver, locator};
pub use reporter::{Reporter, TracingReporter};
pub use strategy::{AutoDetect, ClickLearn, DetectionStrategy, ManualSelectors, SmartAutoDetect};
