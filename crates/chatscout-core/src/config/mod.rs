pub mod loader;
pub mod schema;

pub use loader::{ConfigError, ConfigLoader};
pub use schema::{BrowserConfig, CaptureConfig, ChatscoutConfig, DetectionConfig, OutputConfig, StrategyKind};
