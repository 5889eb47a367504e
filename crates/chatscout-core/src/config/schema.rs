use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatscoutConfig {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    #[serde(default = "default_capture_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_host_grace_ms")]
    pub host_grace_ms: u64,
    #[serde(default = "default_highlight")]
    pub highlight: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_capture_timeout_ms(),
            host_grace_ms: default_host_grace_ms(),
            highlight: default_highlight(),
        }
    }
}

impl CaptureConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn host_grace(&self) -> Duration {
        Duration::from_millis(self.host_grace_ms)
    }
}

fn default_capture_timeout_ms() -> u64 {
    30000
}

fn default_host_grace_ms() -> u64 {
    5000
}

fn default_highlight() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Auto,
    Click,
    Manual,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionConfig {
    #[serde(default)]
    pub strategy: StrategyKind,
    /// Run framework detection before the catalog walk.
    #[serde(default)]
    pub smart: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub chrome_bin: Option<PathBuf>,
    #[serde(default)]
    pub user_data_dir: Option<PathBuf>,
    /// Wait after navigation before detection starts.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            visible: false,
            chrome_bin: None,
            user_data_dir: None,
            settle_ms: default_settle_ms(),
        }
    }
}

fn default_settle_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub detailed: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            detailed: false,
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("selectors.yaml")
}
