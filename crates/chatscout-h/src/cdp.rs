use chatscout_core::capture::{DEFAULT_CAPTURE_TIMEOUT, DEFAULT_HOST_GRACE};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;

/// chromiumoxide's own default per-request timeout.
pub const MIN_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const REQUEST_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);

/// CDP request timeout for a page where a click capture may wait `capture_timeout`.
///
/// A capture is a single awaited `Runtime.evaluate`, so the request must
/// outlive the host bound (`capture_timeout + host_grace`).
pub fn request_timeout_for(capture_timeout: Duration, host_grace: Duration) -> Duration {
    (capture_timeout + host_grace + REQUEST_TIMEOUT_MARGIN).max(MIN_REQUEST_TIMEOUT)
}

/// How the browser process is started.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub visible: bool,
    pub chrome_bin: Option<PathBuf>,
    pub user_data_dir: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            visible: false,
            chrome_bin: None,
            user_data_dir: None,
            request_timeout: request_timeout_for(DEFAULT_CAPTURE_TIMEOUT, DEFAULT_HOST_GRACE),
        }
    }
}

pub struct CdpClient {
    pub browser: Browser,
    pub handler_task: JoinHandle<()>,
    pub page: Page,
    user_data_dir: PathBuf,
    cleanup_user_data_dir: bool,
}

impl CdpClient {
    pub async fn launch(
        options: &LaunchOptions,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let mut config_builder = BrowserConfig::builder();
        config_builder = config_builder.no_sandbox(); // Often needed in docker/CI/restricted envs
        let (user_data_dir, cleanup_user_data_dir) =
            resolve_user_data_dir(options.user_data_dir.as_ref())?;
        config_builder = config_builder.user_data_dir(&user_data_dir);
        config_builder = config_builder.request_timeout(options.request_timeout);

        // Click learning needs a window the user can click in.
        if options.visible {
            tracing::info!("Launching browser in visible mode");
            config_builder = config_builder.with_head();
        } else {
            tracing::info!("Launching browser in headless mode");
        }

        // CHROME_BIN wins over the configured binary.
        let chrome_bin = std::env::var("CHROME_BIN")
            .ok()
            .map(PathBuf::from)
            .or_else(|| options.chrome_bin.clone());
        if let Some(chrome_bin) = chrome_bin {
            tracing::info!("Using custom Chrome binary: {}", chrome_bin.display());
            config_builder = config_builder.chrome_executable(chrome_bin);
        }

        let (browser, mut handler) = Browser::launch(
            config_builder
                .build()
                .map_err(|e| format!("Failed to build browser config: {}", e))?,
        )
        .await
        .map_err(|e| format!("Failed to launch browser: {}", e))?;

        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if let Err(e) = h {
                    tracing::debug!("Browser handler error (ignoring): {}", e);
                }
            }
            tracing::info!("Browser handler task ended");
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| format!("Failed to create page: {}", e))?;

        let mut console_events = page
            .event_listener::<chromiumoxide::cdp::js_protocol::runtime::EventConsoleApiCalled>()
            .await
            .map_err(|e| format!("Failed to subscribe to console events: {}", e))?;

        tokio::spawn(async move {
            while let Some(event) = console_events.next().await {
                let args_str: Vec<String> = event
                    .args
                    .iter()
                    .map(|arg| {
                        arg.description
                            .clone()
                            .unwrap_or_else(|| "unknown".to_string())
                    })
                    .collect();
                tracing::debug!(
                    "Browser Console [{:?}]: {}",
                    event.r#type,
                    args_str.join(" ")
                );
            }
        });

        // A pending alert blocks every evaluation, captures included.
        let mut dialog_events = page
            .event_listener::<chromiumoxide::cdp::browser_protocol::page::EventJavascriptDialogOpening>()
            .await
            .map_err(|e| format!("Failed to subscribe to dialog events: {}", e))?;

        let page_clone = page.clone();
        tokio::spawn(async move {
            while let Some(event) = dialog_events.next().await {
                tracing::info!(
                    "Handling JavaScript Dialog: {} ({:?})",
                    event.message,
                    event.r#type
                );
                let cmd =
                    chromiumoxide::cdp::browser_protocol::page::HandleJavaScriptDialogParams::new(
                        true,
                    );
                if let Err(e) = page_clone.execute(cmd).await {
                    tracing::error!("Failed to handle/accept dialog: {}", e);
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
            page,
            user_data_dir,
            cleanup_user_data_dir,
        })
    }

    pub async fn close(mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.browser
            .close()
            .await
            .map_err(|e| format!("Error closing browser: {}", e))?;
        self.handler_task
            .await
            .map_err(|e| format!("Error awaiting handler: {}", e))?;

        if self.cleanup_user_data_dir {
            if let Err(e) = std::fs::remove_dir_all(&self.user_data_dir) {
                tracing::debug!(
                    "Failed to clean up user-data-dir {}: {}",
                    self.user_data_dir.display(),
                    e
                );
            }
        }

        Ok(())
    }
}

/// Profile directory and whether it is ours to delete on close.
///
/// `CHATSCOUT_USER_DATA_DIR` wins over the configured directory; without
/// either a throwaway profile is created under the temp dir.
fn resolve_user_data_dir(
    configured: Option<&PathBuf>,
) -> Result<(PathBuf, bool), Box<dyn std::error::Error + Send + Sync>> {
    let explicit = std::env::var("CHATSCOUT_USER_DATA_DIR")
        .ok()
        .map(PathBuf::from)
        .or_else(|| configured.cloned());
    if let Some(path) = explicit {
        std::fs::create_dir_all(&path)?;
        tracing::info!("Using user data dir: {}", path.display());
        return Ok((path, false));
    }

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| format!("System clock error: {}", e))?
        .as_nanos();
    let unique = format!("chatscout-chromium-profile-{}-{}", std::process::id(), nanos);
    let path = std::env::temp_dir().join(unique);
    std::fs::create_dir_all(&path)?;
    tracing::info!("Using isolated user data dir: {}", path.display());
    Ok((path, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_timeout_outlives_capture_bound() {
        let timeout = request_timeout_for(Duration::from_secs(60), Duration::from_secs(5));
        assert!(timeout > Duration::from_secs(65));

        let default = LaunchOptions::default().request_timeout;
        assert!(default > DEFAULT_CAPTURE_TIMEOUT + DEFAULT_HOST_GRACE);
    }

    #[test]
    fn test_request_timeout_never_below_chromiumoxide_default() {
        let timeout = request_timeout_for(Duration::from_millis(300), Duration::ZERO);
        assert_eq!(timeout, MIN_REQUEST_TIMEOUT);
    }
}
