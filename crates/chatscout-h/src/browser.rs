use crate::cdp::{CdpClient, LaunchOptions, request_timeout_for};
use crate::driver::CdpPage;
use chatscout_core::config::BrowserConfig;
use chatscout_core::error::PageError;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone)]
pub struct NavigationResult {
    pub url: String,
    pub title: String,
}

/// One Chromium instance with a single tab that detection runs against.
pub struct HeadlessBrowser {
    client: Option<CdpClient>,
    options: LaunchOptions,
    settle: Duration,
}

impl HeadlessBrowser {
    pub fn new() -> Self {
        Self::with_options(LaunchOptions::default())
    }

    pub fn new_with_visibility(visible: bool) -> Self {
        Self::with_options(LaunchOptions {
            visible,
            ..LaunchOptions::default()
        })
    }

    pub fn with_options(options: LaunchOptions) -> Self {
        Self {
            client: None,
            options,
            settle: Duration::ZERO,
        }
    }

    pub fn from_config(config: &BrowserConfig) -> Self {
        Self {
            settle: Duration::from_millis(config.settle_ms),
            ..Self::with_options(LaunchOptions {
                visible: config.visible,
                chrome_bin: config.chrome_bin.clone(),
                user_data_dir: config.user_data_dir.clone(),
                ..LaunchOptions::default()
            })
        }
    }

    /// Let CDP requests run long enough for captures of up to `timeout`.
    /// Takes effect at the next launch.
    pub fn with_capture_timeout(mut self, timeout: Duration, host_grace: Duration) -> Self {
        self.options.request_timeout = request_timeout_for(timeout, host_grace);
        self
    }

    pub fn request_timeout(&self) -> Duration {
        self.options.request_timeout
    }

    /// Override the wait after each navigation.
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    pub async fn launch(&mut self) -> Result<(), PageError> {
        info!("Launching headless browser (Chromium)...");
        let client = CdpClient::launch(&self.options)
            .await
            .map_err(|e| PageError::Other(e.to_string()))?;
        self.client = Some(client);
        Ok(())
    }

    pub async fn close(&mut self) -> Result<(), PageError> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| PageError::Other(e.to_string()))?;
        }
        Ok(())
    }

    /// Load `url` and wait for the settle period so scripted widgets render.
    pub async fn navigate(&mut self, url: &str) -> Result<NavigationResult, PageError> {
        let client = self.client.as_ref().ok_or(PageError::NotReady)?;

        info!("Navigating to: {}", url);
        client
            .page
            .goto(url)
            .await
            .map_err(|e| PageError::Navigation(e.to_string()))?;

        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }

        let title = client
            .page
            .get_title()
            .await
            .unwrap_or_default()
            .unwrap_or_default();
        let url = client
            .page
            .url()
            .await
            .map_err(|e| PageError::Navigation(e.to_string()))?
            .unwrap_or_default();
        Ok(NavigationResult { url, title })
    }

    /// Driver for the current tab.
    pub fn page(&self) -> Result<Arc<CdpPage>, PageError> {
        let client = self.client.as_ref().ok_or(PageError::NotReady)?;
        Ok(Arc::new(CdpPage::new(client.page.clone())))
    }
}

impl Default for HeadlessBrowser {
    fn default() -> Self {
        Self::new()
    }
}
