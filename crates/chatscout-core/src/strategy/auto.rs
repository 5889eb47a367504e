use super::DetectionStrategy;
use crate::catalog::{FRAMEWORK_SIGNATURES, Framework};
use crate::inference::infer_bot_messages;
use crate::matcher::match_role;
use crate::model::{DetectionResult, Role, SelectorInfo, SelectorSet};
use crate::page::PageDriver;
use crate::validator::{PageStructure, page_structure};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Pattern-based detection over the static catalog.
pub struct AutoDetect {
    page: Arc<dyn PageDriver>,
}

impl AutoDetect {
    pub fn new(page: Arc<dyn PageDriver>) -> Self {
        Self { page }
    }

    /// Catalog match for a role, with structural inference as the
    /// bot-message fallback.
    pub async fn detect_role(&self, role: Role) -> Option<SelectorInfo> {
        let found = match_role(self.page.as_ref(), role).await;
        if found.is_none() && role == Role::BotMessages {
            debug!("bot messages: falling back to structural inference");
            return infer_bot_messages(self.page.as_ref()).await;
        }
        found
    }

    pub async fn page_structure(&self) -> PageStructure {
        page_structure(self.page.as_ref()).await
    }
}

fn missing_warning(role: Role) -> Option<&'static str> {
    match role {
        Role::Textarea => Some("Textarea non rilevato automaticamente"),
        Role::SubmitButton => Some("Submit button non rilevato automaticamente"),
        Role::BotMessages => Some("Bot messages non rilevato automaticamente"),
        _ => None,
    }
}

#[async_trait]
impl DetectionStrategy for AutoDetect {
    fn name(&self) -> &'static str {
        "auto"
    }

    async fn detect(&self) -> DetectionResult {
        info!("Starting automatic selector detection");
        let mut selectors = SelectorSet::new();
        let mut warnings = Vec::new();

        for role in [
            Role::Textarea,
            Role::SubmitButton,
            Role::BotMessages,
            Role::ThreadContainer,
        ] {
            let found = self.detect_role(role).await;
            match &found {
                Some(info) => debug!("{}: {} ({})", role, info.selector(), info.confidence()),
                None => warnings.extend(missing_warning(role).map(String::from)),
            }
            selectors.set(role, found);
        }

        let mut result = DetectionResult::new(selectors, String::new(), warnings);
        result.message = if result.success() {
            "Tutti i selettori rilevati!".to_string()
        } else {
            format!("Selettori mancanti: {}", result.missing_summary())
        };
        info!("Automatic detection finished: {}", result.message);
        result
    }

    async fn detect_textarea(&self) -> Option<SelectorInfo> {
        self.detect_role(Role::Textarea).await
    }

    async fn detect_submit_button(&self) -> Option<SelectorInfo> {
        self.detect_role(Role::SubmitButton).await
    }

    async fn detect_bot_messages(&self) -> Option<SelectorInfo> {
        self.detect_role(Role::BotMessages).await
    }

    async fn detect_thread_container(&self) -> Option<SelectorInfo> {
        self.detect_role(Role::ThreadContainer).await
    }
}

/// Identify the chatbot framework from its markup signatures.
///
/// The first signature with at least one match wins; failing queries are
/// skipped. Falls back to [`Framework::Custom`].
pub async fn detect_framework(page: &dyn PageDriver) -> Framework {
    for (framework, signatures) in FRAMEWORK_SIGNATURES {
        for signature in *signatures {
            match page.count(signature).await {
                Ok(count) if count > 0 => {
                    debug!("framework signature {} matched", signature);
                    return *framework;
                }
                Ok(_) => {}
                Err(e) => debug!("framework signature {} error - {}", signature, e),
            }
        }
    }
    Framework::Custom
}

/// [`AutoDetect`] preceded by framework detection.
///
/// The detected framework is reported but does not yet change which
/// patterns are tried.
pub struct SmartAutoDetect {
    inner: AutoDetect,
}

impl SmartAutoDetect {
    pub fn new(page: Arc<dyn PageDriver>) -> Self {
        Self {
            inner: AutoDetect::new(page),
        }
    }

    pub async fn detect_framework(&self) -> Framework {
        detect_framework(self.inner.page.as_ref()).await
    }
}

#[async_trait]
impl DetectionStrategy for SmartAutoDetect {
    fn name(&self) -> &'static str {
        "smart-auto"
    }

    async fn detect(&self) -> DetectionResult {
        let framework = self.detect_framework().await;
        info!("Detected chatbot framework: {}", framework);
        self.inner.detect().await
    }

    async fn detect_textarea(&self) -> Option<SelectorInfo> {
        self.inner.detect_textarea().await
    }

    async fn detect_submit_button(&self) -> Option<SelectorInfo> {
        self.inner.detect_submit_button().await
    }

    async fn detect_bot_messages(&self) -> Option<SelectorInfo> {
        self.inner.detect_bot_messages().await
    }

    async fn detect_thread_container(&self) -> Option<SelectorInfo> {
        self.inner.detect_thread_container().await
    }
}
