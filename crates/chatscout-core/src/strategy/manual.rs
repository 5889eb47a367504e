use super::DetectionStrategy;
use crate::model::{ConfidenceTier, DetectionMethod, DetectionResult, Role, SelectorInfo, SelectorSet};
use crate::page::PageDriver;
use crate::validator::validate;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Selectors supplied by the caller, checked for existence only.
///
/// Hidden elements are accepted; only selectors that match nothing (or fail
/// to parse) are rejected.
pub struct ManualSelectors {
    page: Arc<dyn PageDriver>,
    selectors: BTreeMap<Role, String>,
}

impl ManualSelectors {
    pub fn new(page: Arc<dyn PageDriver>, selectors: impl IntoIterator<Item = (Role, String)>) -> Self {
        Self {
            page,
            selectors: selectors.into_iter().collect(),
        }
    }

    async fn manual_info(&self, role: Role) -> Option<SelectorInfo> {
        let selector = self.selectors.get(&role).filter(|s| !s.is_empty())?;
        if !validate(self.page.as_ref(), selector, 0, false).await {
            debug!("{}: manual selector {} matched nothing", role, selector);
            return None;
        }
        Some(SelectorInfo::new(
            selector.as_str(),
            ConfidenceTier::Manual,
            DetectionMethod::Manual,
            format!("Selettore {} inserito manualmente", role),
        ))
    }
}

#[async_trait]
impl DetectionStrategy for ManualSelectors {
    fn name(&self) -> &'static str {
        "manual"
    }

    async fn detect(&self) -> DetectionResult {
        let mut selectors = SelectorSet::new();
        let mut warnings = Vec::new();

        for role in self.selectors.keys().copied() {
            let info = self.manual_info(role).await;
            if info.is_none() {
                warnings.push(format!("Selettore {} non valido", role));
            }
            selectors.set(role, info);
        }

        let mut result = DetectionResult::new(selectors, String::new(), warnings);
        result.message = if result.success() {
            "Selettori manuali configurati".to_string()
        } else {
            "Selettori incompleti".to_string()
        };
        info!("Manual selectors: {}", result.message);
        result
    }

    async fn detect_textarea(&self) -> Option<SelectorInfo> {
        self.manual_info(Role::Textarea).await
    }

    async fn detect_submit_button(&self) -> Option<SelectorInfo> {
        self.manual_info(Role::SubmitButton).await
    }

    async fn detect_bot_messages(&self) -> Option<SelectorInfo> {
        self.manual_info(Role::BotMessages).await
    }

    async fn detect_thread_container(&self) -> Option<SelectorInfo> {
        self.manual_info(Role::ThreadContainer).await
    }
}
