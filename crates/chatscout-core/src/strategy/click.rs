use super::DetectionStrategy;
use crate::capture::{ClickCapture, DEFAULT_CAPTURE_TIMEOUT, build_info};
use crate::model::{DetectionResult, Role, SelectorInfo, SelectorSet};
use crate::page::PageDriver;
use crate::reporter::{Reporter, TracingReporter};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// One step of the guided learning sequence.
struct Step {
    role: Role,
    prompt: &'static str,
    hint: Option<&'static str>,
    captured: &'static str,
    not_captured: &'static str,
    warning: &'static str,
}

const STEPS: [Step; 3] = [
    Step {
        role: Role::Textarea,
        prompt: "Step 1/3: Clicca sul CAMPO DI INPUT dove scrivi i messaggi",
        hint: None,
        captured: "Campo input catturato",
        not_captured: "Campo input non catturato",
        warning: "Textarea non catturato",
    },
    Step {
        role: Role::SubmitButton,
        prompt: "Step 2/3: Clicca sul BOTTONE INVIO",
        hint: None,
        captured: "Bottone invio catturato",
        not_captured: "Bottone invio non catturato",
        warning: "Submit button non catturato",
    },
    Step {
        role: Role::BotMessages,
        prompt: "Step 3/3: Clicca su un MESSAGGIO DEL BOT (se presente)",
        hint: Some("   (Premi ESC o attendi il timeout se non ci sono messaggi)"),
        captured: "Messaggi bot catturati",
        not_captured: "Messaggi bot non catturati",
        warning: "Bot messages non catturato - potrebbe essere necessario configurarlo manualmente",
    },
];

/// Learns selectors from the user's clicks.
pub struct ClickLearn {
    page: Arc<dyn PageDriver>,
    capture: ClickCapture,
    timeout: Duration,
    highlight: bool,
    reporter: Arc<dyn Reporter>,
}

impl ClickLearn {
    pub fn new(page: Arc<dyn PageDriver>) -> Self {
        Self {
            capture: ClickCapture::new(page.clone()),
            page,
            timeout: DEFAULT_CAPTURE_TIMEOUT,
            highlight: false,
            reporter: Arc::new(TracingReporter),
        }
    }

    /// Time the user has for each click.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_host_grace(mut self, grace: Duration) -> Self {
        self.capture = self.capture.with_host_grace(grace);
        self
    }

    /// Outline elements under the pointer while the sequence runs.
    pub fn with_highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    async fn learn(&self) -> Option<SelectorInfo> {
        let captured = self.capture.capture(self.timeout).await;
        build_info(self.page.as_ref(), captured.as_ref()).await
    }

    async fn guided_sequence(&self) -> DetectionResult {
        let mut selectors = SelectorSet::new();
        let mut warnings = Vec::new();

        self.reporter.instruction("\nAPPRENDIMENTO DA CLICK");
        self.reporter
            .instruction("Segui le istruzioni per identificare gli elementi del chatbot.\n");

        for step in &STEPS {
            self.reporter.instruction(step.prompt);
            if let Some(hint) = step.hint {
                self.reporter.instruction(hint);
            }

            let learned = self.learn().await;
            match &learned {
                Some(info) => self
                    .reporter
                    .instruction(&format!("  ✓ {}: {}\n", step.captured, info.selector())),
                None => {
                    warnings.push(step.warning.to_string());
                    self.reporter
                        .instruction(&format!("  ! {}\n", step.not_captured));
                }
            }
            selectors.set(step.role, learned);
        }

        let mut result = DetectionResult::new(selectors, String::new(), warnings);
        result.message = if result.success() {
            "Apprendimento completato!".to_string()
        } else {
            format!("Elementi mancanti: {}", result.missing_summary())
        };
        result
    }
}

#[async_trait]
impl DetectionStrategy for ClickLearn {
    fn name(&self) -> &'static str {
        "click"
    }

    async fn detect(&self) -> DetectionResult {
        info!("Starting click learning (timeout {:?} per step)", self.timeout);
        if self.highlight {
            self.capture.install_highlight().await;
        }

        let result = self.guided_sequence().await;

        if self.highlight {
            self.capture.remove_highlight().await;
        }
        info!("Click learning finished: {}", result.message);
        result
    }

    async fn detect_textarea(&self) -> Option<SelectorInfo> {
        self.reporter.instruction("Clicca sul campo di input...");
        self.learn().await
    }

    async fn detect_submit_button(&self) -> Option<SelectorInfo> {
        self.reporter.instruction("Clicca sul bottone invio...");
        self.learn().await
    }

    async fn detect_bot_messages(&self) -> Option<SelectorInfo> {
        self.reporter.instruction("Clicca su un messaggio del bot...");
        self.learn().await
    }
}
