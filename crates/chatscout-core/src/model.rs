use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Maximum number of fallback selectors carried by a [`SelectorInfo`].
pub const MAX_ALTERNATIVES: usize = 5;

/// Chat UI element categories located by the engine.
///
/// Ordering follows declaration order, which is also the order used when
/// listing missing roles and when serializing selector maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Textarea,
    SubmitButton,
    BotMessages,
    ThreadContainer,
    UserMessages,
    NewChatButton,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Textarea,
        Role::SubmitButton,
        Role::BotMessages,
        Role::ThreadContainer,
        Role::UserMessages,
        Role::NewChatButton,
    ];

    /// Roles that must be present for a selector set to be complete.
    pub const REQUIRED: [Role; 3] = [Role::Textarea, Role::SubmitButton, Role::BotMessages];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Textarea => "textarea",
            Role::SubmitButton => "submit_button",
            Role::BotMessages => "bot_messages",
            Role::ThreadContainer => "thread_container",
            Role::UserMessages => "user_messages",
            Role::NewChatButton => "new_chat_button",
        }
    }

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }

    pub fn parse(name: &str) -> Option<Role> {
        Self::ALL.into_iter().find(|r| r.as_str() == name)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse trust label describing how a selector was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    /// Unique and stable selector.
    High,
    /// Works, but potentially fragile.
    Medium,
    /// Generic; may not keep working.
    Low,
    /// Entered by the user.
    Manual,
}

impl ConfidenceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "high",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::Low => "low",
            ConfidenceTier::Manual => "manual",
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a selector was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetectionMethod {
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "auto-heuristic")]
    AutoHeuristic,
    #[serde(rename = "click")]
    Click,
    #[serde(rename = "click-alternative")]
    ClickAlternative,
    #[serde(rename = "click-unvalidated")]
    ClickUnvalidated,
    #[serde(rename = "manual")]
    Manual,
}

impl DetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::Auto => "auto",
            DetectionMethod::AutoHeuristic => "auto-heuristic",
            DetectionMethod::Click => "click",
            DetectionMethod::ClickAlternative => "click-alternative",
            DetectionMethod::ClickUnvalidated => "click-unvalidated",
            DetectionMethod::Manual => "manual",
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discovered selector together with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorInfo {
    selector: String,
    confidence: ConfidenceTier,
    method: DetectionMethod,
    #[serde(default)]
    description: String,
    #[serde(default)]
    alternatives: Vec<String>,
}

impl SelectorInfo {
    pub fn new(
        selector: impl Into<String>,
        confidence: ConfidenceTier,
        method: DetectionMethod,
        description: impl Into<String>,
    ) -> Self {
        Self {
            selector: selector.into(),
            confidence,
            method,
            description: description.into(),
            alternatives: Vec::new(),
        }
    }

    /// Attach fallback selectors; anything past [`MAX_ALTERNATIVES`] is dropped.
    pub fn with_alternatives(mut self, mut alternatives: Vec<String>) -> Self {
        alternatives.truncate(MAX_ALTERNATIVES);
        self.alternatives = alternatives;
        self
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn confidence(&self) -> ConfidenceTier {
        self.confidence
    }

    pub fn method(&self) -> DetectionMethod {
        self.method
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn alternatives(&self) -> &[String] {
        &self.alternatives
    }
}

/// Detail view of a selector, as persisted by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorDetail {
    pub selector: String,
    pub confidence: ConfidenceTier,
    pub method: DetectionMethod,
    pub alternatives: Vec<String>,
}

/// Full set of selectors for one chatbot page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectorSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textarea: Option<SelectorInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_button: Option<SelectorInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_messages: Option<SelectorInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_container: Option<SelectorInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_messages: Option<SelectorInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_chat_button: Option<SelectorInfo>,
}

impl SelectorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, role: Role) -> Option<&SelectorInfo> {
        self.slot(role).as_ref()
    }

    pub fn set(&mut self, role: Role, info: Option<SelectorInfo>) {
        *self.slot_mut(role) = info;
    }

    fn slot(&self, role: Role) -> &Option<SelectorInfo> {
        match role {
            Role::Textarea => &self.textarea,
            Role::SubmitButton => &self.submit_button,
            Role::BotMessages => &self.bot_messages,
            Role::ThreadContainer => &self.thread_container,
            Role::UserMessages => &self.user_messages,
            Role::NewChatButton => &self.new_chat_button,
        }
    }

    fn slot_mut(&mut self, role: Role) -> &mut Option<SelectorInfo> {
        match role {
            Role::Textarea => &mut self.textarea,
            Role::SubmitButton => &mut self.submit_button,
            Role::BotMessages => &mut self.bot_messages,
            Role::ThreadContainer => &mut self.thread_container,
            Role::UserMessages => &mut self.user_messages,
            Role::NewChatButton => &mut self.new_chat_button,
        }
    }

    fn has_selector(&self, role: Role) -> bool {
        self.get(role).is_some_and(|info| !info.selector.is_empty())
    }

    /// True when every required role carries a non-empty selector.
    pub fn is_complete(&self) -> bool {
        Role::REQUIRED.iter().all(|role| self.has_selector(*role))
    }

    /// Required roles without a usable selector, in role order.
    pub fn missing(&self) -> Vec<Role> {
        Role::REQUIRED
            .into_iter()
            .filter(|role| !self.has_selector(*role))
            .collect()
    }

    /// Role to selector string. The four primary roles are always present
    /// (empty when undetected); auxiliary roles only when set.
    pub fn to_plain_map(&self) -> BTreeMap<Role, String> {
        Role::ALL
            .into_iter()
            .filter_map(|role| match self.get(role) {
                Some(info) => Some((role, info.selector.clone())),
                None if matches!(role, Role::UserMessages | Role::NewChatButton) => None,
                None => Some((role, String::new())),
            })
            .collect()
    }

    /// Role to selector detail, for every role that was detected.
    pub fn to_detailed_map(&self) -> BTreeMap<Role, SelectorDetail> {
        Role::ALL
            .into_iter()
            .filter_map(|role| {
                self.get(role).map(|info| {
                    (
                        role,
                        SelectorDetail {
                            selector: info.selector.clone(),
                            confidence: info.confidence,
                            method: info.method,
                            alternatives: info.alternatives.clone(),
                        },
                    )
                })
            })
            .collect()
    }
}

/// Outcome of a detection run.
///
/// Success is not stored: it is always `selectors.is_complete()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionResult {
    pub selectors: SelectorSet,
    pub message: String,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl DetectionResult {
    pub fn new(selectors: SelectorSet, message: impl Into<String>, warnings: Vec<String>) -> Self {
        Self {
            selectors,
            message: message.into(),
            warnings,
            errors: Vec::new(),
        }
    }

    pub fn success(&self) -> bool {
        self.selectors.is_complete()
    }

    /// Comma-separated list of missing required roles.
    pub fn missing_summary(&self) -> String {
        self.selectors
            .missing()
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Serialize)]
struct DetectionReport<'a> {
    success: bool,
    selectors: &'a SelectorSet,
    message: &'a str,
    warnings: &'a [String],
    errors: &'a [String],
}

impl Serialize for DetectionResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DetectionReport {
            success: self.success(),
            selectors: &self.selectors,
            message: &self.message,
            warnings: &self.warnings,
            errors: &self.errors,
        }
        .serialize(serializer)
    }
}
