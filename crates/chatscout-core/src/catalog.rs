//! Static pattern catalog.
//!
//! Each table is walked front to back and the first usable entry wins. Order
//! is the priority: a framework-specific MEDIUM entry may sit ahead of a
//! generic one of equal or higher tier, so tables must never be re-sorted by
//! confidence.

use crate::model::{ConfidenceTier, Role};

use ConfidenceTier::{High, Low, Medium};

/// One candidate selector for a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternEntry {
    pub selector: &'static str,
    pub confidence: ConfidenceTier,
    pub description: &'static str,
}

const fn p(selector: &'static str, confidence: ConfidenceTier, description: &'static str) -> PatternEntry {
    PatternEntry {
        selector,
        confidence,
        description,
    }
}

pub static TEXTAREA_PATTERNS: &[PatternEntry] = &[
    // Chatbot-specific
    p("#llm-prompt-textarea", High, "EFG chatbot"),
    p("[data-testid='chat-input']", High, "Test ID standard"),
    p("[data-testid='prompt-textarea']", High, "OpenAI-style"),
    p(".chat-input textarea", High, "Chat input class"),
    // ARIA
    p("textarea[aria-label*='message' i]", Medium, "ARIA message"),
    p("textarea[aria-label*='prompt' i]", Medium, "ARIA prompt"),
    p("textarea[aria-label*='chat' i]", Medium, "ARIA chat"),
    p("textarea[aria-label*='input' i]", Medium, "ARIA input"),
    // Placeholder
    p("textarea[placeholder*='message' i]", Medium, "Placeholder message"),
    p("textarea[placeholder*='type' i]", Medium, "Placeholder type"),
    p("textarea[placeholder*='ask' i]", Medium, "Placeholder ask"),
    p("textarea[placeholder*='scrivi' i]", Medium, "Placeholder italiano"),
    p("textarea[placeholder*='digita' i]", Medium, "Placeholder italiano"),
    p("textarea[placeholder*='send' i]", Medium, "Placeholder send"),
    // Class
    p("textarea.prompt", Medium, "Class prompt"),
    p("textarea.chat-input", Medium, "Class chat-input"),
    p("textarea.message-input", Medium, "Class message-input"),
    // Contenteditable
    p("[contenteditable='true'][role='textbox']", Medium, "Contenteditable textbox"),
    p("[contenteditable='true'][data-placeholder]", Low, "Contenteditable generic"),
    // Generic
    p("form textarea", Low, "Form textarea"),
    p("[role='textbox']", Low, "Role textbox"),
];

pub static SUBMIT_PATTERNS: &[PatternEntry] = &[
    p("button.llm__prompt-submit", High, "EFG submit"),
    p("[data-testid='send-button']", High, "Test ID send"),
    p("[data-testid='submit-button']", High, "Test ID submit"),
    // ARIA
    p("button[aria-label*='send' i]", Medium, "ARIA send"),
    p("button[aria-label*='invia' i]", Medium, "ARIA invia"),
    p("button[aria-label*='submit' i]", Medium, "ARIA submit"),
    // Icons
    p("button:has(svg[class*='send'])", Medium, "SVG send icon"),
    p("button:has(svg[data-icon='paper-plane'])", Medium, "Paper plane icon"),
    p("button:has([class*='send'])", Medium, "Send class element"),
    // Class
    p("button.send-button", Medium, "Class send-button"),
    p("button.submit-button", Medium, "Class submit-button"),
    p(".chat-submit button", Medium, "Chat submit container"),
    // Generic
    p("button[type='submit']", Low, "Type submit"),
    p("form button:last-child", Low, "Last form button"),
];

pub static BOT_MESSAGE_PATTERNS: &[PatternEntry] = &[
    p(".llm__message--assistant .llm__text-body", High, "EFG assistant"),
    p("[data-role='assistant']", High, "Data role assistant"),
    p("[data-message-author='assistant']", High, "Message author"),
    // Class
    p(".message.assistant", Medium, "Class message assistant"),
    p(".message.bot", Medium, "Class message bot"),
    p(".message[data-role='assistant']", Medium, "Message data role"),
    p(".bot-message", Medium, "Class bot-message"),
    p(".ai-response", Medium, "Class ai-response"),
    p(".assistant-message", Medium, "Class assistant-message"),
    // Partial class
    p("[class*='assistant-message']", Low, "Partial class assistant"),
    p("[class*='bot-response']", Low, "Partial class bot"),
    p("[class*='ai-message']", Low, "Partial class ai"),
];

pub static THREAD_PATTERNS: &[PatternEntry] = &[
    p(".llm__thread", High, "EFG thread"),
    p("[data-testid='chat-thread']", High, "Test ID thread"),
    p(".chat-thread", Medium, "Class chat-thread"),
    p(".message-container", Medium, "Class message-container"),
    p(".conversation-container", Medium, "Class conversation"),
    p("[role='log']", Low, "Role log"),
];

/// Broad structural probes tried when no bot-message pattern matched.
pub static STRUCTURAL_BOT_PROBES: &[&str] = &[
    "div[class*='message']",
    "div[class*='response']",
    "p[class*='message']",
];

/// Class fragments that mark a structural match as a user message.
pub static USER_MESSAGE_MARKERS: &[&str] = &["user", "human"];

/// Catalog table for a role. Auxiliary roles have none.
pub fn patterns_for(role: Role) -> &'static [PatternEntry] {
    match role {
        Role::Textarea => TEXTAREA_PATTERNS,
        Role::SubmitButton => SUBMIT_PATTERNS,
        Role::BotMessages => BOT_MESSAGE_PATTERNS,
        Role::ThreadContainer => THREAD_PATTERNS,
        Role::UserMessages | Role::NewChatButton => &[],
    }
}

/// What the first element of a pattern must satisfy for a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleRequirement {
    pub visible: bool,
    pub enabled: bool,
}

pub fn requirement_for(role: Role) -> RoleRequirement {
    match role {
        Role::Textarea | Role::SubmitButton => RoleRequirement {
            visible: true,
            enabled: true,
        },
        // Messages may not exist yet when detection runs.
        Role::BotMessages => RoleRequirement {
            visible: false,
            enabled: false,
        },
        Role::ThreadContainer | Role::UserMessages | Role::NewChatButton => RoleRequirement {
            visible: true,
            enabled: false,
        },
    }
}

/// Chatbot frameworks recognisable from page markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    Langchain,
    Openai,
    Dialogflow,
    Rasa,
    Botpress,
    Custom,
}

impl Framework {
    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::Langchain => "langchain",
            Framework::Openai => "openai",
            Framework::Dialogflow => "dialogflow",
            Framework::Rasa => "rasa",
            Framework::Botpress => "botpress",
            Framework::Custom => "custom",
        }
    }
}

impl std::fmt::Display for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Some signatures are prefixes rather than complete selectors; drivers reject
// them and they are skipped like any other failed query.
pub static FRAMEWORK_SIGNATURES: &[(Framework, &[&str])] = &[
    (Framework::Langchain, &[".llm__", "[data-langchain]"]),
    (Framework::Openai, &["[data-testid*=\"openai\"]", ".openai-"]),
    (Framework::Dialogflow, &[".df-", "[data-dialogflow]"]),
    (Framework::Rasa, &[".rasa-", "[data-rasa]"]),
    (Framework::Botpress, &[".bp-", "[data-botpress]"]),
];

/// Class fragments counted by the page structure summary.
pub static CHAT_CLASS_FRAGMENTS: &[&str] = &[
    "chat",
    "message",
    "thread",
    "conversation",
    "prompt",
    "assistant",
    "bot",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_keep_declared_priority() {
        assert_eq!(TEXTAREA_PATTERNS[0].selector, "#llm-prompt-textarea");
        assert_eq!(TEXTAREA_PATTERNS[1].selector, "[data-testid='chat-input']");
        assert_eq!(
            SUBMIT_PATTERNS.last().map(|p| p.selector),
            Some("form button:last-child")
        );
        assert_eq!(THREAD_PATTERNS.len(), 6);
    }

    #[test]
    fn test_auxiliary_roles_have_no_patterns() {
        assert!(patterns_for(Role::UserMessages).is_empty());
        assert!(patterns_for(Role::NewChatButton).is_empty());
    }

    #[test]
    fn test_requirements() {
        assert_eq!(
            requirement_for(Role::Textarea),
            RoleRequirement {
                visible: true,
                enabled: true
            }
        );
        assert!(!requirement_for(Role::BotMessages).visible);
        let thread = requirement_for(Role::ThreadContainer);
        assert!(thread.visible && !thread.enabled);
    }
}
