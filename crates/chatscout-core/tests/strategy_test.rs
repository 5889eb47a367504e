mod common;

use chatscout_core::catalog::Framework;
use chatscout_core::model::{ConfidenceTier, DetectionMethod, Role};
use chatscout_core::reporter::Reporter;
use chatscout_core::strategy::{
    AutoDetect, ClickLearn, DetectionStrategy, ManualSelectors, SmartAutoDetect,
};
use common::{FakeMatch, FakePage, click, escape, init_tracing};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn efg_page() -> FakePage {
    FakePage::new()
        .with("#llm-prompt-textarea", FakeMatch::visible(1))
        .with("button.llm__prompt-submit", FakeMatch::visible(1))
        .with(
            ".llm__message--assistant .llm__text-body",
            FakeMatch::hidden(3),
        )
        .with(".llm__thread", FakeMatch::visible(1))
}

fn collecting_reporter() -> (Arc<dyn Reporter>, Arc<Mutex<Vec<String>>>) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = lines.clone();
    let reporter: Arc<dyn Reporter> = Arc::new(move |msg: &str| {
        sink.lock().unwrap().push(msg.to_string());
    });
    (reporter, lines)
}

#[tokio::test]
async fn test_auto_detects_complete_set() {
    init_tracing();
    let strategy = AutoDetect::new(efg_page().into_arc());

    let result = strategy.detect().await;
    assert!(result.success());
    assert_eq!(result.message, "Tutti i selettori rilevati!");
    assert!(result.warnings.is_empty());

    let selectors = &result.selectors;
    assert_eq!(
        selectors.textarea.as_ref().unwrap().selector(),
        "#llm-prompt-textarea"
    );
    assert_eq!(
        selectors.submit_button.as_ref().unwrap().confidence(),
        ConfidenceTier::High
    );
    assert_eq!(
        selectors.thread_container.as_ref().unwrap().selector(),
        ".llm__thread"
    );
    assert!(selectors.user_messages.is_none());
}

#[tokio::test]
async fn test_auto_falls_back_to_structural_inference() {
    let page = FakePage::new()
        .with("textarea.prompt", FakeMatch::visible(1))
        .with("button[type='submit']", FakeMatch::visible(1))
        .with(
            "div[class*='message']",
            FakeMatch::visible(2).with_class("message bot"),
        )
        .into_arc();
    let strategy = AutoDetect::new(page);

    let result = strategy.detect().await;
    assert!(result.success());
    let bot = result.selectors.bot_messages.as_ref().unwrap();
    assert_eq!(bot.selector(), "div[class*='message']");
    assert_eq!(bot.method(), DetectionMethod::AutoHeuristic);
    // Thread container is optional: no warning when absent.
    assert!(result.selectors.thread_container.is_none());
    assert!(result.warnings.is_empty());
}

#[tokio::test]
async fn test_auto_reports_missing_roles() {
    let page = FakePage::new()
        .with("form textarea", FakeMatch::visible(1))
        .into_arc();
    let strategy = AutoDetect::new(page);

    let result = strategy.detect().await;
    assert!(!result.success());
    assert_eq!(
        result.message,
        "Selettori mancanti: submit_button, bot_messages"
    );
    assert_eq!(
        result.warnings,
        vec![
            "Submit button non rilevato automaticamente".to_string(),
            "Bot messages non rilevato automaticamente".to_string(),
        ]
    );

    let report = serde_json::to_value(&result).unwrap();
    assert_eq!(report["success"], json!(false));
}

#[tokio::test]
async fn test_auto_single_role_operations() {
    let strategy = AutoDetect::new(efg_page().into_arc());
    assert!(strategy.detect_textarea().await.is_some());
    assert!(strategy.detect_submit_button().await.is_some());
    assert!(strategy.detect_bot_messages().await.is_some());
    assert!(strategy.detect_thread_container().await.is_some());

    let structure = strategy.page_structure().await;
    assert_eq!(structure.forms, 0);
}

#[tokio::test]
async fn test_smart_auto_detects_framework() {
    let page = FakePage::new()
        .failing(".llm__")
        .with("[data-testid*=\"openai\"]", FakeMatch::hidden(1))
        .into_arc();
    let strategy = SmartAutoDetect::new(page);
    assert_eq!(strategy.detect_framework().await, Framework::Openai);
    assert_eq!(strategy.name(), "smart-auto");

    let custom = SmartAutoDetect::new(FakePage::new().into_arc());
    assert_eq!(custom.detect_framework().await, Framework::Custom);
}

#[tokio::test]
async fn test_smart_auto_delegates_detection() {
    let strategy = SmartAutoDetect::new(efg_page().into_arc());
    let result = strategy.detect().await;
    assert!(result.success());
}

#[tokio::test]
async fn test_click_learn_with_escaped_bot_step() {
    init_tracing();
    let page = FakePage::new()
        .with("#prompt", FakeMatch::visible(1))
        .with("#send", FakeMatch::visible(1))
        .capture_reply(click("TEXTAREA", "", "prompt", json!({})))
        .capture_reply(click("BUTTON", "", "send", json!({"type": "submit"})))
        .capture_reply(escape())
        .into_arc();
    let (reporter, lines) = collecting_reporter();
    let strategy = ClickLearn::new(page.clone())
        .with_timeout(Duration::from_secs(10))
        .with_reporter(reporter);

    let result = strategy.detect().await;
    assert!(!result.success());
    assert_eq!(result.message, "Elementi mancanti: bot_messages");
    assert_eq!(
        result.warnings,
        vec![
            "Bot messages non catturato - potrebbe essere necessario configurarlo manualmente"
                .to_string()
        ]
    );

    let textarea = result.selectors.textarea.as_ref().unwrap();
    assert_eq!(textarea.selector(), "#prompt");
    assert_eq!(textarea.method(), DetectionMethod::Click);
    assert_eq!(
        result.selectors.submit_button.as_ref().unwrap().selector(),
        "#send"
    );

    let lines = lines.lock().unwrap();
    assert!(lines.iter().any(|l| l.starts_with("Step 1/3")));
    assert!(lines.iter().any(|l| l.starts_with("Step 3/3")));
    assert!(lines.iter().any(|l| l.contains("Premi ESC")));
    assert!(lines.iter().any(|l| l.contains("Messaggi bot non catturati")));

    // Highlight is off by default.
    assert!(page.styles().is_empty());
}

#[tokio::test]
async fn test_click_learn_complete_with_highlight() {
    let page = FakePage::new()
        .with_style_support()
        .with("#prompt", FakeMatch::visible(1))
        .with("#send", FakeMatch::visible(1))
        .with(".assistant-reply", FakeMatch::visible(2))
        .capture_reply(click("TEXTAREA", "", "prompt", json!({})))
        .capture_reply(click("BUTTON", "", "send", json!({})))
        .capture_reply(click("DIV", "assistant-reply chatscout-highlight", "", json!({})))
        .into_arc();
    let (reporter, _) = collecting_reporter();
    let strategy = ClickLearn::new(page.clone())
        .with_highlight(true)
        .with_reporter(reporter);

    let result = strategy.detect().await;
    assert!(result.success());
    assert_eq!(result.message, "Apprendimento completato!");
    assert!(result.warnings.is_empty());
    let bot = result.selectors.bot_messages.as_ref().unwrap();
    assert_eq!(bot.selector(), ".assistant-reply");
    assert_eq!(bot.alternatives(), ["div.assistant-reply", "div"]);

    assert_eq!(page.styles().len(), 1);
    let scripts = page.scripts();
    assert!(scripts.first().unwrap().contains("addEventListener('mouseover'"));
    assert!(scripts.last().unwrap().contains("style[data-chatscout-style]"));
}

#[tokio::test]
async fn test_click_single_role_uses_one_capture() {
    let page = FakePage::new()
        .with("#send", FakeMatch::visible(1))
        .capture_reply(click("BUTTON", "", "send", json!({})))
        .into_arc();
    let (reporter, lines) = collecting_reporter();
    let strategy = ClickLearn::new(page).with_reporter(reporter);

    let info = strategy.detect_submit_button().await.unwrap();
    assert_eq!(info.selector(), "#send");
    assert_eq!(lines.lock().unwrap().len(), 1);
    assert!(strategy.detect_thread_container().await.is_none());
}

#[tokio::test]
async fn test_manual_checks_existence_only() {
    let page = FakePage::new()
        .with("#prompt", FakeMatch::hidden(1))
        .with("#send", FakeMatch::disabled(1))
        .into_arc();
    let strategy = ManualSelectors::new(
        page,
        [
            (Role::Textarea, "#prompt".to_string()),
            (Role::SubmitButton, "#send".to_string()),
            (Role::BotMessages, "#nope".to_string()),
        ],
    );

    let result = strategy.detect().await;
    assert!(!result.success());
    assert_eq!(result.message, "Selettori incompleti");
    assert_eq!(
        result.warnings,
        vec!["Selettore bot_messages non valido".to_string()]
    );

    let textarea = result.selectors.textarea.as_ref().unwrap();
    assert_eq!(textarea.confidence(), ConfidenceTier::Manual);
    assert_eq!(textarea.method(), DetectionMethod::Manual);
    assert_eq!(textarea.description(), "Selettore textarea inserito manualmente");
    assert!(result.selectors.bot_messages.is_none());
}

#[tokio::test]
async fn test_manual_complete_set() {
    let page = FakePage::new()
        .with("#prompt", FakeMatch::visible(1))
        .with("#send", FakeMatch::visible(1))
        .with(".reply", FakeMatch::visible(1))
        .with(".thread", FakeMatch::visible(1))
        .into_arc();
    let strategy = ManualSelectors::new(
        page,
        [
            (Role::Textarea, "#prompt".to_string()),
            (Role::SubmitButton, "#send".to_string()),
            (Role::BotMessages, ".reply".to_string()),
            (Role::ThreadContainer, ".thread".to_string()),
        ],
    );

    let result = strategy.detect().await;
    assert!(result.success());
    assert_eq!(result.message, "Selettori manuali configurati");
    assert!(result.warnings.is_empty());
    assert_eq!(
        strategy.detect_thread_container().await.unwrap().selector(),
        ".thread"
    );
}

#[tokio::test]
async fn test_strategies_are_interchangeable() {
    let page = efg_page().capture_reply(escape()).into_arc();
    let strategies: Vec<Box<dyn DetectionStrategy>> = vec![
        Box::new(AutoDetect::new(page.clone())),
        Box::new(SmartAutoDetect::new(page.clone())),
        Box::new(ClickLearn::new(page.clone()).with_timeout(Duration::from_secs(1))),
        Box::new(ManualSelectors::new(
            page.clone(),
            [(Role::Textarea, "#llm-prompt-textarea".to_string())],
        )),
    ];

    let names: Vec<&str> = strategies.iter().map(|s| s.name()).collect();
    assert_eq!(names, ["auto", "smart-auto", "click", "manual"]);

    for strategy in &strategies[..2] {
        assert!(strategy.detect().await.success());
    }
    let manual = strategies[3].detect().await;
    assert!(!manual.success());
    assert!(manual.selectors.textarea.is_some());
}
