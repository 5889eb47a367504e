#![allow(dead_code)]

use async_trait::async_trait;
use chatscout_core::error::PageError;
use chatscout_core::page::PageDriver;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// What the fake page returns for a selector.
#[derive(Debug, Clone)]
pub struct FakeMatch {
    pub count: usize,
    pub visible: bool,
    pub enabled: bool,
    pub class: Option<String>,
}

impl FakeMatch {
    pub fn visible(count: usize) -> Self {
        Self {
            count,
            visible: true,
            enabled: true,
            class: None,
        }
    }

    pub fn hidden(count: usize) -> Self {
        Self {
            visible: false,
            ..Self::visible(count)
        }
    }

    pub fn disabled(count: usize) -> Self {
        Self {
            enabled: false,
            ..Self::visible(count)
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }
}

/// Scripted reply to a capture evaluation.
pub enum Scripted {
    Value(Value),
    Fail(PageError),
    Hang,
}

/// In-memory page: selectors resolve through a lookup table, unknown
/// selectors match nothing, and capture routines consume scripted replies.
#[derive(Default)]
pub struct FakePage {
    matches: HashMap<String, FakeMatch>,
    failing: Vec<String>,
    captures: Mutex<VecDeque<Scripted>>,
    queries: Mutex<Vec<String>>,
    scripts: Mutex<Vec<String>>,
    styles: Mutex<Vec<String>>,
    supports_style: bool,
    armed: Mutex<Option<u64>>,
    cancelled: Mutex<Vec<u64>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, selector: &str, m: FakeMatch) -> Self {
        self.matches.insert(selector.to_string(), m);
        self
    }

    pub fn failing(mut self, selector: &str) -> Self {
        self.failing.push(selector.to_string());
        self
    }

    pub fn with_style_support(mut self) -> Self {
        self.supports_style = true;
        self
    }

    pub fn capture_reply(self, reply: Scripted) -> Self {
        self.captures.lock().unwrap().push_back(reply);
        self
    }

    pub fn into_arc(self) -> Arc<FakePage> {
        Arc::new(self)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }

    pub fn styles(&self) -> Vec<String> {
        self.styles.lock().unwrap().clone()
    }

    /// Session id of the capture currently waiting on the page.
    pub fn armed(&self) -> Option<u64> {
        *self.armed.lock().unwrap()
    }

    /// Sessions a cancel routine actually settled.
    pub fn cancelled(&self) -> Vec<u64> {
        self.cancelled.lock().unwrap().clone()
    }

    fn lookup(&self, selector: &str) -> Result<Option<&FakeMatch>, PageError> {
        self.queries.lock().unwrap().push(selector.to_string());
        if self.failing.iter().any(|s| s == selector) {
            return Err(PageError::InvalidSelector {
                selector: selector.to_string(),
            });
        }
        Ok(self.matches.get(selector).filter(|m| m.count > 0))
    }

    fn first(&self, selector: &str) -> Result<&FakeMatch, PageError> {
        self.lookup(selector)?.ok_or_else(|| PageError::QueryFailed {
            selector: selector.to_string(),
            reason: "no element".into(),
        })
    }
}

pub fn is_capture_script(script: &str) -> bool {
    script.contains("addEventListener('click'")
}

pub fn is_cancel_script(script: &str) -> bool {
    script.contains("s.cancel()")
}

/// Session id passed to a capture routine as its last argument.
pub fn capture_id(script: &str) -> Option<u64> {
    let args = script.trim_end().strip_suffix(')')?;
    args.rsplit(|c: char| c == ' ' || c == ',').next()?.parse().ok()
}

/// Session id a cancel routine is aimed at.
pub fn cancel_target(script: &str) -> Option<u64> {
    let rest = script.split("s.id === ").nth(1)?;
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

#[async_trait]
impl PageDriver for FakePage {
    async fn count(&self, selector: &str) -> Result<usize, PageError> {
        Ok(self.lookup(selector)?.map(|m| m.count).unwrap_or(0))
    }

    async fn is_visible(&self, selector: &str) -> Result<bool, PageError> {
        Ok(self.first(selector)?.visible)
    }

    async fn is_enabled(&self, selector: &str) -> Result<bool, PageError> {
        Ok(self.first(selector)?.enabled)
    }

    async fn get_attribute(
        &self,
        selector: &str,
        name: &str,
    ) -> Result<Option<String>, PageError> {
        let m = self.first(selector)?;
        Ok(if name == "class" { m.class.clone() } else { None })
    }

    async fn evaluate(&self, script: &str) -> Result<Value, PageError> {
        self.scripts.lock().unwrap().push(script.to_string());
        if is_cancel_script(script) {
            let mut armed = self.armed.lock().unwrap();
            let target = cancel_target(script);
            if target.is_some() && *armed == target {
                *armed = None;
                self.cancelled.lock().unwrap().extend(target);
                return Ok(Value::Bool(true));
            }
            return Ok(Value::Bool(false));
        }
        if !is_capture_script(script) {
            return Ok(Value::Bool(true));
        }
        let id = capture_id(script);
        let next = self.captures.lock().unwrap().pop_front();
        if let Some(Scripted::Hang) = next {
            // A newer capture replaces whatever was armed before it.
            *self.armed.lock().unwrap() = id;
            return std::future::pending().await;
        }
        match next {
            Some(Scripted::Value(v)) => Ok(v),
            Some(Scripted::Fail(e)) => Err(e),
            Some(Scripted::Hang) | None => Ok(json!({ "outcome": "timeout" })),
        }
    }

    async fn inject_style(&self, css: &str) -> Result<(), PageError> {
        if !self.supports_style {
            return Err(PageError::NotSupported("inject_style".into()));
        }
        self.styles.lock().unwrap().push(css.to_string());
        Ok(())
    }
}

/// A click reply as the capture routine would produce it.
pub fn click(tag: &str, class: &str, id: &str, attributes: Value) -> Scripted {
    Scripted::Value(json!({
        "outcome": "click",
        "element": {
            "tag_name": tag,
            "class_name": class,
            "id_attr": id,
            "text_content": "",
            "attributes": attributes,
        }
    }))
}

pub fn escape() -> Scripted {
    Scripted::Value(json!({ "outcome": "escape" }))
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}
