use chatscout_core::error::PageError;
use chromiumoxide::Page;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use serde::Deserialize;
use std::time::Duration;

const QUERY_JS: &str = include_str!("query.js");

/// Bound on a single DOM query. Prevents hanging when a dialog blocks the
/// JS thread.
const QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum retries for context errors during page navigation.
const MAX_CONTEXT_RETRIES: u32 = 10;

/// Delay between retries when context is not found (page navigating).
const CONTEXT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Check if an error indicates the page context is unavailable (e.g., during navigation).
fn is_context_error(err: &str) -> bool {
    err.contains("Cannot find context")
        || err.contains("Execution context was destroyed")
        || err.contains("-32000")
}

#[derive(Debug, Clone, Copy)]
pub enum QueryOp {
    Count,
    Visible,
    Enabled,
    Attribute,
}

impl QueryOp {
    fn as_str(&self) -> &'static str {
        match self {
            QueryOp::Count => "count",
            QueryOp::Visible => "visible",
            QueryOp::Enabled => "enabled",
            QueryOp::Attribute => "attribute",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QueryReply {
    pub invalid: bool,
    pub count: usize,
    pub value: serde_json::Value,
}

enum EvalError {
    Timeout,
    Context(String),
    Other(String),
}

/// Evaluate an expression, awaiting a returned promise and returning the
/// result by value.
pub async fn evaluate_value(page: &Page, expression: &str) -> Result<serde_json::Value, PageError> {
    evaluate_once(page, expression).await.map_err(|e| match e {
        EvalError::Context(msg) | EvalError::Other(msg) => PageError::Script(msg),
        EvalError::Timeout => PageError::Timeout {
            operation: "evaluate".into(),
        },
    })
}

async fn evaluate_once(page: &Page, expression: &str) -> Result<serde_json::Value, EvalError> {
    let params = EvaluateParams::builder()
        .expression(expression)
        .await_promise(true)
        .return_by_value(true)
        .build()
        .map_err(EvalError::Other)?;

    let result = page.evaluate_expression(params).await.map_err(|e| {
        let err_str = e.to_string();
        if is_context_error(&err_str) {
            EvalError::Context(err_str)
        } else {
            EvalError::Other(err_str)
        }
    })?;

    // `undefined` comes back without a value.
    Ok(result
        .value()
        .cloned()
        .unwrap_or(serde_json::Value::Null))
}

async fn evaluate_with_timeout(
    page: &Page,
    expression: &str,
) -> Result<serde_json::Value, EvalError> {
    match tokio::time::timeout(QUERY_TIMEOUT, evaluate_once(page, expression)).await {
        Err(_) => Err(EvalError::Timeout),
        Ok(result) => result,
    }
}

/// Run one DOM query against the first document, retrying while the page
/// is between execution contexts.
pub async fn run_query(
    page: &Page,
    selector: &str,
    op: QueryOp,
    name: Option<&str>,
) -> Result<QueryReply, PageError> {
    let expression = format!(
        "({})({}, {}, {})",
        QUERY_JS,
        serde_json::to_string(selector)?,
        serde_json::to_string(op.as_str())?,
        serde_json::to_string(&name)?,
    );

    let mut last_error = None;
    for attempt in 0..MAX_CONTEXT_RETRIES {
        match evaluate_with_timeout(page, &expression).await {
            Ok(value) => {
                let reply: QueryReply = serde_json::from_value(value)?;
                if reply.invalid {
                    return Err(PageError::InvalidSelector {
                        selector: selector.to_string(),
                    });
                }
                return Ok(reply);
            }
            Err(EvalError::Timeout) => {
                return Err(PageError::Timeout {
                    operation: format!("{} {}", op.as_str(), selector),
                });
            }
            Err(EvalError::Context(err_str)) => {
                tracing::debug!(
                    "Context error during query (attempt {}/{}), retrying...",
                    attempt + 1,
                    MAX_CONTEXT_RETRIES
                );
                last_error = Some(err_str);
                tokio::time::sleep(CONTEXT_RETRY_DELAY).await;
            }
            Err(EvalError::Other(err_str)) => {
                return Err(PageError::QueryFailed {
                    selector: selector.to_string(),
                    reason: err_str,
                });
            }
        }
    }

    Err(PageError::QueryFailed {
        selector: selector.to_string(),
        reason: last_error.unwrap_or_else(|| "query failed after retries".to_string()),
    })
}

/// Script that appends a tagged `<style>` element with `css`.
pub fn style_script(css: &str) -> Result<String, PageError> {
    Ok(format!(
        "(function (css) {{ const s = document.createElement('style'); \
         s.setAttribute('data-chatscout-style', ''); s.textContent = css; \
         (document.head || document.documentElement).appendChild(s); return true; }})({})",
        serde_json::to_string(css)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_errors() {
        assert!(is_context_error("Execution context was destroyed."));
        assert!(is_context_error("error -32000: Cannot find context with specified id"));
        assert!(!is_context_error("SyntaxError: unexpected token"));
    }

    #[test]
    fn test_style_script_escapes_css() {
        let script = style_script(".a::after { content: \"x\" }").unwrap();
        assert!(script.contains("data-chatscout-style"));
        assert!(script.ends_with(r#"(".a::after { content: \"x\" }")"#));
    }
}
