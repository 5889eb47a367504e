use crate::inject::{QueryOp, evaluate_value, run_query, style_script};
use async_trait::async_trait;
use chatscout_core::error::PageError;
use chatscout_core::page::PageDriver;
use chromiumoxide::Page;

/// [`PageDriver`] over a live Chromium tab.
///
/// Element state is always read from the first match of the selector, the
/// same element a locator's `first()` would address.
#[derive(Clone)]
pub struct CdpPage {
    page: Page,
}

impl CdpPage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    async fn first_value(
        &self,
        selector: &str,
        op: QueryOp,
        name: Option<&str>,
    ) -> Result<serde_json::Value, PageError> {
        let reply = run_query(&self.page, selector, op, name).await?;
        if reply.count == 0 {
            return Err(PageError::QueryFailed {
                selector: selector.to_string(),
                reason: "no matching element".into(),
            });
        }
        Ok(reply.value)
    }
}

#[async_trait]
impl PageDriver for CdpPage {
    async fn count(&self, selector: &str) -> Result<usize, PageError> {
        Ok(run_query(&self.page, selector, QueryOp::Count, None).await?.count)
    }

    async fn is_visible(&self, selector: &str) -> Result<bool, PageError> {
        let value = self.first_value(selector, QueryOp::Visible, None).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn is_enabled(&self, selector: &str) -> Result<bool, PageError> {
        let value = self.first_value(selector, QueryOp::Enabled, None).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn get_attribute(&self, selector: &str, name: &str) -> Result<Option<String>, PageError> {
        let value = self
            .first_value(selector, QueryOp::Attribute, Some(name))
            .await?;
        Ok(value.as_str().map(String::from))
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, PageError> {
        evaluate_value(&self.page, script).await
    }

    async fn inject_style(&self, css: &str) -> Result<(), PageError> {
        evaluate_value(&self.page, &style_script(css)?).await?;
        Ok(())
    }
}
