use crate::catalog::CHAT_CLASS_FRAGMENTS;
use crate::error::PageError;
use crate::page::{PageDriver, locator};
use serde::Serialize;
use tracing::debug;

/// Check that `selector` resolves to at least `max(min_count, 1)` elements,
/// and that the first one is visible when `require_visible` is set.
///
/// Any query failure counts as invalid.
pub async fn validate(
    page: &dyn PageDriver,
    selector: &str,
    min_count: usize,
    require_visible: bool,
) -> bool {
    match try_validate(page, selector, min_count, require_visible).await {
        Ok(valid) => valid,
        Err(e) => {
            debug!("validate {}: {}", selector, e);
            false
        }
    }
}

async fn try_validate(
    page: &dyn PageDriver,
    selector: &str,
    min_count: usize,
    require_visible: bool,
) -> Result<bool, PageError> {
    let elements = locator(page, selector);
    let count = elements.count().await?;
    if count < min_count.max(1) {
        return Ok(false);
    }
    if require_visible {
        return elements.first().is_visible().await;
    }
    Ok(true)
}

/// What a [`probe`] judges validity on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeAction {
    Visibility,
    Clickable,
    Fillable,
}

/// Full diagnostic for one selector.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectorProbe {
    pub valid: bool,
    pub count: usize,
    pub visible: bool,
    pub enabled: bool,
    pub error: Option<String>,
}

/// Count, visibility and enabled state of a selector's first match.
pub async fn probe(page: &dyn PageDriver, selector: &str, action: ProbeAction) -> SelectorProbe {
    let mut result = SelectorProbe::default();
    if let Err(e) = fill_probe(page, selector, action, &mut result).await {
        result.error = Some(e.to_string());
    }
    result
}

async fn fill_probe(
    page: &dyn PageDriver,
    selector: &str,
    action: ProbeAction,
    result: &mut SelectorProbe,
) -> Result<(), PageError> {
    let elements = locator(page, selector);
    result.count = elements.count().await?;
    if result.count > 0 {
        let first = elements.first();
        result.visible = first.is_visible().await?;
        result.enabled = first.is_enabled().await?;
        result.valid = match action {
            ProbeAction::Visibility => result.visible,
            ProbeAction::Clickable | ProbeAction::Fillable => result.enabled,
        };
    }
    Ok(())
}

/// Rough inventory of chat-relevant markup, for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageStructure {
    pub forms: usize,
    pub textareas: usize,
    pub buttons: usize,
    pub inputs: usize,
    pub contenteditable: usize,
    pub common_classes: Vec<(String, usize)>,
}

/// Count the main interactive elements and chat-related class fragments.
///
/// A failing query stops the inventory; whatever was counted so far is kept.
pub async fn page_structure(page: &dyn PageDriver) -> PageStructure {
    let mut structure = PageStructure::default();
    if let Err(e) = fill_structure(page, &mut structure).await {
        debug!("page structure incomplete: {}", e);
    }
    structure
}

async fn fill_structure(page: &dyn PageDriver, out: &mut PageStructure) -> Result<(), PageError> {
    out.forms = page.count("form").await?;
    out.textareas = page.count("textarea").await?;
    out.buttons = page.count("button").await?;
    out.inputs = page.count("input").await?;
    out.contenteditable = page.count("[contenteditable=\"true\"]").await?;

    for fragment in CHAT_CLASS_FRAGMENTS {
        let count = page.count(&format!("[class*=\"{}\"]", fragment)).await?;
        if count > 0 {
            out.common_classes.push((fragment.to_string(), count));
        }
    }
    Ok(())
}
