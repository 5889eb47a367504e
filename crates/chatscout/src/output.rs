use anyhow::Context;
use chatscout_core::model::{DetectionResult, SelectorSet};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Yaml,
    Json,
}

impl OutputFormat {
    /// JSON when forced or when the path ends in `.json`, YAML otherwise.
    pub fn for_path(path: &Path, force_json: bool) -> Self {
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if force_json || is_json {
            OutputFormat::Json
        } else {
            OutputFormat::Yaml
        }
    }
}

pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    })
}

/// Selector map as persisted: role to selector string, or role to detail
/// record with confidence, method and alternatives.
pub fn render_selectors(
    selectors: &SelectorSet,
    detailed: bool,
    format: OutputFormat,
) -> anyhow::Result<String> {
    if detailed {
        render(&selectors.to_detailed_map(), format)
    } else {
        render(&selectors.to_plain_map(), format)
    }
}

pub fn write_selectors(
    path: &Path,
    selectors: &SelectorSet,
    detailed: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let contents = render_selectors(selectors, detailed, format)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Human-readable summary lines for a finished detection.
pub fn summary_lines(result: &DetectionResult) -> Vec<String> {
    let mut lines = vec![result.message.clone()];
    lines.extend(result.warnings.iter().map(|w| format!("  ! {}", w)));
    lines.extend(result.errors.iter().map(|e| format!("  x {}", e)));
    lines
}
