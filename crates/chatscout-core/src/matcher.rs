use crate::catalog::{PatternEntry, patterns_for, requirement_for};
use crate::error::PageError;
use crate::model::{DetectionMethod, Role, SelectorInfo};
use crate::page::{PageDriver, locator};
use tracing::debug;

/// Why a catalog entry was passed over.
enum Probe {
    /// Zero matches or a failed query. Not recorded.
    NoMatch,
    /// Matched, but the first element failed a requirement. Recorded as an
    /// alternative.
    Rejected(&'static str),
    Accepted,
}

async fn probe_pattern(
    page: &dyn PageDriver,
    pattern: &PatternEntry,
    require_visible: bool,
    require_enabled: bool,
) -> Result<Probe, PageError> {
    let elements = locator(page, pattern.selector);
    if elements.count().await? == 0 {
        return Ok(Probe::NoMatch);
    }

    let first = elements.first();
    if require_visible && !first.is_visible().await? {
        return Ok(Probe::Rejected("not visible"));
    }
    if require_enabled && !first.is_enabled().await? {
        return Ok(Probe::Rejected("disabled"));
    }
    Ok(Probe::Accepted)
}

/// Walk `patterns` in order and return the first whose first element meets
/// the requirements.
///
/// Entries that matched but failed a requirement become the result's
/// alternatives. Query errors are skipped silently.
pub async fn match_patterns(
    page: &dyn PageDriver,
    role: Role,
    patterns: &[PatternEntry],
    require_visible: bool,
    require_enabled: bool,
) -> Option<SelectorInfo> {
    let mut alternatives = Vec::new();

    for pattern in patterns {
        match probe_pattern(page, pattern, require_visible, require_enabled).await {
            Ok(Probe::Accepted) => {
                debug!("{}: matched {}", role, pattern.selector);
                return Some(
                    SelectorInfo::new(
                        pattern.selector,
                        pattern.confidence,
                        DetectionMethod::Auto,
                        pattern.description,
                    )
                    .with_alternatives(alternatives),
                );
            }
            Ok(Probe::Rejected(reason)) => {
                debug!("{}: {} {}", role, pattern.selector, reason);
                alternatives.push(pattern.selector.to_string());
            }
            Ok(Probe::NoMatch) => {}
            Err(e) => debug!("{}: {} error - {}", role, pattern.selector, e),
        }
    }

    debug!("{}: no catalog pattern matched", role);
    None
}

/// Match a role against its catalog table with the role's own requirements.
pub async fn match_role(page: &dyn PageDriver, role: Role) -> Option<SelectorInfo> {
    let requirement = requirement_for(role);
    match_patterns(
        page,
        role,
        patterns_for(role),
        requirement.visible,
        requirement.enabled,
    )
    .await
}
