use crate::catalog::{STRUCTURAL_BOT_PROBES, USER_MESSAGE_MARKERS};
use crate::error::PageError;
use crate::model::{ConfidenceTier, DetectionMethod, SelectorInfo};
use crate::page::{PageDriver, locator};
use tracing::debug;

/// Check whether a class attribute looks like it belongs to a user message.
fn looks_like_user_message(class_attr: &str) -> bool {
    let lower = class_attr.to_lowercase();
    USER_MESSAGE_MARKERS.iter().any(|m| lower.contains(m))
}

/// Class attribute of the first match, or `None` if nothing matched.
async fn first_class(page: &dyn PageDriver, probe: &str) -> Result<Option<String>, PageError> {
    let elements = locator(page, probe);
    if elements.count().await? == 0 {
        return Ok(None);
    }
    Ok(Some(
        elements.first().get_attribute("class").await?.unwrap_or_default(),
    ))
}

/// Guess a bot-message selector from page structure.
///
/// Used only after the bot-message catalog yielded nothing. A probe whose
/// first match carries a user/human class is rejected in favour of the next.
pub async fn infer_bot_messages(page: &dyn PageDriver) -> Option<SelectorInfo> {
    for probe in STRUCTURAL_BOT_PROBES {
        match first_class(page, probe).await {
            Ok(Some(classes)) if looks_like_user_message(&classes) => {
                debug!("structural probe {} rejected (user class '{}')", probe, classes);
            }
            Ok(Some(_)) => {
                debug!("structural probe {} accepted", probe);
                return Some(SelectorInfo::new(
                    *probe,
                    ConfidenceTier::Low,
                    DetectionMethod::AutoHeuristic,
                    "Inferito da struttura pagina",
                ));
            }
            Ok(None) => {}
            Err(e) => debug!("structural probe {} error - {}", probe, e),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::looks_like_user_message;

    #[test]
    fn test_user_markers_case_insensitive() {
        assert!(looks_like_user_message("msg User-bubble"));
        assert!(looks_like_user_message("HumanTurn"));
        assert!(!looks_like_user_message("response-bubble"));
        assert!(!looks_like_user_message(""));
    }
}
