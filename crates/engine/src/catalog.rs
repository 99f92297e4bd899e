//! Verdict table for homework review statuses.

use std::collections::HashMap;

use watch_common::error::WatchError;
use watch_common::types::StatusCode;

const APPROVED_VERDICT: &str = "Работа проверена: ревьюеру всё понравилось. Ура!";
const REVIEWING_VERDICT: &str = "Работа взята на проверку ревьюером.";
const REJECTED_VERDICT: &str = "Работа проверена: у ревьюера есть замечания.";

/// Fixed mapping from status code to verdict text.
///
/// Overrides are applied while building the catalog; after that it is read-only.
#[derive(Debug, Clone)]
pub struct StatusCatalog {
    verdicts: HashMap<StatusCode, String>,
}

impl StatusCatalog {
    pub fn new() -> Self {
        let verdicts = StatusCode::ALL
            .into_iter()
            .map(|code| (code, Self::default_verdict(code).to_string()))
            .collect();
        Self { verdicts }
    }

    /// Replace the verdict text for one status (e.g. for another locale).
    pub fn with_verdict(mut self, code: StatusCode, verdict: impl Into<String>) -> Self {
        self.verdicts.insert(code, verdict.into());
        self
    }

    /// Look up the verdict for a raw status string.
    pub fn translate(&self, code: &str) -> Result<&str, WatchError> {
        let status: StatusCode = code.parse()?;
        self.verdict(status)
    }

    pub fn verdict(&self, status: StatusCode) -> Result<&str, WatchError> {
        self.verdicts
            .get(&status)
            .map(String::as_str)
            .ok_or_else(|| WatchError::UnknownStatus(status.to_string()))
    }

    fn default_verdict(code: StatusCode) -> &'static str {
        match code {
            StatusCode::Approved => APPROVED_VERDICT,
            StatusCode::Reviewing => REVIEWING_VERDICT,
            StatusCode::Rejected => REJECTED_VERDICT,
        }
    }
}

impl Default for StatusCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_statuses_have_verdicts() {
        let catalog = StatusCatalog::new();
        for code in StatusCode::ALL {
            let verdict = catalog.translate(code.as_str()).unwrap();
            assert!(!verdict.is_empty());
        }
        assert_eq!(catalog.translate("approved").unwrap(), APPROVED_VERDICT);
    }

    #[test]
    fn test_unknown_statuses_rejected() {
        let catalog = StatusCatalog::new();
        for code in ["pending", "", "Approved", "approved ", "null"] {
            assert_eq!(
                catalog.translate(code).unwrap_err(),
                WatchError::UnknownStatus(code.to_string())
            );
        }
    }

    #[test]
    fn test_verdict_override() {
        let catalog = StatusCatalog::new().with_verdict(StatusCode::Rejected, "Needs changes.");
        assert_eq!(catalog.translate("rejected").unwrap(), "Needs changes.");
        assert_eq!(catalog.translate("reviewing").unwrap(), REVIEWING_VERDICT);
    }
}
