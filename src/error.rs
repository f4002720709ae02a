use std::fmt;
use std::time::Duration;

/// Failures that abort a scrape run.
///
/// Per-row problems never show up here; they are [`SkipReason`] values and
/// only ever drop the one row they belong to.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// The floor-plan list never appeared on the page.
    #[error("listing container `{selector}` did not appear within {waited:?}")]
    RenderTimeout { selector: String, waited: Duration },

    #[error("browser error: {0}")]
    Browser(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Why a single unit row was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkipReason {
    /// A required sub-element was absent from the row or its group.
    MissingField(&'static str),
    /// The group's bed/bath label does not contain the target configuration.
    UnitTypeMismatch { label: String },
    /// The price text did not parse to a non-negative number.
    UnparseablePrice(String),
}

impl SkipReason {
    /// Stable key used when tallying skips for the run log.
    pub fn kind(&self) -> &'static str {
        match self {
            SkipReason::MissingField(_) => "missing_field",
            SkipReason::UnitTypeMismatch { .. } => "unit_type_mismatch",
            SkipReason::UnparseablePrice(_) => "unparseable_price",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingField(field) => write!(f, "missing {field}"),
            SkipReason::UnitTypeMismatch { label } => write!(f, "unit type `{label}` not targeted"),
            SkipReason::UnparseablePrice(raw) => write!(f, "unparseable price `{raw}`"),
        }
    }
}

/// Result of a best-effort browser step such as dismissing a consent banner.
///
/// None of these outcomes stop the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Succeeded,
    NotApplicable,
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_timeout_message_names_selector() {
        let err = ScrapeError::RenderTimeout {
            selector: ".fapt-fp-list-item".to_string(),
            waited: Duration::from_secs(60),
        };
        let msg = err.to_string();
        assert!(msg.contains(".fapt-fp-list-item"));
        assert!(msg.contains("60s"));
    }

    #[test]
    fn test_skip_reason_kinds() {
        assert_eq!(SkipReason::MissingField("term").kind(), "missing_field");
        assert_eq!(
            SkipReason::UnitTypeMismatch { label: "1 Bed / 1 Bath".into() }.kind(),
            "unit_type_mismatch"
        );
        assert_eq!(
            SkipReason::UnparseablePrice("Call for price".into()).to_string(),
            "unparseable price `Call for price`"
        );
    }
}
