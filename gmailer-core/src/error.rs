//! Error types shared by the lookup components.

use thiserror::Error;

/// Failure of a single remote lookup (geocoding, weather, public IP).
///
/// Lookup failures degrade the report instead of aborting the send: the
/// pipeline logs them and omits the affected section.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The query was understood but matched nothing (e.g. unresolvable address).
    #[error("not found")]
    NotFound,

    /// The service could not be reached, timed out, or answered unusably.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl LookupError {
    /// True when retrying against a different service instance could help.
    pub fn is_service_failure(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_service_detail() {
        let err = LookupError::ServiceUnavailable("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn not_found_is_not_a_service_failure() {
        assert!(!LookupError::NotFound.is_service_failure());
        assert!(LookupError::ServiceUnavailable(String::new()).is_service_failure());
    }
}
