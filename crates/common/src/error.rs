use thiserror::Error;

/// Error taxonomy shared by every stage of the polling cycle.
///
/// Everything except `Config` is recovered inside a cycle; `Config` only
/// surfaces during startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Type mismatch for `{field}`: expected {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },

    #[error("Unknown homework status: {0}")]
    UnknownStatus(String),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WatchError {
    pub fn type_mismatch(field: impl Into<String>, expected: &'static str) -> Self {
        WatchError::TypeMismatch {
            field: field.into(),
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_status_message_embeds_code() {
        let err = WatchError::UnknownStatus("pending".to_string());
        assert_eq!(err.to_string(), "Unknown homework status: pending");
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = WatchError::type_mismatch("homeworks", "an array");
        assert_eq!(
            err.to_string(),
            "Type mismatch for `homeworks`: expected an array"
        );
    }
}
