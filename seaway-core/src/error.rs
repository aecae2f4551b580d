use seaway_shared::Money;
use uuid::Uuid;

/// A failure reported by an operator's API, carried verbatim: their
/// message, their error code, the HTTP status we saw.
#[derive(Debug, Clone, thiserror::Error)]
#[error("operator {operator} reported: {message} (code {code:?}, http {http_status:?})")]
pub struct OperatorError {
    pub operator: String,
    pub message: String,
    pub code: Option<String>,
    pub http_status: Option<u16>,
}

/// Outcome classification for a single outbound operator call. RateLimited
/// and Connection are retryable; Api failures are not.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OperatorCallError {
    #[error("rate limited by {operator}: {message}")]
    RateLimited { operator: String, message: String },

    #[error("connection to {operator} failed: {message}")]
    Connection { operator: String, message: String },

    #[error(transparent)]
    Api(#[from] OperatorError),
}

impl OperatorCallError {
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            OperatorCallError::RateLimited { .. } | OperatorCallError::Connection { .. }
        )
    }

    /// Flatten to an OperatorError once retries are exhausted and the
    /// failure has to travel up the booking path.
    pub fn into_operator_error(self) -> OperatorError {
        match self {
            OperatorCallError::Api(err) => err,
            OperatorCallError::RateLimited { operator, message } => OperatorError {
                operator,
                message: format!("rate limit exhausted retries: {message}"),
                code: Some("RATE_LIMITED".to_string()),
                http_status: Some(429),
            },
            OperatorCallError::Connection { operator, message } => OperatorError {
                operator,
                message: format!("connection failed after retries: {message}"),
                code: Some("CONNECTION_FAILED".to_string()),
                http_status: None,
            },
        }
    }
}

/// Search-path failures that reach the caller. Operator failures do not
/// appear here: they are isolated per adapter during fan-out.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Booking-path failures. Unlike search, these always surface: money and
/// inventory are at stake.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("price mismatch: caller expected {expected}, hold snapshot is {snapshot}")]
    PriceMismatch { expected: Money, snapshot: Money },

    #[error("reservation {0} already has an active hold")]
    AlreadyHeld(Uuid),

    #[error("no hold found for reference {0}")]
    NoSuchHold(String),

    #[error("invalid hold transition from {from} via {action}")]
    InvalidState { from: String, action: String },

    #[error("booking context for handle {0} is missing or expired; re-run the search")]
    ContextExpired(Uuid),

    #[error("no adapter configured for operator {0}")]
    UnknownOperator(String),

    #[error(transparent)]
    Operator(#[from] OperatorError),

    #[error("store failure: {0}")]
    Store(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let rate = OperatorCallError::RateLimited {
            operator: "maghreb".to_string(),
            message: "slow down".to_string(),
        };
        let api = OperatorCallError::Api(OperatorError {
            operator: "maghreb".to_string(),
            message: "bad request".to_string(),
            code: Some("E400".to_string()),
            http_status: Some(400),
        });
        assert!(rate.is_transient());
        assert!(!api.is_transient());
    }

    #[test]
    fn test_rate_limit_flattens_with_status() {
        let err = OperatorCallError::RateLimited {
            operator: "adriatic".to_string(),
            message: "burst".to_string(),
        }
        .into_operator_error();
        assert_eq!(err.http_status, Some(429));
        assert_eq!(err.code.as_deref(), Some("RATE_LIMITED"));
    }
}
