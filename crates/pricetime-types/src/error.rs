//! Error types for the pricetime order book.
//!
//! All errors use the `PT_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Order admission and lookup errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::OrderId;

/// Central error enum for all book operations.
///
/// Every failing operation leaves the book exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    // =================================================================
    // Order Errors (1xx)
    // =================================================================
    /// No resting order carries this identifier.
    #[error("PT_ERR_100: Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The order failed admission checks (zero quantity, bad price, ...).
    #[error("PT_ERR_101: Invalid order: {reason}")]
    InvalidOrder { reason: String },

    /// An order with this identifier is already resting.
    #[error("PT_ERR_102: Order already exists: {0}")]
    DuplicateOrder(OrderId),

    /// A side value outside {buy, sell}.
    #[error("PT_ERR_103: Invalid side: {0:?}")]
    InvalidSide(String),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// A structural invariant of the book does not hold.
    #[error("PT_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Configuration error (bad JSON, missing fields, invalid values).
    #[error("PT_ERR_901: Configuration error: {0}")]
    Configuration(String),

    /// The book actor has stopped and can no longer accept commands.
    #[error("PT_ERR_902: Book engine is closed")]
    EngineClosed,
}

impl BookError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidOrder {
            reason: reason.into(),
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, BookError>;

impl From<serde_json::Error> for BookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_not_found_display() {
        let msg = format!("{}", BookError::OrderNotFound(OrderId(42)));
        assert!(msg.starts_with("PT_ERR_100"), "Got: {msg}");
        assert!(msg.contains("42"));
    }

    #[test]
    fn invalid_side_quotes_input() {
        let msg = format!("{}", BookError::InvalidSide("HOLD".into()));
        assert!(msg.contains("\"HOLD\""), "Got: {msg}");
    }

    #[test]
    fn all_errors_have_pt_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(BookError::OrderNotFound(OrderId(1))),
            Box::new(BookError::invalid("zero quantity")),
            Box::new(BookError::DuplicateOrder(OrderId(1))),
            Box::new(BookError::InvalidSide("x".into())),
            Box::new(BookError::Internal("test".into())),
            Box::new(BookError::Configuration("test".into())),
            Box::new(BookError::EngineClosed),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("PT_ERR_"),
                "Error missing PT_ERR_ prefix: {msg}"
            );
        }
    }
}
