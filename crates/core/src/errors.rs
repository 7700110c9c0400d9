//! Core error types for the NutriKart client.
//!
//! This module defines transport-agnostic error types. HTTP-specific failures
//! (from reqwest, status codes, etc.) are converted to these types by the
//! client crate.

use std::num::ParseIntError;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the storefront client.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Cart operation failed: {0}")]
    Cart(#[from] CartError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Service call failed: {0}")]
    Service(#[from] ServiceError),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Errors raised by the cart store.
///
/// A rejected mutation leaves the cart untouched and notifies no observer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: i64, quantity: i64 },
}

/// Failures of the external collaborators (recommendation and catalog endpoints).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The endpoint could not be reached (connection refused, DNS, timeout).
    #[error("Service unreachable: {0}")]
    NetworkUnreachable(String),

    /// The endpoint answered with a structured error (e.g. invalid budget).
    #[error("Service rejected the request (HTTP {status}){}", detail_suffix(.detail))]
    ServiceRejected { status: u16, detail: Option<String> },

    /// The endpoint answered 2xx but the body could not be decoded.
    #[error("Malformed service response: {0}")]
    MalformedResponse(String),

    /// A newer request or key change made this result irrelevant.
    /// Never surfaced to users.
    #[error("Result superseded by a newer request")]
    Superseded,
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {}", d))
        .unwrap_or_default()
}

/// Fallback message when the service rejects a request without a detail.
pub const REJECTED_FALLBACK_MESSAGE: &str = "Request rejected by the recommendation service.";

/// Message shown when the service cannot be reached.
pub const UNREACHABLE_MESSAGE: &str =
    "Could not reach the server. Make sure the backend is running.";

impl ServiceError {
    /// Human-readable message for the standalone form flow.
    pub fn user_message(&self) -> String {
        match self {
            Self::NetworkUnreachable(_) => UNREACHABLE_MESSAGE.to_string(),
            Self::ServiceRejected { detail, .. } => detail
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| REJECTED_FALLBACK_MESSAGE.to_string()),
            Self::MalformedResponse(_) => {
                "The recommendation service returned an unexpected response.".to_string()
            }
            Self::Superseded => String::new(),
        }
    }

    /// Whether the user may retry the same request.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Superseded)
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded)
    }
}

/// Validation errors for user input and config parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Unknown health condition '{0}'. Valid options: diabetic, hypertension, weight_loss or none")]
    UnknownHealthCondition(String),

    #[error("Failed to parse number: {0}")]
    NumberParse(String),
}

impl From<ParseIntError> for ValidationError {
    fn from(err: ParseIntError) -> Self {
        ValidationError::NumberParse(err.to_string())
    }
}

impl From<rust_decimal::Error> for ValidationError {
    fn from(err: rust_decimal::Error) -> Self {
        ValidationError::NumberParse(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Export(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Export(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_message_prefers_detail() {
        let err = ServiceError::ServiceRejected {
            status: 400,
            detail: Some("Budget must be greater than 0".to_string()),
        };
        assert_eq!(err.user_message(), "Budget must be greater than 0");
        assert_eq!(
            err.to_string(),
            "Service rejected the request (HTTP 400): Budget must be greater than 0"
        );
    }

    #[test]
    fn test_rejected_message_falls_back_without_detail() {
        let err = ServiceError::ServiceRejected {
            status: 500,
            detail: None,
        };
        assert_eq!(err.user_message(), REJECTED_FALLBACK_MESSAGE);
        assert_eq!(err.to_string(), "Service rejected the request (HTTP 500)");
    }

    #[test]
    fn test_unreachable_message() {
        let err = ServiceError::NetworkUnreachable("connection refused".to_string());
        assert_eq!(err.user_message(), UNREACHABLE_MESSAGE);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_superseded_is_not_retryable() {
        assert!(!ServiceError::Superseded.is_retryable());
        assert!(ServiceError::Superseded.is_superseded());
    }
}
