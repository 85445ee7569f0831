//! Service error type.

use thiserror::Error;

use shopcart_core::{OrderId, ProductId};

/// Boxed cause carried by [`ServiceError::Fault`].
pub type FaultSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// An unexpected failure (storage, arithmetic overflow) while performing
    /// `operation`. The cause is logged; callers show a generic message.
    #[error("{operation} failed: {source}")]
    Fault {
        operation: &'static str,
        #[source]
        source: FaultSource,
    },

    /// Status update targeted an order that does not exist.
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// Update targeted a product that does not exist.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// Rejected input.
    #[error("invalid input: {0}")]
    Invalid(String),
}

impl ServiceError {
    /// Wrap an unexpected failure, logging the full cause.
    pub fn fault(operation: &'static str, source: impl Into<FaultSource>) -> Self {
        let source = source.into();
        tracing::error!(operation, error = %source, "Service operation failed");
        Self::Fault { operation, source }
    }

    /// Reject input with a user-facing reason.
    pub fn invalid(reason: impl std::fmt::Display) -> Self {
        Self::Invalid(reason.to_string())
    }
}
