use bazaar_core::StoreError;
use bazaar_shared::{OrderId, OrderStatus, ProductId};
use thiserror::Error;

/// Failures of the order fulfillment workflow.
///
/// Only `Persistence` and `StockUpdateFailed` can occur after remote stock
/// has been touched; the others are raised before any side effect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FulfillmentError {
    #[error("Invalid order request: {0}")]
    InvalidInput(String),

    #[error("Product {product_id} not found")]
    ProductUnavailable { product_id: ProductId, reason: String },

    #[error("Insufficient stock for product {product_id}")]
    InsufficientStock {
        product_id: ProductId,
        requested: i32,
        available: i32,
    },

    #[error("Failed to persist order: {0}")]
    Persistence(String),

    #[error("Failed to update product stock for product {product_id}")]
    StockUpdateFailed { product_id: ProductId, reason: String },
}

impl FulfillmentError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            FulfillmentError::InvalidInput(_) => "INVALID_INPUT",
            FulfillmentError::ProductUnavailable { .. } => "PRODUCT_UNAVAILABLE",
            FulfillmentError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            FulfillmentError::Persistence(_) => "PERSISTENCE_ERROR",
            FulfillmentError::StockUpdateFailed { .. } => "STOCK_UPDATE_FAILED",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            FulfillmentError::InvalidInput(_)
            | FulfillmentError::ProductUnavailable { .. }
            | FulfillmentError::InsufficientStock { .. } => 400,
            FulfillmentError::Persistence(_) | FulfillmentError::StockUpdateFailed { .. } => 500,
        }
    }
}

impl From<StoreError> for FulfillmentError {
    fn from(e: StoreError) -> Self {
        FulfillmentError::Persistence(e.to_string())
    }
}

/// Failures of the order read and status operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("Order not found")]
    NotFound(OrderId),

    #[error("{0}")]
    InvalidStatus(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order store failure: {0}")]
    Store(#[from] StoreError),
}

impl OrderError {
    pub fn code(&self) -> &'static str {
        match self {
            OrderError::NotFound(_) => "ORDER_NOT_FOUND",
            OrderError::InvalidStatus(_) => "INVALID_STATUS",
            OrderError::InvalidTransition { .. } => "INVALID_STATE_TRANSITION",
            OrderError::Store(_) => "PERSISTENCE_ERROR",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            OrderError::NotFound(_) => 404,
            OrderError::InvalidStatus(_) | OrderError::InvalidTransition { .. } => 400,
            OrderError::Store(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            FulfillmentError::InvalidInput("empty".into()).code(),
            "INVALID_INPUT"
        );
        assert_eq!(
            FulfillmentError::StockUpdateFailed {
                product_id: 1,
                reason: "boom".into()
            }
            .code(),
            "STOCK_UPDATE_FAILED"
        );
        assert_eq!(OrderError::NotFound(3).code(), "ORDER_NOT_FOUND");
    }

    #[test]
    fn test_http_status() {
        let insufficient = FulfillmentError::InsufficientStock {
            product_id: 42,
            requested: 2,
            available: 1,
        };
        assert_eq!(insufficient.http_status(), 400);
        assert_eq!(
            FulfillmentError::ProductUnavailable {
                product_id: 42,
                reason: "gone".into()
            }
            .http_status(),
            400
        );
        assert_eq!(FulfillmentError::Persistence("x".into()).http_status(), 500);
        assert_eq!(OrderError::NotFound(1).http_status(), 404);
        assert_eq!(OrderError::Store(StoreError::Timeout).http_status(), 500);
    }

    #[test]
    fn test_display_names_the_product() {
        let err = FulfillmentError::InsufficientStock {
            product_id: 42,
            requested: 2,
            available: 1,
        };
        assert_eq!(err.to_string(), "Insufficient stock for product 42");

        let err = FulfillmentError::ProductUnavailable {
            product_id: 7,
            reason: "Product 7 not found".into(),
        };
        assert_eq!(err.to_string(), "Product 7 not found");
    }
}
