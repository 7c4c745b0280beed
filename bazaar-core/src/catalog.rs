use async_trait::async_trait;
use bazaar_shared::{ProductId, ProductSnapshot};

/// Boundary to the products service, which owns price and stock.
///
/// Implementations make one round trip per call: no retries, no caching.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Read the current price and stock of a product
    async fn get_snapshot(&self, product_id: ProductId) -> Result<ProductSnapshot, CatalogError>;

    /// Apply a signed stock delta. Returns no resulting stock value.
    async fn adjust_stock(&self, product_id: ProductId, delta: i32) -> Result<(), CatalogError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Product {0} not found")]
    NotFound(ProductId),

    #[error("Product service unreachable: {0}")]
    Unreachable(String),

    #[error("Product service rejected the request with status {status}")]
    Rejected { status: u16 },

    #[error("Invalid response from product service: {0}")]
    InvalidResponse(String),
}
