//! HTTP client for the products service.
//!
//! Reads go to `GET /api/products/{id}`, which returns the same product
//! representation the service exposes to its own clients. Stock changes go
//! to `PATCH /api/products/{id}/stock` with a signed `quantity` delta.

use std::time::Duration;

use async_trait::async_trait;
use bazaar_core::catalog::{CatalogError, ProductCatalog};
use bazaar_shared::{ProductId, ProductSnapshot};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Subset of the product representation we rely on
#[derive(Deserialize)]
struct ProductRecord {
    #[allow(dead_code)]
    id: ProductId,
    price: Decimal,
    stock_quantity: i32,
}

#[derive(Serialize)]
struct StockAdjustment {
    quantity: i32,
}

pub struct HttpProductCatalog {
    client: Client,
    base_url: String,
}

impl HttpProductCatalog {
    /// `timeout` bounds each round trip, connect through body.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Unreachable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn product_url(&self, product_id: ProductId) -> String {
        format!("{}/api/products/{}", self.base_url, product_id)
    }
}

fn transport_err(err: reqwest::Error) -> CatalogError {
    if err.is_timeout() {
        CatalogError::Unreachable("request timed out".to_string())
    } else if err.is_decode() {
        CatalogError::InvalidResponse(err.to_string())
    } else {
        CatalogError::Unreachable(err.to_string())
    }
}

fn status_err(product_id: ProductId, status: StatusCode) -> CatalogError {
    if status == StatusCode::NOT_FOUND {
        CatalogError::NotFound(product_id)
    } else {
        CatalogError::Rejected {
            status: status.as_u16(),
        }
    }
}

#[async_trait]
impl ProductCatalog for HttpProductCatalog {
    async fn get_snapshot(&self, product_id: ProductId) -> Result<ProductSnapshot, CatalogError> {
        let response = self
            .client
            .get(self.product_url(product_id))
            .send()
            .await
            .map_err(transport_err)?;

        if !response.status().is_success() {
            return Err(status_err(product_id, response.status()));
        }

        let record: ProductRecord = response.json().await.map_err(transport_err)?;
        debug!(
            product_id,
            price = %record.price,
            stock = record.stock_quantity,
            "Fetched product snapshot"
        );

        Ok(ProductSnapshot::new(record.price, record.stock_quantity))
    }

    async fn adjust_stock(&self, product_id: ProductId, delta: i32) -> Result<(), CatalogError> {
        let response = self
            .client
            .patch(format!("{}/stock", self.product_url(product_id)))
            .json(&StockAdjustment { quantity: delta })
            .send()
            .await
            .map_err(transport_err)?;

        if !response.status().is_success() {
            return Err(status_err(product_id, response.status()));
        }

        debug!(product_id, delta, "Adjusted product stock");
        Ok(())
    }
}
