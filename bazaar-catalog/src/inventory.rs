use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bazaar_core::catalog::{CatalogError, ProductCatalog};
use bazaar_shared::{ProductId, ProductSnapshot};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tokio::sync::Barrier;

/// Inventory tracking for one product
#[derive(Debug, Clone, Copy)]
pub struct InventoryItem {
    pub price: Decimal,
    pub stock: i32,
}

#[derive(Default)]
struct InventoryState {
    items: HashMap<ProductId, InventoryItem>,
    adjustments: Vec<(ProductId, i32)>,
    adjust_calls: usize,
    unreachable: HashSet<ProductId>,
    fail_adjust_for: HashSet<ProductId>,
    /// 1-based position of the adjust call that fails
    fail_adjust_at: Option<usize>,
}

/// In-memory stand-in for the products service.
///
/// Like the real service, stock adjustments are applied unconditionally and
/// may drive stock negative. Every successful adjustment is recorded in call
/// order.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<Mutex<InventoryState>>,
    latency: Option<Duration>,
    adjust_latency: Option<Duration>,
    read_barrier: Option<Arc<Barrier>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a product with its price and stock
    pub fn with_product(self, product_id: ProductId, price: Decimal, stock: i32) -> Self {
        self.state
            .lock()
            .items
            .insert(product_id, InventoryItem { price, stock });
        self
    }

    /// Delay every call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Delay stock adjustments only, before they are applied
    pub fn with_adjust_latency(mut self, latency: Duration) -> Self {
        self.adjust_latency = Some(latency);
        self
    }

    /// Hold each snapshot read until `readers` reads are in flight. The
    /// stock is captured before waiting, so every reader in a group sees the
    /// same value regardless of decrements issued afterwards.
    pub fn with_read_barrier(mut self, readers: usize) -> Self {
        self.read_barrier = Some(Arc::new(Barrier::new(readers)));
        self
    }

    pub fn set_unreachable(&self, product_id: ProductId) {
        self.state.lock().unreachable.insert(product_id);
    }

    pub fn fail_adjust_for(&self, product_id: ProductId) {
        self.state.lock().fail_adjust_for.insert(product_id);
    }

    pub fn fail_adjust_at(&self, position: usize) {
        self.state.lock().fail_adjust_at = Some(position);
    }

    pub fn stock(&self, product_id: ProductId) -> Option<i32> {
        self.state.lock().items.get(&product_id).map(|item| item.stock)
    }

    /// Successful adjustments in the order they were applied
    pub fn adjustments(&self) -> Vec<(ProductId, i32)> {
        self.state.lock().adjustments.clone()
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
    async fn get_snapshot(&self, product_id: ProductId) -> Result<ProductSnapshot, CatalogError> {
        self.simulate_latency().await;

        let snapshot = {
            let state = self.state.lock();
            if state.unreachable.contains(&product_id) {
                return Err(CatalogError::Unreachable("connection refused".to_string()));
            }
            let item = state
                .items
                .get(&product_id)
                .ok_or(CatalogError::NotFound(product_id))?;
            ProductSnapshot::new(item.price, item.stock)
        };

        if let Some(barrier) = &self.read_barrier {
            barrier.wait().await;
        }
        Ok(snapshot)
    }

    async fn adjust_stock(&self, product_id: ProductId, delta: i32) -> Result<(), CatalogError> {
        self.simulate_latency().await;
        if let Some(latency) = self.adjust_latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state.lock();
        state.adjust_calls += 1;
        if state.unreachable.contains(&product_id)
            || state.fail_adjust_for.contains(&product_id)
            || state.fail_adjust_at == Some(state.adjust_calls)
        {
            return Err(CatalogError::Rejected { status: 500 });
        }

        let item = state
            .items
            .get_mut(&product_id)
            .ok_or(CatalogError::NotFound(product_id))?;
        item.stock += delta;
        state.adjustments.push((product_id, delta));
        Ok(())
    }
}
