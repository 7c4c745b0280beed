use std::time::Duration;

use bazaar_core::ProductCatalog;
use bazaar_shared::ProductId;
use tracing::{info, warn};

/// Stock decrements applied to the products service during one
/// fulfillment attempt, in the order they landed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StockLedger {
    applied: Vec<(ProductId, i32)>,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `quantity` units of `product_id` were taken
    pub fn record(&mut self, product_id: ProductId, quantity: i32) {
        self.applied.push((product_id, quantity));
    }

    pub fn applied(&self) -> &[(ProductId, i32)] {
        &self.applied
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }

    pub fn len(&self) -> usize {
        self.applied.len()
    }
}

/// Re-increment every recorded decrement, most recent first.
///
/// Each call is attempted once. Failures are logged and skipped, so the
/// return value is the number of decrements actually restored.
pub async fn restore_stock(
    catalog: &dyn ProductCatalog,
    ledger: &StockLedger,
    timeout: Duration,
) -> usize {
    let mut restored = 0;

    for &(product_id, quantity) in ledger.applied().iter().rev() {
        match tokio::time::timeout(timeout, catalog.adjust_stock(product_id, quantity)).await {
            Ok(Ok(())) => {
                restored += 1;
                info!(product_id, quantity, "Restored stock");
            }
            Ok(Err(e)) => {
                warn!(product_id, quantity, error = %e, "Failed to restore stock");
            }
            Err(_) => {
                warn!(product_id, quantity, "Timed out restoring stock");
            }
        }
    }

    restored
}
