//! Order fulfillment workflow.
//!
//! The orders store and the products service share no transaction. The
//! workflow validates and prices the whole cart first, then writes the order
//! inside one local transaction while decrementing remote stock item by
//! item. A decrement is a separate side effect: rolling back the local
//! transaction does not undo it. Whether earlier decrements are restored
//! after a later failure is decided by [`CompensationPolicy`].
//!
//! Concurrent orders for the same product are not serialized. Two requests
//! can both read enough stock and both decrement it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bazaar_core::{
    CatalogError, CompensationPolicy, OrderRepository, OrderTransaction, ProductCatalog,
    StoreError,
};
use bazaar_shared::{CartRequest, NewOrderItem, OrderId, OrderStatus, OrderSummary, UserId};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, info, warn};

use crate::compensation::{restore_stock, StockLedger};
use crate::error::FulfillmentError;

const MONEY_SCALE: u32 = 2;

#[derive(Debug, Clone)]
pub struct FulfillmentSettings {
    pub compensation: CompensationPolicy,
    /// Bound on every products service call
    pub remote_timeout: Duration,
    /// Bound on acquiring the local transaction
    pub transaction_timeout: Duration,
}

impl Default for FulfillmentSettings {
    fn default() -> Self {
        Self {
            compensation: CompensationPolicy::None,
            remote_timeout: Duration::from_secs(5),
            transaction_timeout: Duration::from_secs(3),
        }
    }
}

pub struct OrderFulfillmentOrchestrator {
    catalog: Arc<dyn ProductCatalog>,
    orders: Arc<dyn OrderRepository>,
    settings: FulfillmentSettings,
}

impl OrderFulfillmentOrchestrator {
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        orders: Arc<dyn OrderRepository>,
        settings: FulfillmentSettings,
    ) -> Self {
        Self {
            catalog,
            orders,
            settings,
        }
    }

    /// Validate, price, persist and decrement stock for a cart.
    pub async fn create_order(&self, cart: &CartRequest) -> Result<OrderSummary, FulfillmentError> {
        validate_cart(cart)?;

        let (items, total_amount) = self.price_cart(cart).await?;

        let mut tx = self.begin().await?;
        let mut ledger = StockLedger::new();

        let outcome = self
            .write_order(tx.as_mut(), cart.user_id, &items, total_amount, &mut ledger)
            .await;

        match outcome {
            Ok(order_id) => {
                info!(
                    order_id,
                    user_id = cart.user_id,
                    total = %total_amount,
                    items = items.len(),
                    "Order created"
                );
                Ok(OrderSummary {
                    order_id,
                    total_amount,
                })
            }
            Err(err) => {
                if let Err(e) = tx.rollback().await {
                    warn!(error = %e, "Rollback of order transaction failed");
                }
                warn!(user_id = cart.user_id, code = err.code(), error = %err, "Order aborted");
                self.handle_applied_decrements(&ledger).await;
                Err(err)
            }
        }
    }

    /// Read a snapshot for every line and capture its price. No side effects.
    async fn price_cart(
        &self,
        cart: &CartRequest,
    ) -> Result<(Vec<NewOrderItem>, Decimal), FulfillmentError> {
        let mut total_amount = Decimal::ZERO;
        let mut items = Vec::with_capacity(cart.items.len());

        for line in &cart.items {
            let snapshot = self
                .remote(self.catalog.get_snapshot(line.product_id))
                .await
                .map_err(|e| {
                    info!(product_id = line.product_id, error = %e, "Product unavailable");
                    FulfillmentError::ProductUnavailable {
                        product_id: line.product_id,
                        reason: e.to_string(),
                    }
                })?;

            if !snapshot.covers(line.quantity) {
                info!(
                    product_id = line.product_id,
                    requested = line.quantity,
                    available = snapshot.stock,
                    "Insufficient stock"
                );
                return Err(FulfillmentError::InsufficientStock {
                    product_id: line.product_id,
                    requested: line.quantity,
                    available: snapshot.stock,
                });
            }

            // Stored prices carry two decimal places
            let price = snapshot
                .price
                .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
            let item = NewOrderItem::new(line.product_id, line.quantity, price);
            total_amount = item
                .line_total()
                .and_then(|line_total| total_amount.checked_add(line_total))
                .ok_or_else(|| {
                    FulfillmentError::InvalidInput(format!(
                        "order total out of range at product {}",
                        line.product_id
                    ))
                })?;
            items.push(item);
        }

        Ok((items, total_amount))
    }

    async fn begin(&self) -> Result<Box<dyn OrderTransaction>, FulfillmentError> {
        match tokio::time::timeout(self.settings.transaction_timeout, self.orders.begin()).await {
            Ok(tx) => Ok(tx?),
            Err(_) => Err(StoreError::Timeout.into()),
        }
    }

    async fn write_order(
        &self,
        tx: &mut dyn OrderTransaction,
        user_id: UserId,
        items: &[NewOrderItem],
        total_amount: Decimal,
        ledger: &mut StockLedger,
    ) -> Result<OrderId, FulfillmentError> {
        let order_id = tx
            .insert_order_header(user_id, OrderStatus::Pending, total_amount)
            .await?;
        debug!(order_id, user_id, "Order header written");

        for item in items {
            tx.insert_order_item(order_id, item.product_id, item.quantity, item.price)
                .await?;

            // Not part of the local transaction. Only confirmed decrements
            // reach the ledger, a timed-out call may still have landed.
            self.remote(self.catalog.adjust_stock(item.product_id, -item.quantity))
                .await
                .map_err(|e| FulfillmentError::StockUpdateFailed {
                    product_id: item.product_id,
                    reason: e.to_string(),
                })?;
            ledger.record(item.product_id, item.quantity);
            debug!(
                order_id,
                product_id = item.product_id,
                quantity = item.quantity,
                "Stock decremented"
            );
        }

        tx.commit().await?;
        Ok(order_id)
    }

    async fn handle_applied_decrements(&self, ledger: &StockLedger) {
        if ledger.is_empty() {
            return;
        }

        match self.settings.compensation {
            CompensationPolicy::None => {
                warn!(
                    decrements = ledger.len(),
                    applied = ?ledger.applied(),
                    "Stock decrements from aborted order left applied"
                );
            }
            CompensationPolicy::Reverse => {
                let restored =
                    restore_stock(self.catalog.as_ref(), ledger, self.settings.remote_timeout)
                        .await;
                info!(restored, decrements = ledger.len(), "Compensated aborted order");
            }
        }
    }

    async fn remote<T>(
        &self,
        call: impl Future<Output = Result<T, CatalogError>>,
    ) -> Result<T, CatalogError> {
        tokio::time::timeout(self.settings.remote_timeout, call)
            .await
            .unwrap_or_else(|_| Err(CatalogError::Unreachable("request timed out".to_string())))
    }
}

fn validate_cart(cart: &CartRequest) -> Result<(), FulfillmentError> {
    if cart.items.is_empty() {
        return Err(FulfillmentError::InvalidInput(
            "order must contain at least one item".to_string(),
        ));
    }

    if let Some(line) = cart.items.iter().find(|line| line.quantity <= 0) {
        return Err(FulfillmentError::InvalidInput(format!(
            "quantity for product {} must be positive",
            line.product_id
        )));
    }

    Ok(())
}
