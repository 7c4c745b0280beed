use std::sync::Arc;

use bazaar_core::OrderRepository;
use bazaar_shared::{Order, OrderId, OrderStatus, UserId};
use tracing::info;

use crate::error::OrderError;

/// Reads orders and manages their status after creation
pub struct OrderManager {
    orders: Arc<dyn OrderRepository>,
}

impl OrderManager {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    /// Get an order with its items
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.orders
            .get_order(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))
    }

    /// Order headers for a user, newest first
    pub async fn list_user_orders(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list_orders_by_user(user_id).await?)
    }

    /// Move an order to `status`. Delivered and cancelled orders are final.
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status: &str,
    ) -> Result<OrderStatus, OrderError> {
        let next: OrderStatus = status
            .parse()
            .map_err(|e: bazaar_shared::UnknownStatus| OrderError::InvalidStatus(e.to_string()))?;

        let current = self.get_order(order_id).await?.status;
        if !current.can_transition_to(next) {
            return Err(OrderError::InvalidTransition {
                from: current,
                to: next,
            });
        }

        if !self.orders.update_order_status(order_id, next).await? {
            return Err(OrderError::NotFound(order_id));
        }

        info!(order_id, from = %current, to = %next, "Order status updated");
        Ok(next)
    }
}
