use async_trait::async_trait;
use bazaar_shared::{Order, OrderId, OrderItemId, OrderStatus, ProductId, UserId};
use rust_decimal::Decimal;

/// A unit of work against the orders store, scoped to a single order.
///
/// `rollback` may be called unconditionally: it is a no-op once the
/// transaction has been committed, rolled back, or consumed by a failed
/// commit.
#[async_trait]
pub trait OrderTransaction: Send {
    async fn insert_order_header(
        &mut self,
        user_id: UserId,
        status: OrderStatus,
        total_amount: Decimal,
    ) -> Result<OrderId, StoreError>;

    async fn insert_order_item(
        &mut self,
        order_id: OrderId,
        product_id: ProductId,
        quantity: i32,
        price: Decimal,
    ) -> Result<OrderItemId, StoreError>;

    async fn commit(&mut self) -> Result<(), StoreError>;

    async fn rollback(&mut self) -> Result<(), StoreError>;
}

/// Repository trait for order data access
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn OrderTransaction>, StoreError>;

    /// Header plus items
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Headers only, newest first
    async fn list_orders_by_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError>;

    /// Returns false when no order has this id
    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<bool, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Timed out waiting for the orders database")]
    Timeout,

    #[error("Transaction already closed")]
    TransactionClosed,

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}
