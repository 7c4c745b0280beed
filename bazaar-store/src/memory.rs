//! In-memory orders store.
//!
//! Writes are buffered inside each transaction and only become visible on
//! commit, which gives the same all-or-nothing behaviour as the Postgres
//! store. Ids are drawn from shared counters at insert time, so a rolled
//! back transaction leaves a gap just like a `BIGSERIAL` would.
//!
//! Faults can be injected to drive the persistence failure paths in tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bazaar_core::repository::{OrderRepository, OrderTransaction, StoreError};
use bazaar_shared::{Order, OrderId, OrderItem, OrderItemId, OrderStatus, ProductId, UserId};
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;

#[derive(Default)]
struct StoreState {
    orders: BTreeMap<OrderId, Order>,
    next_order_id: OrderId,
    next_item_id: OrderItemId,
    commits: usize,
    rollbacks: usize,
}

#[derive(Debug, Default, Clone, Copy)]
struct Faults {
    fail_begin: bool,
    fail_header: bool,
    /// 1-based position of the item insert that fails
    fail_item_at: Option<usize>,
    fail_commit: bool,
}

#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<Mutex<StoreState>>,
    faults: Arc<Mutex<Faults>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_begin(&self) {
        self.faults.lock().fail_begin = true;
    }

    pub fn fail_header_insert(&self) {
        self.faults.lock().fail_header = true;
    }

    pub fn fail_item_insert_at(&self, position: usize) {
        self.faults.lock().fail_item_at = Some(position);
    }

    pub fn fail_commit(&self) {
        self.faults.lock().fail_commit = true;
    }

    pub fn order_count(&self) -> usize {
        self.state.lock().orders.len()
    }

    pub fn item_count(&self) -> usize {
        self.state.lock().orders.values().map(|o| o.items.len()).sum()
    }

    pub fn commits(&self) -> usize {
        self.state.lock().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.state.lock().rollbacks
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderStore {
    async fn begin(&self) -> Result<Box<dyn OrderTransaction>, StoreError> {
        let faults = *self.faults.lock();
        if faults.fail_begin {
            return Err(StoreError::Database("connection refused".to_string()));
        }

        Ok(Box::new(InMemoryTransaction {
            state: self.state.clone(),
            faults,
            pending: None,
            items_inserted: 0,
            open: true,
        }))
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.state.lock().orders.get(&id).cloned())
    }

    async fn list_orders_by_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let state = self.state.lock();
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .map(|o| Order {
                items: Vec::new(),
                ..o.clone()
            })
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock();
        match state.orders.get_mut(&id) {
            Some(order) => {
                order.status = status;
                order.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

struct InMemoryTransaction {
    state: Arc<Mutex<StoreState>>,
    faults: Faults,
    pending: Option<Order>,
    items_inserted: usize,
    open: bool,
}

impl InMemoryTransaction {
    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.open {
            Ok(())
        } else {
            Err(StoreError::TransactionClosed)
        }
    }
}

#[async_trait]
impl OrderTransaction for InMemoryTransaction {
    async fn insert_order_header(
        &mut self,
        user_id: UserId,
        status: OrderStatus,
        total_amount: Decimal,
    ) -> Result<OrderId, StoreError> {
        self.ensure_open()?;
        if self.faults.fail_header {
            return Err(StoreError::Database("insert into orders failed".to_string()));
        }

        let id = {
            let mut state = self.state.lock();
            state.next_order_id += 1;
            state.next_order_id
        };
        let now = Utc::now();
        self.pending = Some(Order {
            id,
            user_id,
            status,
            total_amount,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn insert_order_item(
        &mut self,
        order_id: OrderId,
        product_id: ProductId,
        quantity: i32,
        price: Decimal,
    ) -> Result<OrderItemId, StoreError> {
        self.ensure_open()?;
        self.items_inserted += 1;
        if self.faults.fail_item_at == Some(self.items_inserted) {
            return Err(StoreError::Database("insert into order_items failed".to_string()));
        }

        let order = self
            .pending
            .as_mut()
            .filter(|o| o.id == order_id)
            .ok_or_else(|| {
                StoreError::Database(format!("order {} does not exist", order_id))
            })?;

        let id = {
            let mut state = self.state.lock();
            state.next_item_id += 1;
            state.next_item_id
        };
        order.items.push(OrderItem {
            id,
            product_id,
            quantity,
            price,
        });
        Ok(id)
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.open = false;
        let pending = self.pending.take();

        let mut state = self.state.lock();
        if self.faults.fail_commit {
            return Err(StoreError::Database("commit failed".to_string()));
        }
        if let Some(order) = pending {
            state.orders.insert(order.id, order);
        }
        state.commits += 1;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.pending = None;
        self.state.lock().rollbacks += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn write_order(store: &InMemoryOrderStore, user_id: UserId) -> OrderId {
        let mut tx = store.begin().await.unwrap();
        let id = tx
            .insert_order_header(user_id, OrderStatus::Pending, Decimal::new(1998, 2))
            .await
            .unwrap();
        tx.insert_order_item(id, 42, 2, Decimal::new(999, 2)).await.unwrap();
        tx.commit().await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_commit_makes_order_visible() {
        let store = InMemoryOrderStore::new();
        let id = write_order(&store, 7).await;

        let order = store.get_order(id).await.unwrap().unwrap();
        assert_eq!(order.user_id, 7);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items_total(), order.total_amount);
        assert_eq!(store.commits(), 1);
    }

    #[tokio::test]
    async fn test_rollback_discards_buffered_rows() {
        let store = InMemoryOrderStore::new();
        let mut tx = store.begin().await.unwrap();
        let id = tx
            .insert_order_header(7, OrderStatus::Pending, Decimal::ONE)
            .await
            .unwrap();
        tx.insert_order_item(id, 1, 1, Decimal::ONE).await.unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(store.order_count(), 0);
        assert_eq!(store.item_count(), 0);
        assert_eq!(store.rollbacks(), 1);
    }

    #[tokio::test]
    async fn test_rollback_after_commit_is_noop() {
        let store = InMemoryOrderStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_order_header(7, OrderStatus::Pending, Decimal::ONE)
            .await
            .unwrap();
        tx.commit().await.unwrap();
        tx.rollback().await.unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(store.order_count(), 1);
        assert_eq!(store.rollbacks(), 0);
        assert_eq!(
            tx.insert_order_header(7, OrderStatus::Pending, Decimal::ONE).await,
            Err(StoreError::TransactionClosed)
        );
    }

    #[tokio::test]
    async fn test_failed_commit_persists_nothing() {
        let store = InMemoryOrderStore::new();
        store.fail_commit();
        let mut tx = store.begin().await.unwrap();
        tx.insert_order_header(7, OrderStatus::Pending, Decimal::ONE)
            .await
            .unwrap();

        assert!(tx.commit().await.is_err());
        tx.rollback().await.unwrap();
        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn test_list_is_newest_first_without_items() {
        let store = InMemoryOrderStore::new();
        let first = write_order(&store, 7).await;
        let second = write_order(&store, 7).await;
        write_order(&store, 8).await;

        let orders = store.list_orders_by_user(7).await.unwrap();
        let ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![second, first]);
        assert!(orders.iter().all(|o| o.items.is_empty()));
    }

    #[tokio::test]
    async fn test_update_status_reports_missing_order() {
        let store = InMemoryOrderStore::new();
        let id = write_order(&store, 7).await;

        assert!(store.update_order_status(id, OrderStatus::Shipped).await.unwrap());
        assert!(!store.update_order_status(id + 100, OrderStatus::Shipped).await.unwrap());
        assert_eq!(
            store.get_order(id).await.unwrap().unwrap().status,
            OrderStatus::Shipped
        );
    }
}
