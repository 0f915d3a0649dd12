//! Order store trait and in-memory implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use common::OrderId;
use domain::{Order, OrderDraft, OrderPatch, OrderRef};
use tokio::sync::RwLock;

use crate::{Result, StoreError};

/// Persistent home of placed orders.
///
/// Orders are created once and never deleted. After creation only the
/// fields carried by an [`OrderPatch`] change.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Creates an order from a draft and returns its assigned identifiers.
    async fn create(&self, draft: OrderDraft) -> Result<OrderRef>;

    /// Returns every order, oldest first.
    async fn list(&self) -> Result<Vec<Order>>;

    /// Loads a single order.
    async fn get(&self, order_id: OrderId) -> Result<Option<Order>>;

    /// Applies a patch and returns the updated record.
    ///
    /// Returns [`StoreError::OrderNotFound`] if the order does not exist.
    async fn update(&self, order_id: OrderId, patch: OrderPatch) -> Result<Order>;
}

#[derive(Debug, Default)]
struct OrderTable {
    orders: Vec<Order>,
    next_number: u64,
}

/// In-memory order store.
///
/// Order numbers are sequential (`ORD-000001`, `ORD-000002`, ...). Create
/// and update can be made to fail for testing persistence failures.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    table: Arc<RwLock<OrderTable>>,
    fail_on_create: Arc<AtomicBool>,
    fail_on_update: Arc<AtomicBool>,
}

impl InMemoryOrderStore {
    /// Creates a new empty order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `create` call fail until reset.
    pub fn set_fail_on_create(&self, fail: bool) {
        self.fail_on_create.store(fail, Ordering::SeqCst);
    }

    /// Makes every following `update` call fail until reset.
    pub fn set_fail_on_update(&self, fail: bool) {
        self.fail_on_update.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.table.read().await.orders.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    #[tracing::instrument(skip(self, draft), fields(customer = %draft.customer.email))]
    async fn create(&self, draft: OrderDraft) -> Result<OrderRef> {
        if self.fail_on_create.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "order store rejected create".to_string(),
            ));
        }

        let mut table = self.table.write().await;
        table.next_number += 1;
        let order_ref = OrderRef {
            order_id: OrderId::new(),
            order_number: format!("ORD-{:06}", table.next_number),
        };
        table
            .orders
            .push(Order::from_draft(order_ref.clone(), draft, Utc::now()));

        tracing::debug!(order_number = %order_ref.order_number, "Order stored");
        Ok(order_ref)
    }

    async fn list(&self) -> Result<Vec<Order>> {
        Ok(self.table.read().await.orders.clone())
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<Order>> {
        let table = self.table.read().await;
        Ok(table.orders.iter().find(|o| o.id() == order_id).cloned())
    }

    #[tracing::instrument(skip(self, patch))]
    async fn update(&self, order_id: OrderId, patch: OrderPatch) -> Result<Order> {
        if self.fail_on_update.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "order store rejected update".to_string(),
            ));
        }

        let mut table = self.table.write().await;
        let slot = table
            .orders
            .iter_mut()
            .find(|o| o.id() == order_id)
            .ok_or(StoreError::OrderNotFound(order_id))?;
        *slot = slot.apply_patch(&patch);
        Ok(slot.clone())
    }
}
