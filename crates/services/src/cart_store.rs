//! Cart store trait and in-memory implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::CartItemId;
use domain::CartItem;
use tokio::sync::RwLock;

use crate::{Result, StoreError};

/// Persistent home of the buyer's active cart lines.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Returns the stored lines in insertion order.
    async fn get(&self) -> Result<Vec<CartItem>>;

    /// Inserts the line, or replaces the stored line with the same id.
    async fn put(&self, item: CartItem) -> Result<()>;

    /// Removes a line.
    async fn remove(&self, item_id: CartItemId) -> Result<()>;

    /// Removes every line.
    async fn clear(&self) -> Result<()>;
}

/// In-memory cart store with failure injection for tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartStore {
    items: Arc<RwLock<Vec<CartItem>>>,
    fail_on_write: Arc<AtomicBool>,
    fail_on_clear: Arc<AtomicBool>,
}

impl InMemoryCartStore {
    /// Creates a new empty cart store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with lines.
    pub fn with_items(items: Vec<CartItem>) -> Self {
        Self {
            items: Arc::new(RwLock::new(items)),
            ..Self::default()
        }
    }

    /// Makes `put` and `remove` fail until reset.
    pub fn set_fail_on_write(&self, fail: bool) {
        self.fail_on_write.store(fail, Ordering::SeqCst);
    }

    /// Makes `clear` fail until reset.
    pub fn set_fail_on_clear(&self, fail: bool) {
        self.fail_on_clear.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of stored lines.
    pub async fn item_count(&self) -> usize {
        self.items.read().await.len()
    }

    fn check(&self, flag: &AtomicBool, operation: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!(
                "cart store rejected {operation}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn get(&self) -> Result<Vec<CartItem>> {
        Ok(self.items.read().await.clone())
    }

    async fn put(&self, item: CartItem) -> Result<()> {
        self.check(&self.fail_on_write, "put")?;

        let mut items = self.items.write().await;
        match items.iter_mut().find(|line| line.id == item.id) {
            Some(line) => *line = item,
            None => items.push(item),
        }
        Ok(())
    }

    async fn remove(&self, item_id: CartItemId) -> Result<()> {
        self.check(&self.fail_on_write, "remove")?;

        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|line| line.id != item_id);
        if items.len() == before {
            return Err(StoreError::CartItemNotFound(item_id));
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.check(&self.fail_on_clear, "clear")?;
        self.items.write().await.clear();
        Ok(())
    }
}
