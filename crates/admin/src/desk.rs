//! The admin's order desk: owns the order collection and applies status
//! actions through the order state machine.

use std::sync::Arc;

use common::OrderId;
use domain::{Order, OrderAction};
use services::{NotificationSink, OrderStore, Severity, StoreError};

use crate::error::Result;
use crate::read_model::ReadModel;

/// Owner of the admin's view of every placed order.
///
/// The collection is published as an immutable snapshot. Each successful
/// action builds a new snapshot with the one updated record swapped in, so
/// readers never observe a partial update. A failed store update keeps the
/// previous snapshot.
pub struct OrderDesk<S, N>
where
    S: OrderStore,
    N: NotificationSink,
{
    store: S,
    notifier: N,
    orders: Arc<[Order]>,
}

impl<S, N> OrderDesk<S, N>
where
    S: OrderStore,
    N: NotificationSink,
{
    /// Creates a desk and loads the current orders.
    pub async fn load(store: S, notifier: N) -> Result<Self> {
        let mut desk = Self {
            store,
            notifier,
            orders: Arc::from(Vec::new()),
        };
        desk.refresh().await?;
        Ok(desk)
    }

    /// Reloads the collection from the store.
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<()> {
        let orders = self.store.list().await?;
        tracing::debug!(count = orders.len(), "Orders loaded");
        self.orders = orders.into();
        Ok(())
    }

    /// Returns the current snapshot.
    pub fn orders(&self) -> Arc<[Order]> {
        Arc::clone(&self.orders)
    }

    pub fn get(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| order.id() == order_id)
    }

    /// Applies an admin action to one order.
    ///
    /// Returns the order as it stands afterwards, or `None` if the desk or
    /// the store does not know the order (logged, not an error). Illegal
    /// actions return [`AdminError::InvalidTransition`](crate::AdminError)
    /// and leave the order untouched. An action that changes nothing is not
    /// sent to the store.
    #[tracing::instrument(skip(self), fields(action = %action))]
    pub async fn apply(&mut self, order_id: OrderId, action: OrderAction) -> Result<Option<Order>> {
        let Some(current) = self.get(order_id) else {
            tracing::warn!(%order_id, "Action on unknown order ignored");
            record(action, "not_found");
            return Ok(None);
        };

        let patch = match current.decide(action) {
            Ok(patch) => patch,
            Err(e) => {
                tracing::info!(%order_id, error = %e, "Action rejected");
                record(action, "rejected");
                return Err(e.into());
            }
        };

        if patch.is_empty() {
            record(action, "noop");
            return Ok(Some(current.clone()));
        }

        let order_number = current.order_number().to_string();
        match self.store.update(order_id, patch).await {
            Ok(updated) => {
                self.replace(&updated);
                record(action, "applied");
                tracing::info!(
                    %order_number,
                    status = %updated.status(),
                    payment_status = %updated.payment_status(),
                    "Order updated"
                );
                self.notifier
                    .notify(
                        "Order updated",
                        &format!("{order_number} is now {}", updated.status()),
                        Severity::Success,
                    )
                    .await;
                Ok(Some(updated))
            }
            Err(StoreError::OrderNotFound(_)) => {
                tracing::warn!(%order_id, "Order vanished from store; action ignored");
                record(action, "not_found");
                Ok(None)
            }
            Err(e) => {
                record(action, "failed");
                tracing::error!(%order_number, error = %e, "Order update failed");
                self.notifier
                    .notify(
                        "Update failed",
                        &format!("Could not {action} {order_number}: {e}"),
                        Severity::Error,
                    )
                    .await;
                Err(e.into())
            }
        }
    }

    fn replace(&mut self, updated: &Order) {
        self.orders = self
            .orders
            .iter()
            .map(|order| {
                if order.id() == updated.id() {
                    updated.clone()
                } else {
                    order.clone()
                }
            })
            .collect();
    }
}

impl<S, N> ReadModel for OrderDesk<S, N>
where
    S: OrderStore,
    N: NotificationSink,
{
    fn name(&self) -> &'static str {
        "OrderDesk"
    }

    fn count(&self) -> usize {
        self.orders.len()
    }
}

fn record(action: OrderAction, outcome: &'static str) {
    metrics::counter!(
        "order_actions_total",
        "action" => action.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdminError;
    use common::CustomerId;
    use domain::{
        Address, CartTotals, CustomerInfo, OrderDraft, OrderError, OrderStatus, PaymentMethod,
        PaymentStatus,
    };
    use services::{InMemoryOrderStore, RecordingNotificationSink};

    type Desk = OrderDesk<InMemoryOrderStore, RecordingNotificationSink>;

    fn draft(email: &str) -> OrderDraft {
        OrderDraft {
            customer: CustomerInfo {
                id: CustomerId::new(),
                name: "Test Buyer".to_string(),
                email: email.to_string(),
            },
            items: Vec::new(),
            shipping_address: Address::default(),
            billing_address: Address::default(),
            payment_method: PaymentMethod::Card,
            totals: CartTotals::zero(),
        }
    }

    async fn desk_with_orders(n: usize) -> (Desk, InMemoryOrderStore, RecordingNotificationSink) {
        let store = InMemoryOrderStore::new();
        for i in 0..n {
            store.create(draft(&format!("buyer{i}@example.com"))).await.unwrap();
        }
        let notifier = RecordingNotificationSink::new();
        let desk = OrderDesk::load(store.clone(), notifier.clone()).await.unwrap();
        (desk, store, notifier)
    }

    #[tokio::test]
    async fn test_load_reads_store() {
        let (desk, _, _) = desk_with_orders(3).await;
        assert_eq!(desk.count(), 3);
        assert_eq!(desk.orders()[0].order_number(), "ORD-000001");
    }

    #[tokio::test]
    async fn test_apply_updates_snapshot_and_store() {
        let (mut desk, store, notifier) = desk_with_orders(2).await;
        let order_id = desk.orders()[1].id();
        let before = desk.orders();

        let updated = desk.apply(order_id, OrderAction::Process).await.unwrap().unwrap();
        assert_eq!(updated.status(), OrderStatus::Processing);
        assert_eq!(desk.get(order_id).unwrap(), &updated);
        assert_eq!(store.get(order_id).await.unwrap().unwrap(), updated);

        // the old snapshot is untouched
        assert_eq!(before[1].status(), OrderStatus::Pending);
        assert!(!Arc::ptr_eq(&before, &desk.orders()));
        assert_eq!(notifier.notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_illegal_action_is_rejected() {
        let (mut desk, _, _) = desk_with_orders(1).await;
        let order_id = desk.orders()[0].id();
        let before = desk.orders();

        let err = desk.apply(order_id, OrderAction::Ship).await.unwrap_err();
        assert_eq!(
            err,
            AdminError::InvalidTransition(OrderError::InvalidTransition {
                action: OrderAction::Ship,
                current_status: OrderStatus::Pending,
            })
        );
        assert!(Arc::ptr_eq(&before, &desk.orders()));
    }

    #[tokio::test]
    async fn test_unknown_order_is_noop() {
        let (mut desk, _, notifier) = desk_with_orders(1).await;
        let before = desk.orders();

        let result = desk.apply(OrderId::new(), OrderAction::Cancel).await.unwrap();
        assert!(result.is_none());
        assert!(Arc::ptr_eq(&before, &desk.orders()));
        assert!(notifier.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_failed_update_reverts() {
        let (mut desk, store, notifier) = desk_with_orders(1).await;
        let order_id = desk.orders()[0].id();
        let before = desk.orders();

        store.set_fail_on_update(true);
        let err = desk.apply(order_id, OrderAction::Cancel).await.unwrap_err();
        assert!(matches!(err, AdminError::Persistence(StoreError::Unavailable(_))));

        assert!(Arc::ptr_eq(&before, &desk.orders()));
        assert_eq!(desk.get(order_id).unwrap().status(), OrderStatus::Pending);
        assert_eq!(notifier.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_refund_twice_is_not_persisted() {
        let (mut desk, store, _) = desk_with_orders(1).await;
        let order_id = desk.orders()[0].id();

        desk.apply(order_id, OrderAction::Refund).await.unwrap();
        let snapshot = desk.orders();

        // a failing store proves the second refund never reaches it
        store.set_fail_on_update(true);
        let again = desk.apply(order_id, OrderAction::Refund).await.unwrap().unwrap();
        assert_eq!(again.payment_status(), PaymentStatus::Refunded);
        assert!(Arc::ptr_eq(&snapshot, &desk.orders()));
    }

    #[tokio::test]
    async fn test_refresh_picks_up_new_orders() {
        let (mut desk, store, _) = desk_with_orders(1).await;
        store.create(draft("late@example.com")).await.unwrap();
        assert_eq!(desk.count(), 1);

        desk.refresh().await.unwrap();
        assert_eq!(desk.count(), 2);
    }
}
