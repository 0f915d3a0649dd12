//! Placed order record and its status state machine.

use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId};
use serde::{Deserialize, Serialize};

use crate::cart::{CartItem, CartTotals};
use crate::payment::{PaymentMethod, PaymentStatus};
use crate::value_objects::{Address, Money, ProductId};

use super::{OrderAction, OrderError, OrderStatus, TrackingNumber};

/// Who placed the order. Name and email are what admins search by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
}

/// Price-frozen copy of a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl OrderLine {
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            product_name: item.product_name.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
        }
    }
}

/// Everything checkout hands to the order store to create an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub customer: CustomerInfo,
    pub items: Vec<OrderLine>,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub payment_method: PaymentMethod,
    pub totals: CartTotals,
}

/// Identifiers the order store assigns on creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRef {
    pub order_id: OrderId,
    pub order_number: String,
}

/// The fields a status action may change. `None` means unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub tracking_number: Option<TrackingNumber>,
}

impl OrderPatch {
    /// A patch that only records a payment outcome.
    pub fn payment(payment_status: PaymentStatus) -> Self {
        Self {
            payment_status: Some(payment_status),
            ..Self::default()
        }
    }

    /// Returns true if applying this patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.payment_status.is_none() && self.tracking_number.is_none()
    }
}

/// A placed order.
///
/// The priced snapshot (lines, addresses, totals) is fixed at creation.
/// Only status, payment status and tracking number change afterwards, and
/// only through [`OrderPatch`]es.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    order_number: String,
    customer: CustomerInfo,
    items: Vec<OrderLine>,
    shipping_address: Address,
    billing_address: Address,
    payment_method: PaymentMethod,
    subtotal: Money,
    shipping: Money,
    tax: Money,
    total: Money,
    status: OrderStatus,
    payment_status: PaymentStatus,
    tracking_number: Option<TrackingNumber>,
    created_at: DateTime<Utc>,
}

impl Order {
    /// Builds the stored record for a freshly created order.
    ///
    /// New orders start `pending` with payment `pending`.
    pub fn from_draft(order_ref: OrderRef, draft: OrderDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id: order_ref.order_id,
            order_number: order_ref.order_number,
            customer: draft.customer,
            items: draft.items,
            shipping_address: draft.shipping_address,
            billing_address: draft.billing_address,
            payment_method: draft.payment_method,
            subtotal: draft.totals.subtotal,
            shipping: draft.totals.shipping,
            tax: draft.totals.tax,
            total: draft.totals.total,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            tracking_number: None,
            created_at,
        }
    }
}

// Query methods
impl Order {
    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn order_number(&self) -> &str {
        &self.order_number
    }

    pub fn customer(&self) -> &CustomerInfo {
        &self.customer
    }

    pub fn items(&self) -> &[OrderLine] {
        &self.items
    }

    pub fn shipping_address(&self) -> &Address {
        &self.shipping_address
    }

    pub fn billing_address(&self) -> &Address {
        &self.billing_address
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn shipping(&self) -> Money {
        self.shipping
    }

    pub fn tax(&self) -> Money {
        self.tax
    }

    pub fn total(&self) -> Money {
        self.total
    }

    /// Returns the totals breakdown frozen at creation.
    pub fn totals(&self) -> CartTotals {
        CartTotals {
            subtotal: self.subtotal,
            shipping: self.shipping,
            tax: self.tax,
            total: self.total,
        }
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    pub fn tracking_number(&self) -> Option<&TrackingNumber> {
        self.tracking_number.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Actions the transition table allows from the current status.
    pub fn available_actions(&self) -> Vec<OrderAction> {
        OrderAction::available_from(self.status)
    }
}

// State machine
impl Order {
    /// Decides what `action` changes on this order.
    ///
    /// Illegal actions are rejected and leave the order untouched. The
    /// returned patch may be empty (refunding an already refunded order).
    pub fn decide(&self, action: OrderAction) -> Result<OrderPatch, OrderError> {
        let Some(next) = action.target_status(self.status) else {
            return Err(OrderError::InvalidTransition {
                action,
                current_status: self.status,
            });
        };

        let patch = match action {
            OrderAction::Process | OrderAction::Deliver => OrderPatch {
                status: Some(next),
                ..OrderPatch::default()
            },
            OrderAction::Ship => OrderPatch {
                status: Some(next),
                tracking_number: Some(TrackingNumber::generate()),
                ..OrderPatch::default()
            },
            OrderAction::Cancel => OrderPatch {
                status: Some(next),
                payment_status: Some(PaymentStatus::Refunded),
                ..OrderPatch::default()
            },
            OrderAction::Refund if self.payment_status == PaymentStatus::Refunded => {
                OrderPatch::default()
            }
            OrderAction::Refund => OrderPatch::payment(PaymentStatus::Refunded),
        };

        Ok(patch)
    }

    /// Returns a new record with the patch applied; `self` is untouched.
    pub fn apply_patch(&self, patch: &OrderPatch) -> Order {
        let mut next = self.clone();
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(payment_status) = patch.payment_status {
            next.payment_status = payment_status;
        }
        if let Some(tracking_number) = &patch.tracking_number {
            next.tracking_number = Some(tracking_number.clone());
        }
        next
    }

    /// Decides and applies in one step, for purely local use.
    pub fn transition(&self, action: OrderAction) -> Result<Order, OrderError> {
        let patch = self.decide(action)?;
        Ok(self.apply_patch(&patch))
    }
}
