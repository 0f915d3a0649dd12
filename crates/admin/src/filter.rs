//! Search and status filtering over the admin's order collection.

use std::str::FromStr;

use domain::{Order, OrderStatus, ParseError, PaymentStatus};

/// Either every value, or exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Filter<T> {
    #[default]
    All,
    Only(T),
}

/// Filter on [`OrderStatus`].
pub type StatusFilter = Filter<OrderStatus>;

/// Filter on [`PaymentStatus`].
pub type PaymentFilter = Filter<PaymentStatus>;

impl<T: PartialEq> Filter<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(expected) => expected == value,
        }
    }
}

/// Parses `"all"` or the lowercase name of a value.
impl<T> FromStr for Filter<T>
where
    T: FromStr<Err = ParseError>,
{
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(Filter::All);
        }
        s.parse().map(Filter::Only)
    }
}

/// The admin's filter inputs. The default matches every order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct OrderFilter {
    /// Case-insensitive substring of the order number, customer name or
    /// customer email. Surrounding whitespace is ignored.
    pub search: String,
    pub status: StatusFilter,
    pub payment: PaymentFilter,
}

impl OrderFilter {
    pub fn new(search: impl Into<String>, status: StatusFilter, payment: PaymentFilter) -> Self {
        Self {
            search: search.into(),
            status,
            payment,
        }
    }

    /// Returns true if the filter lets every order through.
    pub fn is_unfiltered(&self) -> bool {
        self.search.trim().is_empty()
            && self.status == Filter::All
            && self.payment == Filter::All
    }

    pub fn matches(&self, order: &Order) -> bool {
        let needle = self.search.trim().to_lowercase();
        Self::matches_with(&needle, self, order)
    }

    fn matches_with(needle: &str, filter: &OrderFilter, order: &Order) -> bool {
        filter.status.matches(&order.status())
            && filter.payment.matches(&order.payment_status())
            && search_matches(needle, order)
    }
}

fn search_matches(needle: &str, order: &Order) -> bool {
    if needle.is_empty() {
        return true;
    }
    let customer = order.customer();
    [
        order.order_number(),
        customer.name.as_str(),
        customer.email.as_str(),
    ]
    .into_iter()
    .any(|field| field.to_lowercase().contains(needle))
}

/// Returns the orders that pass `filter`, in their original order.
pub fn filter_orders(orders: &[Order], filter: &OrderFilter) -> Vec<Order> {
    let needle = filter.search.trim().to_lowercase();
    orders
        .iter()
        .filter(|order| OrderFilter::matches_with(&needle, filter, order))
        .cloned()
        .collect()
}
