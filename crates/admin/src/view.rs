//! Memoised filtered view over the desk's order snapshot.

use std::sync::Arc;

use domain::Order;

use crate::filter::{OrderFilter, filter_orders};
use crate::read_model::ReadModel;

#[derive(Debug, Clone)]
struct Cached {
    source: Arc<[Order]>,
    filter: OrderFilter,
    result: Arc<[Order]>,
}

/// Filter results for the admin order table.
///
/// Remembers the last (snapshot, filter) pair and only runs the filter
/// again when the desk published a new snapshot or the filter changed.
/// Snapshots are compared by identity: the desk never mutates a published
/// snapshot in place.
#[derive(Debug, Clone, Default)]
pub struct FilteredOrdersView {
    cached: Option<Cached>,
    recomputations: u64,
}

impl FilteredOrdersView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the orders in `snapshot` that pass `filter`.
    pub fn get(&mut self, snapshot: &Arc<[Order]>, filter: &OrderFilter) -> Arc<[Order]> {
        if let Some(cached) = &self.cached
            && Arc::ptr_eq(&cached.source, snapshot)
            && cached.filter == *filter
        {
            return Arc::clone(&cached.result);
        }

        let result: Arc<[Order]> = if filter.is_unfiltered() {
            Arc::clone(snapshot)
        } else {
            filter_orders(snapshot, filter).into()
        };
        self.recomputations += 1;
        self.cached = Some(Cached {
            source: Arc::clone(snapshot),
            filter: filter.clone(),
            result: Arc::clone(&result),
        });
        result
    }

    /// How many times the filter actually ran.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}

impl ReadModel for FilteredOrdersView {
    fn name(&self) -> &'static str {
        "FilteredOrdersView"
    }

    fn count(&self) -> usize {
        self.cached.as_ref().map_or(0, |cached| cached.result.len())
    }
}
