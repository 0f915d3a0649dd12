//! Read model trait for the admin's query-side views.

/// A read model giving query access to the order collection.
pub trait ReadModel: Send + Sync {
    /// Returns the name of this read model.
    fn name(&self) -> &'static str;

    /// Returns the number of orders this read model currently exposes.
    fn count(&self) -> usize;
}
