pub mod admin;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod metrics;
