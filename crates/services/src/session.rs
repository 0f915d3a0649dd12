//! Session provider: who is checking out.

use async_trait::async_trait;
use common::CustomerId;
use domain::Address;
use serde::{Deserialize, Serialize};

use crate::Result;

/// The signed-in buyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    /// Pre-fills the checkout shipping step when present.
    pub default_address: Option<Address>,
}

/// Source of the current user. Authentication itself happens elsewhere.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_user(&self) -> Result<CurrentUser>;
}

/// Session provider that always returns the same user.
#[derive(Debug, Clone)]
pub struct StaticSessionProvider {
    user: CurrentUser,
}

impl StaticSessionProvider {
    pub fn new(user: CurrentUser) -> Self {
        Self { user }
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn current_user(&self) -> Result<CurrentUser> {
        Ok(self.user.clone())
    }
}
