//! Cloud resource client trait definition

use crate::action::PendingAction;
use crate::error::Result;
use crate::resource::ResourceRef;
use async_trait::async_trait;
use std::net::IpAddr;

/// Cloud resource client abstraction
///
/// Lookups are read-only. Mutating calls return a [`PendingAction`] that has to
/// be awaited (see [`crate::waiter::ActionWaiter`]) before the change is in effect.
#[async_trait]
pub trait CloudResourceClient: Send + Sync {
    /// Returns the provider name (e.g., "hetzner-cloud")
    fn name(&self) -> &str;

    async fn lookup_floating_ip(&self, name: &str) -> Result<ResourceRef>;

    async fn lookup_network(&self, name: &str) -> Result<ResourceRef>;

    async fn lookup_server(&self, name: &str) -> Result<ResourceRef>;

    /// Assign a floating IP to a server
    async fn assign_floating_ip(
        &self,
        floating_ip: &ResourceRef,
        server: &ResourceRef,
    ) -> Result<PendingAction>;

    /// Replace a server's alias addresses within a network
    ///
    /// An empty `addresses` slice removes every alias address.
    async fn set_alias_addresses(
        &self,
        network: &ResourceRef,
        server: &ResourceRef,
        addresses: &[IpAddr],
    ) -> Result<PendingAction>;

    /// Fetch the current state of an action
    async fn get_action(&self, id: u64) -> Result<PendingAction>;
}
