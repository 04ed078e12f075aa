//! Resolved cloud resources and the target/other partition

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Kind of a named cloud entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    FloatingIp,
    Network,
    Server,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::FloatingIp => write!(f, "floating ip"),
            ResourceKind::Network => write!(f, "network"),
            ResourceKind::Server => write!(f, "server"),
        }
    }
}

/// Reference to a resolved cloud entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    /// Provider-specific identifier
    pub id: u64,

    /// Name the entity was looked up by
    pub name: String,

    pub kind: ResourceKind,
}

impl ResourceRef {
    pub fn new(kind: ResourceKind, id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
        }
    }

    pub fn floating_ip(id: u64, name: impl Into<String>) -> Self {
        Self::new(ResourceKind::FloatingIp, id, name)
    }

    pub fn network(id: u64, name: impl Into<String>) -> Self {
        Self::new(ResourceKind::Network, id, name)
    }

    pub fn server(id: u64, name: impl Into<String>) -> Self {
        Self::new(ResourceKind::Server, id, name)
    }
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}' (id {})", self.kind, self.name, self.id)
    }
}

/// Names of the resources taking part in a failover
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNames {
    pub floating_ip: String,
    pub network: String,
    pub primary_server: String,
    pub secondary_server: String,
}

/// Everything a failover run needs besides the provider client
#[derive(Debug, Clone)]
pub struct FailoverRequest {
    pub names: ResourceNames,

    /// Alias address for the target; `None` clears its alias addresses
    pub alias_ip: Option<IpAddr>,

    /// Health signal: whether the primary server is currently available
    pub primary_available: bool,
}

/// Resolved snapshot of the resources of one failover run
///
/// `target` and `other` always partition `{primary_server, secondary_server}`.
/// The set is never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSet {
    floating_ip: ResourceRef,
    network: ResourceRef,
    primary_server: ResourceRef,
    secondary_server: ResourceRef,
    primary_available: bool,
}

impl ResourceSet {
    /// Build the set and partition primary/secondary by the health signal
    pub fn partition(
        floating_ip: ResourceRef,
        network: ResourceRef,
        primary_server: ResourceRef,
        secondary_server: ResourceRef,
        primary_available: bool,
    ) -> Self {
        Self {
            floating_ip,
            network,
            primary_server,
            secondary_server,
            primary_available,
        }
    }

    pub fn floating_ip(&self) -> &ResourceRef {
        &self.floating_ip
    }

    pub fn network(&self) -> &ResourceRef {
        &self.network
    }

    pub fn primary_server(&self) -> &ResourceRef {
        &self.primary_server
    }

    pub fn secondary_server(&self) -> &ResourceRef {
        &self.secondary_server
    }

    /// Server that receives the floating IP and the alias address
    pub fn target(&self) -> &ResourceRef {
        if self.primary_available {
            &self.primary_server
        } else {
            &self.secondary_server
        }
    }

    /// Peer of the target, losing both addresses
    pub fn other(&self) -> &ResourceRef {
        if self.primary_available {
            &self.secondary_server
        } else {
            &self.primary_server
        }
    }
}
