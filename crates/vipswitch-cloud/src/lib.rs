//! vipswitch cloud failover core
//!
//! This crate moves a virtual-IP pair (a floating IP and an alias IP inside a
//! private network) between two redundant gateway servers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  vipswitch CLI                   │
//! │        (dpinger alert_cmd: DEST_ADDR ALARM)      │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                vipswitch-cloud                   │
//! │  ┌──────────────────┐  ┌──────────────────────┐ │
//! │  │ ResourceResolver │─▶│ FailoverOrchestrator │ │
//! │  │  (4 lookups)     │  │  floating-ip branch  │ │
//! │  └──────────────────┘  │  alias-ip branch     │ │
//! │                        └──────────┬───────────┘ │
//! │  ┌──────────────┐  ┌──────────────▼───────────┐ │
//! │  │  TaskGroup   │  │      ActionWaiter        │ │
//! │  └──────────────┘  └──────────────────────────┘ │
//! │  trait CloudResourceClient { ... }               │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼───────┐
//!           │ hetzner-cloud │
//!           │   provider    │
//!           └───────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! let client: Arc<dyn CloudResourceClient> = Arc::new(HetznerClient::new(config)?);
//! let token = CancellationToken::new();
//!
//! let resources = ResourceResolver::new(client.clone())
//!     .resolve(&token, &names, primary_available)
//!     .await?;
//!
//! let waiter = ActionWaiter::new(client.clone(), WaitConfig::default());
//! FailoverOrchestrator::new(client, waiter)
//!     .run(&token, &resources, Some("10.0.0.3".parse()?))
//!     .await?;
//! ```

pub mod action;
pub mod error;
pub mod orchestrator;
pub mod plan;
pub mod provider;
pub mod resolver;
pub mod resource;
pub mod task_group;
pub mod waiter;

// Re-exports
pub use action::{ActionStatus, PendingAction};
pub use error::{CloudError, Result};
pub use orchestrator::{BranchFailure, FailoverError, FailoverOrchestrator, StepError};
pub use plan::{Branch, FailoverPlan, PlannedStep, Step};
pub use provider::CloudResourceClient;
pub use resolver::ResourceResolver;
pub use resource::{FailoverRequest, ResourceKind, ResourceNames, ResourceRef, ResourceSet};
pub use task_group::{TaskError, TaskGroup};
pub use waiter::{ActionWaiter, WaitConfig};

pub use tokio_util::sync::CancellationToken;
