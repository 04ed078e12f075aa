//! Concurrent name resolution of the failover resources

use crate::error::{CloudError, Result};
use crate::provider::CloudResourceClient;
use crate::resource::{ResourceKind, ResourceNames, ResourceRef, ResourceSet};
use crate::task_group::{TaskGroup, until_cancelled};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Looks up the floating IP, network and both servers in parallel
pub struct ResourceResolver {
    client: Arc<dyn CloudResourceClient>,
}

impl ResourceResolver {
    pub fn new(client: Arc<dyn CloudResourceClient>) -> Self {
        Self { client }
    }

    /// Resolve `names` and partition the servers by `primary_available`
    ///
    /// The first failing lookup cancels the others; its error is the one returned.
    pub async fn resolve(
        &self,
        token: &CancellationToken,
        names: &ResourceNames,
        primary_available: bool,
    ) -> Result<ResourceSet> {
        let mut group: TaskGroup<ResourceRef> = TaskGroup::new(token);

        let lookups = [
            (ResourceKind::FloatingIp, names.floating_ip.clone()),
            (ResourceKind::Network, names.network.clone()),
            (ResourceKind::Server, names.primary_server.clone()),
            (ResourceKind::Server, names.secondary_server.clone()),
        ];

        for (kind, name) in lookups {
            let client = Arc::clone(&self.client);
            group.spawn(move |token| async move { lookup(client, &token, kind, name).await });
        }

        let resolved = group.join_first_error().await?;
        let [floating_ip, network, primary_server, secondary_server]: [ResourceRef; 4] = resolved
            .try_into()
            .map_err(|v: Vec<ResourceRef>| {
                CloudError::TaskAborted(format!("expected 4 resolved resources, got {}", v.len()))
            })?;

        let resources = ResourceSet::partition(
            floating_ip,
            network,
            primary_server,
            secondary_server,
            primary_available,
        );

        tracing::info!(
            floating_ip = resources.floating_ip().id,
            network = resources.network().id,
            target_server = %resources.target().name,
            other_server = %resources.other().name,
            primary_available,
            "resources resolved"
        );

        Ok(resources)
    }
}

async fn lookup(
    client: Arc<dyn CloudResourceClient>,
    token: &CancellationToken,
    kind: ResourceKind,
    name: String,
) -> Result<ResourceRef> {
    if token.is_cancelled() {
        return Err(CloudError::Cancelled);
    }
    tracing::debug!(%kind, %name, "looking up resource");

    let result = until_cancelled(token, async {
        match kind {
            ResourceKind::FloatingIp => client.lookup_floating_ip(&name).await,
            ResourceKind::Network => client.lookup_network(&name).await,
            ResourceKind::Server => client.lookup_server(&name).await,
        }
    })
    .await;

    match result {
        Ok(resource) => {
            tracing::debug!(%kind, %name, id = resource.id, "resource found");
            Ok(resource)
        }
        Err(err) => {
            if !err.is_cancelled() {
                tracing::warn!(%kind, %name, error = %err, "lookup failed");
            }
            Err(err.for_lookup(kind, &name))
        }
    }
}
