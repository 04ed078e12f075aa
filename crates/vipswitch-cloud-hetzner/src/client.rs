//! Hetzner Cloud REST client
//!
//! Implements [`CloudResourceClient`] against `https://api.hetzner.cloud/v1`
//! with Bearer token authentication.

use crate::api::{
    ActionEnvelope, ApiResource, AssignFloatingIpRequest, ChangeAliasIpsRequest, ErrorEnvelope,
    FloatingIpList, NetworkList, ServerList, find_named,
};
use crate::error::{HetznerError, Result};
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::net::IpAddr;
use std::time::Duration;
use vipswitch_cloud::{CloudError, CloudResourceClient, PendingAction, ResourceKind, ResourceRef};

pub const HETZNER_API_BASE: &str = "https://api.hetzner.cloud/v1";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for [`HetznerClient`]
#[derive(Clone)]
pub struct HetznerConfig {
    pub token: String,
    pub endpoint: String,
}

impl HetznerConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            endpoint: HETZNER_API_BASE.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl std::fmt::Debug for HetznerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HetznerConfig")
            .field("token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Hetzner Cloud client
pub struct HetznerClient {
    client: reqwest::Client,
    token: String,
    endpoint: String,
}

impl HetznerClient {
    pub fn new(config: HetznerConfig) -> Result<Self> {
        let token = config.token.trim().to_string();
        if token.is_empty() {
            return Err(HetznerError::MissingToken);
        }

        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(HetznerError::InvalidEndpoint(config.endpoint));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("vipswitch/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            token,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.bearer_auth(&self.token).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(error_from_response(status, &body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn list(&self, kind: ResourceKind, name: &str) -> Result<Vec<ApiResource>> {
        let path = match kind {
            ResourceKind::FloatingIp => "/floating_ips",
            ResourceKind::Network => "/networks",
            ResourceKind::Server => "/servers",
        };
        let request = self.client.get(self.url(path)).query(&[("name", name)]);

        Ok(match kind {
            ResourceKind::FloatingIp => self.send::<FloatingIpList>(request).await?.floating_ips,
            ResourceKind::Network => self.send::<NetworkList>(request).await?.networks,
            ResourceKind::Server => self.send::<ServerList>(request).await?.servers,
        })
    }

    async fn lookup(&self, kind: ResourceKind, name: &str) -> vipswitch_cloud::Result<ResourceRef> {
        let resources = self.list(kind, name).await?;

        match find_named(resources, name) {
            Some(found) => Ok(ResourceRef::new(kind, found.id, found.name)),
            None => {
                tracing::debug!(%kind, name, "no exact name match in API response");
                Err(CloudError::NotFound {
                    kind,
                    name: name.to_string(),
                })
            }
        }
    }

    async fn post_action<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<PendingAction> {
        let request = self.client.post(self.url(path)).json(body);
        let envelope: ActionEnvelope = self.send(request).await?;
        Ok(envelope.action.into())
    }
}

/// Translate a non-2xx response into an error
pub(crate) fn error_from_response(status: StatusCode, body: &str) -> HetznerError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();

    if status == StatusCode::UNAUTHORIZED {
        let message = parsed
            .map(|e| e.error.message)
            .unwrap_or_else(|| "invalid API token".to_string());
        return HetznerError::Unauthorized(message);
    }

    match parsed {
        Some(envelope) => HetznerError::Api {
            status: status.as_u16(),
            code: envelope.error.code,
            message: envelope.error.message,
        },
        None => HetznerError::UnexpectedResponse(format!("HTTP {}: {}", status, body.trim())),
    }
}

#[async_trait]
impl CloudResourceClient for HetznerClient {
    fn name(&self) -> &str {
        "hetzner"
    }

    async fn lookup_floating_ip(&self, name: &str) -> vipswitch_cloud::Result<ResourceRef> {
        self.lookup(ResourceKind::FloatingIp, name).await
    }

    async fn lookup_network(&self, name: &str) -> vipswitch_cloud::Result<ResourceRef> {
        self.lookup(ResourceKind::Network, name).await
    }

    async fn lookup_server(&self, name: &str) -> vipswitch_cloud::Result<ResourceRef> {
        self.lookup(ResourceKind::Server, name).await
    }

    async fn assign_floating_ip(
        &self,
        floating_ip: &ResourceRef,
        server: &ResourceRef,
    ) -> vipswitch_cloud::Result<PendingAction> {
        let path = format!("/floating_ips/{}/actions/assign", floating_ip.id);
        let action = self
            .post_action(&path, &AssignFloatingIpRequest { server: server.id })
            .await?;

        tracing::info!(
            floating_ip = %floating_ip.name,
            server = %server.name,
            action_id = action.id,
            "floating ip assignment requested"
        );
        Ok(action)
    }

    async fn set_alias_addresses(
        &self,
        network: &ResourceRef,
        server: &ResourceRef,
        addresses: &[IpAddr],
    ) -> vipswitch_cloud::Result<PendingAction> {
        let path = format!("/servers/{}/actions/change_alias_ips", server.id);
        let body = ChangeAliasIpsRequest {
            network: network.id,
            alias_ips: addresses,
        };
        let action = self.post_action(&path, &body).await?;

        tracing::info!(
            network = %network.name,
            server = %server.name,
            addresses = ?addresses,
            action_id = action.id,
            "alias ip change requested"
        );
        Ok(action)
    }

    async fn get_action(&self, id: u64) -> vipswitch_cloud::Result<PendingAction> {
        let request = self.client.get(self.url(&format!("/actions/{}", id)));
        let envelope: ActionEnvelope = self.send(request).await?;
        let action: PendingAction = envelope.action.into();

        if action.status.is_terminal() {
            tracing::debug!(
                action_id = action.id,
                command = %action.command,
                status = %action.status,
                "action reached terminal state"
            );
        }
        Ok(action)
    }
}
