//! Hetzner Cloud API wire types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use vipswitch_cloud::{ActionStatus, PendingAction};

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

/// Named resource as returned by the list endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResource {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FloatingIpList {
    pub floating_ips: Vec<ApiResource>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NetworkList {
    pub networks: Vec<ApiResource>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServerList {
    pub servers: Vec<ApiResource>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActionEnvelope {
    pub action: ApiAction,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiAction {
    pub id: u64,
    pub command: String,
    pub status: String,
    #[serde(default)]
    pub progress: u8,
    pub started: Option<DateTime<Utc>>,
    pub finished: Option<DateTime<Utc>>,
    pub error: Option<ApiErrorBody>,
}

impl From<ApiAction> for PendingAction {
    fn from(action: ApiAction) -> Self {
        let status = match action.status.as_str() {
            "success" => ActionStatus::Success,
            "error" => {
                let error = action.error.unwrap_or_else(|| ApiErrorBody {
                    code: "unknown".to_string(),
                    message: "action failed without error details".to_string(),
                });
                ActionStatus::Error {
                    code: error.code,
                    message: error.message,
                }
            }
            _ => ActionStatus::Running,
        };

        PendingAction {
            id: action.id,
            command: action.command,
            status,
            progress: action.progress,
            started: action.started,
            finished: action.finished,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AssignFloatingIpRequest {
    pub server: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChangeAliasIpsRequest<'a> {
    pub network: u64,
    pub alias_ips: &'a [IpAddr],
}

/// Pick the entry whose name matches exactly
pub(crate) fn find_named(resources: Vec<ApiResource>, name: &str) -> Option<ApiResource> {
    resources.into_iter().find(|r| r.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_floating_ip_list() {
        let json = r#"{
            "floating_ips": [
                {"id": 4711, "name": "pfsense", "ip": "203.0.113.10", "type": "ipv4", "server": 42}
            ],
            "meta": {"pagination": {"page": 1, "per_page": 25, "total_entries": 1}}
        }"#;

        let list: FloatingIpList = serde_json::from_str(json).unwrap();
        assert_eq!(list.floating_ips.len(), 1);
        assert_eq!(list.floating_ips[0].id, 4711);
        assert_eq!(list.floating_ips[0].name, "pfsense");
    }

    #[test]
    fn test_find_named_requires_exact_match() {
        let servers = vec![
            ApiResource {
                id: 1,
                name: "pfsense-010".to_string(),
            },
            ApiResource {
                id: 2,
                name: "pfsense-01".to_string(),
            },
        ];

        assert_eq!(find_named(servers, "pfsense-01").map(|s| s.id), Some(2));
        assert!(find_named(Vec::new(), "pfsense-01").is_none());
    }

    #[test]
    fn test_running_action() {
        let json = r#"{"action": {
            "id": 13,
            "command": "assign_floating_ip",
            "status": "running",
            "progress": 40,
            "started": "2024-01-30T23:50:00+00:00",
            "finished": null,
            "resources": [{"id": 42, "type": "server"}],
            "error": null
        }}"#;

        let envelope: ActionEnvelope = serde_json::from_str(json).unwrap();
        let action = PendingAction::from(envelope.action);

        assert_eq!(action.id, 13);
        assert_eq!(action.status, ActionStatus::Running);
        assert_eq!(action.progress, 40);
        assert!(action.started.is_some());
        assert!(action.finished.is_none());
    }

    #[test]
    fn test_failed_action_carries_reason() {
        let json = r#"{"action": {
            "id": 14,
            "command": "change_alias_ips",
            "status": "error",
            "progress": 100,
            "started": "2024-01-30T23:50:00+00:00",
            "finished": "2024-01-30T23:50:03+00:00",
            "error": {"code": "action_failed", "message": "Action failed"}
        }}"#;

        let envelope: ActionEnvelope = serde_json::from_str(json).unwrap();
        let action = PendingAction::from(envelope.action);

        assert_eq!(
            action.status,
            ActionStatus::Error {
                code: "action_failed".to_string(),
                message: "Action failed".to_string(),
            }
        );
        assert!(action.status.is_terminal());
    }

    #[test]
    fn test_change_alias_ips_body() {
        let addresses: Vec<IpAddr> = vec!["10.0.0.3".parse().unwrap()];
        let body = ChangeAliasIpsRequest {
            network: 7,
            alias_ips: &addresses,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"network": 7, "alias_ips": ["10.0.0.3"]}));

        let cleared = ChangeAliasIpsRequest {
            network: 7,
            alias_ips: &[],
        };
        let json = serde_json::to_value(&cleared).unwrap();
        assert_eq!(json["alias_ips"], serde_json::json!([]));
    }

    #[test]
    fn test_parse_error_envelope() {
        let json = r#"{"error": {"code": "unauthorized", "message": "unable to authenticate", "details": {}}}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.error.code, "unauthorized");
    }
}
