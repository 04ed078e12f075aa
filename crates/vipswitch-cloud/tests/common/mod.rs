use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use vipswitch_cloud::{
    ActionStatus, CloudError, CloudResourceClient, PendingAction, ResourceKind, ResourceNames,
    ResourceRef, Result,
};

/// Calls observed by the mock, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    LookupFloatingIp(String),
    LookupNetwork(String),
    LookupServer(String),
    AssignFloatingIp { floating_ip: String, server: String },
    SetAlias { network: String, server: String, addresses: Vec<IpAddr> },
    /// A terminal status was handed back to the caller
    ActionTerminal { id: u64, success: bool },
}

/// Mutation kinds that can be scripted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    AssignFloatingIp,
    ClearAlias,
    SetAlias,
}

/// How an issued action behaves when polled
#[derive(Debug, Clone)]
pub struct ActionScript {
    /// Polls answered with `running` before the terminal status
    pub polls: u32,
    /// Terminal status is returned by the mutating call itself
    pub immediate: bool,
    pub error: Option<(String, String)>,
}

impl ActionScript {
    pub fn success_after(polls: u32) -> Self {
        Self {
            polls,
            immediate: false,
            error: None,
        }
    }

    pub fn immediate_success() -> Self {
        Self {
            polls: 0,
            immediate: true,
            error: None,
        }
    }

    pub fn error_after(polls: u32, code: &str, message: &str) -> Self {
        Self {
            polls,
            immediate: false,
            error: Some((code.to_string(), message.to_string())),
        }
    }
}

impl Default for ActionScript {
    fn default() -> Self {
        Self::success_after(0)
    }
}

enum Effect {
    FloatingIp { floating_ip: u64, server: u64 },
    Alias { server: u64, addresses: Vec<IpAddr> },
}

struct ActionRecord {
    command: String,
    remaining_polls: u32,
    error: Option<(String, String)>,
    effect: Option<Effect>,
}

#[derive(Default)]
struct State {
    floating_ips: HashMap<String, u64>,
    networks: HashMap<String, u64>,
    servers: HashMap<String, u64>,
    hanging: HashSet<String>,
    broken: HashMap<String, String>,
    scripts: HashMap<(Op, String), ActionScript>,
    rejected: HashMap<(Op, String), String>,
    actions: HashMap<u64, ActionRecord>,
    next_action: u64,
    calls: Vec<Call>,
    floating_ip_owner: HashMap<u64, u64>,
    aliases: HashMap<u64, Vec<IpAddr>>,
}

/// In-memory cloud with scriptable lookups and actions
#[derive(Clone, Default)]
pub struct MockCloud {
    state: Arc<Mutex<State>>,
}

#[allow(dead_code)]
impl MockCloud {
    pub fn new() -> Self {
        Self::default()
    }

    /// fip1 / lan / gw-a / gw-b, with gw-a currently holding both addresses
    pub fn scenario() -> Self {
        let cloud = Self::new()
            .with_floating_ip("fip1", 1)
            .with_network("lan", 2)
            .with_server("gw-a", 10)
            .with_server("gw-b", 11);
        {
            let mut state = cloud.state.lock().unwrap();
            state.floating_ip_owner.insert(1, 10);
            state.aliases.insert(10, vec![alias_ip()]);
        }
        cloud
    }

    pub fn with_floating_ip(self, name: &str, id: u64) -> Self {
        self.state
            .lock()
            .unwrap()
            .floating_ips
            .insert(name.to_string(), id);
        self
    }

    pub fn with_network(self, name: &str, id: u64) -> Self {
        self.state
            .lock()
            .unwrap()
            .networks
            .insert(name.to_string(), id);
        self
    }

    pub fn with_server(self, name: &str, id: u64) -> Self {
        self.state
            .lock()
            .unwrap()
            .servers
            .insert(name.to_string(), id);
        self
    }

    pub fn without_network(self, name: &str) -> Self {
        self.state.lock().unwrap().networks.remove(name);
        self
    }

    /// Lookups of `name` never complete
    pub fn hang_lookup(self, name: &str) -> Self {
        self.state.lock().unwrap().hanging.insert(name.to_string());
        self
    }

    /// Lookups of `name` fail with a transport error
    pub fn break_lookup(self, name: &str, message: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .broken
            .insert(name.to_string(), message.to_string());
        self
    }

    pub fn script(self, op: Op, server: &str, script: ActionScript) -> Self {
        self.state
            .lock()
            .unwrap()
            .scripts
            .insert((op, server.to_string()), script);
        self
    }

    /// The mutating call itself is refused by the API
    pub fn reject(self, op: Op, server: &str, message: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .rejected
            .insert((op, server.to_string()), message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn floating_ip_owner(&self, floating_ip: u64) -> Option<u64> {
        self.state
            .lock()
            .unwrap()
            .floating_ip_owner
            .get(&floating_ip)
            .copied()
    }

    pub fn aliases_of(&self, server: u64) -> Vec<IpAddr> {
        self.state
            .lock()
            .unwrap()
            .aliases
            .get(&server)
            .cloned()
            .unwrap_or_default()
    }

    fn lookup(
        &self,
        kind: ResourceKind,
        name: &str,
        call: Call,
        table: impl Fn(&State) -> &HashMap<String, u64>,
    ) -> std::result::Result<ResourceRef, Option<CloudError>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);

        if state.hanging.contains(name) {
            return Err(None);
        }
        if let Some(message) = state.broken.get(name) {
            return Err(Some(CloudError::Transport(message.clone())));
        }

        let found = table(&*state).get(name).copied();
        match found {
            Some(id) => Ok(ResourceRef::new(kind, id, name)),
            None => Err(Some(CloudError::NotFound {
                kind,
                name: name.to_string(),
            })),
        }
    }

    fn issue(&self, op: Op, server: &ResourceRef, call: Call, effect: Effect) -> Result<PendingAction> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);

        let key = (op, server.name.clone());
        if let Some(message) = state.rejected.get(&key) {
            return Err(CloudError::ApiError {
                code: "invalid_input".to_string(),
                message: message.clone(),
            });
        }

        let script = state.scripts.get(&key).cloned().unwrap_or_default();
        state.next_action += 1;
        let id = state.next_action;
        let command = match op {
            Op::AssignFloatingIp => "assign_floating_ip",
            Op::ClearAlias | Op::SetAlias => "change_alias_ips",
        };

        state.actions.insert(
            id,
            ActionRecord {
                command: command.to_string(),
                remaining_polls: script.polls,
                error: script.error,
                effect: Some(effect),
            },
        );

        if script.immediate {
            let status = finish(&mut state, id);
            return Ok(PendingAction::new(id, command, status));
        }

        Ok(PendingAction::new(id, command, ActionStatus::Running))
    }
}

fn finish(state: &mut State, id: u64) -> ActionStatus {
    let Some(record) = state.actions.get_mut(&id) else {
        return ActionStatus::Error {
            code: "not_found".to_string(),
            message: format!("action {} not found", id),
        };
    };

    let error = record.error.clone();
    let effect = record.effect.take();

    let status = match error {
        Some((code, message)) => ActionStatus::Error { code, message },
        None => {
            match effect {
                Some(Effect::FloatingIp {
                    floating_ip,
                    server,
                }) => {
                    state.floating_ip_owner.insert(floating_ip, server);
                }
                Some(Effect::Alias { server, addresses }) => {
                    state.aliases.insert(server, addresses);
                }
                None => {}
            }
            ActionStatus::Success
        }
    };

    state.calls.push(Call::ActionTerminal {
        id,
        success: status == ActionStatus::Success,
    });
    status
}

#[async_trait]
impl CloudResourceClient for MockCloud {
    fn name(&self) -> &str {
        "mock"
    }

    async fn lookup_floating_ip(&self, name: &str) -> Result<ResourceRef> {
        let result = self.lookup(
            ResourceKind::FloatingIp,
            name,
            Call::LookupFloatingIp(name.to_string()),
            |s| &s.floating_ips,
        );
        settle(result).await
    }

    async fn lookup_network(&self, name: &str) -> Result<ResourceRef> {
        let result = self.lookup(
            ResourceKind::Network,
            name,
            Call::LookupNetwork(name.to_string()),
            |s| &s.networks,
        );
        settle(result).await
    }

    async fn lookup_server(&self, name: &str) -> Result<ResourceRef> {
        let result = self.lookup(
            ResourceKind::Server,
            name,
            Call::LookupServer(name.to_string()),
            |s| &s.servers,
        );
        settle(result).await
    }

    async fn assign_floating_ip(
        &self,
        floating_ip: &ResourceRef,
        server: &ResourceRef,
    ) -> Result<PendingAction> {
        self.issue(
            Op::AssignFloatingIp,
            server,
            Call::AssignFloatingIp {
                floating_ip: floating_ip.name.clone(),
                server: server.name.clone(),
            },
            Effect::FloatingIp {
                floating_ip: floating_ip.id,
                server: server.id,
            },
        )
    }

    async fn set_alias_addresses(
        &self,
        network: &ResourceRef,
        server: &ResourceRef,
        addresses: &[IpAddr],
    ) -> Result<PendingAction> {
        let op = if addresses.is_empty() {
            Op::ClearAlias
        } else {
            Op::SetAlias
        };
        self.issue(
            op,
            server,
            Call::SetAlias {
                network: network.name.clone(),
                server: server.name.clone(),
                addresses: addresses.to_vec(),
            },
            Effect::Alias {
                server: server.id,
                addresses: addresses.to_vec(),
            },
        )
    }

    async fn get_action(&self, id: u64) -> Result<PendingAction> {
        let mut state = self.state.lock().unwrap();

        let (command, running) = match state.actions.get_mut(&id) {
            Some(record) if record.remaining_polls > 0 => {
                record.remaining_polls -= 1;
                (record.command.clone(), true)
            }
            Some(record) => (record.command.clone(), false),
            None => return Err(CloudError::ApiError {
                code: "not_found".to_string(),
                message: format!("action {} not found", id),
            }),
        };

        if running {
            return Ok(PendingAction::new(id, command, ActionStatus::Running));
        }

        let status = finish(&mut state, id);
        Ok(PendingAction::new(id, command, status))
    }
}

async fn settle(
    result: std::result::Result<ResourceRef, Option<CloudError>>,
) -> Result<ResourceRef> {
    match result {
        Ok(resource) => Ok(resource),
        Err(Some(err)) => Err(err),
        Err(None) => std::future::pending().await,
    }
}

pub fn alias_ip() -> IpAddr {
    "10.0.0.3".parse().unwrap()
}

pub fn names() -> ResourceNames {
    ResourceNames {
        floating_ip: "fip1".to_string(),
        network: "lan".to_string(),
        primary_server: "gw-a".to_string(),
        secondary_server: "gw-b".to_string(),
    }
}

/// Index of the first call matching `pred`
#[allow(dead_code)]
pub fn position(calls: &[Call], pred: impl Fn(&Call) -> bool) -> Option<usize> {
    calls.iter().position(pred)
}
