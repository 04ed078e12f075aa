//! Failover plan: the mutating steps a run issues, per branch

use crate::resource::{ResourceRef, ResourceSet};
use serde::Serialize;
use std::net::IpAddr;

/// Independent branch of a failover run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    /// Floating IP reassignment
    FloatingIp,
    /// Alias IP swap (clear on other, then set on target)
    AliasIp,
}

impl Branch {
    pub const ALL: [Branch; 2] = [Branch::FloatingIp, Branch::AliasIp];
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Branch::FloatingIp => write!(f, "floating-ip"),
            Branch::AliasIp => write!(f, "alias-ip"),
        }
    }
}

/// Kind of mutating step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    AssignFloatingIp,
    ClearAlias,
    SetAlias,
}

impl Step {
    pub fn branch(&self) -> Branch {
        match self {
            Step::AssignFloatingIp => Branch::FloatingIp,
            Step::ClearAlias | Step::SetAlias => Branch::AliasIp,
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::AssignFloatingIp => write!(f, "assign-floating-ip"),
            Step::ClearAlias => write!(f, "clear-alias"),
            Step::SetAlias => write!(f, "set-alias"),
        }
    }
}

/// One mutating call against the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedStep {
    pub step: Step,

    /// Server the step acts on
    pub server: ResourceRef,

    /// Floating IP for `AssignFloatingIp`, network for the alias steps
    pub resource: ResourceRef,

    /// Alias addresses to set; empty for the other steps and for clearing
    pub addresses: Vec<IpAddr>,
}

impl PlannedStep {
    pub fn branch(&self) -> Branch {
        self.step.branch()
    }

    pub fn description(&self) -> String {
        match self.step {
            Step::AssignFloatingIp => {
                format!("assign {} to {}", self.resource.name, self.server.name)
            }
            Step::ClearAlias => format!(
                "clear alias addresses of {} in {}",
                self.server.name, self.resource.name
            ),
            Step::SetAlias if self.addresses.is_empty() => format!(
                "set no alias addresses on {} in {}",
                self.server.name, self.resource.name
            ),
            Step::SetAlias => {
                let addresses: Vec<String> =
                    self.addresses.iter().map(|a| a.to_string()).collect();
                format!(
                    "set alias {{{}}} on {} in {}",
                    addresses.join(", "),
                    self.server.name,
                    self.resource.name
                )
            }
        }
    }
}

/// Plan containing every step of a failover run
#[derive(Debug, Clone, Serialize)]
pub struct FailoverPlan {
    pub target: ResourceRef,
    pub other: ResourceRef,

    /// Steps in issue order within each branch
    pub steps: Vec<PlannedStep>,
}

impl FailoverPlan {
    pub fn new(resources: &ResourceSet, alias_ip: Option<IpAddr>) -> Self {
        let target = resources.target().clone();
        let other = resources.other().clone();

        let steps = vec![
            PlannedStep {
                step: Step::AssignFloatingIp,
                server: target.clone(),
                resource: resources.floating_ip().clone(),
                addresses: Vec::new(),
            },
            // Clearing `other` has to finish before `target` gets the address.
            PlannedStep {
                step: Step::ClearAlias,
                server: other.clone(),
                resource: resources.network().clone(),
                addresses: Vec::new(),
            },
            PlannedStep {
                step: Step::SetAlias,
                server: target.clone(),
                resource: resources.network().clone(),
                addresses: alias_ip.into_iter().collect(),
            },
        ];

        Self {
            target,
            other,
            steps,
        }
    }

    /// Steps of one branch, in the order they are issued
    pub fn steps_for(&self, branch: Branch) -> Vec<&PlannedStep> {
        self.steps.iter().filter(|s| s.branch() == branch).collect()
    }
}

impl std::fmt::Display for FailoverPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "target: {}, other: {}", self.target.name, self.other.name)?;
        for branch in Branch::ALL {
            writeln!(f, "[{}]", branch)?;
            for (i, step) in self.steps_for(branch).iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, step.description())?;
            }
        }
        Ok(())
    }
}
