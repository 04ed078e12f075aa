//! Failover orchestration
//!
//! Runs the floating-IP branch and the alias-IP branch of a [`FailoverPlan`]
//! concurrently under one cancellation scope. Each branch issues its steps in
//! order and waits for every action before moving on, so the alias address is
//! only set on the target after it has been cleared on the other server.
//! Nothing is rolled back: a branch that succeeded stays applied when the
//! other one fails.

use crate::action::PendingAction;
use crate::error::CloudError;
use crate::plan::{Branch, FailoverPlan, PlannedStep, Step};
use crate::provider::CloudResourceClient;
use crate::resource::ResourceSet;
use crate::task_group::{TaskError, TaskGroup, until_cancelled};
use crate::waiter::ActionWaiter;
use std::net::IpAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

/// Failure of a single step inside a branch
#[derive(Error, Debug)]
pub enum StepError {
    #[error("{step} on {server}: {source}")]
    Step {
        step: Step,
        server: String,
        #[source]
        source: CloudError,
    },

    #[error("branch task aborted: {0}")]
    Aborted(String),
}

impl StepError {
    pub fn step(&self) -> Option<Step> {
        match self {
            StepError::Step { step, .. } => Some(*step),
            StepError::Aborted(_) => None,
        }
    }
}

impl From<JoinError> for StepError {
    fn from(err: JoinError) -> Self {
        StepError::Aborted(err.to_string())
    }
}

impl TaskError for StepError {
    fn is_cancelled(&self) -> bool {
        matches!(self, StepError::Step { source, .. } if source.is_cancelled())
    }
}

/// A branch that did not complete
#[derive(Error, Debug)]
#[error("{branch} branch failed at {error}")]
pub struct BranchFailure {
    pub branch: Branch,
    #[source]
    pub error: StepError,
}

impl BranchFailure {
    /// True when the branch was stopped by the scope cancellation, not by its own failure
    pub fn was_cancelled(&self) -> bool {
        self.error.is_cancelled()
    }
}

/// Aggregated outcome of a run that did not fully succeed
#[derive(Error, Debug)]
pub enum FailoverError {
    /// Exactly one branch failed; the other one is applied
    #[error("failover partially failed: {0}")]
    PartialFailure(BranchFailure),

    /// Every branch failed
    #[error("failover failed: {}", join_failures(.0))]
    Failed(Vec<BranchFailure>),
}

impl FailoverError {
    pub fn failures(&self) -> Vec<&BranchFailure> {
        match self {
            FailoverError::PartialFailure(failure) => vec![failure],
            FailoverError::Failed(failures) => failures.iter().collect(),
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, FailoverError::PartialFailure(_))
    }
}

fn join_failures(failures: &[BranchFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Drives a failover run to completion
pub struct FailoverOrchestrator {
    client: Arc<dyn CloudResourceClient>,
    waiter: ActionWaiter,
}

impl FailoverOrchestrator {
    pub fn new(client: Arc<dyn CloudResourceClient>, waiter: ActionWaiter) -> Self {
        Self { client, waiter }
    }

    /// Move the floating IP and the alias address to `resources.target()`
    pub async fn run(
        &self,
        token: &CancellationToken,
        resources: &ResourceSet,
        alias_ip: Option<IpAddr>,
    ) -> Result<(), FailoverError> {
        let plan = FailoverPlan::new(resources, alias_ip);
        self.execute(token, &plan).await
    }

    /// Execute every branch of `plan` concurrently and aggregate the failures
    pub async fn execute(
        &self,
        token: &CancellationToken,
        plan: &FailoverPlan,
    ) -> Result<(), FailoverError> {
        tracing::info!(
            target_server = %plan.target.name,
            other_server = %plan.other.name,
            "starting failover"
        );

        let mut group: TaskGroup<(), StepError> = TaskGroup::new(token);

        for branch in Branch::ALL {
            let steps: Vec<PlannedStep> = plan.steps_for(branch).into_iter().cloned().collect();
            let client = Arc::clone(&self.client);
            let waiter = self.waiter.clone();

            group.spawn(move |token| async move {
                run_branch(client, waiter, token, branch, steps).await
            });
        }

        let mut failures: Vec<BranchFailure> = Branch::ALL
            .into_iter()
            .zip(group.join_all().await)
            .filter_map(|(branch, result)| {
                result.err().map(|error| BranchFailure { branch, error })
            })
            .collect();

        for failure in &failures {
            if failure.was_cancelled() {
                tracing::warn!(branch = %failure.branch, "branch cancelled");
            } else {
                tracing::error!(branch = %failure.branch, error = %failure.error, "branch failed");
            }
        }

        match failures.len() {
            0 => {
                tracing::info!(target_server = %plan.target.name, "failover completed");
                Ok(())
            }
            n if n < Branch::ALL.len() => Err(FailoverError::PartialFailure(failures.remove(0))),
            _ => Err(FailoverError::Failed(failures)),
        }
    }
}

async fn run_branch(
    client: Arc<dyn CloudResourceClient>,
    waiter: ActionWaiter,
    token: CancellationToken,
    branch: Branch,
    steps: Vec<PlannedStep>,
) -> Result<(), StepError> {
    for planned in &steps {
        tracing::info!(%branch, step = %planned.step, "{}", planned.description());

        run_step(client.as_ref(), &waiter, &token, planned)
            .await
            .map_err(|source| StepError::Step {
                step: planned.step,
                server: planned.server.name.clone(),
                source,
            })?;
    }

    tracing::info!(%branch, "branch completed");
    Ok(())
}

async fn run_step(
    client: &dyn CloudResourceClient,
    waiter: &ActionWaiter,
    token: &CancellationToken,
    planned: &PlannedStep,
) -> Result<PendingAction, CloudError> {
    // no new mutation once the scope is cancelled
    if token.is_cancelled() {
        return Err(CloudError::Cancelled);
    }

    let action = until_cancelled(token, async {
        match planned.step {
            Step::AssignFloatingIp => {
                client
                    .assign_floating_ip(&planned.resource, &planned.server)
                    .await
            }
            Step::ClearAlias => {
                client
                    .set_alias_addresses(&planned.resource, &planned.server, &[])
                    .await
            }
            Step::SetAlias => {
                client
                    .set_alias_addresses(&planned.resource, &planned.server, &planned.addresses)
                    .await
            }
        }
    })
    .await?;

    tracing::debug!(step = %planned.step, action_id = action.id, "action issued");
    waiter.wait(token, action).await
}
