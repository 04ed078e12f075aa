//! Waiting for provider actions (exponential backoff polling)

use crate::action::{ActionStatus, PendingAction};
use crate::error::{CloudError, Result};
use crate::provider::CloudResourceClient;
use crate::task_group::until_cancelled;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Polling configuration for [`ActionWaiter`]
///
/// There is no attempt limit: deadlines belong to the caller's cancellation token.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            multiplier: 1.5,
        }
    }
}

impl WaitConfig {
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(i32::MAX as u32) as i32;
        let delay = (self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent))
            .min(self.max_delay.as_secs_f64());
        Duration::try_from_secs_f64(delay).unwrap_or(self.max_delay)
    }
}

/// Blocks a branch until an action reaches a terminal state
#[derive(Clone)]
pub struct ActionWaiter {
    client: Arc<dyn CloudResourceClient>,
    config: WaitConfig,
}

impl ActionWaiter {
    pub fn new(client: Arc<dyn CloudResourceClient>, config: WaitConfig) -> Self {
        Self { client, config }
    }

    /// Wait for `action` to succeed
    ///
    /// Returns the terminal action on success, [`CloudError::ActionFailed`] with the
    /// provider's reason on failure and [`CloudError::Cancelled`] when `token` fires first.
    pub async fn wait(
        &self,
        token: &CancellationToken,
        mut action: PendingAction,
    ) -> Result<PendingAction> {
        let mut attempt = 0;

        loop {
            match action.status {
                ActionStatus::Success => {
                    tracing::debug!(
                        action_id = action.id,
                        command = %action.command,
                        polls = attempt,
                        "action succeeded"
                    );
                    return Ok(action);
                }
                ActionStatus::Error { code, message } => {
                    tracing::warn!(
                        action_id = action.id,
                        command = %action.command,
                        %code,
                        %message,
                        "action failed"
                    );
                    return Err(CloudError::ActionFailed {
                        id: action.id,
                        command: action.command,
                        code,
                        message,
                    });
                }
                ActionStatus::Running => {}
            }

            let delay = self.config.delay_for_attempt(attempt);
            tracing::trace!(
                action_id = action.id,
                progress = action.progress,
                delay_ms = delay.as_millis() as u64,
                "action still running"
            );

            until_cancelled(token, async {
                sleep(delay).await;
                Ok(())
            })
            .await?;

            action = until_cancelled(token, self.client.get_action(action.id)).await?;
            attempt += 1;
        }
    }
}
