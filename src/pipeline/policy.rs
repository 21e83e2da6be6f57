//! Per-stage failure handling

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::status;
use crate::db::repositories::activity::{ActivityRepository, NewActivity};

/// What a stage does when one of its items fails
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Propagate the error and stop the stage
    Abort,
    /// Record the error as an activity and move on
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagePolicies {
    pub files: FailurePolicy,
    pub filings: FailurePolicy,
    pub parsing: FailurePolicy,
}

impl Default for StagePolicies {
    fn default() -> Self {
        Self {
            files: FailurePolicy::Abort,
            filings: FailurePolicy::Continue,
            parsing: FailurePolicy::Continue,
        }
    }
}

impl FailurePolicy {
    /// Apply the policy to a failed item.
    ///
    /// Under `Continue` the failure is stored as a `sub` activity with status
    /// 500 and `Ok(())` is returned.
    pub async fn handle(
        self,
        activities: &ActivityRepository,
        workspace_id: &str,
        title: &str,
        err: anyhow::Error,
    ) -> Result<()> {
        match self {
            FailurePolicy::Abort => Err(err),
            FailurePolicy::Continue => {
                error!("{} failed for workspace {}: {:#}", title, workspace_id, err);
                activities
                    .create(NewActivity::sub(
                        workspace_id,
                        status::FAILED,
                        title,
                        format!("{:#}", err),
                    ))
                    .await?;
                Ok(())
            }
        }
    }
}
