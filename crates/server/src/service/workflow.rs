use std::sync::Arc;

use thesis_core::domain::{ProcessStatus, Stage};
use thiserror::Error;
use tracing::info;

use crate::repository::ProcessStatusRepository;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("stage {0} is closed")]
    Closed(Stage),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Access to the process-status flags. Every check reads the row again, so
/// an admin toggle takes effect on the very next request.
#[derive(Clone)]
pub struct WorkflowGate {
    repository: Arc<dyn ProcessStatusRepository>,
}

impl WorkflowGate {
    pub fn new(repository: Arc<dyn ProcessStatusRepository>) -> Self {
        Self { repository }
    }

    pub async fn current(&self) -> anyhow::Result<ProcessStatus> {
        self.repository.get_or_init().await
    }

    #[tracing::instrument(skip(self))]
    pub async fn update(&self, status: ProcessStatus) -> anyhow::Result<ProcessStatus> {
        let saved = self.repository.save(status).await?;
        info!(
            releasing_notices = saved.releasing_notices.code(),
            complete_personal_data = saved.complete_personal_data.code(),
            upload_paper_guide = saved.upload_paper_guide.code(),
            upload_end_evaluate = saved.upload_end_evaluate.code(),
            "process status updated"
        );
        Ok(saved)
    }

    pub async fn ensure_open(&self, stage: Stage) -> Result<(), GateError> {
        let status = self.current().await?;
        status.ensure_open(stage).map_err(|_| GateError::Closed(stage))
    }
}
