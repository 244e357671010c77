use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use thesis_core::domain::{ArtifactKind, DocumentName, DomainError, LoginNo, Stage, StoredFileName};
use thesis_storage::{StorageError, UploadStore};
use thiserror::Error;
use tracing::{info, warn};

use super::workflow::{GateError, WorkflowGate};
use crate::repository::{GuideRecord, GuideRepository, NewGuide, NewPaper, PaperRecord, PaperRepository};

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("stage {0} is closed")]
    StageClosed(Stage),
    #[error("no file selected")]
    MissingFile,
    #[error(transparent)]
    Invalid(#[from] DomainError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<GateError> for SubmissionError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Closed(stage) => SubmissionError::StageClosed(stage),
            GateError::Internal(err) => SubmissionError::Internal(err),
        }
    }
}

/// A file part received from a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct PaperSubmission {
    pub student_no: LoginNo,
    pub file: Option<UploadedFile>,
    /// Falls back to the uploaded file name when blank.
    pub paper_name: Option<String>,
    pub teacher_no: Option<LoginNo>,
}

#[derive(Debug, Clone)]
pub struct GuideSubmission {
    pub teacher_no: LoginNo,
    pub file: Option<UploadedFile>,
    /// Falls back to the uploaded file name when blank.
    pub display_name: Option<String>,
}

/// Gated uploads of papers and guide materials.
#[derive(Clone)]
pub struct SubmissionService {
    workflow: WorkflowGate,
    papers: Arc<dyn PaperRepository>,
    guides: Arc<dyn GuideRepository>,
    storage: UploadStore,
}

struct Prepared {
    file: UploadedFile,
    stored_name: StoredFileName,
}

fn display_name(declared: Option<&str>, file_name: &str) -> Result<DocumentName, DomainError> {
    match declared.map(str::trim) {
        Some(name) if !name.is_empty() => DocumentName::new(name),
        _ => DocumentName::new(file_name),
    }
}

impl SubmissionService {
    pub fn new(
        workflow: WorkflowGate,
        papers: Arc<dyn PaperRepository>,
        guides: Arc<dyn GuideRepository>,
        storage: UploadStore,
    ) -> Self {
        Self {
            workflow,
            papers,
            guides,
            storage,
        }
    }

    fn prepare(file: Option<UploadedFile>) -> Result<Prepared, SubmissionError> {
        let file = file
            .filter(|f| !f.file_name.trim().is_empty())
            .ok_or(SubmissionError::MissingFile)?;
        let stored_name = StoredFileName::new(&file.file_name, Local::now().naive_local())?;
        Ok(Prepared { file, stored_name })
    }

    /// Stores a student's thesis and makes it their only paper on record.
    ///
    /// The file is written before the database is touched. If the row swap
    /// fails the new file is removed and the previous paper stays intact;
    /// once it commits, the replaced files are deleted best-effort.
    #[tracing::instrument(skip(self, submission), fields(student_no = %submission.student_no))]
    pub async fn submit_paper(&self, submission: PaperSubmission) -> Result<PaperRecord, SubmissionError> {
        self.workflow.ensure_open(Stage::UploadEndEvaluate).await?;

        let Prepared { file, stored_name } = Self::prepare(submission.file)?;
        let paper_name = display_name(submission.paper_name.as_deref(), &file.file_name)?;

        let path = self
            .storage
            .store(ArtifactKind::Paper, &submission.student_no, &stored_name, &file.bytes)
            .await?;
        let save_path = path.to_string_lossy().into_owned();

        let replacement = match self
            .papers
            .replace_for_student(NewPaper {
                paper_name,
                student_no: submission.student_no.clone(),
                teacher_no: submission.teacher_no,
                save_path: save_path.clone(),
            })
            .await
        {
            Ok(replacement) => replacement,
            Err(err) => {
                warn!(path = %save_path, error = %err, "paper row swap failed, discarding new file");
                self.storage.remove_best_effort(&path).await;
                return Err(err.into());
            }
        };

        for old in &replacement.replaced {
            if old.save_path != save_path {
                self.storage.remove_best_effort(Path::new(&old.save_path)).await;
            }
        }

        info!(
            paper_id = %replacement.paper.id,
            replaced = replacement.replaced.len(),
            path = %save_path,
            "paper submitted"
        );
        Ok(replacement.paper)
    }

    /// Stores a guide file for a teacher. Guides accumulate.
    #[tracing::instrument(skip(self, submission), fields(teacher_no = %submission.teacher_no))]
    pub async fn upload_guide(&self, submission: GuideSubmission) -> Result<GuideRecord, SubmissionError> {
        self.workflow.ensure_open(Stage::UploadPaperGuide).await?;

        let Prepared { file, stored_name } = Self::prepare(submission.file)?;
        let file_name = display_name(submission.display_name.as_deref(), &file.file_name)?;

        let path = self
            .storage
            .store(ArtifactKind::Guide, &submission.teacher_no, &stored_name, &file.bytes)
            .await?;
        let file_path = path.to_string_lossy().into_owned();

        let guide = match self
            .guides
            .create(NewGuide {
                file_path: file_path.clone(),
                file_name,
                teacher_no: submission.teacher_no,
            })
            .await
        {
            Ok(guide) => guide,
            Err(err) => {
                warn!(path = %file_path, error = %err, "guide insert failed, discarding new file");
                self.storage.remove_best_effort(&path).await;
                return Err(err.into());
            }
        };

        info!(guide_id = %guide.id, path = %file_path, "guide uploaded");
        Ok(guide)
    }
}
