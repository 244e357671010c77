mod auth;
mod password;
mod seed;
mod submission;
mod workflow;

pub use auth::{AuthError, AuthService};
pub use password::{hash_password_task, verify_password_task};
pub use seed::{SeedReport, seed};
pub use submission::{
    GuideSubmission, PaperSubmission, SubmissionError, SubmissionService, UploadedFile,
};
pub use workflow::{GateError, WorkflowGate};
