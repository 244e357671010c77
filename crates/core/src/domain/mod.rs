mod error;
mod ids;
mod login_no;
mod page;
mod role;
mod text;
mod upload;
mod workflow;

pub use error::DomainError;
pub use ids::{CommentId, GuideId, LookupId, NoticeId, PaperId, PrincipalId};
pub use login_no::LoginNo;
pub use page::{Page, PageRequest};
pub use role::Role;
pub use text::{CommentContent, DisplayName, DocumentName, NoticeContent, NoticeTitle};
pub use upload::{ALLOWED_EXTENSIONS, ArtifactKind, StoredFileName, allowed_extension, secure_filename};
pub use workflow::{ProcessStatus, Stage, StageFlag};
