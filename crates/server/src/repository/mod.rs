mod comment_repository;
mod guide_repository;
mod notice_repository;
mod paper_repository;
mod principal_repository;
mod process_status_repository;
mod reference_repository;

pub use comment_repository::{
    CommentRecord, CommentRepository, NewComment, SeaOrmCommentRepository,
};
pub use guide_repository::{GuideRecord, GuideRepository, NewGuide, SeaOrmGuideRepository};
pub use notice_repository::{
    NewNotice, NoticeEdit, NoticeRecord, NoticeRepository, SeaOrmNoticeRepository,
};
pub use paper_repository::{
    NewPaper, PaperRecord, PaperReplacement, PaperRepository, SeaOrmPaperRepository,
};
pub use principal_repository::{
    NewPrincipal, Placement, PrincipalRecord, PrincipalRepository, PrincipalUpdate, Profile,
    SeaOrmPrincipalRepository,
};
pub use process_status_repository::{ProcessStatusRepository, SeaOrmProcessStatusRepository};
pub use reference_repository::{
    LookupKind, LookupRecord, ReferenceRepository, SeaOrmReferenceRepository,
};
