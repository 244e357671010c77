//! 统一的应用状态。

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use sha2::{Digest, Sha512};
use thesis_storage::UploadStore;
use tower_cookies::Key;

use crate::config::{AppConfig, SESSION_LIFETIME};
use crate::repository::{
    CommentRepository, GuideRepository, NoticeRepository, PaperRepository, PrincipalRepository,
    ProcessStatusRepository, ReferenceRepository, SeaOrmCommentRepository, SeaOrmGuideRepository,
    SeaOrmNoticeRepository, SeaOrmPaperRepository, SeaOrmPrincipalRepository,
    SeaOrmProcessStatusRepository, SeaOrmReferenceRepository,
};
use crate::service::{AuthService, SubmissionService, WorkflowGate};
use crate::session::SessionStore;

/// 所有处理器共享的数据。
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub sessions: SessionStore,
    /// 会话 Cookie 的签名密钥。
    pub cookie_key: Key,
    pub storage: UploadStore,
    pub principals: Arc<dyn PrincipalRepository>,
    pub references: Arc<dyn ReferenceRepository>,
    pub notices: Arc<dyn NoticeRepository>,
    pub guides: Arc<dyn GuideRepository>,
    pub papers: Arc<dyn PaperRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub process_status: Arc<dyn ProcessStatusRepository>,
    pub workflow: WorkflowGate,
    pub auth: AuthService,
    pub submissions: SubmissionService,
}

impl AppState {
    /// 基于数据库连接装配全部仓储与服务。
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        let principals: Arc<dyn PrincipalRepository> =
            Arc::new(SeaOrmPrincipalRepository::new(db.clone()));
        let guides: Arc<dyn GuideRepository> = Arc::new(SeaOrmGuideRepository::new(db.clone()));
        let papers: Arc<dyn PaperRepository> = Arc::new(SeaOrmPaperRepository::new(db.clone()));
        let process_status: Arc<dyn ProcessStatusRepository> =
            Arc::new(SeaOrmProcessStatusRepository::new(db.clone()));

        let storage = UploadStore::new(config.upload_folder.clone());
        let workflow = WorkflowGate::new(process_status.clone());
        let auth = AuthService::new(principals.clone(), workflow.clone());
        let submissions = SubmissionService::new(
            workflow.clone(),
            papers.clone(),
            guides.clone(),
            storage.clone(),
        );
        let cookie_key = Key::from(&Sha512::digest(config.secret_key.as_bytes()));

        Self {
            sessions: SessionStore::new(SESSION_LIFETIME),
            cookie_key,
            storage,
            principals,
            references: Arc::new(SeaOrmReferenceRepository::new(db.clone())),
            notices: Arc::new(SeaOrmNoticeRepository::new(db.clone())),
            guides,
            papers,
            comments: Arc::new(SeaOrmCommentRepository::new(db)),
            process_status,
            workflow,
            auth,
            submissions,
            config,
        }
    }
}
