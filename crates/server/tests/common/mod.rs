#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use thesis_core::domain::{LoginNo, ProcessStatus, Role, Stage, StageFlag};
use thesis_server::api::AppState;
use thesis_server::config::AppConfig;
use thesis_server::db::connect_and_migrate;
use thesis_server::repository::PrincipalRecord;
use thesis_server::service::{UploadedFile, seed};
use uuid::Uuid;

pub const STUDENT_NO: &str = "2020001001";
pub const TEACHER_NO: &str = "T001";
pub const ADMIN_NO: &str = "admin001";

pub fn temp_root(prefix: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{prefix}-{}", Uuid::new_v4()))
}

/// Fresh in-memory database and upload folder, seeded like `thesis-server init`.
pub async fn seeded_state(prefix: &str) -> Arc<AppState> {
    let config = AppConfig {
        database_url: "sqlite::memory:".to_string(),
        secret_key: "integration-test-secret".to_string(),
        upload_folder: temp_root(prefix),
        bind_addr: "127.0.0.1:0".to_string(),
    };
    let db = connect_and_migrate(&config.database_url)
        .await
        .expect("in-memory database should migrate");
    let state = Arc::new(AppState::new(db, config));
    state.storage.ensure_root().await.expect("upload root should be created");
    seed(&state).await.expect("seed should succeed");
    state
}

pub fn login_no(value: &str) -> LoginNo {
    LoginNo::new(value).expect("valid login number")
}

pub async fn principal(state: &AppState, role: Role, value: &str) -> PrincipalRecord {
    state
        .principals
        .find_by_login_no(role, &login_no(value))
        .await
        .expect("principal lookup should succeed")
        .expect("principal should exist")
}

pub async fn set_stage(state: &AppState, stage: Stage, flag: StageFlag) {
    let current = state.workflow.current().await.expect("process status should load");
    state
        .workflow
        .update(current.with(stage, flag))
        .await
        .expect("process status should save");
}

pub async fn close_everything(state: &AppState) {
    state
        .workflow
        .update(ProcessStatus::all_closed())
        .await
        .expect("process status should save");
}

pub fn upload(file_name: &str, bytes: &[u8]) -> UploadedFile {
    UploadedFile {
        file_name: file_name.to_string(),
        bytes: bytes.to_vec(),
    }
}
