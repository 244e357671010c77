//! HTTP 路由模块。
//!
//! 页面按角色分为 `/auth`、`/admin`、`/teacher`、`/student` 与公共页面。

pub mod admin;
pub mod auth;
pub mod extract;
pub mod files;
pub mod public;
pub mod response;
pub mod state;
pub mod student;
pub mod teacher;

use std::sync::Arc;

use axum::{Router, middleware};
use axum::extract::DefaultBodyLimit;
use thesis_api_types::{NoticeForm, non_blank, optional_id};
use thesis_core::domain::{DisplayName, DomainError, NoticeContent, NoticeTitle, Stage};
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;

use crate::config::MAX_CONTENT_LENGTH;
use crate::repository::Profile;
use crate::service::{GateError, SubmissionError};
pub use response::{AppError, AppResult, FlashRedirect, HtmlPage};
pub use state::AppState;

/// 组装全部路由与中间件。
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(public::create_public_router())
        .merge(auth::create_auth_router())
        .merge(admin::create_admin_router())
        .merge(teacher::create_teacher_router())
        .merge(student::create_student_router())
        .fallback(|| async { AppError::NotFound })
        .layer(DefaultBodyLimit::max(MAX_CONTENT_LENGTH))
        .layer(middleware::from_fn(response::apply_flash))
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 阶段关闭时展示给用户的提示。
pub fn stage_closed_message(stage: Stage) -> &'static str {
    match stage {
        Stage::ReleasingNotices => "当前不允许发布通知",
        Stage::CompletePersonalData => "当前不允许完善个人资料",
        Stage::UploadPaperGuide => "当前不允许上传指导资料",
        Stage::UploadEndEvaluate => "当前不允许上传论文",
    }
}

/// 检查流程阶段，关闭时带提示重定向到 `redirect_to`。
pub async fn require_stage(state: &AppState, stage: Stage, redirect_to: &str) -> AppResult<()> {
    match state.workflow.ensure_open(stage).await {
        Ok(()) => Ok(()),
        Err(GateError::Closed(stage)) => Err(AppError::rejected(stage_closed_message(stage), redirect_to)),
        Err(GateError::Internal(err)) => Err(AppError::Internal(err)),
    }
}

/// 上传失败的统一映射：阶段关闭回到列表页，表单问题回到表单页。
pub fn submission_rejection(err: SubmissionError, list_path: &str, form_path: &str) -> AppError {
    match err {
        SubmissionError::StageClosed(stage) => {
            AppError::rejected(stage_closed_message(stage), list_path)
        }
        SubmissionError::MissingFile | SubmissionError::Invalid(DomainError::EmptyFileName) => {
            AppError::rejected("没有选择文件", form_path)
        }
        SubmissionError::Invalid(DomainError::DisallowedFileType(_)) => {
            AppError::rejected("不支持的文件类型", form_path)
        }
        SubmissionError::Invalid(DomainError::TextTooLong { .. }) => {
            AppError::rejected("文件名称过长", form_path)
        }
        SubmissionError::Invalid(err) => AppError::rejected(err.to_string(), form_path),
        SubmissionError::Storage(err) => AppError::Internal(err.into()),
        SubmissionError::Internal(err) => AppError::Internal(err),
    }
}

/// 由表单字段构造个人资料；姓名必填且不超过 20 个字符。
pub fn profile_from_form(
    username: &str,
    sex: &str,
    birth: &str,
    native_place_id: &str,
) -> Result<Profile, DomainError> {
    let username = DisplayName::new(username)?;
    Ok(Profile {
        username: username.into_inner(),
        sex: non_blank(sex).map(str::to_string),
        birth: non_blank(birth).map(str::to_string),
        native_place_id: optional_id(native_place_id),
    })
}

/// 标题与内容必填；任一无效都给出同一提示。
pub fn notice_fields(form: &NoticeForm, form_path: &str) -> AppResult<(NoticeTitle, NoticeContent, Option<String>)> {
    let fields = NoticeTitle::new(form.title.as_str()).and_then(|title| {
        NoticeContent::new(form.content.as_str()).map(|content| (title, content))
    });
    match fields {
        Ok((title, content)) => Ok((title, content, non_blank(&form.lead_foot).map(str::to_string))),
        Err(DomainError::TextTooLong { .. }) => Err(AppError::rejected("标题或内容过长", form_path)),
        Err(_) => Err(AppError::rejected("请填写标题和内容", form_path)),
    }
}
