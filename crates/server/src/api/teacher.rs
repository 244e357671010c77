//! 教师页面：通知、指导资料、论文批阅与学生名单。

use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::response::Response;
use axum::{Form, Router, routing::get};
use thesis_api_types::{NoticeForm, PageQuery, ReviewForm};
use thesis_core::domain::{CommentContent, LoginNo, PageRequest, PaperId, Role, Stage};
use tracing::info;

use super::extract::{IncomingFlash, TeacherUser};
use super::files::{UploadForm, attachment};
use super::response::{AppError, AppResult, FlashRedirect, HtmlPage};
use super::state::AppState;
use super::{notice_fields, require_stage, submission_rejection};
use crate::config::PAGE_SIZE;
use crate::repository::{LookupKind, NewComment, NewNotice, PaperRecord};
use crate::service::GuideSubmission;
use crate::views::{self, Chrome};

pub fn create_teacher_router() -> Router<Arc<AppState>> {
    Router::new()
        // 控制台
        .route("/teacher/dashboard", get(dashboard))
        // 通知
        .route("/teacher/notices", get(notices))
        .route("/teacher/add_notice", get(add_notice_page).post(add_notice))
        // 指导资料
        .route("/teacher/guides", get(guides))
        .route("/teacher/upload_guide", get(upload_guide_page).post(upload_guide))
        // 论文批阅
        .route("/teacher/papers", get(papers))
        .route("/teacher/review_paper/{id}", get(review_paper_page).post(review_paper))
        .route("/teacher/download_paper/{id}", get(download_paper))
        // 指导学生
        .route("/teacher/students", get(students))
}

/// 只返回提交给当前教师的论文，其余一律视为不存在。
async fn supervised_paper(state: &AppState, id: i32, teacher_no: &LoginNo) -> AppResult<PaperRecord> {
    state
        .papers
        .find_by_id(PaperId::new(id))
        .await?
        .filter(|paper| paper.teacher_no.as_deref() == Some(teacher_no.as_str()))
        .ok_or(AppError::NotFound)
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    user: TeacherUser,
    IncomingFlash(flash): IncomingFlash,
) -> AppResult<HtmlPage> {
    let teacher_no = &user.session.login_no;
    if state
        .principals
        .find_by_id(Role::Teacher, user.session.principal_id)
        .await?
        .is_none()
    {
        state.sessions.remove(&user.session_id).await;
        return Err(AppError::rejected("教师信息不存在", "/auth/login"));
    }

    let students = state.principals.list_students_of(user.session.principal_id).await?;
    let stats = views::teacher::DashboardStats {
        students: students.len() as u64,
        guides: state.guides.count_by_teacher(teacher_no).await?,
        papers: state.papers.count_by_teacher(teacher_no).await?,
        comments: state.comments.count_by_teacher(teacher_no).await?,
    };
    let recent = state.notices.recent(5).await?;
    let classes = state.references.list(LookupKind::Class).await?;
    let grades = state.references.list(LookupKind::Grade).await?;

    Ok(HtmlPage(views::teacher::dashboard(
        Chrome::new(Some(&user.session), flash.as_ref()),
        &stats,
        &recent,
        &students,
        &classes,
        &grades,
    )))
}

async fn notices(
    State(state): State<Arc<AppState>>,
    user: TeacherUser,
    IncomingFlash(flash): IncomingFlash,
    Query(query): Query<PageQuery>,
) -> AppResult<HtmlPage> {
    let page = state.notices.list(PageRequest::new(query.page, PAGE_SIZE)).await?;
    let can_publish = state.workflow.current().await?.is_open(Stage::ReleasingNotices);

    Ok(HtmlPage(views::teacher::notices(
        Chrome::new(Some(&user.session), flash.as_ref()),
        &page,
        can_publish,
    )))
}

async fn add_notice_page(
    State(state): State<Arc<AppState>>,
    user: TeacherUser,
    IncomingFlash(flash): IncomingFlash,
) -> AppResult<HtmlPage> {
    require_stage(&state, Stage::ReleasingNotices, "/teacher/notices").await?;
    Ok(HtmlPage(views::teacher::add_notice(Chrome::new(
        Some(&user.session),
        flash.as_ref(),
    ))))
}

async fn add_notice(
    State(state): State<Arc<AppState>>,
    user: TeacherUser,
    Form(form): Form<NoticeForm>,
) -> AppResult<FlashRedirect> {
    require_stage(&state, Stage::ReleasingNotices, "/teacher/notices").await?;

    let (title, content, lead_foot) = notice_fields(&form, "/teacher/add_notice")?;
    let notice = state
        .notices
        .create(NewNotice {
            title,
            content,
            lead_foot,
            publisher_role: Role::Teacher,
            publisher_no: user.session.login_no.clone(),
        })
        .await?;

    info!(teacher_no = %user.session.login_no, notice_id = %notice.id, "notice published");
    Ok(FlashRedirect::success("通知发布成功", "/teacher/notices"))
}

async fn guides(
    State(state): State<Arc<AppState>>,
    user: TeacherUser,
    IncomingFlash(flash): IncomingFlash,
    Query(query): Query<PageQuery>,
) -> AppResult<HtmlPage> {
    let page = state
        .guides
        .list_by_teacher(&user.session.login_no, PageRequest::new(query.page, PAGE_SIZE))
        .await?;
    let can_upload = state.workflow.current().await?.is_open(Stage::UploadPaperGuide);

    Ok(HtmlPage(views::teacher::guides(
        Chrome::new(Some(&user.session), flash.as_ref()),
        &page,
        can_upload,
    )))
}

async fn upload_guide_page(
    State(state): State<Arc<AppState>>,
    user: TeacherUser,
    IncomingFlash(flash): IncomingFlash,
) -> AppResult<HtmlPage> {
    require_stage(&state, Stage::UploadPaperGuide, "/teacher/guides").await?;
    Ok(HtmlPage(views::teacher::upload_guide(Chrome::new(
        Some(&user.session),
        flash.as_ref(),
    ))))
}

async fn upload_guide(
    State(state): State<Arc<AppState>>,
    user: TeacherUser,
    multipart: Multipart,
) -> AppResult<FlashRedirect> {
    const FORM_PATH: &str = "/teacher/upload_guide";

    require_stage(&state, Stage::UploadPaperGuide, "/teacher/guides").await?;
    let form = UploadForm::read(multipart, FORM_PATH).await?;
    let display_name = form.field("file_name").map(str::to_string);
    state
        .submissions
        .upload_guide(GuideSubmission {
            teacher_no: user.session.login_no.clone(),
            file: form.file,
            display_name,
        })
        .await
        .map_err(|err| submission_rejection(err, "/teacher/guides", FORM_PATH))?;

    Ok(FlashRedirect::success("指导资料上传成功", "/teacher/guides"))
}

async fn papers(
    State(state): State<Arc<AppState>>,
    user: TeacherUser,
    IncomingFlash(flash): IncomingFlash,
    Query(query): Query<PageQuery>,
) -> AppResult<HtmlPage> {
    let page = state
        .papers
        .list_by_teacher(&user.session.login_no, PageRequest::new(query.page, PAGE_SIZE))
        .await?;
    Ok(HtmlPage(views::teacher::papers(
        Chrome::new(Some(&user.session), flash.as_ref()),
        &page,
    )))
}

async fn review_paper_page(
    State(state): State<Arc<AppState>>,
    user: TeacherUser,
    IncomingFlash(flash): IncomingFlash,
    Path(id): Path<i32>,
) -> AppResult<HtmlPage> {
    let paper = supervised_paper(&state, id, &user.session.login_no).await?;
    let comments = state.comments.list_for_paper(paper.id).await?;

    Ok(HtmlPage(views::teacher::review_paper(
        Chrome::new(Some(&user.session), flash.as_ref()),
        &paper,
        &comments,
    )))
}

async fn review_paper(
    State(state): State<Arc<AppState>>,
    user: TeacherUser,
    Path(id): Path<i32>,
    Form(form): Form<ReviewForm>,
) -> AppResult<FlashRedirect> {
    let paper = supervised_paper(&state, id, &user.session.login_no).await?;
    let content = CommentContent::new(form.content)
        .map_err(|_| AppError::rejected("请填写批阅内容", format!("/teacher/review_paper/{id}")))?;

    let comment = state
        .comments
        .create(NewComment {
            paper_id: paper.id,
            teacher_no: user.session.login_no.clone(),
            student_no: paper.student_no,
            content,
        })
        .await?;

    info!(
        teacher_no = %user.session.login_no,
        paper_id = %paper.id,
        comment_id = %comment.id,
        "paper reviewed"
    );
    Ok(FlashRedirect::success("批阅提交成功", "/teacher/papers"))
}

async fn download_paper(
    State(state): State<Arc<AppState>>,
    user: TeacherUser,
    Path(id): Path<i32>,
) -> AppResult<Response> {
    let paper = supervised_paper(&state, id, &user.session.login_no).await?;
    attachment(&state.storage, &paper.save_path).await
}

async fn students(
    State(state): State<Arc<AppState>>,
    user: TeacherUser,
    IncomingFlash(flash): IncomingFlash,
) -> AppResult<HtmlPage> {
    let students = state.principals.list_students_of(user.session.principal_id).await?;
    let classes = state.references.list(LookupKind::Class).await?;
    let grades = state.references.list(LookupKind::Grade).await?;

    Ok(HtmlPage(views::teacher::students(
        Chrome::new(Some(&user.session), flash.as_ref()),
        &students,
        &classes,
        &grades,
    )))
}
