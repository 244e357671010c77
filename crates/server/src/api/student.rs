//! 学生页面：通知、指导资料下载、论文上传与个人信息。

use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::response::Response;
use axum::{Form, Router, routing::get};
use thesis_api_types::{PageQuery, ProfileForm, non_blank};
use thesis_core::domain::{
    DomainError, GuideId, LoginNo, NoticeId, PageRequest, PaperId, Role, Stage,
};
use tracing::info;

use super::extract::{IncomingFlash, StudentUser};
use super::files::{UploadForm, attachment};
use super::response::{AppError, AppResult, FlashRedirect, HtmlPage};
use super::state::AppState;
use super::{profile_from_form, require_stage, submission_rejection};
use crate::config::PAGE_SIZE;
use crate::repository::{LookupKind, PrincipalRecord};
use crate::service::PaperSubmission;
use crate::views::{self, Chrome};

const PAPERS_PATH: &str = "/student/papers";
const UPLOAD_PAPER_PATH: &str = "/student/upload_paper";
const UPDATE_PROFILE_PATH: &str = "/student/update_profile";

pub fn create_student_router() -> Router<Arc<AppState>> {
    Router::new()
        // 控制台
        .route("/student/dashboard", get(dashboard))
        // 通知
        .route("/student/notices", get(notices))
        .route("/student/notice/{id}", get(view_notice))
        // 指导资料
        .route("/student/guides", get(guides))
        .route("/student/download_guide/{id}", get(download_guide))
        // 论文
        .route(PAPERS_PATH, get(papers))
        .route(UPLOAD_PAPER_PATH, get(upload_paper_page).post(upload_paper))
        .route("/student/paper/{id}", get(view_paper))
        .route("/student/download_paper/{id}", get(download_paper))
        // 批阅意见
        .route("/student/comments", get(comments))
        // 个人信息
        .route("/student/profile", get(profile))
        .route(UPDATE_PROFILE_PATH, get(update_profile_page).post(update_profile))
}

async fn current_student(state: &AppState, user: &StudentUser) -> AppResult<PrincipalRecord> {
    match state
        .principals
        .find_by_id(Role::Student, user.session.principal_id)
        .await?
    {
        Some(student) => Ok(student),
        None => {
            state.sessions.remove(&user.session_id).await;
            Err(AppError::rejected("学生信息不存在", "/auth/login"))
        }
    }
}

async fn assigned_teacher(state: &AppState, student: &PrincipalRecord) -> AppResult<Option<PrincipalRecord>> {
    match student.placement.teacher_id {
        Some(id) => Ok(state.principals.find_by_id(Role::Teacher, id.into()).await?),
        None => Ok(None),
    }
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    user: StudentUser,
    IncomingFlash(flash): IncomingFlash,
) -> AppResult<HtmlPage> {
    let student_no = &user.session.login_no;
    let notices = state.notices.recent(5).await?;
    let papers = state.papers.recent_by_student(student_no, 5).await?;
    let comments = state.comments.recent_by_student(student_no, 5).await?;
    let data = views::student::DashboardData {
        paper_count: state.papers.count_by_student(student_no).await?,
        comment_count: state.comments.count_by_student(student_no).await?,
        notices: &notices,
        papers: &papers,
        comments: &comments,
    };

    Ok(HtmlPage(views::student::dashboard(
        Chrome::new(Some(&user.session), flash.as_ref()),
        &data,
    )))
}

async fn notices(
    State(state): State<Arc<AppState>>,
    user: StudentUser,
    IncomingFlash(flash): IncomingFlash,
    Query(query): Query<PageQuery>,
) -> AppResult<HtmlPage> {
    let page = state.notices.list(PageRequest::new(query.page, PAGE_SIZE)).await?;
    Ok(HtmlPage(views::student::notices(
        Chrome::new(Some(&user.session), flash.as_ref()),
        &page,
    )))
}

async fn view_notice(
    State(state): State<Arc<AppState>>,
    user: StudentUser,
    IncomingFlash(flash): IncomingFlash,
    Path(id): Path<i32>,
) -> AppResult<HtmlPage> {
    let notice = state
        .notices
        .find_by_id(NoticeId::new(id))
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(HtmlPage(views::student::view_notice(
        Chrome::new(Some(&user.session), flash.as_ref()),
        &notice,
    )))
}

async fn guides(
    State(state): State<Arc<AppState>>,
    user: StudentUser,
    IncomingFlash(flash): IncomingFlash,
    Query(query): Query<PageQuery>,
) -> AppResult<HtmlPage> {
    let page = state.guides.list(PageRequest::new(query.page, PAGE_SIZE)).await?;
    Ok(HtmlPage(views::student::guides(
        Chrome::new(Some(&user.session), flash.as_ref()),
        &page,
    )))
}

/// 文件可读后才累加下载次数。
async fn download_guide(
    State(state): State<Arc<AppState>>,
    user: StudentUser,
    Path(id): Path<i32>,
) -> AppResult<Response> {
    let guide = state
        .guides
        .find_by_id(GuideId::new(id))
        .await?
        .ok_or(AppError::NotFound)?;
    let response = attachment(&state.storage, &guide.file_path).await?;
    state.guides.increment_downloads(guide.id).await?;

    info!(student_no = %user.session.login_no, guide_id = %guide.id, "guide downloaded");
    Ok(response)
}

async fn papers(
    State(state): State<Arc<AppState>>,
    user: StudentUser,
    IncomingFlash(flash): IncomingFlash,
    Query(query): Query<PageQuery>,
) -> AppResult<HtmlPage> {
    let page = state
        .papers
        .list_by_student(&user.session.login_no, PageRequest::new(query.page, PAGE_SIZE))
        .await?;
    let can_upload = state.workflow.current().await?.is_open(Stage::UploadEndEvaluate);

    Ok(HtmlPage(views::student::papers(
        Chrome::new(Some(&user.session), flash.as_ref()),
        &page,
        can_upload,
    )))
}

async fn upload_paper_page(
    State(state): State<Arc<AppState>>,
    user: StudentUser,
    IncomingFlash(flash): IncomingFlash,
) -> AppResult<HtmlPage> {
    require_stage(&state, Stage::UploadEndEvaluate, PAPERS_PATH).await?;

    let student = current_student(&state, &user).await?;
    let assigned = assigned_teacher(&state, &student).await?;
    let teachers = state.principals.list_all(Role::Teacher).await?;

    Ok(HtmlPage(views::student::upload_paper(
        Chrome::new(Some(&user.session), flash.as_ref()),
        &teachers,
        assigned.as_ref(),
    )))
}

/// 表单未选择教师时使用学生的指导教师；选择了则必须是已存在的教师。
async fn paper_teacher(
    state: &AppState,
    user: &StudentUser,
    selected: Option<&str>,
) -> AppResult<Option<LoginNo>> {
    let Some(selected) = selected else {
        let student = current_student(state, user).await?;
        return Ok(assigned_teacher(state, &student).await?.map(|teacher| teacher.login_no));
    };

    let unknown = || AppError::rejected("指导教师不存在", UPLOAD_PAPER_PATH);
    let teacher_no = LoginNo::new(selected).map_err(|_| unknown())?;
    match state.principals.find_by_login_no(Role::Teacher, &teacher_no).await? {
        Some(_) => Ok(Some(teacher_no)),
        None => Err(unknown()),
    }
}

async fn upload_paper(
    State(state): State<Arc<AppState>>,
    user: StudentUser,
    multipart: Multipart,
) -> AppResult<FlashRedirect> {
    require_stage(&state, Stage::UploadEndEvaluate, PAPERS_PATH).await?;

    let form = UploadForm::read(multipart, UPLOAD_PAPER_PATH).await?;
    let teacher_no = paper_teacher(&state, &user, form.field("teacher_no").and_then(non_blank)).await?;
    let paper_name = form.field("paper_name").map(str::to_string);

    state
        .submissions
        .submit_paper(PaperSubmission {
            student_no: user.session.login_no.clone(),
            file: form.file,
            paper_name,
            teacher_no,
        })
        .await
        .map_err(|err| submission_rejection(err, PAPERS_PATH, UPLOAD_PAPER_PATH))?;

    Ok(FlashRedirect::success("论文上传成功", PAPERS_PATH))
}

async fn view_paper(
    State(state): State<Arc<AppState>>,
    user: StudentUser,
    IncomingFlash(flash): IncomingFlash,
    Path(id): Path<i32>,
) -> AppResult<HtmlPage> {
    let paper = state
        .papers
        .find_for_student(PaperId::new(id), &user.session.login_no)
        .await?
        .ok_or(AppError::NotFound)?;
    let comments = state.comments.list_for_paper(paper.id).await?;

    Ok(HtmlPage(views::student::view_paper(
        Chrome::new(Some(&user.session), flash.as_ref()),
        &paper,
        &comments,
    )))
}

async fn download_paper(
    State(state): State<Arc<AppState>>,
    user: StudentUser,
    Path(id): Path<i32>,
) -> AppResult<Response> {
    let paper = state
        .papers
        .find_for_student(PaperId::new(id), &user.session.login_no)
        .await?
        .ok_or(AppError::NotFound)?;
    attachment(&state.storage, &paper.save_path).await
}

async fn comments(
    State(state): State<Arc<AppState>>,
    user: StudentUser,
    IncomingFlash(flash): IncomingFlash,
    Query(query): Query<PageQuery>,
) -> AppResult<HtmlPage> {
    let page = state
        .comments
        .list_by_student(&user.session.login_no, PageRequest::new(query.page, PAGE_SIZE))
        .await?;
    Ok(HtmlPage(views::student::comments(
        Chrome::new(Some(&user.session), flash.as_ref()),
        &page,
    )))
}

async fn profile(
    State(state): State<Arc<AppState>>,
    user: StudentUser,
    IncomingFlash(flash): IncomingFlash,
) -> AppResult<HtmlPage> {
    let student = current_student(&state, &user).await?;
    let teacher = assigned_teacher(&state, &student).await?;
    let native_places = state.references.list(LookupKind::NativePlace).await?;
    let classes = state.references.list(LookupKind::Class).await?;
    let grades = state.references.list(LookupKind::Grade).await?;

    let lookups = views::student::ProfileLookups {
        native_places: &native_places,
        classes: &classes,
        grades: &grades,
        teacher: teacher.as_ref(),
    };
    Ok(HtmlPage(views::student::profile(
        Chrome::new(Some(&user.session), flash.as_ref()),
        &student,
        &lookups,
    )))
}

async fn update_profile_page(
    State(state): State<Arc<AppState>>,
    user: StudentUser,
    IncomingFlash(flash): IncomingFlash,
) -> AppResult<HtmlPage> {
    let student = current_student(&state, &user).await?;
    let native_places = state.references.list(LookupKind::NativePlace).await?;

    Ok(HtmlPage(views::student::update_profile(
        Chrome::new(Some(&user.session), flash.as_ref()),
        &student,
        &native_places,
    )))
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    user: StudentUser,
    Form(form): Form<ProfileForm>,
) -> AppResult<FlashRedirect> {
    let profile = profile_from_form(&form.username, &form.sex, &form.birth, &form.native_place_id)
        .map_err(|err| match err {
            DomainError::TextTooLong { .. } => AppError::rejected("姓名过长", UPDATE_PROFILE_PATH),
            _ => AppError::rejected("请填写姓名", UPDATE_PROFILE_PATH),
        })?;
    let username = profile.username.clone();

    state
        .principals
        .update_profile(Role::Student, user.session.principal_id, profile)
        .await?
        .ok_or(AppError::NotFound)?;
    state.sessions.rename(&user.session_id, username).await;

    info!(student_no = %user.session.login_no, "profile updated");
    Ok(FlashRedirect::success("个人信息更新成功", "/student/profile"))
}
