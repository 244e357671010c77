//! 管理员页面：用户、通知、流程控制与全局浏览。

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::{Form, Router, routing::get, routing::post};
use thesis_api_types::{
    NoticeForm, PageQuery, ProcessControlForm, UserForm, UserListQuery, non_blank, optional_id,
};
use thesis_core::domain::{
    DomainError, LoginNo, NoticeId, PageRequest, PrincipalId, ProcessStatus, Role, Stage,
    StageFlag,
};
use tracing::info;

use super::extract::{AdminUser, IncomingFlash};
use super::response::{AppError, AppResult, FlashRedirect, HtmlPage};
use super::state::AppState;
use super::{notice_fields, profile_from_form};
use crate::config::PAGE_SIZE;
use crate::repository::{
    LookupKind, NewNotice, NewPrincipal, NoticeEdit, Placement, PrincipalUpdate,
};
use crate::service::hash_password_task;
use crate::views::{self, Chrome};

pub fn create_admin_router() -> Router<Arc<AppState>> {
    Router::new()
        // 控制台
        .route("/admin/dashboard", get(dashboard))
        // 用户管理
        .route("/admin/users", get(users))
        .route("/admin/add_user", get(add_user_page).post(add_user))
        .route("/admin/edit_user/{id}", get(edit_user_page).post(edit_user))
        .route("/admin/delete_user/{id}", post(delete_user))
        // 通知管理
        .route("/admin/notices", get(notices))
        .route("/admin/add_notice", get(add_notice_page).post(add_notice))
        .route("/admin/edit_notice/{id}", get(edit_notice_page).post(edit_notice))
        .route("/admin/delete_notice/{id}", post(delete_notice))
        // 流程控制
        .route("/admin/process_control", get(process_control_page).post(process_control))
        // 全局浏览
        .route("/admin/papers", get(papers))
        .route("/admin/comments", get(comments))
}

/// `?type=teacher` 选择教师，其余一律视为学生。
fn listed_role(user_type: Option<&str>) -> Role {
    match user_type {
        Some("teacher") => Role::Teacher,
        _ => Role::Student,
    }
}

fn users_path(role: Role) -> String {
    format!("/admin/users?type={}", role.as_str())
}

async fn user_options(state: &AppState) -> AppResult<views::admin::UserOptions> {
    Ok(views::admin::UserOptions {
        classes: state.references.list(LookupKind::Class).await?,
        grades: state.references.list(LookupKind::Grade).await?,
        native_places: state.references.list(LookupKind::NativePlace).await?,
        teachers: state.principals.list_all(Role::Teacher).await?,
    })
}

fn placement_from_form(role: Role, form: &UserForm) -> Placement {
    match role {
        Role::Student => Placement {
            class_id: optional_id(&form.class_id),
            grade_id: optional_id(&form.grade_id),
            teacher_id: optional_id(&form.teacher_id),
        },
        _ => Placement::default(),
    }
}

fn descs_from_form(role: Role, form: &UserForm) -> Option<String> {
    match role {
        Role::Teacher => non_blank(&form.descs).map(str::to_string),
        _ => None,
    }
}

fn invalid_user_field(err: &DomainError) -> &'static str {
    match err {
        DomainError::EmptyText { .. } | DomainError::EmptyLoginNo => "请填写完整信息",
        DomainError::TextTooLong { .. } => "姓名过长",
        DomainError::InvalidLoginNoLength(_) | DomainError::InvalidLoginNoCharacters(_) => {
            "编号格式不正确"
        }
        _ => "用户信息无效",
    }
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    user: AdminUser,
    IncomingFlash(flash): IncomingFlash,
) -> AppResult<HtmlPage> {
    let stats = views::admin::DashboardStats {
        students: state.principals.count(Role::Student).await?,
        teachers: state.principals.count(Role::Teacher).await?,
        notices: state.notices.count().await?,
        papers: state.papers.count().await?,
    };
    let recent = state.notices.recent(5).await?;

    Ok(HtmlPage(views::admin::dashboard(
        Chrome::new(Some(&user.session), flash.as_ref()),
        &stats,
        &recent,
    )))
}

async fn users(
    State(state): State<Arc<AppState>>,
    user: AdminUser,
    IncomingFlash(flash): IncomingFlash,
    Query(query): Query<UserListQuery>,
) -> AppResult<HtmlPage> {
    let role = listed_role(query.user_type.as_deref());
    let page = state
        .principals
        .list(role, PageRequest::new(query.page, PAGE_SIZE))
        .await?;
    let options = user_options(&state).await?;

    Ok(HtmlPage(views::admin::users(
        Chrome::new(Some(&user.session), flash.as_ref()),
        role,
        &page,
        &options,
    )))
}

async fn add_user_page(
    State(state): State<Arc<AppState>>,
    user: AdminUser,
    IncomingFlash(flash): IncomingFlash,
) -> AppResult<HtmlPage> {
    let options = user_options(&state).await?;
    Ok(HtmlPage(views::admin::add_user(
        Chrome::new(Some(&user.session), flash.as_ref()),
        &options,
    )))
}

async fn add_user(
    State(state): State<Arc<AppState>>,
    user: AdminUser,
    Form(form): Form<UserForm>,
) -> AppResult<FlashRedirect> {
    const FORM_PATH: &str = "/admin/add_user";

    let (role, raw_login_no, duplicate) = match form.user_type.trim() {
        "student" => (Role::Student, form.student_no.as_str(), "学号已存在"),
        "teacher" => (Role::Teacher, form.teacher_no.as_str(), "教师编号已存在"),
        _ => return Err(AppError::rejected("无效的用户类型", FORM_PATH)),
    };

    if form.password.is_empty() {
        return Err(AppError::rejected("请填写完整信息", FORM_PATH));
    }
    let login_no = LoginNo::new(raw_login_no)
        .map_err(|err| AppError::rejected(invalid_user_field(&err), FORM_PATH))?;
    let profile = profile_from_form(&form.username, &form.sex, &form.birth, &form.native_place_id)
        .map_err(|err| AppError::rejected(invalid_user_field(&err), FORM_PATH))?;

    if state.principals.find_by_login_no(role, &login_no).await?.is_some() {
        return Err(AppError::rejected(duplicate, FORM_PATH));
    }

    let created = state
        .principals
        .create(NewPrincipal {
            role,
            login_no,
            password_hash: hash_password_task(form.password.clone()).await?,
            profile,
            descs: descs_from_form(role, &form),
            placement: placement_from_form(role, &form),
        })
        .await?;

    info!(
        admin = %user.session.login_no,
        role = %role,
        login_no = %created.login_no,
        "user created"
    );
    Ok(FlashRedirect::success("用户添加成功", users_path(role)))
}

async fn edit_user_page(
    State(state): State<Arc<AppState>>,
    user: AdminUser,
    IncomingFlash(flash): IncomingFlash,
    Path(id): Path<i32>,
    Query(query): Query<UserListQuery>,
) -> AppResult<HtmlPage> {
    let role = listed_role(query.user_type.as_deref());
    let target = state
        .principals
        .find_by_id(role, PrincipalId::new(id))
        .await?
        .ok_or(AppError::NotFound)?;
    let options = user_options(&state).await?;

    Ok(HtmlPage(views::admin::edit_user(
        Chrome::new(Some(&user.session), flash.as_ref()),
        &target,
        &options,
    )))
}

async fn edit_user(
    State(state): State<Arc<AppState>>,
    user: AdminUser,
    Path(id): Path<i32>,
    Query(query): Query<UserListQuery>,
    Form(form): Form<UserForm>,
) -> AppResult<FlashRedirect> {
    let role = listed_role(query.user_type.as_deref());
    let form_path = format!("/admin/edit_user/{id}?type={}", role.as_str());

    let profile = profile_from_form(&form.username, &form.sex, &form.birth, &form.native_place_id)
        .map_err(|err| AppError::rejected(invalid_user_field(&err), form_path.as_str()))?;
    let password_hash = if form.password.is_empty() {
        None
    } else {
        Some(hash_password_task(form.password.clone()).await?)
    };

    let update = PrincipalUpdate {
        profile,
        password_hash,
        descs: descs_from_form(role, &form),
        placement: placement_from_form(role, &form),
    };
    let updated = state
        .principals
        .update(role, PrincipalId::new(id), update)
        .await?
        .ok_or(AppError::NotFound)?;

    info!(
        admin = %user.session.login_no,
        role = %role,
        login_no = %updated.login_no,
        "user updated"
    );
    Ok(FlashRedirect::success("用户信息更新成功", users_path(role)))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    user: AdminUser,
    Path(id): Path<i32>,
    Query(query): Query<UserListQuery>,
) -> AppResult<FlashRedirect> {
    let role = listed_role(query.user_type.as_deref());
    if !state.principals.delete(role, PrincipalId::new(id)).await? {
        return Err(AppError::NotFound);
    }

    info!(admin = %user.session.login_no, role = %role, id, "user deleted");
    Ok(FlashRedirect::success("用户删除成功", users_path(role)))
}

async fn notices(
    State(state): State<Arc<AppState>>,
    user: AdminUser,
    IncomingFlash(flash): IncomingFlash,
    Query(query): Query<PageQuery>,
) -> AppResult<HtmlPage> {
    let page = state.notices.list(PageRequest::new(query.page, PAGE_SIZE)).await?;
    Ok(HtmlPage(views::admin::notices(
        Chrome::new(Some(&user.session), flash.as_ref()),
        &page,
    )))
}

async fn add_notice_page(user: AdminUser, IncomingFlash(flash): IncomingFlash) -> HtmlPage {
    HtmlPage(views::admin::add_notice(Chrome::new(Some(&user.session), flash.as_ref())))
}

async fn add_notice(
    State(state): State<Arc<AppState>>,
    user: AdminUser,
    Form(form): Form<NoticeForm>,
) -> AppResult<FlashRedirect> {
    let (title, content, lead_foot) = notice_fields(&form, "/admin/add_notice")?;
    let notice = state
        .notices
        .create(NewNotice {
            title,
            content,
            lead_foot,
            publisher_role: Role::Admin,
            publisher_no: user.session.login_no.clone(),
        })
        .await?;

    info!(admin = %user.session.login_no, notice_id = %notice.id, "notice published");
    Ok(FlashRedirect::success("通知发布成功", "/admin/notices"))
}

async fn edit_notice_page(
    State(state): State<Arc<AppState>>,
    user: AdminUser,
    IncomingFlash(flash): IncomingFlash,
    Path(id): Path<i32>,
) -> AppResult<HtmlPage> {
    let notice = state
        .notices
        .find_by_id(NoticeId::new(id))
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(HtmlPage(views::admin::edit_notice(
        Chrome::new(Some(&user.session), flash.as_ref()),
        &notice,
    )))
}

async fn edit_notice(
    State(state): State<Arc<AppState>>,
    user: AdminUser,
    Path(id): Path<i32>,
    Form(form): Form<NoticeForm>,
) -> AppResult<FlashRedirect> {
    let form_path = format!("/admin/edit_notice/{id}");
    let (title, content, lead_foot) = notice_fields(&form, &form_path)?;
    state
        .notices
        .update(NoticeId::new(id), NoticeEdit { title, content, lead_foot })
        .await?
        .ok_or(AppError::NotFound)?;

    info!(admin = %user.session.login_no, notice_id = id, "notice updated");
    Ok(FlashRedirect::success("通知更新成功", "/admin/notices"))
}

async fn delete_notice(
    State(state): State<Arc<AppState>>,
    user: AdminUser,
    Path(id): Path<i32>,
) -> AppResult<FlashRedirect> {
    if !state.notices.delete(NoticeId::new(id)).await? {
        return Err(AppError::NotFound);
    }

    info!(admin = %user.session.login_no, notice_id = id, "notice deleted");
    Ok(FlashRedirect::success("通知删除成功", "/admin/notices"))
}

async fn process_control_page(
    State(state): State<Arc<AppState>>,
    user: AdminUser,
    IncomingFlash(flash): IncomingFlash,
) -> AppResult<HtmlPage> {
    let status = state.workflow.current().await?;
    Ok(HtmlPage(views::admin::process_control(
        Chrome::new(Some(&user.session), flash.as_ref()),
        &status,
    )))
}

/// 未勾选的复选框不会提交，因此缺省即关闭。
fn status_from_form(form: &ProcessControlForm) -> ProcessStatus {
    let submitted = |stage: Stage| -> bool {
        match stage {
            Stage::ReleasingNotices => form.releasing_notices.is_some(),
            Stage::CompletePersonalData => form.complete_personal_data.is_some(),
            Stage::UploadPaperGuide => form.upload_paper_guide.is_some(),
            Stage::UploadEndEvaluate => form.upload_end_evaluate.is_some(),
        }
    };

    Stage::ALL
        .into_iter()
        .fold(ProcessStatus::all_closed(), |status, stage| {
            status.with(stage, StageFlag::from(submitted(stage)))
        })
}

async fn process_control(
    State(state): State<Arc<AppState>>,
    user: AdminUser,
    Form(form): Form<ProcessControlForm>,
) -> AppResult<FlashRedirect> {
    state.workflow.update(status_from_form(&form)).await?;

    info!(admin = %user.session.login_no, "process status changed");
    Ok(FlashRedirect::success("进程状态更新成功", "/admin/process_control"))
}

async fn papers(
    State(state): State<Arc<AppState>>,
    user: AdminUser,
    IncomingFlash(flash): IncomingFlash,
    Query(query): Query<PageQuery>,
) -> AppResult<HtmlPage> {
    let page = state.papers.list(PageRequest::new(query.page, PAGE_SIZE)).await?;
    Ok(HtmlPage(views::admin::papers(
        Chrome::new(Some(&user.session), flash.as_ref()),
        &page,
    )))
}

async fn comments(
    State(state): State<Arc<AppState>>,
    user: AdminUser,
    IncomingFlash(flash): IncomingFlash,
    Query(query): Query<PageQuery>,
) -> AppResult<HtmlPage> {
    let page = state.comments.list(PageRequest::new(query.page, PAGE_SIZE)).await?;
    Ok(HtmlPage(views::admin::comments(
        Chrome::new(Some(&user.session), flash.as_ref()),
        &page,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchecked_boxes_close_their_stage() {
        let form = ProcessControlForm {
            releasing_notices: Some("1".to_string()),
            upload_end_evaluate: Some("1".to_string()),
            ..ProcessControlForm::default()
        };
        let status = status_from_form(&form);

        assert!(status.is_open(Stage::ReleasingNotices));
        assert!(!status.is_open(Stage::CompletePersonalData));
        assert!(!status.is_open(Stage::UploadPaperGuide));
        assert!(status.is_open(Stage::UploadEndEvaluate));
    }

    #[test]
    fn unknown_list_type_falls_back_to_students() {
        assert_eq!(listed_role(Some("teacher")), Role::Teacher);
        assert_eq!(listed_role(Some("admin")), Role::Student);
        assert_eq!(listed_role(None), Role::Student);
    }
}
