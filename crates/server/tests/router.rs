mod common;

use axum::Router;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use common::{
    ADMIN_NO, STUDENT_NO, TEACHER_NO, close_everything, login_no, principal, seeded_state,
    set_stage,
};
use thesis_api_types::{Flash, FlashLevel};
use thesis_core::domain::{PageRequest, Role, Stage, StageFlag};
use thesis_server::api::create_router;
use thesis_server::api::response::{FLASH_COOKIE, decode_flash};
use thesis_server::session::SESSION_COOKIE;
use tower::ServiceExt;

const BOUNDARY: &str = "thesis-test-boundary";

fn cookie_value(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn flash(response: &Response) -> Option<Flash> {
    cookie_value(response, FLASH_COOKIE).and_then(|value| decode_flash(&value))
}

fn location(response: &Response) -> Option<&str> {
    response.headers().get(LOCATION).and_then(|value| value.to_str().ok())
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.expect("router should respond")
}

async fn login(app: &Router, role: &str, login_no: &str, password: &str) -> Response {
    let body = format!("username={login_no}&password={password}&user_type={role}");
    send(
        app,
        Request::post("/auth/login")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("request should build"),
    )
    .await
}

async fn session_cookie(app: &Router, role: &str, login_no: &str, password: &str) -> String {
    let response = login(app, role, login_no, password).await;
    let value = cookie_value(&response, SESSION_COOKIE).expect("login should set a session cookie");
    format!("{SESSION_COOKIE}={value}")
}

fn get(path: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(path);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request should build")
}

fn post_form(path: &str, cookie: &str, body: &str) -> Request<Body> {
    Request::post(path)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(COOKIE, cookie)
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

fn multipart(path: &str, cookie: &str, fields: &[(&str, &str)], file_name: &str, bytes: &str) -> Request<Body> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n\
         {bytes}\r\n\
         --{BOUNDARY}--\r\n"
    ));
    Request::post(path)
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .header(COOKIE, cookie)
        .body(Body::from(body))
        .expect("request should build")
}

fn paper_upload(cookie: &str, file_name: &str, bytes: &str) -> Request<Body> {
    paper_upload_for(cookie, "", file_name, bytes)
}

fn paper_upload_for(cookie: &str, teacher_no: &str, file_name: &str, bytes: &str) -> Request<Body> {
    multipart(
        "/student/upload_paper",
        cookie,
        &[("paper_name", ""), ("teacher_no", teacher_no)],
        file_name,
        bytes,
    )
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    String::from_utf8_lossy(&bytes).into_owned()
}

#[tokio::test]
async fn test_health_check() {
    let app = create_router(seeded_state("thesis-router-health").await);

    let response = send(&app, get("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let app = create_router(seeded_state("thesis-router-404").await);

    let response = send(&app, get("/no/such/page", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_redirects_to_role_dashboard() {
    let app = create_router(seeded_state("thesis-router-login").await);

    let response = login(&app, "student", STUDENT_NO, "student123").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/student/dashboard"));
    assert!(cookie_value(&response, SESSION_COOKIE).is_some());
    let message = flash(&response).expect("login should leave a flash message");
    assert_eq!(message.level, FlashLevel::Success);
}

#[tokio::test]
async fn test_login_with_wrong_role_is_rejected() {
    let app = create_router(seeded_state("thesis-router-wrong-role").await);

    let response = login(&app, "teacher", STUDENT_NO, "student123").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/auth/login"));
    assert!(cookie_value(&response, SESSION_COOKIE).is_none());
    assert_eq!(
        flash(&response).map(|f| f.message),
        Some("用户名或密码错误".to_string())
    );
}

#[tokio::test]
async fn test_role_guard_redirects_to_login() {
    let app = create_router(seeded_state("thesis-router-guard").await);

    let anonymous = send(&app, get("/admin/dashboard", None)).await;
    assert_eq!(anonymous.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&anonymous), Some("/auth/login"));

    let cookie = session_cookie(&app, "student", STUDENT_NO, "student123").await;
    let forbidden = send(&app, get("/admin/dashboard", Some(&cookie))).await;
    assert_eq!(forbidden.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&forbidden), Some("/auth/login"));
    assert_eq!(
        flash(&forbidden).map(|f| f.message),
        Some("需要管理员权限".to_string())
    );

    let allowed = send(&app, get("/student/dashboard", Some(&cookie))).await;
    assert_eq!(allowed.status(), StatusCode::OK);
    let body = axum::body::to_bytes(allowed.into_body(), usize::MAX)
        .await
        .expect("body should read");
    assert!(String::from_utf8_lossy(&body).contains("学生控制台"));
}

#[tokio::test]
async fn test_logout_ends_the_session() {
    let app = create_router(seeded_state("thesis-router-logout").await);
    let cookie = session_cookie(&app, "teacher", TEACHER_NO, "teacher123").await;

    let response = send(&app, get("/auth/logout", Some(&cookie))).await;
    assert_eq!(location(&response), Some("/auth/login"));

    let after = send(&app, get("/teacher/dashboard", Some(&cookie))).await;
    assert_eq!(after.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&after), Some("/auth/login"));
}

#[tokio::test]
async fn test_paper_upload_defaults_to_assigned_teacher() {
    let state = seeded_state("thesis-router-upload").await;
    let app = create_router(state.clone());
    let cookie = session_cookie(&app, "student", STUDENT_NO, "student123").await;

    let response = send(&app, paper_upload(&cookie, "final.pdf", "%PDF-1.4")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/student/papers"));
    assert_eq!(
        flash(&response).map(|f| f.message),
        Some("论文上传成功".to_string())
    );

    let paper = state
        .papers
        .latest_for_student(&login_no(STUDENT_NO))
        .await
        .expect("paper should load")
        .expect("paper should exist");
    assert_eq!(paper.paper_name, "final.pdf");
    assert_eq!(paper.teacher_no.as_deref(), Some(TEACHER_NO));

    let download = send(
        &app,
        get(&format!("/student/download_paper/{}", paper.id), Some(&cookie)),
    )
    .await;
    assert_eq!(download.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(download.into_body(), usize::MAX)
        .await
        .expect("body should read");
    assert_eq!(&bytes[..], b"%PDF-1.4");
}

#[tokio::test]
async fn test_paper_upload_blocked_when_stage_closed() {
    let state = seeded_state("thesis-router-closed").await;
    let app = create_router(state.clone());
    let cookie = session_cookie(&app, "student", STUDENT_NO, "student123").await;
    close_everything(&state).await;

    let form = send(&app, get("/student/upload_paper", Some(&cookie))).await;
    assert_eq!(location(&form), Some("/student/papers"));

    let response = send(&app, paper_upload(&cookie, "final.pdf", "%PDF-1.4")).await;
    assert_eq!(location(&response), Some("/student/papers"));
    assert_eq!(
        flash(&response).map(|f| f.message),
        Some("当前不允许上传论文".to_string())
    );
    assert_eq!(state.papers.count().await.expect("count"), 0);
}

#[tokio::test]
async fn test_teacher_cannot_review_unsupervised_paper() {
    let state = seeded_state("thesis-router-review").await;
    let app = create_router(state.clone());
    let cookie = session_cookie(&app, "teacher", TEACHER_NO, "teacher123").await;

    let response = send(&app, get("/teacher/review_paper/999", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_huge_page_number_renders_empty_list() {
    let app = create_router(seeded_state("thesis-router-huge-page").await);
    let cookie = session_cookie(&app, "student", STUDENT_NO, "student123").await;

    for path in [
        "/student/notices?page=9223372036854775807",
        "/student/guides?page=9223372036854775807",
        "/student/papers?page=9223372036854775807",
        "/student/comments?page=9223372036854775807",
    ] {
        let response = send(&app, get(path, Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::OK, "{path}");
    }

    let admin = session_cookie(&app, "admin", ADMIN_NO, "admin123").await;
    let response = send(
        &app,
        get("/admin/users?type=student&page=9223372036854775807", Some(&admin)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(!body.contains(STUDENT_NO));
}

#[tokio::test]
async fn test_teacher_notice_blocked_when_stage_closed() {
    let state = seeded_state("thesis-router-notice-closed").await;
    let app = create_router(state.clone());
    let cookie = session_cookie(&app, "teacher", TEACHER_NO, "teacher123").await;
    set_stage(&state, Stage::ReleasingNotices, StageFlag::Closed).await;
    let before = state.notices.count().await.expect("count");

    let form = send(&app, get("/teacher/add_notice", Some(&cookie))).await;
    assert_eq!(form.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&form), Some("/teacher/notices"));
    assert_eq!(
        flash(&form).map(|f| f.message),
        Some("当前不允许发布通知".to_string())
    );

    let response = send(
        &app,
        post_form(
            "/teacher/add_notice",
            &cookie,
            "title=%E5%BC%80%E9%A2%98&content=%E4%B8%8B%E5%91%A8%E4%B8%80&lead_foot=",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/teacher/notices"));
    assert_eq!(
        flash(&response).map(|f| f.message),
        Some("当前不允许发布通知".to_string())
    );
    assert_eq!(state.notices.count().await.expect("count"), before);
}

#[tokio::test]
async fn test_process_control_close_then_reopen_upload() {
    let state = seeded_state("thesis-router-reopen").await;
    let app = create_router(state.clone());
    let admin = session_cookie(&app, "admin", ADMIN_NO, "admin123").await;
    let student = session_cookie(&app, "student", STUDENT_NO, "student123").await;

    let closed = send(
        &app,
        post_form(
            "/admin/process_control",
            &admin,
            "releasing_notices=1&complete_personal_data=1&upload_paper_guide=1",
        ),
    )
    .await;
    assert_eq!(location(&closed), Some("/admin/process_control"));
    assert_eq!(
        flash(&closed).map(|f| f.message),
        Some("进程状态更新成功".to_string())
    );

    let rejected = send(&app, paper_upload(&student, "final.pdf", "%PDF-1.4")).await;
    assert_eq!(location(&rejected), Some("/student/papers"));
    assert_eq!(
        flash(&rejected).map(|f| f.message),
        Some("当前不允许上传论文".to_string())
    );
    assert_eq!(state.papers.count().await.expect("count"), 0);

    let reopened = send(
        &app,
        post_form(
            "/admin/process_control",
            &admin,
            "releasing_notices=1&complete_personal_data=1&upload_paper_guide=1&upload_end_evaluate=1",
        ),
    )
    .await;
    assert_eq!(location(&reopened), Some("/admin/process_control"));

    let accepted = send(&app, paper_upload(&student, "final.pdf", "%PDF-1.4")).await;
    assert_eq!(location(&accepted), Some("/student/papers"));
    assert_eq!(
        flash(&accepted).map(|f| f.message),
        Some("论文上传成功".to_string())
    );
    assert_eq!(state.papers.count().await.expect("count"), 1);
}

#[tokio::test]
async fn test_guide_upload_blocked_when_stage_closed() {
    let state = seeded_state("thesis-router-guide-closed").await;
    let app = create_router(state.clone());
    let cookie = session_cookie(&app, "teacher", TEACHER_NO, "teacher123").await;
    set_stage(&state, Stage::UploadPaperGuide, StageFlag::Closed).await;

    let form = send(&app, get("/teacher/upload_guide", Some(&cookie))).await;
    assert_eq!(location(&form), Some("/teacher/guides"));

    let response = send(
        &app,
        multipart(
            "/teacher/upload_guide",
            &cookie,
            &[("file_name", "")],
            "outline.docx",
            "outline",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/teacher/guides"));
    assert_eq!(
        flash(&response).map(|f| f.message),
        Some("当前不允许上传指导资料".to_string())
    );
    assert_eq!(
        state
            .guides
            .count_by_teacher(&login_no(TEACHER_NO))
            .await
            .expect("count"),
        0
    );
}

#[tokio::test]
async fn test_closed_upload_checked_before_teacher_choice() {
    let state = seeded_state("thesis-router-closed-teacher").await;
    let app = create_router(state.clone());
    let cookie = session_cookie(&app, "student", STUDENT_NO, "student123").await;
    set_stage(&state, Stage::UploadEndEvaluate, StageFlag::Closed).await;

    let response = send(&app, paper_upload_for(&cookie, "T999", "final.pdf", "%PDF-1.4")).await;
    assert_eq!(location(&response), Some("/student/papers"));
    assert_eq!(
        flash(&response).map(|f| f.message),
        Some("当前不允许上传论文".to_string())
    );
    assert_eq!(state.papers.count().await.expect("count"), 0);
}

#[tokio::test]
async fn test_admin_deleting_student_keeps_papers_and_comments() {
    let state = seeded_state("thesis-router-delete-student").await;
    let app = create_router(state.clone());
    let student = session_cookie(&app, "student", STUDENT_NO, "student123").await;
    let teacher = session_cookie(&app, "teacher", TEACHER_NO, "teacher123").await;
    let admin = session_cookie(&app, "admin", ADMIN_NO, "admin123").await;

    let uploaded = send(&app, paper_upload(&student, "final.pdf", "%PDF-1.4")).await;
    assert_eq!(location(&uploaded), Some("/student/papers"));
    let paper = state
        .papers
        .latest_for_student(&login_no(STUDENT_NO))
        .await
        .expect("paper should load")
        .expect("paper should exist");

    let reviewed = send(
        &app,
        post_form(
            &format!("/teacher/review_paper/{}", paper.id),
            &teacher,
            "content=%E8%AF%B7%E8%A1%A5%E5%85%85%E5%AE%9E%E9%AA%8C",
        ),
    )
    .await;
    assert_eq!(location(&reviewed), Some("/teacher/papers"));

    let target = principal(&state, Role::Student, STUDENT_NO).await;
    let deleted = send(
        &app,
        post_form(&format!("/admin/delete_user/{}?type=student", target.id), &admin, ""),
    )
    .await;
    assert_eq!(location(&deleted), Some("/admin/users?type=student"));
    assert_eq!(
        flash(&deleted).map(|f| f.message),
        Some("用户删除成功".to_string())
    );

    let students = state
        .principals
        .list(Role::Student, PageRequest::first(10))
        .await
        .expect("student page should load");
    assert!(students.items.iter().all(|s| s.login_no.as_str() != STUDENT_NO));

    assert!(state
        .papers
        .latest_for_student(&login_no(STUDENT_NO))
        .await
        .expect("paper should load")
        .is_some());
    assert_eq!(state.papers.count().await.expect("count"), 1);
    assert_eq!(
        state
            .comments
            .count_by_student(&login_no(STUDENT_NO))
            .await
            .expect("count"),
        1
    );

    let again = send(
        &app,
        post_form(&format!("/admin/delete_user/{}?type=student", target.id), &admin, ""),
    )
    .await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}
