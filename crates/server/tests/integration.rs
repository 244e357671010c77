mod common;

use std::path::Path;

use common::{
    ADMIN_NO, STUDENT_NO, TEACHER_NO, close_everything, login_no, principal, seeded_state,
    set_stage, upload,
};
use thesis_core::domain::{
    CommentContent, DocumentName, DomainError, PageRequest, ProcessStatus, Role, Stage, StageFlag,
};
use thesis_server::repository::{NewComment, NewGuide};
use thesis_server::service::{
    AuthError, GateError, GuideSubmission, PaperSubmission, SubmissionError, seed,
};

fn paper_submission(file_name: &str, bytes: &[u8]) -> PaperSubmission {
    PaperSubmission {
        student_no: login_no(STUDENT_NO),
        file: Some(upload(file_name, bytes)),
        paper_name: None,
        teacher_no: Some(login_no(TEACHER_NO)),
    }
}

#[tokio::test]
async fn test_seed_is_idempotent() {
    let state = seeded_state("thesis-seed").await;

    let second = seed(&state).await.expect("second seed should succeed");
    assert_eq!(second.lookups_inserted, 0);
    assert!(!second.admin_created);
    assert!(!second.teacher_created);
    assert!(!second.student_created);
    assert!(!second.process_status_created);

    assert_eq!(state.principals.count(Role::Admin).await.expect("count"), 1);
    assert_eq!(state.principals.count(Role::Teacher).await.expect("count"), 1);
    assert_eq!(state.principals.count(Role::Student).await.expect("count"), 1);
    assert_eq!(
        state.workflow.current().await.expect("status"),
        ProcessStatus::all_open()
    );
}

#[tokio::test]
async fn test_seeded_student_is_assigned_to_seeded_teacher() {
    let state = seeded_state("thesis-seed-assign").await;
    let teacher = principal(&state, Role::Teacher, TEACHER_NO).await;
    let student = principal(&state, Role::Student, STUDENT_NO).await;

    assert_eq!(student.placement.teacher_id, Some(teacher.id.into_inner()));
    assert!(student.placement.class_id.is_some());
    assert!(student.placement.grade_id.is_some());

    let supervised = state
        .principals
        .list_students_of(teacher.id)
        .await
        .expect("students should load");
    assert_eq!(supervised.len(), 1);
    assert_eq!(supervised[0].login_no.as_str(), STUDENT_NO);
}

#[tokio::test]
async fn test_login_checks_only_the_claimed_role() {
    let state = seeded_state("thesis-login").await;

    let student = state
        .auth
        .login(Role::Student, STUDENT_NO, "student123")
        .await
        .expect("student should log in");
    assert_eq!(student.role, Role::Student);

    let wrong_role = state.auth.login(Role::Teacher, STUDENT_NO, "student123").await;
    assert!(matches!(wrong_role, Err(AuthError::InvalidCredentials)));

    let wrong_password = state.auth.login(Role::Admin, ADMIN_NO, "nope").await;
    assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));

    let malformed = state.auth.login(Role::Admin, "../admin", "admin123").await;
    assert!(matches!(malformed, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_change_password_validates_in_order() {
    let state = seeded_state("thesis-password").await;
    let teacher = principal(&state, Role::Teacher, TEACHER_NO).await;

    let wrong_old = state
        .auth
        .change_password(Role::Teacher, teacher.id, "bad", "new-secret", "new-secret")
        .await;
    assert!(matches!(wrong_old, Err(AuthError::WrongPassword)));

    let empty = state
        .auth
        .change_password(Role::Teacher, teacher.id, "teacher123", "", "")
        .await;
    assert!(matches!(empty, Err(AuthError::EmptyPassword)));

    let mismatch = state
        .auth
        .change_password(Role::Teacher, teacher.id, "teacher123", "new-secret", "other")
        .await;
    assert!(matches!(mismatch, Err(AuthError::PasswordMismatch)));

    state
        .auth
        .change_password(Role::Teacher, teacher.id, "teacher123", "new-secret", "new-secret")
        .await
        .expect("password change should succeed");

    assert!(state.auth.login(Role::Teacher, TEACHER_NO, "teacher123").await.is_err());
    assert!(state.auth.login(Role::Teacher, TEACHER_NO, "new-secret").await.is_ok());
}

#[tokio::test]
async fn test_gate_follows_process_status() {
    let state = seeded_state("thesis-gate").await;

    assert!(state.workflow.ensure_open(Stage::ReleasingNotices).await.is_ok());

    set_stage(&state, Stage::ReleasingNotices, StageFlag::Closed).await;
    let closed = state.workflow.ensure_open(Stage::ReleasingNotices).await;
    assert!(matches!(closed, Err(GateError::Closed(Stage::ReleasingNotices))));

    assert!(state.workflow.ensure_open(Stage::UploadEndEvaluate).await.is_ok());

    set_stage(&state, Stage::ReleasingNotices, StageFlag::Open).await;
    assert!(state.workflow.ensure_open(Stage::ReleasingNotices).await.is_ok());
}

#[tokio::test]
async fn test_closed_upload_stage_stores_nothing() {
    let state = seeded_state("thesis-upload-closed").await;
    close_everything(&state).await;

    let result = state
        .submissions
        .submit_paper(paper_submission("thesis.pdf", b"%PDF-1.4"))
        .await;
    assert!(matches!(
        result,
        Err(SubmissionError::StageClosed(Stage::UploadEndEvaluate))
    ));

    let count = state
        .papers
        .count_by_student(&login_no(STUDENT_NO))
        .await
        .expect("count should succeed");
    assert_eq!(count, 0);
    assert!(!state.storage.root().join("papers").exists());
}

#[tokio::test]
async fn test_resubmission_replaces_previous_paper() {
    let state = seeded_state("thesis-replace").await;

    let first = state
        .submissions
        .submit_paper(paper_submission("draft.pdf", b"first draft"))
        .await
        .expect("first upload should succeed");
    assert_eq!(first.paper_name, "draft.pdf");
    assert!(Path::new(&first.save_path).exists());

    let second = state
        .submissions
        .submit_paper(PaperSubmission {
            paper_name: Some("毕业论文终稿".to_string()),
            ..paper_submission("final.docx", b"final version")
        })
        .await
        .expect("second upload should succeed");

    let papers = state
        .papers
        .list_by_student(&login_no(STUDENT_NO), PageRequest::first(10))
        .await
        .expect("papers should load");
    assert_eq!(papers.total, 1);
    assert_eq!(papers.items[0].id, second.id);
    assert_eq!(papers.items[0].paper_name, "毕业论文终稿");
    assert_eq!(papers.items[0].teacher_no.as_deref(), Some(TEACHER_NO));

    assert!(!Path::new(&first.save_path).exists());
    let stored = tokio::fs::read(&second.save_path).await.expect("new file should exist");
    assert_eq!(stored, b"final version");
}

#[tokio::test]
async fn test_disallowed_extension_is_rejected_before_storage() {
    let state = seeded_state("thesis-extension").await;

    let result = state
        .submissions
        .submit_paper(paper_submission("payload.exe", b"MZ"))
        .await;
    assert!(matches!(
        result,
        Err(SubmissionError::Invalid(DomainError::DisallowedFileType(_)))
    ));

    let missing = state
        .submissions
        .submit_paper(PaperSubmission {
            file: None,
            ..paper_submission("unused.pdf", b"")
        })
        .await;
    assert!(matches!(missing, Err(SubmissionError::MissingFile)));

    assert_eq!(
        state.papers.count().await.expect("count should succeed"),
        0
    );
    assert!(!state.storage.root().join("papers").exists());
}

#[tokio::test]
async fn test_guides_accumulate_and_count_downloads() {
    let state = seeded_state("thesis-guides").await;

    for name in ["outline.docx", "template.doc"] {
        state
            .submissions
            .upload_guide(GuideSubmission {
                teacher_no: login_no(TEACHER_NO),
                file: Some(upload(name, b"guide")),
                display_name: None,
            })
            .await
            .expect("guide upload should succeed");
    }

    let guides = state
        .guides
        .list_by_teacher(&login_no(TEACHER_NO), PageRequest::first(10))
        .await
        .expect("guides should load");
    assert_eq!(guides.total, 2);

    let guide = &guides.items[0];
    assert_eq!(guide.download_time, 0);
    assert!(state.guides.increment_downloads(guide.id).await.expect("increment"));
    assert!(state.guides.increment_downloads(guide.id).await.expect("increment"));

    let reloaded = state
        .guides
        .find_by_id(guide.id)
        .await
        .expect("guide should load")
        .expect("guide should exist");
    assert_eq!(reloaded.download_time, 2);
}

#[tokio::test]
async fn test_guide_upload_respects_its_own_stage() {
    let state = seeded_state("thesis-guide-stage").await;
    set_stage(&state, Stage::UploadPaperGuide, StageFlag::Closed).await;

    let result = state
        .submissions
        .upload_guide(GuideSubmission {
            teacher_no: login_no(TEACHER_NO),
            file: Some(upload("outline.docx", b"guide")),
            display_name: Some("开题指导".to_string()),
        })
        .await;
    assert!(matches!(
        result,
        Err(SubmissionError::StageClosed(Stage::UploadPaperGuide))
    ));
    assert_eq!(
        state
            .guides
            .count_by_teacher(&login_no(TEACHER_NO))
            .await
            .expect("count should succeed"),
        0
    );
}

#[tokio::test]
async fn test_deleting_teacher_orphans_dependents() {
    let state = seeded_state("thesis-delete").await;
    let teacher = principal(&state, Role::Teacher, TEACHER_NO).await;

    let paper = state
        .submissions
        .submit_paper(paper_submission("thesis.pdf", b"content"))
        .await
        .expect("upload should succeed");
    state
        .comments
        .create(NewComment {
            paper_id: paper.id,
            teacher_no: login_no(TEACHER_NO),
            student_no: STUDENT_NO.to_string(),
            content: CommentContent::new("结构清晰，补充实验数据").expect("valid comment"),
        })
        .await
        .expect("comment should be saved");
    state
        .guides
        .create(NewGuide {
            file_path: "guides/T001/missing.pdf".to_string(),
            file_name: DocumentName::new("missing.pdf").expect("valid name"),
            teacher_no: login_no(TEACHER_NO),
        })
        .await
        .expect("guide should be saved");

    assert!(state
        .principals
        .delete(Role::Teacher, teacher.id)
        .await
        .expect("delete should succeed"));
    assert!(!state
        .principals
        .delete(Role::Teacher, teacher.id)
        .await
        .expect("second delete should succeed"));

    let teachers = state
        .principals
        .list_all(Role::Teacher)
        .await
        .expect("teachers should load");
    assert!(teachers.iter().all(|t| t.login_no.as_str() != TEACHER_NO));
    let listed = state
        .principals
        .list(Role::Teacher, PageRequest::first(10))
        .await
        .expect("teacher page should load");
    assert!(listed.items.iter().all(|t| t.login_no.as_str() != TEACHER_NO));
    assert_eq!(listed.total, teachers.len() as u64);

    let student = principal(&state, Role::Student, STUDENT_NO).await;
    assert_eq!(student.placement.teacher_id, None);

    assert_eq!(state.papers.count().await.expect("count"), 1);
    assert_eq!(
        state
            .comments
            .count_by_teacher(&login_no(TEACHER_NO))
            .await
            .expect("count"),
        1
    );
    assert_eq!(
        state
            .guides
            .count_by_teacher(&login_no(TEACHER_NO))
            .await
            .expect("count"),
        1
    );
}
