use anyhow::{Context, Result};
use thesis_core::domain::{LoginNo, ProcessStatus, Role};
use tracing::info;

use super::password::hash_password_task;
use crate::api::AppState;
use crate::repository::{LookupKind, LookupRecord, NewPrincipal, Placement, Profile};

const CLASSES: [&str; 6] = [
    "计算机科学与技术1班",
    "计算机科学与技术2班",
    "软件工程1班",
    "软件工程2班",
    "网络工程1班",
    "信息安全1班",
];
const GRADES: [&str; 4] = ["2020级", "2021级", "2022级", "2023级"];
const NATIVE_PLACES: [&str; 10] = [
    "北京", "上海", "广东", "浙江", "江苏", "山东", "河南", "四川", "湖北", "福建",
];

/// What `init` actually created; tables that already had rows are skipped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub lookups_inserted: u64,
    pub admin_created: bool,
    pub teacher_created: bool,
    pub student_created: bool,
    pub process_status_created: bool,
}

/// Seeds lookup tables, the default accounts and an all-open workflow row.
pub async fn seed(state: &AppState) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for (kind, names) in [
        (LookupKind::Class, &CLASSES[..]),
        (LookupKind::Grade, &GRADES[..]),
        (LookupKind::NativePlace, &NATIVE_PLACES[..]),
    ] {
        report.lookups_inserted += state.references.insert_if_empty(kind, names).await?;
    }

    let places = state.references.list(LookupKind::NativePlace).await?;
    let classes = state.references.list(LookupKind::Class).await?;
    let grades = state.references.list(LookupKind::Grade).await?;
    let nth_id = |records: &[LookupRecord], n: usize| records.get(n).map(|r| r.id.into_inner());

    let beijing = nth_id(&places, 0);
    let shanghai = nth_id(&places, 1);
    let first_class = nth_id(&classes, 0);
    let first_grade = nth_id(&grades, 0);

    if state.principals.count(Role::Admin).await? == 0 {
        state
            .principals
            .create(NewPrincipal {
                role: Role::Admin,
                login_no: LoginNo::new("admin001")?,
                password_hash: hash_password_task("admin123".to_string()).await?,
                profile: Profile {
                    username: "系统管理员".to_string(),
                    sex: Some("男".to_string()),
                    birth: Some("1990-01-01".to_string()),
                    native_place_id: beijing,
                },
                descs: None,
                placement: Placement::default(),
            })
            .await
            .context("failed to create default admin")?;
        report.admin_created = true;
    }

    if state.principals.count(Role::Teacher).await? == 0 {
        state
            .principals
            .create(NewPrincipal {
                role: Role::Teacher,
                login_no: LoginNo::new("T001")?,
                password_hash: hash_password_task("teacher123".to_string()).await?,
                profile: Profile {
                    username: "张教授".to_string(),
                    sex: Some("男".to_string()),
                    birth: Some("1980-05-15".to_string()),
                    native_place_id: beijing,
                },
                descs: Some("计算机科学与技术专业教授，研究方向：人工智能、机器学习".to_string()),
                placement: Placement::default(),
            })
            .await
            .context("failed to create sample teacher")?;
        report.teacher_created = true;
    }

    if state.principals.count(Role::Student).await? == 0 {
        let teacher_id = state
            .principals
            .list_all(Role::Teacher)
            .await?
            .into_iter()
            .next()
            .map(|t| t.id.into_inner());

        state
            .principals
            .create(NewPrincipal {
                role: Role::Student,
                login_no: LoginNo::new("2020001001")?,
                password_hash: hash_password_task("student123".to_string()).await?,
                profile: Profile {
                    username: "李同学".to_string(),
                    sex: Some("男".to_string()),
                    birth: Some("2002-03-20".to_string()),
                    native_place_id: shanghai,
                },
                descs: None,
                placement: Placement {
                    class_id: first_class,
                    grade_id: first_grade,
                    teacher_id,
                },
            })
            .await
            .context("failed to create sample student")?;
        report.student_created = true;
    }

    report.process_status_created = state
        .process_status
        .init_if_absent(ProcessStatus::all_open())
        .await?;

    info!(?report, "database seeded");
    Ok(report)
}
