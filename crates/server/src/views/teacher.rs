use maud::{Markup, html};
use thesis_core::domain::{Page, Stage};

use super::shared::{
    comment_list, notice_form, notice_table, paper_table, recent_notices, stage_closed_hint,
    upload_field,
};
use super::{Chrome, format_time, layout, lookup_name, or_dash, pagination};
use crate::repository::{
    CommentRecord, GuideRecord, LookupRecord, NoticeRecord, PaperRecord, PrincipalRecord,
};

pub struct DashboardStats {
    pub students: u64,
    pub guides: u64,
    pub papers: u64,
    pub comments: u64,
}

fn student_table(students: &[PrincipalRecord], classes: &[LookupRecord], grades: &[LookupRecord]) -> Markup {
    html! {
        @if students.is_empty() {
            p { "暂无指导学生" }
        } @else {
            table {
                thead { tr { th { "学号" } th { "姓名" } th { "性别" } th { "班级" } th { "年级" } } }
                tbody {
                    @for student in students {
                        tr {
                            td { (student.login_no.as_str()) }
                            td { (student.profile.username) }
                            td { (or_dash(student.profile.sex.as_deref())) }
                            td { (lookup_name(classes, student.placement.class_id)) }
                            td { (lookup_name(grades, student.placement.grade_id)) }
                        }
                    }
                }
            }
        }
    }
}

pub fn dashboard(
    chrome: Chrome<'_>,
    stats: &DashboardStats,
    notices: &[NoticeRecord],
    students: &[PrincipalRecord],
    classes: &[LookupRecord],
    grades: &[LookupRecord],
) -> Markup {
    let body = html! {
        ul class="stats" {
            li { "指导学生：" (stats.students) }
            li { "指导资料：" (stats.guides) }
            li { "收到论文：" (stats.papers) }
            li { "批阅次数：" (stats.comments) }
        }
        (recent_notices(notices))
        h2 { "我的学生" }
        (student_table(students, classes, grades))
    };
    layout("教师控制台", chrome, body)
}

pub fn notices(chrome: Chrome<'_>, page: &Page<NoticeRecord>, can_publish: bool) -> Markup {
    let body = html! {
        @if can_publish {
            p { a href="/teacher/add_notice" { "发布通知" } }
        } @else {
            (stage_closed_hint(Stage::ReleasingNotices))
        }
        (notice_table(page, "/teacher/notices", None, false))
    };
    layout("通知", chrome, body)
}

pub fn add_notice(chrome: Chrome<'_>) -> Markup {
    layout("发布通知", chrome, notice_form("/teacher/add_notice", None))
}

pub fn guides(chrome: Chrome<'_>, page: &Page<GuideRecord>, can_upload: bool) -> Markup {
    let body = html! {
        @if can_upload {
            p { a href="/teacher/upload_guide" { "上传指导资料" } }
        } @else {
            (stage_closed_hint(Stage::UploadPaperGuide))
        }
        @if page.items.is_empty() {
            p { "暂无指导资料" }
        } @else {
            table {
                thead { tr { th { "名称" } th { "下载次数" } th { "上传时间" } } }
                tbody {
                    @for guide in &page.items {
                        tr {
                            td { (guide.file_name) }
                            td { (guide.download_time) }
                            td { (format_time(&guide.created_at)) }
                        }
                    }
                }
            }
            (pagination(page, "/teacher/guides"))
        }
    };
    layout("指导资料", chrome, body)
}

pub fn upload_guide(chrome: Chrome<'_>) -> Markup {
    let body = html! {
        form method="post" action="/teacher/upload_guide" enctype="multipart/form-data" {
            p { label { "显示名称（可选） " input type="text" name="file_name" maxlength="200"; } }
            (upload_field())
            button type="submit" { "上传" }
        }
    };
    layout("上传指导资料", chrome, body)
}

pub fn papers(chrome: Chrome<'_>, page: &Page<PaperRecord>) -> Markup {
    layout("学生论文", chrome, paper_table(page, "/teacher/papers", true, false))
}

pub fn review_paper(chrome: Chrome<'_>, paper: &PaperRecord, comments: &[CommentRecord]) -> Markup {
    let action = format!("/teacher/review_paper/{}", paper.id);
    let body = html! {
        dl {
            dt { "论文名称" } dd { (paper.paper_name) }
            dt { "学号" } dd { (paper.student_no) }
            dt { "上传时间" } dd { (format_time(&paper.upload_time)) }
        }
        p { a href={ "/teacher/download_paper/" (paper.id.into_inner()) } { "下载论文" } }
        h2 { "批阅" }
        form method="post" action=(action) {
            p { textarea name="content" rows="6" cols="60" maxlength="1000" required {} }
            button type="submit" { "提交批阅" }
        }
        h2 { "批阅记录" }
        (comment_list(comments))
    };
    layout("批阅论文", chrome, body)
}

pub fn students(
    chrome: Chrome<'_>,
    students: &[PrincipalRecord],
    classes: &[LookupRecord],
    grades: &[LookupRecord],
) -> Markup {
    layout("我的学生", chrome, student_table(students, classes, grades))
}
