use maud::{Markup, html};
use thesis_core::domain::{Page, Stage};

use super::shared::{comment_list, comment_table, notice_table, paper_table, recent_notices, stage_closed_hint, upload_field};
use super::{Chrome, format_time, layout, lookup_name, lookup_select, or_dash, pagination};
use crate::repository::{
    CommentRecord, GuideRecord, LookupRecord, NoticeRecord, PaperRecord, PrincipalRecord,
};

pub struct DashboardData<'a> {
    pub paper_count: u64,
    pub comment_count: u64,
    pub notices: &'a [NoticeRecord],
    pub papers: &'a [PaperRecord],
    pub comments: &'a [CommentRecord],
}

pub fn dashboard(chrome: Chrome<'_>, data: &DashboardData<'_>) -> Markup {
    let body = html! {
        ul class="stats" {
            li { "我的论文：" (data.paper_count) }
            li { "收到批阅：" (data.comment_count) }
        }
        (recent_notices(data.notices))
        h2 { "我的论文" }
        @if data.papers.is_empty() {
            p { "尚未上传论文" }
        } @else {
            ul {
                @for paper in data.papers {
                    li { a href={ "/student/paper/" (paper.id.into_inner()) } { (paper.paper_name) } " （" (format_time(&paper.upload_time)) "）" }
                }
            }
        }
        h2 { "最新批阅" }
        (comment_list(data.comments))
    };
    layout("学生控制台", chrome, body)
}

pub fn notices(chrome: Chrome<'_>, page: &Page<NoticeRecord>) -> Markup {
    layout("通知", chrome, notice_table(page, "/student/notices", Some("/student/notice"), false))
}

pub fn view_notice(chrome: Chrome<'_>, notice: &NoticeRecord) -> Markup {
    let body = html! {
        p class="meta" { (notice.publisher_role.label()) " " (notice.publisher_no) " · " (format_time(&notice.created_at)) }
        div class="content" {
            @for line in notice.content.lines() {
                p { (line) }
            }
        }
        @if let Some(lead_foot) = notice.lead_foot.as_deref().filter(|l| !l.is_empty()) {
            p class="lead-foot" { (lead_foot) }
        }
        p { a href="/student/notices" { "返回通知列表" } }
    };
    layout(&notice.title, chrome, body)
}

pub fn guides(chrome: Chrome<'_>, page: &Page<GuideRecord>) -> Markup {
    let body = html! {
        @if page.items.is_empty() {
            p { "暂无指导资料" }
        } @else {
            table {
                thead { tr { th { "名称" } th { "教师" } th { "下载次数" } th { "上传时间" } th { "操作" } } }
                tbody {
                    @for guide in &page.items {
                        tr {
                            td { (guide.file_name) }
                            td { (guide.teacher_no) }
                            td { (guide.download_time) }
                            td { (format_time(&guide.created_at)) }
                            td { a href={ "/student/download_guide/" (guide.id.into_inner()) } { "下载" } }
                        }
                    }
                }
            }
            (pagination(page, "/student/guides"))
        }
    };
    layout("指导资料", chrome, body)
}

pub fn papers(chrome: Chrome<'_>, page: &Page<PaperRecord>, can_upload: bool) -> Markup {
    let body = html! {
        @if can_upload {
            p { a href="/student/upload_paper" { "上传论文" } " （重新上传会替换已提交的论文）" }
        } @else {
            (stage_closed_hint(Stage::UploadEndEvaluate))
        }
        (paper_table(page, "/student/papers", false, true))
    };
    layout("我的论文", chrome, body)
}

pub fn upload_paper(chrome: Chrome<'_>, teachers: &[PrincipalRecord], assigned: Option<&PrincipalRecord>) -> Markup {
    let body = html! {
        form method="post" action="/student/upload_paper" enctype="multipart/form-data" {
            p { label { "论文名称（可选） " input type="text" name="paper_name" maxlength="200"; } }
            p {
                label {
                    "指导教师 "
                    select name="teacher_no" {
                        option value="" { "（未指定）" }
                        @for teacher in teachers {
                            option value=(teacher.login_no.as_str()) selected[assigned.is_some_and(|a| a.id == teacher.id)] {
                                (teacher.profile.username) " (" (teacher.login_no.as_str()) ")"
                            }
                        }
                    }
                }
            }
            (upload_field())
            button type="submit" { "上传" }
        }
    };
    layout("上传论文", chrome, body)
}

pub fn view_paper(chrome: Chrome<'_>, paper: &PaperRecord, comments: &[CommentRecord]) -> Markup {
    let body = html! {
        dl {
            dt { "论文名称" } dd { (paper.paper_name) }
            dt { "指导教师" } dd { (or_dash(paper.teacher_no.as_deref())) }
            dt { "上传时间" } dd { (format_time(&paper.upload_time)) }
        }
        p { a href={ "/student/download_paper/" (paper.id.into_inner()) } { "下载论文" } }
        h2 { "批阅意见" }
        (comment_list(comments))
    };
    layout("论文详情", chrome, body)
}

pub fn comments(chrome: Chrome<'_>, page: &Page<CommentRecord>) -> Markup {
    layout("批阅意见", chrome, comment_table(page, "/student/comments"))
}

pub struct ProfileLookups<'a> {
    pub native_places: &'a [LookupRecord],
    pub classes: &'a [LookupRecord],
    pub grades: &'a [LookupRecord],
    pub teacher: Option<&'a PrincipalRecord>,
}

pub fn profile(chrome: Chrome<'_>, student: &PrincipalRecord, lookups: &ProfileLookups<'_>) -> Markup {
    let body = html! {
        dl {
            dt { "学号" } dd { (student.login_no.as_str()) }
            dt { "姓名" } dd { (student.profile.username) }
            dt { "性别" } dd { (or_dash(student.profile.sex.as_deref())) }
            dt { "出生日期" } dd { (or_dash(student.profile.birth.as_deref())) }
            dt { "籍贯" } dd { (lookup_name(lookups.native_places, student.profile.native_place_id)) }
            dt { "班级" } dd { (lookup_name(lookups.classes, student.placement.class_id)) }
            dt { "年级" } dd { (lookup_name(lookups.grades, student.placement.grade_id)) }
            dt { "指导教师" } dd {
                @match lookups.teacher {
                    Some(teacher) => { (teacher.profile.username) " (" (teacher.login_no.as_str()) ")" }
                    None => { "-" }
                }
            }
        }
        p { a href="/student/update_profile" { "修改个人信息" } }
    };
    layout("个人信息", chrome, body)
}

pub fn update_profile(chrome: Chrome<'_>, student: &PrincipalRecord, native_places: &[LookupRecord]) -> Markup {
    let profile = &student.profile;
    let body = html! {
        form method="post" action="/student/update_profile" {
            p { label { "姓名 " input type="text" name="username" maxlength="20" required value=(profile.username); } }
            p { label { "性别 " input type="text" name="sex" value=[profile.sex.as_deref()]; } }
            p { label { "出生日期 " input type="date" name="birth" value=[profile.birth.as_deref()]; } }
            p { label { "籍贯 " (lookup_select("native_place_id", native_places, profile.native_place_id)) } }
            button type="submit" { "保存" }
        }
    };
    layout("修改个人信息", chrome, body)
}
