//! Tables and forms used by more than one portal.

use maud::{Markup, html};
use thesis_core::domain::{Page, Stage};

use super::{format_time, or_dash, pagination};
use crate::repository::{CommentRecord, NoticeRecord, PaperRecord};

/// Notice list with optional per-row links. `detail` turns titles into links
/// to `<detail>/<id>`; `manage` adds admin edit/delete controls.
pub fn notice_table(page: &Page<NoticeRecord>, base: &str, detail: Option<&str>, manage: bool) -> Markup {
    html! {
        @if page.items.is_empty() {
            p { "暂无通知" }
        } @else {
            table {
                thead { tr { th { "标题" } th { "发布人" } th { "发布时间" } @if manage { th { "操作" } } } }
                tbody {
                    @for notice in &page.items {
                        tr {
                            td {
                                @if let Some(detail) = detail {
                                    a href={ (detail) "/" (notice.id.into_inner()) } { (notice.title) }
                                } @else {
                                    (notice.title)
                                }
                            }
                            td { (notice.publisher_role.label()) " " (notice.publisher_no) }
                            td { (format_time(&notice.created_at)) }
                            @if manage {
                                td {
                                    a href={ "/admin/edit_notice/" (notice.id.into_inner()) } { "编辑" }
                                    form method="post" action={ "/admin/delete_notice/" (notice.id.into_inner()) } style="display:inline" {
                                        button type="submit" { "删除" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
            (pagination(page, base))
        }
    }
}

pub fn recent_notices(notices: &[NoticeRecord]) -> Markup {
    html! {
        h2 { "最新通知" }
        @if notices.is_empty() {
            p { "暂无通知" }
        } @else {
            ul {
                @for notice in notices {
                    li { (notice.title) " （" (format_time(&notice.created_at)) "）" }
                }
            }
        }
    }
}

pub fn notice_form(action: &str, existing: Option<&NoticeRecord>) -> Markup {
    html! {
        form method="post" action=(action) {
            p { label { "标题 " input type="text" name="title" maxlength="200" required value=[existing.map(|n| n.title.as_str())]; } }
            p { label { "内容" br; textarea name="content" rows="8" cols="60" required { @if let Some(n) = existing { (n.content) } } } }
            p { label { "落款 " input type="text" name="lead_foot" value=[existing.and_then(|n| n.lead_foot.as_deref())]; } }
            button type="submit" { "保存" }
        }
    }
}

/// Paper list. `review` adds a link to the teacher's review page,
/// `own` links to the student's view and download pages.
pub fn paper_table(page: &Page<PaperRecord>, base: &str, review: bool, own: bool) -> Markup {
    html! {
        @if page.items.is_empty() {
            p { "暂无论文" }
        } @else {
            table {
                thead { tr { th { "论文名称" } th { "学号" } th { "指导教师" } th { "上传时间" } @if review || own { th { "操作" } } } }
                tbody {
                    @for paper in &page.items {
                        tr {
                            td { (paper.paper_name) }
                            td { (paper.student_no) }
                            td { (or_dash(paper.teacher_no.as_deref())) }
                            td { (format_time(&paper.upload_time)) }
                            @if review {
                                td {
                                    a href={ "/teacher/review_paper/" (paper.id.into_inner()) } { "批阅" } " "
                                    a href={ "/teacher/download_paper/" (paper.id.into_inner()) } { "下载" }
                                }
                            } @else if own {
                                td {
                                    a href={ "/student/paper/" (paper.id.into_inner()) } { "查看" } " "
                                    a href={ "/student/download_paper/" (paper.id.into_inner()) } { "下载" }
                                }
                            }
                        }
                    }
                }
            }
            (pagination(page, base))
        }
    }
}

pub fn comment_list(comments: &[CommentRecord]) -> Markup {
    html! {
        @if comments.is_empty() {
            p { "暂无批阅意见" }
        } @else {
            ul class="comments" {
                @for comment in comments {
                    li {
                        p { (comment.content) }
                        small { "教师 " (comment.teacher_no) " · " (format_time(&comment.created_at)) }
                    }
                }
            }
        }
    }
}

pub fn comment_table(page: &Page<CommentRecord>, base: &str) -> Markup {
    html! {
        @if page.items.is_empty() {
            p { "暂无批阅意见" }
        } @else {
            table {
                thead { tr { th { "论文" } th { "学号" } th { "教师" } th { "内容" } th { "时间" } } }
                tbody {
                    @for comment in &page.items {
                        tr {
                            td { (comment.paper_id.into_inner()) }
                            td { (comment.student_no) }
                            td { (comment.teacher_no) }
                            td { (comment.content) }
                            td { (format_time(&comment.created_at)) }
                        }
                    }
                }
            }
            (pagination(page, base))
        }
    }
}

pub fn stage_closed_hint(stage: Stage) -> Markup {
    html! { p class="hint" { "「" (stage.label()) "」阶段当前未开放。" } }
}

pub fn upload_field() -> Markup {
    html! {
        p { label { "文件 " input type="file" name="file" required; } }
        p class="hint" { "支持 txt、pdf、png、jpg、jpeg、gif、doc、docx，最大 16 MB。" }
    }
}
