use maud::{Markup, html};
use thesis_core::domain::{Page, ProcessStatus, Role, Stage};

use super::shared::{comment_table, notice_form, notice_table, paper_table, recent_notices};
use super::{Chrome, layout, lookup_name, lookup_select, or_dash};
use crate::repository::{
    CommentRecord, LookupRecord, NoticeRecord, PaperRecord, PrincipalRecord,
};

pub struct DashboardStats {
    pub students: u64,
    pub teachers: u64,
    pub notices: u64,
    pub papers: u64,
}

/// Lookup rows and teachers offered by the user forms.
pub struct UserOptions {
    pub classes: Vec<LookupRecord>,
    pub grades: Vec<LookupRecord>,
    pub native_places: Vec<LookupRecord>,
    pub teachers: Vec<PrincipalRecord>,
}

impl UserOptions {
    fn teacher_name(&self, teacher_id: Option<i32>) -> String {
        teacher_id
            .and_then(|id| self.teachers.iter().find(|t| t.id.into_inner() == id))
            .map(|t| format!("{} ({})", t.profile.username, t.login_no))
            .unwrap_or_default()
    }

    fn teacher_select(&self, selected: Option<i32>) -> Markup {
        html! {
            select name="teacher_id" {
                option value="" { "（未分配）" }
                @for teacher in &self.teachers {
                    @let id = teacher.id.into_inner();
                    option value=(id) selected[selected == Some(id)] { (teacher.profile.username) " (" (teacher.login_no.as_str()) ")" }
                }
            }
        }
    }
}

pub fn dashboard(chrome: Chrome<'_>, stats: &DashboardStats, notices: &[NoticeRecord]) -> Markup {
    let body = html! {
        ul class="stats" {
            li { "学生：" (stats.students) }
            li { "教师：" (stats.teachers) }
            li { "通知：" (stats.notices) }
            li { "论文：" (stats.papers) }
        }
        (recent_notices(notices))
    };
    layout("管理员控制台", chrome, body)
}

pub fn users(chrome: Chrome<'_>, role: Role, page: &Page<PrincipalRecord>, options: &UserOptions) -> Markup {
    let base = format!("/admin/users?type={}", role.as_str());
    let body = html! {
        p {
            a href="/admin/users?type=student" { "学生" } " | "
            a href="/admin/users?type=teacher" { "教师" } " | "
            a href="/admin/add_user" { "添加用户" }
        }
        @if page.items.is_empty() {
            p { "暂无" (role.label()) }
        } @else {
            table {
                thead {
                    tr {
                        th { "编号" } th { "姓名" } th { "性别" } th { "出生日期" }
                        @if role == Role::Student { th { "班级" } th { "年级" } th { "指导教师" } }
                        @if role == Role::Teacher { th { "简介" } }
                        th { "操作" }
                    }
                }
                tbody {
                    @for user in &page.items {
                        tr {
                            td { (user.login_no.as_str()) }
                            td { (user.profile.username) }
                            td { (or_dash(user.profile.sex.as_deref())) }
                            td { (or_dash(user.profile.birth.as_deref())) }
                            @if role == Role::Student {
                                td { (lookup_name(&options.classes, user.placement.class_id)) }
                                td { (lookup_name(&options.grades, user.placement.grade_id)) }
                                td { (options.teacher_name(user.placement.teacher_id)) }
                            }
                            @if role == Role::Teacher {
                                td { (or_dash(user.descs.as_deref())) }
                            }
                            td {
                                a href={ "/admin/edit_user/" (user.id.into_inner()) "?type=" (role.as_str()) } { "编辑" }
                                form method="post" action={ "/admin/delete_user/" (user.id.into_inner()) "?type=" (role.as_str()) } style="display:inline" {
                                    button type="submit" { "删除" }
                                }
                            }
                        }
                    }
                }
            }
            (super::pagination(page, &base))
        }
    };
    layout("用户管理", chrome, body)
}

fn profile_fields(existing: Option<&PrincipalRecord>, options: &UserOptions) -> Markup {
    let profile = existing.map(|u| &u.profile);
    html! {
        p { label { "姓名 " input type="text" name="username" maxlength="20" required value=[profile.map(|p| p.username.as_str())]; } }
        p { label { "性别 " input type="text" name="sex" value=[profile.and_then(|p| p.sex.as_deref())]; } }
        p { label { "出生日期 " input type="date" name="birth" value=[profile.and_then(|p| p.birth.as_deref())]; } }
        p { label { "籍贯 " (lookup_select("native_place_id", &options.native_places, profile.and_then(|p| p.native_place_id))) } }
    }
}

fn student_fields(existing: Option<&PrincipalRecord>, options: &UserOptions) -> Markup {
    let placement = existing.map(|u| u.placement).unwrap_or_default();
    html! {
        p { label { "班级 " (lookup_select("class_id", &options.classes, placement.class_id)) } }
        p { label { "年级 " (lookup_select("grade_id", &options.grades, placement.grade_id)) } }
        p { label { "指导教师 " (options.teacher_select(placement.teacher_id)) } }
    }
}

pub fn add_user(chrome: Chrome<'_>, options: &UserOptions) -> Markup {
    let body = html! {
        form method="post" action="/admin/add_user" {
            p {
                label {
                    "类型 "
                    select name="user_type" {
                        option value="student" { "学生" }
                        option value="teacher" { "教师" }
                    }
                }
            }
            p { label { "学号（学生） " input type="text" name="student_no" maxlength="20"; } }
            p { label { "教师编号（教师） " input type="text" name="teacher_no" maxlength="20"; } }
            p { label { "密码 " input type="password" name="password" required; } }
            (profile_fields(None, options))
            fieldset {
                legend { "学生信息" }
                (student_fields(None, options))
            }
            fieldset {
                legend { "教师信息" }
                p { label { "简介" br; textarea name="descs" rows="4" cols="60" {} } }
            }
            button type="submit" { "添加" }
        }
    };
    layout("添加用户", chrome, body)
}

pub fn edit_user(chrome: Chrome<'_>, user: &PrincipalRecord, options: &UserOptions) -> Markup {
    let action = format!("/admin/edit_user/{}?type={}", user.id, user.role.as_str());
    let body = html! {
        p { (user.role.label()) " " (user.login_no.as_str()) }
        form method="post" action=(action) {
            p { label { "新密码（留空不修改） " input type="password" name="password"; } }
            (profile_fields(Some(user), options))
            @if user.role == Role::Student {
                (student_fields(Some(user), options))
            }
            @if user.role == Role::Teacher {
                p { label { "简介" br; textarea name="descs" rows="4" cols="60" { @if let Some(descs) = &user.descs { (descs) } } } }
            }
            button type="submit" { "保存" }
        }
    };
    layout("编辑用户", chrome, body)
}

pub fn notices(chrome: Chrome<'_>, page: &Page<NoticeRecord>) -> Markup {
    let body = html! {
        p { a href="/admin/add_notice" { "发布通知" } }
        (notice_table(page, "/admin/notices", None, true))
    };
    layout("通知管理", chrome, body)
}

pub fn add_notice(chrome: Chrome<'_>) -> Markup {
    layout("发布通知", chrome, notice_form("/admin/add_notice", None))
}

pub fn edit_notice(chrome: Chrome<'_>, notice: &NoticeRecord) -> Markup {
    let action = format!("/admin/edit_notice/{}", notice.id);
    layout("编辑通知", chrome, notice_form(&action, Some(notice)))
}

pub fn process_control(chrome: Chrome<'_>, status: &ProcessStatus) -> Markup {
    let body = html! {
        form method="post" action="/admin/process_control" {
            @for stage in Stage::ALL {
                p {
                    label {
                        input type="checkbox" name=(stage.key()) value="1" checked[status.is_open(stage)];
                        " " (stage.label())
                        @if stage == Stage::CompletePersonalData { small { "（仅记录，不限制任何操作）" } }
                    }
                }
            }
            button type="submit" { "保存" }
        }
    };
    layout("流程控制", chrome, body)
}

pub fn papers(chrome: Chrome<'_>, page: &Page<PaperRecord>) -> Markup {
    layout("全部论文", chrome, paper_table(page, "/admin/papers", false, false))
}

pub fn comments(chrome: Chrome<'_>, page: &Page<CommentRecord>) -> Markup {
    layout("全部批阅", chrome, comment_table(page, "/admin/comments"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_control_checks_open_stages_only() {
        let status = ProcessStatus::all_closed().with(Stage::UploadEndEvaluate, thesis_core::domain::StageFlag::Open);
        let markup = process_control(Chrome::default(), &status).into_string();

        assert!(markup.contains(r#"name="upload_end_evaluate" value="1" checked"#));
        assert!(!markup.contains(r#"name="releasing_notices" value="1" checked"#));
    }
}
