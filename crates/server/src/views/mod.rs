//! 服务端渲染的 HTML 页面。

pub mod admin;
pub mod auth;
pub mod public;
pub mod shared;
pub mod student;
pub mod teacher;

use axum::http::StatusCode;
use chrono::NaiveDateTime;
use maud::{DOCTYPE, Markup, html};
use thesis_api_types::{Flash, FlashLevel};
use thesis_core::domain::{Page, Role};

use crate::repository::LookupRecord;
use crate::session::SessionData;

/// Per-request page chrome: who is logged in and the pending flash message.
#[derive(Clone, Copy, Default)]
pub struct Chrome<'a> {
    pub user: Option<&'a SessionData>,
    pub flash: Option<&'a Flash>,
}

impl<'a> Chrome<'a> {
    pub fn new(user: Option<&'a SessionData>, flash: Option<&'a Flash>) -> Self {
        Self { user, flash }
    }
}

fn nav_links(role: Role) -> &'static [(&'static str, &'static str)] {
    match role {
        Role::Admin => &[
            ("/admin/dashboard", "控制台"),
            ("/admin/users", "用户管理"),
            ("/admin/notices", "通知管理"),
            ("/admin/process_control", "流程控制"),
            ("/admin/papers", "论文"),
            ("/admin/comments", "批阅"),
        ],
        Role::Teacher => &[
            ("/teacher/dashboard", "控制台"),
            ("/teacher/notices", "通知"),
            ("/teacher/guides", "指导资料"),
            ("/teacher/papers", "学生论文"),
            ("/teacher/students", "我的学生"),
        ],
        Role::Student => &[
            ("/student/dashboard", "控制台"),
            ("/student/notices", "通知"),
            ("/student/guides", "指导资料"),
            ("/student/papers", "我的论文"),
            ("/student/comments", "批阅意见"),
            ("/student/profile", "个人信息"),
        ],
    }
}

fn flash_class(level: FlashLevel) -> &'static str {
    match level {
        FlashLevel::Success => "flash flash-success",
        FlashLevel::Info => "flash flash-info",
        FlashLevel::Error => "flash flash-error",
    }
}

pub fn layout(title: &str, chrome: Chrome<'_>, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="zh-CN" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " - 毕业论文管理系统" }
            }
            body {
                header {
                    nav {
                        a href="/" { "毕业论文管理系统" }
                        @if let Some(user) = chrome.user {
                            @for (href, label) in nav_links(user.role) {
                                " | " a href=(href) { (label) }
                            }
                            span class="whoami" {
                                " | " (user.role.label()) "：" (user.username)
                                " | " a href="/auth/change_password" { "修改密码" }
                                " | " a href="/auth/logout" { "退出" }
                            }
                        } @else {
                            " | " a href="/about" { "关于" }
                            " | " a href="/auth/login" { "登录" }
                        }
                    }
                }
                @if let Some(flash) = chrome.flash {
                    div class=(flash_class(flash.level)) { (flash.message) }
                }
                main {
                    h1 { (title) }
                    (body)
                }
            }
        }
    }
}

pub fn error_page(status: StatusCode, message: &str) -> Markup {
    layout(
        &status.as_u16().to_string(),
        Chrome::default(),
        html! {
            p { (message) }
            p { a href="/" { "返回首页" } }
        },
    )
}

pub fn format_time(value: &NaiveDateTime) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

/// Previous/next links for a paginated list. `base` may already carry a query.
pub fn pagination<T>(page: &Page<T>, base: &str) -> Markup {
    let sep = if base.contains('?') { "&" } else { "?" };
    html! {
        div class="pagination" {
            @if page.has_prev() {
                a href={ (base) (sep) "page=" (page.page - 1) } { "上一页" } " "
            }
            span { "第 " (page.page) " / " (page.total_pages().max(1)) " 页，共 " (page.total) " 条" }
            @if page.has_next() {
                " " a href={ (base) (sep) "page=" (page.page + 1) } { "下一页" }
            }
        }
    }
}

pub fn lookup_name(records: &[LookupRecord], id: Option<i32>) -> String {
    id.and_then(|id| records.iter().find(|r| r.id.into_inner() == id))
        .map(|r| r.name.clone())
        .unwrap_or_default()
}

/// `<select>` over lookup rows with an empty "none" option.
pub fn lookup_select(name: &str, records: &[LookupRecord], selected: Option<i32>) -> Markup {
    html! {
        select name=(name) {
            option value="" { "（无）" }
            @for record in records {
                @let id = record.id.into_inner();
                option value=(id) selected[selected == Some(id)] { (record.name) }
            }
        }
    }
}

pub fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use thesis_core::domain::{LookupId, PageRequest};

    #[test]
    fn pagination_links_respect_existing_query() {
        let page = Page::new(vec![1, 2], PageRequest::new(Some(2), 2), 6);
        let markup = pagination(&page, "/admin/users?type=teacher").into_string();

        assert!(markup.contains("/admin/users?type=teacher&amp;page=1"));
        assert!(markup.contains("/admin/users?type=teacher&amp;page=3"));
    }

    #[test]
    fn layout_shows_flash_and_role_navigation() {
        let user = SessionData {
            principal_id: thesis_core::domain::PrincipalId::new(1),
            role: Role::Teacher,
            username: "张教授".to_string(),
            login_no: thesis_core::domain::LoginNo::new("T001").expect("valid login number"),
        };
        let flash = Flash::error("当前不允许发布通知");
        let markup = layout("通知", Chrome::new(Some(&user), Some(&flash)), html! {}).into_string();

        assert!(markup.contains("当前不允许发布通知"));
        assert!(markup.contains("/teacher/guides"));
        assert!(!markup.contains("/admin/process_control"));
    }

    #[test]
    fn lookup_name_falls_back_to_empty() {
        let records = vec![LookupRecord {
            id: LookupId::new(3),
            name: "软件工程1班".to_string(),
        }];
        assert_eq!(lookup_name(&records, Some(3)), "软件工程1班");
        assert_eq!(lookup_name(&records, Some(4)), "");
        assert_eq!(lookup_name(&records, None), "");
    }
}
