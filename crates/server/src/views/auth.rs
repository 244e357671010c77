use maud::{Markup, html};
use thesis_core::domain::Role;

use super::{Chrome, layout};

pub fn login(chrome: Chrome<'_>) -> Markup {
    let body = html! {
        form method="post" action="/auth/login" {
            p {
                label { "账号 " input type="text" name="username" required; }
            }
            p {
                label { "密码 " input type="password" name="password" required; }
            }
            p {
                label {
                    "身份 "
                    select name="user_type" {
                        @for role in Role::ALL {
                            option value=(role.as_str()) selected[role == Role::Student] { (role.label()) }
                        }
                    }
                }
            }
            button type="submit" { "登录" }
        }
    };
    layout("登录", chrome, body)
}

pub fn change_password(chrome: Chrome<'_>) -> Markup {
    let body = html! {
        form method="post" action="/auth/change_password" {
            p { label { "原密码 " input type="password" name="old_password" required; } }
            p { label { "新密码 " input type="password" name="new_password" required; } }
            p { label { "确认新密码 " input type="password" name="confirm_password" required; } }
            button type="submit" { "修改密码" }
        }
    };
    layout("修改密码", chrome, body)
}
