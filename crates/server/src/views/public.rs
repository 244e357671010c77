use maud::{Markup, html};

use super::{Chrome, layout};

pub fn index(chrome: Chrome<'_>) -> Markup {
    let body = html! {
        p { "面向管理员、教师和学生的毕业论文全过程管理平台。" }
        @match chrome.user {
            Some(user) => {
                p { "欢迎，" (user.username) "。" }
                p { a href={ "/" (user.role.as_str()) "/dashboard" } { "进入控制台" } }
            }
            None => {
                p { a href="/auth/login" { "登录系统" } }
            }
        }
    };
    layout("首页", chrome, body)
}

pub fn about(chrome: Chrome<'_>) -> Markup {
    let body = html! {
        p { "本系统覆盖通知发布、指导资料上传、论文提交与批阅等环节。" }
        ul {
            li { "管理员：维护用户与通知，控制各阶段的开放状态。" }
            li { "教师：发布通知，上传指导资料，批阅所指导学生的论文。" }
            li { "学生：查看通知，下载指导资料，提交并查看论文批阅意见。" }
        }
    };
    layout("关于", chrome, body)
}
