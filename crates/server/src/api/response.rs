//! 页面、重定向与错误响应。
//!
//! 提示消息放在名为 `flash` 的 Cookie 中：重定向时写入，下一次渲染页面时清除。
//! 响应只在扩展中标记要做的事，由 [`apply_flash`] 中间件通过 `Cookies` 写出。

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Redirect, Response};
use maud::Markup;
use thesis_api_types::Flash;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};
use tracing::error;

use crate::views;

pub const FLASH_COOKIE: &str = "flash";

pub type AppResult<T> = Result<T, AppError>;

/// Cookie 值为 JSON 的十六进制编码，中文消息无需再转义。
pub fn encode_flash(flash: &Flash) -> String {
    hex::encode(serde_json::to_vec(flash).unwrap_or_default())
}

pub fn decode_flash(value: &str) -> Option<Flash> {
    let bytes = hex::decode(value).ok()?;
    serde_json::from_slice(&bytes).ok()
}

fn flash_cookie(value: String) -> Cookie<'static> {
    Cookie::build((FLASH_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// 响应对提示消息 Cookie 的处理。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlashCookie {
    Set(Flash),
    Clear,
}

/// 把响应扩展中的 [`FlashCookie`] 写入 Cookie 管理器；须位于 `CookieManagerLayer` 之内。
/// 清除只在请求带有提示消息时才会产生 `Set-Cookie`。
pub async fn apply_flash(cookies: Cookies, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    match response.extensions_mut().remove::<FlashCookie>() {
        Some(FlashCookie::Set(flash)) => cookies.add(flash_cookie(encode_flash(&flash))),
        Some(FlashCookie::Clear) => cookies.remove(flash_cookie(String::new())),
        None => {}
    }
    response
}

/// 渲染完成的页面，同时清除已展示的提示消息。
pub struct HtmlPage(pub Markup);

impl IntoResponse for HtmlPage {
    fn into_response(self) -> Response {
        let mut response = Html(self.0.into_string()).into_response();
        response.extensions_mut().insert(FlashCookie::Clear);
        response
    }
}

/// 带提示消息的重定向。
pub struct FlashRedirect {
    flash: Flash,
    to: String,
}

impl FlashRedirect {
    pub fn new(flash: Flash, to: impl Into<String>) -> Self {
        Self {
            flash,
            to: to.into(),
        }
    }

    pub fn success(message: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(Flash::success(message), to)
    }

    pub fn info(message: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(Flash::info(message), to)
    }

    pub fn error(message: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(Flash::error(message), to)
    }
}

impl IntoResponse for FlashRedirect {
    fn into_response(self) -> Response {
        let mut response = Redirect::to(&self.to).into_response();
        response.extensions_mut().insert(FlashCookie::Set(self.flash));
        response
    }
}

#[derive(Debug)]
pub enum AppError {
    /// 面向用户的失败：带错误提示重定向。
    Rejected { message: String, redirect_to: String },
    NotFound,
    Internal(anyhow::Error),
}

impl AppError {
    pub fn rejected(message: impl Into<String>, redirect_to: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
            redirect_to: redirect_to.into(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Rejected {
                message,
                redirect_to,
            } => FlashRedirect::error(message, redirect_to).into_response(),
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                Html(views::error_page(StatusCode::NOT_FOUND, "页面不存在").into_string()),
            )
                .into_response(),
            AppError::Internal(err) => {
                error!(error = ?err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(views::error_page(StatusCode::INTERNAL_SERVER_ERROR, "服务器内部错误").into_string()),
                )
                    .into_response()
            }
        }
    }
}
