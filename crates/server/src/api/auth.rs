//! 登录、退出与修改密码。

use std::sync::Arc;

use axum::extract::State;
use axum::{Form, Router, routing::get};
use thesis_api_types::{ChangePasswordForm, LoginForm, non_blank};
use thesis_core::domain::Role;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};
use tracing::info;

use super::extract::{Authenticated, IncomingFlash, MaybeUser};
use super::response::{AppError, AppResult, FlashRedirect, HtmlPage};
use super::state::AppState;
use crate::service::AuthError;
use crate::session::{SESSION_COOKIE, SessionData};
use crate::views::{self, Chrome};

const LOGIN_PATH: &str = "/auth/login";
const CHANGE_PASSWORD_PATH: &str = "/auth/change_password";

pub fn create_auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(LOGIN_PATH, get(login_page).post(login))
        .route("/auth/logout", get(logout))
        .route(CHANGE_PASSWORD_PATH, get(change_password_page).post(change_password))
}

fn session_cookie(value: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

async fn login_page(MaybeUser(user): MaybeUser, IncomingFlash(flash): IncomingFlash) -> HtmlPage {
    HtmlPage(views::auth::login(Chrome::new(user.as_ref(), flash.as_ref())))
}

async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> AppResult<FlashRedirect> {
    let (Some(login_no), Some(user_type)) = (non_blank(&form.username), non_blank(&form.user_type)) else {
        return Err(AppError::rejected("请填写完整信息", LOGIN_PATH));
    };
    if form.password.is_empty() {
        return Err(AppError::rejected("请填写完整信息", LOGIN_PATH));
    }

    let Ok(role) = user_type.parse::<Role>() else {
        return Err(AppError::rejected("用户名或密码错误", LOGIN_PATH));
    };

    let principal = match state.auth.login(role, login_no, &form.password).await {
        Ok(principal) => principal,
        Err(AuthError::InvalidCredentials) => {
            return Err(AppError::rejected("用户名或密码错误", LOGIN_PATH));
        }
        Err(err) => return Err(AppError::Internal(err.into())),
    };

    let username = principal.profile.username.clone();
    let session_id = state
        .sessions
        .create(SessionData {
            principal_id: principal.id,
            role,
            username: username.clone(),
            login_no: principal.login_no,
        })
        .await;
    cookies
        .signed(&state.cookie_key)
        .add(session_cookie(session_id.to_string()));

    Ok(FlashRedirect::success(
        format!("欢迎回来，{username}！"),
        format!("/{}/dashboard", role.as_str()),
    ))
}

async fn logout(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    user: Authenticated,
) -> FlashRedirect {
    state.sessions.remove(&user.session_id).await;
    cookies
        .signed(&state.cookie_key)
        .remove(session_cookie(String::new()));
    info!(role = %user.session.role, login_no = %user.session.login_no, "logged out");

    FlashRedirect::info("您已成功退出登录", LOGIN_PATH)
}

async fn change_password_page(user: Authenticated, IncomingFlash(flash): IncomingFlash) -> HtmlPage {
    HtmlPage(views::auth::change_password(Chrome::new(Some(&user.session), flash.as_ref())))
}

async fn change_password(
    State(state): State<Arc<AppState>>,
    user: Authenticated,
    Form(form): Form<ChangePasswordForm>,
) -> AppResult<FlashRedirect> {
    if form.old_password.is_empty() || form.new_password.is_empty() || form.confirm_password.is_empty() {
        return Err(AppError::rejected("请填写完整信息", CHANGE_PASSWORD_PATH));
    }

    let result = state
        .auth
        .change_password(
            user.session.role,
            user.session.principal_id,
            &form.old_password,
            &form.new_password,
            &form.confirm_password,
        )
        .await;

    match result {
        Ok(()) => Ok(FlashRedirect::success("密码修改成功", "/")),
        Err(AuthError::WrongPassword) => Err(AppError::rejected("原密码错误", CHANGE_PASSWORD_PATH)),
        Err(AuthError::PasswordMismatch) => {
            Err(AppError::rejected("新密码确认不一致", CHANGE_PASSWORD_PATH))
        }
        Err(AuthError::EmptyPassword) => Err(AppError::rejected("请填写完整信息", CHANGE_PASSWORD_PATH)),
        Err(AuthError::PrincipalGone { .. }) => {
            state.sessions.remove(&user.session_id).await;
            Err(AppError::rejected("用户信息不存在", LOGIN_PATH))
        }
        Err(err) => Err(AppError::Internal(err.into())),
    }
}
