//! 请求提取器：会话、角色校验与提示消息。

use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::anyhow;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use thesis_api_types::Flash;
use thesis_core::domain::Role;
use tower_cookies::Cookies;

use super::response::{AppError, FLASH_COOKIE, decode_flash};
use super::state::AppState;
use crate::session::{SESSION_COOKIE, SessionData, SessionId};

const LOGIN_PATH: &str = "/auth/login";

async fn cookies(parts: &mut Parts, state: &Arc<AppState>) -> Result<Cookies, AppError> {
    Cookies::from_request_parts(parts, state)
        .await
        .map_err(|(_, message)| AppError::Internal(anyhow!("cookie layer missing: {message}")))
}

async fn current_session(
    parts: &mut Parts,
    state: &Arc<AppState>,
) -> Result<Option<(SessionId, SessionData)>, AppError> {
    let cookies = cookies(parts, state).await?;
    let Some(cookie) = cookies.signed(&state.cookie_key).get(SESSION_COOKIE) else {
        return Ok(None);
    };

    let id = SessionId::from(cookie.value().to_string());
    Ok(state.sessions.get(&id).await.map(|data| (id, data)))
}

/// Role a handler demands from the session.
pub trait RequiredRole: Send + Sync + 'static {
    const ROLE: Role;
    /// Flash shown when the session is missing or holds another role.
    const DENIED: &'static str;
}

pub struct AdminRole;
pub struct TeacherRole;
pub struct StudentRole;

impl RequiredRole for AdminRole {
    const ROLE: Role = Role::Admin;
    const DENIED: &'static str = "需要管理员权限";
}

impl RequiredRole for TeacherRole {
    const ROLE: Role = Role::Teacher;
    const DENIED: &'static str = "需要教师权限";
}

impl RequiredRole for StudentRole {
    const ROLE: Role = Role::Student;
    const DENIED: &'static str = "需要学生权限";
}

/// A logged-in principal whose session role is exactly `R::ROLE`.
pub struct Principal<R: RequiredRole> {
    pub session_id: SessionId,
    pub session: SessionData,
    _role: PhantomData<R>,
}

pub type AdminUser = Principal<AdminRole>;
pub type TeacherUser = Principal<TeacherRole>;
pub type StudentUser = Principal<StudentRole>;

impl<R: RequiredRole> FromRequestParts<Arc<AppState>> for Principal<R> {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let Some((session_id, session)) = current_session(parts, state).await? else {
            return Err(AppError::rejected(R::DENIED, LOGIN_PATH));
        };

        session
            .role
            .ensure(R::ROLE)
            .map_err(|_| AppError::rejected(R::DENIED, LOGIN_PATH))?;

        Ok(Self {
            session_id,
            session,
            _role: PhantomData,
        })
    }
}

/// Any logged-in principal.
pub struct Authenticated {
    pub session_id: SessionId,
    pub session: SessionData,
}

impl FromRequestParts<Arc<AppState>> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        match current_session(parts, state).await? {
            Some((session_id, session)) => Ok(Self {
                session_id,
                session,
            }),
            None => Err(AppError::rejected("请先登录", LOGIN_PATH)),
        }
    }
}

/// The session, if any. Used by public pages to pick the navigation bar.
pub struct MaybeUser(pub Option<SessionData>);

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        Ok(Self(current_session(parts, state).await?.map(|(_, data)| data)))
    }
}

/// Flash message left by the previous redirect.
pub struct IncomingFlash(pub Option<Flash>);

impl FromRequestParts<Arc<AppState>> for IncomingFlash {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let cookies = cookies(parts, state).await?;
        Ok(Self(
            cookies
                .get(FLASH_COOKIE)
                .and_then(|cookie| decode_flash(cookie.value())),
        ))
    }
}
