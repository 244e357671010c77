use std::sync::Arc;

use thesis_core::domain::{LoginNo, PrincipalId, Role};
use thiserror::Error;
use tracing::{info, warn};

use super::password::{hash_password_task, verify_password_task};
use super::workflow::WorkflowGate;
use crate::repository::{PrincipalRecord, PrincipalRepository};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("login number, password or role is incorrect")]
    InvalidCredentials,
    #[error("current password is incorrect")]
    WrongPassword,
    #[error("new password must not be empty")]
    EmptyPassword,
    #[error("new password and confirmation do not match")]
    PasswordMismatch,
    #[error("principal {role}/{id} no longer exists")]
    PrincipalGone { role: Role, id: PrincipalId },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct AuthService {
    principals: Arc<dyn PrincipalRepository>,
    workflow: WorkflowGate,
}

impl AuthService {
    pub fn new(principals: Arc<dyn PrincipalRepository>, workflow: WorkflowGate) -> Self {
        Self {
            principals,
            workflow,
        }
    }

    /// Verifies the credentials against the table of the claimed role only.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(
        &self,
        role: Role,
        login_no: &str,
        password: &str,
    ) -> Result<PrincipalRecord, AuthError> {
        let Ok(login_no) = LoginNo::new(login_no) else {
            return Err(AuthError::InvalidCredentials);
        };

        let Some(principal) = self.principals.find_by_login_no(role, &login_no).await? else {
            warn!(%role, %login_no, "login rejected: unknown login number");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password_task(password.to_string(), principal.password_hash.clone()).await? {
            warn!(%role, %login_no, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        self.workflow.current().await?;

        info!(%role, %login_no, "login succeeded");
        Ok(principal)
    }

    #[tracing::instrument(skip(self, old_password, new_password, confirm_password))]
    pub async fn change_password(
        &self,
        role: Role,
        id: PrincipalId,
        old_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AuthError> {
        let principal = self
            .principals
            .find_by_id(role, id)
            .await?
            .ok_or(AuthError::PrincipalGone { role, id })?;

        if !verify_password_task(old_password.to_string(), principal.password_hash.clone()).await? {
            return Err(AuthError::WrongPassword);
        }
        if new_password.is_empty() {
            return Err(AuthError::EmptyPassword);
        }
        if new_password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        let hash = hash_password_task(new_password.to_string()).await?;
        if !self.principals.update_password(role, id, hash).await? {
            return Err(AuthError::PrincipalGone { role, id });
        }

        info!(%role, login_no = %principal.login_no, "password changed");
        Ok(())
    }
}
