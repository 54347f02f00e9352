use crate::domain::model::{Identity, LoginResponse};
use crate::domain::ports::{PasswordVerifier, StudentStore, UserStore};
use crate::utils::error::{InquiryError, Result};
use std::sync::Arc;

const DEFAULT_DISPLAY_NAME: &str = "User";

/// Verifies a login and produces the [`Identity`] a session will carry.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    students: Arc<dyn StudentStore>,
    verifier: Arc<dyn PasswordVerifier>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        students: Arc<dyn StudentStore>,
        verifier: Arc<dyn PasswordVerifier>,
    ) -> Self {
        Self {
            users,
            students,
            verifier,
        }
    }

    pub async fn login(&self, login_id: &str, password: &str) -> Result<LoginResponse> {
        tracing::debug!("Attempting to find user with loginId: {}", login_id);
        let user = self
            .users
            .find_by_login_id(login_id)
            .await
            .map_err(|e| {
                tracing::error!("Store error during login for loginId {}: {}", login_id, e);
                InquiryError::Unavailable(e)
            })?
            .ok_or_else(|| {
                tracing::warn!("Login failed - unknown loginId: {}", login_id);
                InquiryError::InvalidCredentials
            })?;

        if !self.verifier.verify(password, &user.password_hash) {
            tracing::warn!("Login failed - loginId: {}, password mismatch", login_id);
            return Err(InquiryError::InvalidCredentials);
        }

        let student = self
            .students
            .find_by_user_id(user.user_id)
            .await
            .map_err(InquiryError::Unavailable)?;

        let identity = Identity {
            user_id: user.user_id,
            student_id: student.as_ref().map(|s| s.student_id),
            role: user.role,
        };
        let name = student
            .map(|s| s.name)
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string());

        tracing::info!("Login succeeded - userId: {}", identity.user_id);
        Ok(LoginResponse {
            identity,
            name,
            message: "Login successful".to_string(),
        })
    }
}
