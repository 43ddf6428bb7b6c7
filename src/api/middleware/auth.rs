use tower_sessions::Session;
use uuid::Uuid;

use super::session::{SESSION_KEY_IS_ADMIN, SESSION_KEY_USER_ID};
use crate::error::AppError;

/// Authentication failures raised while reading the session
#[derive(Debug)]
pub enum AuthError {
    Unauthorized,
    Forbidden,
    SessionError,
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthorized => AppError::Unauthorized,
            AuthError::Forbidden => AppError::Forbidden("Admin access required".to_string()),
            AuthError::SessionError => {
                AppError::Internal(anyhow::anyhow!("session store error"))
            }
        }
    }
}

/// The caller identity established by the auth provider and carried in the
/// session.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// Extracts the authenticated user id from the session
pub async fn get_authenticated_user(session: &Session) -> Result<AuthenticatedUser, AuthError> {
    let user_id: Uuid = session
        .get(SESSION_KEY_USER_ID)
        .await
        .map_err(|_| AuthError::SessionError)?
        .ok_or(AuthError::Unauthorized)?;

    Ok(AuthenticatedUser { user_id })
}

/// Requires an authenticated session carrying the admin flag
pub async fn require_admin(session: &Session) -> Result<AuthenticatedUser, AuthError> {
    let user = get_authenticated_user(session).await?;

    let is_admin: bool = session
        .get(SESSION_KEY_IS_ADMIN)
        .await
        .map_err(|_| AuthError::SessionError)?
        .unwrap_or(false);

    if !is_admin {
        return Err(AuthError::Forbidden);
    }

    Ok(user)
}
