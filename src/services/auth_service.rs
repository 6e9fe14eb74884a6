//! Domain service for the e-mailed one-time login link and admin user management.
//!
//! Raw tokens never touch the database; only their SHA-256 digest is stored.

use crate::db::User;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Login link is invalid or has expired")]
    InvalidLink,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Admin access required")]
    Forbidden,

    #[error("User not found")]
    UserNotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// E-mails a login link when `email` belongs to a user.
    ///
    /// The outcome is the same whether or not the user exists, so callers cannot
    /// probe for accounts.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] only for a malformed address.
    async fn request_link(&self, email: &str) -> Result<(), AuthError>;

    /// Issues a token for `email` and returns the full callback URL, without sending it.
    ///
    /// Returns `None` when no such user exists.
    async fn create_login_link(&self, email: &str) -> Result<Option<String>, AuthError>;

    /// Redeems a raw token. Each token works once, before it expires.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidLink`] for unknown, used or expired tokens.
    async fn consume_link(&self, token: &str) -> Result<User, AuthError>;

    /// Resolves the session's user id to an admin.
    ///
    /// # Errors
    ///
    /// [`AuthError::Unauthorized`] without a (valid) session user,
    /// [`AuthError::Forbidden`] when the user is not an admin.
    async fn current_admin(&self, user_id: Option<i32>) -> Result<User, AuthError>;

    async fn list_users(&self) -> Result<Vec<User>, AuthError>;

    /// # Errors
    ///
    /// Returns [`AuthError::Conflict`] when the e-mail is already registered.
    async fn add_user(&self, email: &str, role: &str) -> Result<User, AuthError>;

    /// Deletes a user. Admins cannot delete themselves.
    async fn remove_user(&self, id: i32, acting_user_id: i32) -> Result<(), AuthError>;

    /// Ensures every configured address exists with the admin role. Returns how many were created.
    async fn bootstrap_admins(&self, emails: &[String]) -> Result<usize, AuthError>;

    /// Deletes spent and expired tokens.
    async fn purge_expired(&self) -> Result<u64, AuthError>;
}
