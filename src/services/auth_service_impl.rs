//! `SeaORM` implementation of the `AuthService` trait.

use crate::clients::mailer::{Email, Mailer};
use crate::config::Config;
use crate::db::repositories::user::{ADMIN_ROLE, normalize_email};
use crate::db::{Store, User, now_timestamp, timestamp};
use crate::services::auth_service::{AuthError, AuthService};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use validator::ValidateEmail;

/// Hex SHA-256 of a raw login token.
#[must_use]
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

fn validate_email(email: &str) -> Result<String, AuthError> {
    let email = normalize_email(email);
    if email.len() > 254 || !email.validate_email() {
        return Err(AuthError::Validation(
            "a valid e-mail address is required".to_string(),
        ));
    }
    Ok(email)
}

pub struct SeaOrmAuthService {
    store: Store,
    mailer: Arc<dyn Mailer>,
    config: Arc<RwLock<Config>>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(store: Store, mailer: Arc<dyn Mailer>, config: Arc<RwLock<Config>>) -> Self {
        Self {
            store,
            mailer,
            config,
        }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn request_link(&self, email: &str) -> Result<(), AuthError> {
        let email = validate_email(email)?;

        let Some(link) = self.create_login_link(&email).await? else {
            info!(event = "login_link_skipped", "Login link requested for unknown address");
            return Ok(());
        };

        let (site_name, ttl) = {
            let config = self.config.read().await;
            (config.site.name.clone(), config.auth.link_ttl_minutes)
        };

        let message = Email {
            to: email.clone(),
            subject: format!("Your {site_name} sign-in link"),
            html: format!(
                "<p>Use the link below to sign in to the {} back-office.</p>\
                 <p><a href=\"{}\">Sign in</a></p>\
                 <p>The link works once and expires in {ttl} minutes. \
                 If you did not ask for it you can ignore this e-mail.</p>",
                encode_text(&site_name),
                encode_double_quoted_attribute(&link),
            ),
        };

        // Delivery problems must not change the response the visitor sees.
        match self.mailer.send(&message).await {
            Ok(()) => {
                metrics::counter!("login_links_sent_total").increment(1);
                info!(event = "login_link_sent", "Login link sent");
            }
            Err(e) => warn!(error = %e, "Failed to send login link"),
        }

        Ok(())
    }

    async fn create_login_link(&self, email: &str) -> Result<Option<String>, AuthError> {
        let Some(user) = self.store.users().get_by_email(email).await? else {
            return Ok(None);
        };

        let (base_url, ttl) = {
            let config = self.config.read().await;
            (config.site.base_url.clone(), config.auth.link_ttl_minutes)
        };

        let token = generate_token();
        let expires_at = timestamp(Utc::now() + Duration::minutes(ttl));
        self.store
            .login_tokens()
            .create(user.id, &hash_token(&token), &expires_at)
            .await?;

        Ok(Some(format!(
            "{}/auth/callback?token={token}",
            base_url.trim_end_matches('/')
        )))
    }

    async fn consume_link(&self, token: &str) -> Result<User, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::InvalidLink);
        }

        let user_id = self
            .store
            .login_tokens()
            .consume(&hash_token(token), &now_timestamp())
            .await?
            .ok_or(AuthError::InvalidLink)?;

        let user = self
            .store
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidLink)?;

        self.store.users().touch_login(user.id).await?;
        info!(event = "login_succeeded", user_id = user.id, "Admin signed in");
        Ok(user)
    }

    async fn current_admin(&self, user_id: Option<i32>) -> Result<User, AuthError> {
        let user_id = user_id.ok_or(AuthError::Unauthorized)?;
        let user = self
            .store
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        if !user.is_admin() {
            return Err(AuthError::Forbidden);
        }
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.store.users().list().await?)
    }

    async fn add_user(&self, email: &str, role: &str) -> Result<User, AuthError> {
        let email = validate_email(email)?;
        let role = role.trim();
        if role.is_empty() || role.len() > 40 {
            return Err(AuthError::Validation("role must be 1-40 characters".to_string()));
        }

        let users = self.store.users();
        if users.get_by_email(&email).await?.is_some() {
            return Err(AuthError::Conflict(format!("{email} is already registered")));
        }

        let user = users.create(&email, role).await?;
        info!(event = "user_created", user_id = user.id, role = %user.role);
        Ok(user)
    }

    async fn remove_user(&self, id: i32, acting_user_id: i32) -> Result<(), AuthError> {
        if id == acting_user_id {
            return Err(AuthError::Validation(
                "you cannot remove your own account".to_string(),
            ));
        }
        if !self.store.users().delete(id).await? {
            return Err(AuthError::UserNotFound);
        }
        info!(event = "user_deleted", user_id = id);
        Ok(())
    }

    async fn bootstrap_admins(&self, emails: &[String]) -> Result<usize, AuthError> {
        let mut created = 0;
        for email in emails {
            let email = validate_email(email)?;
            if self.store.users().upsert(&email, ADMIN_ROLE).await? {
                created += 1;
                info!(event = "admin_bootstrapped", email = %email);
            }
        }
        Ok(created)
    }

    async fn purge_expired(&self) -> Result<u64, AuthError> {
        Ok(self.store.login_tokens().purge(&now_timestamp()).await?)
    }
}
