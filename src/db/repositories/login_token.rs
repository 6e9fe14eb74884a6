use crate::db::now_timestamp;
use crate::entities::{login_tokens, prelude::*};
use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

pub struct LoginTokenRepository {
    conn: DatabaseConnection,
}

impl LoginTokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, user_id: i32, token_hash: &str, expires_at: &str) -> Result<()> {
        let active = login_tokens::ActiveModel {
            user_id: Set(user_id),
            token_hash: Set(token_hash.to_string()),
            expires_at: Set(expires_at.to_string()),
            used_at: Set(None),
            created_at: Set(now_timestamp()),
            ..Default::default()
        };
        active
            .insert(&self.conn)
            .await
            .context("Failed to store login token")?;
        Ok(())
    }

    /// Marks an unused, unexpired token as used and returns its user id.
    ///
    /// The conditional update means two concurrent consumers cannot both win.
    pub async fn consume(&self, token_hash: &str, now: &str) -> Result<Option<i32>> {
        let Some(token) = LoginTokens::find()
            .filter(login_tokens::Column::TokenHash.eq(token_hash))
            .filter(login_tokens::Column::UsedAt.is_null())
            .filter(login_tokens::Column::ExpiresAt.gt(now))
            .one(&self.conn)
            .await
            .context("Failed to query login token")?
        else {
            return Ok(None);
        };

        let result = LoginTokens::update_many()
            .col_expr(login_tokens::Column::UsedAt, Some(now.to_string()).into())
            .filter(login_tokens::Column::Id.eq(token.id))
            .filter(login_tokens::Column::UsedAt.is_null())
            .exec(&self.conn)
            .await
            .context("Failed to mark login token used")?;

        Ok((result.rows_affected == 1).then_some(token.user_id))
    }

    /// Deletes spent and expired tokens. Returns the number removed.
    pub async fn purge(&self, now: &str) -> Result<u64> {
        let result = LoginTokens::delete_many()
            .filter(
                Condition::any()
                    .add(login_tokens::Column::UsedAt.is_not_null())
                    .add(login_tokens::Column::ExpiresAt.lte(now)),
            )
            .exec(&self.conn)
            .await
            .context("Failed to purge login tokens")?;
        Ok(result.rows_affected)
    }
}
