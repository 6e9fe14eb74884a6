use crate::db::now_timestamp;
use crate::entities::{prelude::*, users};
use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub role: String,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            role: model.role,
            created_at: model.created_at,
            last_login_at: model.last_login_at,
        }
    }
}

#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let model = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user")?;
        Ok(model.map(User::from))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let model = Users::find()
            .filter(users::Column::Email.eq(normalize_email(email)))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;
        Ok(model.map(User::from))
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let models = Users::find()
            .order_by_asc(users::Column::Email)
            .all(&self.conn)
            .await?;
        Ok(models.into_iter().map(User::from).collect())
    }

    pub async fn create(&self, email: &str, role: &str) -> Result<User> {
        let active = users::ActiveModel {
            email: Set(normalize_email(email)),
            role: Set(role.to_string()),
            created_at: Set(now_timestamp()),
            last_login_at: Set(None),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;
        Ok(model.into())
    }

    /// Creates the user or resets its role. Returns `true` when a row was created.
    pub async fn upsert(&self, email: &str, role: &str) -> Result<bool> {
        let existing = Users::find()
            .filter(users::Column::Email.eq(normalize_email(email)))
            .one(&self.conn)
            .await?;

        match existing {
            Some(model) if model.role == role => Ok(false),
            Some(model) => {
                let mut active: users::ActiveModel = model.into();
                active.role = Set(role.to_string());
                active.update(&self.conn).await?;
                Ok(false)
            }
            None => {
                self.create(email, role).await?;
                Ok(true)
            }
        }
    }

    pub async fn touch_login(&self, id: i32) -> Result<()> {
        Users::update_many()
            .col_expr(users::Column::LastLoginAt, Some(now_timestamp()).into())
            .filter(users::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to record login")?;
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Users::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn delete_by_email(&self, email: &str) -> Result<bool> {
        let result = Users::delete_many()
            .filter(users::Column::Email.eq(normalize_email(email)))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Owner@Example.COM "), "owner@example.com");
    }

    #[test]
    fn test_is_admin() {
        let mut user = User {
            id: 1,
            email: "owner@example.com".to_string(),
            role: ADMIN_ROLE.to_string(),
            created_at: now_timestamp(),
            last_login_at: None,
        };
        assert!(user.is_admin());
        user.role = "viewer".to_string();
        assert!(!user.is_admin());
    }
}
