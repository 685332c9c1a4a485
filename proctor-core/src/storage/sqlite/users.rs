//! Users table: primary key `name`, unique-indexed `token`. Only
//! `readiness` and `status` ever change after seeding.

use sqlx::QueryBuilder;
use sqlx::Sqlite;

use proctor_model::{User, UserStatus};

use crate::error::{CoreError, Result};

use super::{SqliteStorage, UserFilter};

#[derive(sqlx::FromRow)]
struct UserRow {
    name: String,
    token: String,
    character: String,
    role: String,
    readiness: bool,
    status: String,
}

impl UserRow {
    fn into_user(self) -> Result<User> {
        Ok(User {
            character: self
                .character
                .parse()
                .map_err(|e| CoreError::internal(format!("corrupt user row: {e}")))?,
            status: self
                .status
                .parse()
                .map_err(|e| CoreError::internal(format!("corrupt user row: {e}")))?,
            name: self.name,
            token: self.token,
            role: self.role,
            readiness: self.readiness,
        })
    }
}

impl SqliteStorage {
    pub(super) async fn insert_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (name, token, character, role, readiness, status) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.name)
        .bind(&user.token)
        .bind(user.character.as_str())
        .bind(&user.role)
        .bind(user.readiness)
        .bind(user.status.as_str())
        .execute(self.pool())
        .await
        .map_err(|e| CoreError::internal(format!("could not insert user {}: {e}", user.name)))?;
        Ok(())
    }

    /// Single indexed lookup backing authentication. `None` means the token
    /// is unknown; the caller decides what that implies.
    pub async fn user_by_token(&self, token: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE token = ?")
            .bind(token)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| CoreError::internal(format!("could not look up token: {e}")))?;

        row.map(UserRow::into_user).transpose()
    }

    pub async fn user_by_name(&self, name: &str) -> Result<User> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE name = ?")
            .bind(name)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| CoreError::internal(format!("could not look up user {name}: {e}")))?;

        row.ok_or_else(|| CoreError::not_found(format!("no user with name {name}")))?
            .into_user()
    }

    pub async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM users WHERE 1 = 1");
        if let Some(name) = &filter.name {
            qb.push(" AND name = ").push_bind(name);
        }
        if let Some(token) = &filter.token {
            qb.push(" AND token = ").push_bind(token);
        }
        if let Some(character) = filter.character {
            qb.push(" AND character = ").push_bind(character.as_str());
        }
        if let Some(role) = &filter.role {
            qb.push(" AND role = ").push_bind(role);
        }
        if let Some(readiness) = filter.readiness {
            qb.push(" AND readiness = ").push_bind(readiness);
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        qb.push(" ORDER BY name");

        let rows: Vec<UserRow> = qb
            .build_query_as()
            .fetch_all(self.pool())
            .await
            .map_err(|e| CoreError::internal(format!("could not list users: {e}")))?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    pub async fn update_user_status(&self, name: &str, status: UserStatus) -> Result<()> {
        let result = sqlx::query("UPDATE users SET status = ? WHERE name = ?")
            .bind(status.as_str())
            .bind(name)
            .execute(self.pool())
            .await
            .map_err(|e| {
                CoreError::internal(format!("could not update status of user {name}: {e}"))
            })?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found(format!("no user with name {name}")));
        }
        Ok(())
    }

    pub async fn update_user_readiness(&self, name: &str, readiness: bool) -> Result<()> {
        let result = sqlx::query("UPDATE users SET readiness = ? WHERE name = ?")
            .bind(readiness)
            .bind(name)
            .execute(self.pool())
            .await
            .map_err(|e| {
                CoreError::internal(format!("could not update readiness of user {name}: {e}"))
            })?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found(format!("no user with name {name}")));
        }
        Ok(())
    }
}
