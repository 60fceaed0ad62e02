//! User repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use solvehub_core::{
    Error, NewUser, Result, Role, UpdateProfileRequest, User, UserRepository,
};

/// Validate a username.
///
/// Rules: 3-32 characters, alphanumeric plus hyphens and underscores,
/// must start with a letter or digit.
pub fn validate_username(username: &str) -> std::result::Result<(), String> {
    let len = username.chars().count();
    if !(3..=32).contains(&len) {
        return Err("Username must be between 3 and 32 characters".to_string());
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(
            "Username may only contain letters, digits, hyphens, and underscores".to_string(),
        );
    }
    if !username.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()) {
        return Err("Username must start with a letter or digit".to_string());
    }
    Ok(())
}

fn map_user(row: &PgRow) -> Result<User> {
    let role_str: String = row.get("role");
    let role = Role::parse(&role_str)
        .ok_or_else(|| Error::Internal(format!("Unknown role in database: {}", role_str)))?;
    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        display_name: row.get("display_name"),
        bio: row.get("bio"),
        avatar_url: row.get("avatar_url"),
        role,
        is_active: row.get("is_active"),
        created_at_utc: row.get("created_at_utc"),
        updated_at_utc: row.get("updated_at_utc"),
    })
}

const USER_COLUMNS: &str = "id, username, email, password_hash, display_name, bio, avatar_url, \
                            role, is_active, created_at_utc, updated_at_utc";

/// PostgreSQL implementation of UserRepository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User> {
        validate_username(&user.username).map_err(Error::InvalidInput)?;
        if !user.email.contains('@') {
            return Err(Error::InvalidInput("Invalid email address".to_string()));
        }

        let id = Uuid::now_v7();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO app_user \
             (id, username, email, password_hash, display_name, role, is_active, \
              created_at_utc, updated_at_utc) \
             VALUES ($1, $2, $3, $4, $5, 'student', TRUE, $6, $6)",
        )
        .bind(id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            display_name: user.display_name,
            bio: None,
            avatar_url: None,
            role: Role::Student,
            is_active: true,
            created_at_utc: now,
            updated_at_utc: now,
        })
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM app_user WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(map_user).transpose()
    }

    async fn fetch_by_login(&self, username_or_email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM app_user \
             WHERE LOWER(username) = LOWER($1) OR LOWER(email) = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(username_or_email)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(map_user).transpose()
    }

    async fn fetch_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM app_user WHERE LOWER(username) = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(map_user).transpose()
    }

    async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> Result<User> {
        let row = sqlx::query(&format!(
            "UPDATE app_user SET \
             display_name = COALESCE($2, display_name), \
             bio = COALESCE($3, bio), \
             avatar_url = COALESCE($4, avatar_url), \
             updated_at_utc = $5 \
             WHERE id = $1 \
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(&req.display_name)
        .bind(&req.bio)
        .bind(&req.avatar_url)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(row) => map_user(&row),
            None => Err(Error::UserNotFound(id.to_string())),
        }
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<()> {
        let result = sqlx::query(
            "UPDATE app_user SET is_active = $2, updated_at_utc = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::UserNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn set_saved(&self, user_id: Uuid, exercise_id: Uuid, saved: bool) -> Result<()> {
        if saved {
            sqlx::query(
                "INSERT INTO saved_exercise (user_id, exercise_id, created_at_utc) \
                 VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
            )
            .bind(user_id)
            .bind(exercise_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        } else {
            sqlx::query("DELETE FROM saved_exercise WHERE user_id = $1 AND exercise_id = $2")
                .bind(user_id)
                .bind(exercise_id)
                .execute(&self.pool)
                .await
                .map_err(Error::Database)?;
        }
        Ok(())
    }

    async fn set_completed(&self, user_id: Uuid, exercise_id: Uuid, completed: bool) -> Result<()> {
        if completed {
            sqlx::query(
                "INSERT INTO completed_exercise (user_id, exercise_id, created_at_utc) \
                 VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
            )
            .bind(user_id)
            .bind(exercise_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        } else {
            sqlx::query("DELETE FROM completed_exercise WHERE user_id = $1 AND exercise_id = $2")
                .bind(user_id)
                .bind(exercise_id)
                .execute(&self.pool)
                .await
                .map_err(Error::Database)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username_accepts_reasonable_names() {
        assert!(validate_username("ana").is_ok());
        assert!(validate_username("joao_silva").is_ok());
        assert!(validate_username("user-42").is_ok());
    }

    #[test]
    fn test_validate_username_rejects_bad_names() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"x".repeat(33)).is_err());
        assert!(validate_username("with spaces").is_err());
        assert!(validate_username("_leading").is_err());
        assert!(validate_username("ação").is_err());
    }
}
