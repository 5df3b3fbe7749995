//! User store.

use sqlx::SqlitePool;
use tracing::info;

use super::error::StoreError;
use super::models::{new_object_id, normalize_object_id, User};

/// Insert a new user. Username uniqueness is enforced by the unique index, so
/// concurrent registrations of the same name cannot both succeed.
pub async fn create(
    pool: &SqlitePool,
    username: &str,
    name: &str,
    password_hash: &str,
) -> Result<User, StoreError> {
    if username.trim().is_empty() {
        return Err(StoreError::validation("username", "Username is required"));
    }
    if password_hash.is_empty() {
        return Err(StoreError::validation("password", "Password is required"));
    }

    let id = new_object_id();
    let result = sqlx::query("INSERT INTO users (id, username, name, password_hash) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(username)
        .bind(name)
        .bind(password_hash)
        .execute(pool)
        .await;

    match result {
        Ok(_) => {}
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Err(StoreError::DuplicateUsername);
        }
        Err(e) => return Err(e.into()),
    }

    info!(user_id = %id, username = %username, "User created");

    find_by_id(pool, &id).await
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>, StoreError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<User, StoreError> {
    let id = normalize_object_id(id).ok_or_else(|| StoreError::validation("id", "Malformed id"))?;

    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&id)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound("user"))
}

/// All users in creation order
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<User>, StoreError> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY rowid")
        .fetch_all(pool)
        .await?;
    Ok(users)
}
