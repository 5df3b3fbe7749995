//! Database seeders for test fixtures
//!
//! Clears the users and blogs tables and repopulates them with a small,
//! deterministic data set that the integration suite relies on.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::info;

use super::models::new_object_id;
use crate::crypto::hash_password;

/// Fixture users: (username, name, password)
const USERS: [(&str, &str, &str); 2] = [
    ("johndoe", "John Doe", "password123"),
    ("janedoe", "Jane Doe", "password456"),
];

/// Fixture blogs: (title, author, url, likes, index into USERS)
const BLOGS: [(&str, &str, &str, i64, usize); 3] = [
    ("First Blog", "John Doe", "https://example.com/first-blog", 10, 0),
    ("Second Blog", "Jane Doe", "https://example.com/second-blog", 15, 1),
    ("Another Blog by John", "John Doe", "https://example.com/another-blog", 8, 0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub blogs: usize,
}

/// Replace all users and blogs with the fixture data set.
pub async fn seed_fixtures(pool: &SqlitePool) -> Result<SeedSummary> {
    info!("Starting database seeding...");

    // Hash up front, off the async workers, so the transaction stays short
    let users = tokio::task::spawn_blocking(|| {
        USERS
            .into_iter()
            .map(|(username, name, password)| {
                let hash = hash_password(password).map_err(|e| {
                    anyhow::anyhow!("Failed to hash password for {}: {}", username, e)
                })?;
                Ok((new_object_id(), username, name, hash))
            })
            .collect::<Result<Vec<_>>>()
    })
    .await
    .context("Password hashing task failed")??;

    let mut tx = pool.begin().await.context("Failed to start seeding transaction")?;

    sqlx::query("DELETE FROM blogs").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM users").execute(&mut *tx).await?;
    info!("Cleared existing data");

    for (id, username, name, hash) in &users {
        sqlx::query("INSERT INTO users (id, username, name, password_hash) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(*username)
            .bind(*name)
            .bind(hash)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert user {}", username))?;
    }
    info!(count = users.len(), "Inserted users");

    for (title, author, url, likes, owner) in BLOGS {
        let (owner_id, ..) = &users[owner];
        sqlx::query("INSERT INTO blogs (id, title, author, url, likes, user_id) VALUES (?, ?, ?, ?, ?, ?)")
            .bind(new_object_id())
            .bind(title)
            .bind(author)
            .bind(url)
            .bind(likes)
            .bind(owner_id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert blog {}", title))?;
    }
    info!(count = BLOGS.len(), "Inserted blogs");

    tx.commit().await.context("Failed to commit seed data")?;

    info!("Database seeded");
    Ok(SeedSummary {
        users: users.len(),
        blogs: BLOGS.len(),
    })
}
