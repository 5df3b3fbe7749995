//! Blog models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A blog row joined with its owner's public fields.
#[derive(Debug, Clone, FromRow)]
pub struct BlogRow {
    pub id: String,
    pub title: String,
    pub author: String,
    pub url: String,
    pub likes: i64,
    pub user_id: String,
    pub owner_username: String,
    pub owner_name: String,
}

/// Owner reference expanded inside a blog response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogOwner {
    pub id: String,
    pub username: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    pub id: String,
    pub title: String,
    pub author: String,
    pub url: String,
    pub likes: i64,
    pub user: BlogOwner,
}

impl From<BlogRow> for Blog {
    fn from(row: BlogRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            author: row.author,
            url: row.url,
            likes: row.likes,
            user: BlogOwner {
                id: row.user_id,
                username: row.owner_username,
                name: row.owner_name,
            },
        }
    }
}

// DTOs for API

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateBlogRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub likes: Option<i64>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub likes: Option<i64>,
}

/// Validated input for a new blog
#[derive(Debug, Clone)]
pub struct NewBlog {
    pub title: String,
    pub author: String,
    pub url: String,
    pub likes: i64,
}

/// Validated partial update
#[derive(Debug, Clone, Default)]
pub struct BlogChanges {
    pub title: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub likes: Option<i64>,
}

impl BlogChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.url.is_none() && self.likes.is_none()
    }
}
