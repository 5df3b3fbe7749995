//! Blog store.

use sqlx::SqlitePool;
use tracing::info;

use super::error::StoreError;
use super::models::{new_object_id, normalize_object_id, Blog, BlogChanges, BlogRow, NewBlog};

const SELECT_BLOG: &str = "SELECT b.id, b.title, b.author, b.url, b.likes, b.user_id, \
     u.username AS owner_username, u.name AS owner_name \
     FROM blogs b JOIN users u ON u.id = b.user_id";

fn parse_id(id: &str) -> Result<String, StoreError> {
    normalize_object_id(id).ok_or_else(|| StoreError::validation("id", "Malformed id"))
}

fn map_constraint(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() {
            return StoreError::validation("user", "Owner does not exist");
        }
        if db_err.is_check_violation() {
            return StoreError::validation("likes", "Likes must not be negative");
        }
    }
    StoreError::Database(err)
}

/// Create a blog owned by `owner_id`.
pub async fn create(pool: &SqlitePool, blog: &NewBlog, owner_id: &str) -> Result<Blog, StoreError> {
    if blog.title.trim().is_empty() {
        return Err(StoreError::validation("title", "Title is required"));
    }
    if blog.url.trim().is_empty() {
        return Err(StoreError::validation("url", "URL is required"));
    }
    let owner_id = parse_id(owner_id)?;

    let id = new_object_id();
    sqlx::query("INSERT INTO blogs (id, title, author, url, likes, user_id) VALUES (?, ?, ?, ?, ?, ?)")
        .bind(&id)
        .bind(&blog.title)
        .bind(&blog.author)
        .bind(&blog.url)
        .bind(blog.likes)
        .bind(&owner_id)
        .execute(pool)
        .await
        .map_err(map_constraint)?;

    info!(blog_id = %id, owner = %owner_id, "Blog created");

    find_by_id(pool, &id).await
}

/// All blogs in creation order, owners expanded
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Blog>, StoreError> {
    let rows = sqlx::query_as::<_, BlogRow>(&format!("{} ORDER BY b.rowid", SELECT_BLOG))
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(Blog::from).collect())
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Blog, StoreError> {
    let id = parse_id(id)?;

    sqlx::query_as::<_, BlogRow>(&format!("{} WHERE b.id = ?", SELECT_BLOG))
        .bind(&id)
        .fetch_optional(pool)
        .await?
        .map(Blog::from)
        .ok_or(StoreError::NotFound("blog"))
}

/// Apply a partial update. Untouched fields keep their values; an empty change
/// set just returns the current record.
pub async fn update(pool: &SqlitePool, id: &str, changes: &BlogChanges) -> Result<Blog, StoreError> {
    let id = parse_id(id)?;

    if changes.is_empty() {
        return find_by_id(pool, &id).await;
    }

    let result = sqlx::query(
        "UPDATE blogs SET \
            title = COALESCE(?, title), \
            author = COALESCE(?, author), \
            url = COALESCE(?, url), \
            likes = COALESCE(?, likes) \
         WHERE id = ?",
    )
    .bind(&changes.title)
    .bind(&changes.author)
    .bind(&changes.url)
    .bind(changes.likes)
    .bind(&id)
    .execute(pool)
    .await
    .map_err(map_constraint)?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound("blog"));
    }

    find_by_id(pool, &id).await
}

/// Delete a blog on behalf of `requester_id`, who must be its owner.
pub async fn delete(pool: &SqlitePool, id: &str, requester_id: &str) -> Result<(), StoreError> {
    let id = parse_id(id)?;

    let owner: Option<(String,)> = sqlx::query_as("SELECT user_id FROM blogs WHERE id = ?")
        .bind(&id)
        .fetch_optional(pool)
        .await?;
    let (owner_id,) = owner.ok_or(StoreError::NotFound("blog"))?;

    if normalize_object_id(requester_id).as_deref() != Some(owner_id.as_str()) {
        return Err(StoreError::NotOwner("blog"));
    }

    // Owner re-checked in the statement itself
    let result = sqlx::query("DELETE FROM blogs WHERE id = ? AND user_id = ?")
        .bind(&id)
        .bind(&owner_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound("blog"));
    }

    info!(blog_id = %id, owner = %owner_id, "Blog deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{self, users};

    fn new_blog(title: &str, likes: i64) -> NewBlog {
        NewBlog {
            title: title.to_string(),
            author: "Test Author".to_string(),
            url: "https://example.com/post".to_string(),
            likes,
        }
    }

    async fn setup() -> (SqlitePool, String) {
        let pool = db::connect_memory().await.unwrap();
        let user = users::create(&pool, "owner", "Owner Name", "hash").await.unwrap();
        (pool, user.id)
    }

    #[tokio::test]
    async fn test_create_expands_owner() {
        let (pool, owner_id) = setup().await;

        let blog = create(&pool, &new_blog("T", 5), &owner_id).await.unwrap();
        assert_eq!(blog.title, "T");
        assert_eq!(blog.likes, 5);
        assert_eq!(blog.user.id, owner_id);
        assert_eq!(blog.user.username, "owner");
        assert_eq!(blog.user.name, "Owner Name");

        let fetched = find_by_id(&pool, &blog.id).await.unwrap();
        assert_eq!(fetched, blog);
    }

    #[tokio::test]
    async fn test_create_requires_title_and_url() {
        let (pool, owner_id) = setup().await;

        let err = create(&pool, &new_blog("", 0), &owner_id).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation { field: "title", .. }));

        let mut blog = new_blog("Title", 0);
        blog.url = String::new();
        let err = create(&pool, &blog, &owner_id).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation { field: "url", .. }));
    }

    #[tokio::test]
    async fn test_create_with_unknown_owner() {
        let (pool, _) = setup().await;

        let err = create(&pool, &new_blog("T", 0), "507f1f77bcf86cd799439011")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation { field: "user", .. }));
    }

    #[tokio::test]
    async fn test_list_all() {
        let (pool, owner_id) = setup().await;

        create(&pool, &new_blog("one", 1), &owner_id).await.unwrap();
        create(&pool, &new_blog("two", 2), &owner_id).await.unwrap();

        let blogs = list_all(&pool).await.unwrap();
        assert_eq!(blogs.len(), 2);
        assert_eq!(blogs[0].title, "one");
        assert_eq!(blogs[1].title, "two");
        assert!(blogs.iter().all(|b| b.user.username == "owner"));
    }

    #[tokio::test]
    async fn test_find_malformed_and_missing() {
        let (pool, _) = setup().await;

        assert!(matches!(
            find_by_id(&pool, "invalid-id").await,
            Err(StoreError::Validation { field: "id", .. })
        ));
        assert!(matches!(
            find_by_id(&pool, "507f1f77bcf86cd799439011").await,
            Err(StoreError::NotFound("blog"))
        ));
    }

    #[tokio::test]
    async fn test_update_partial_fields() {
        let (pool, owner_id) = setup().await;
        let blog = create(&pool, &new_blog("T", 5), &owner_id).await.unwrap();

        let changes = BlogChanges {
            likes: Some(10),
            ..Default::default()
        };
        let updated = update(&pool, &blog.id, &changes).await.unwrap();
        assert_eq!(updated.likes, 10);
        assert_eq!(updated.title, "T");
        assert_eq!(updated.url, blog.url);

        // Same update twice is fine
        let again = update(&pool, &blog.id, &changes).await.unwrap();
        assert_eq!(again.likes, 10);
    }

    #[tokio::test]
    async fn test_update_missing_blog() {
        let (pool, _) = setup().await;
        let changes = BlogChanges {
            likes: Some(1),
            ..Default::default()
        };

        assert!(matches!(
            update(&pool, "507f1f77bcf86cd799439011", &changes).await,
            Err(StoreError::NotFound("blog"))
        ));
        assert!(matches!(
            update(&pool, "507f1f77bcf86cd799439011", &BlogChanges::default()).await,
            Err(StoreError::NotFound("blog"))
        ));
    }

    #[tokio::test]
    async fn test_delete_requires_owner() {
        let (pool, owner_id) = setup().await;
        let other = users::create(&pool, "other", "Other", "hash").await.unwrap();
        let blog = create(&pool, &new_blog("T", 0), &owner_id).await.unwrap();

        let err = delete(&pool, &blog.id, &other.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotOwner("blog")));
        assert!(find_by_id(&pool, &blog.id).await.is_ok());

        delete(&pool, &blog.id, &owner_id).await.unwrap();
        assert!(matches!(
            find_by_id(&pool, &blog.id).await,
            Err(StoreError::NotFound("blog"))
        ));
        assert!(matches!(
            delete(&pool, &blog.id, &owner_id).await,
            Err(StoreError::NotFound("blog"))
        ));
    }
}
