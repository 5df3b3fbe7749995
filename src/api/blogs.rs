use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::db::{blogs, users, Blog, BlogChanges, CreateBlogRequest, NewBlog, StoreError, UpdateBlogRequest};
use crate::AppState;

use super::auth::AuthUser;
use super::error::{ApiError, FieldErrors};
use super::validation::{validate_likes, validate_object_id, validate_title, validate_url};

/// Validate a CreateBlogRequest
fn validate_create_request(req: &CreateBlogRequest) -> Result<(), ApiError> {
    let mut errors = FieldErrors::default();
    errors.check("title", validate_title(req.title.as_deref()));
    errors.check("url", validate_url(req.url.as_deref()));
    if let Some(likes) = req.likes {
        errors.check("likes", validate_likes(likes));
    }
    errors.into_result()
}

/// Validate an UpdateBlogRequest (only validates provided fields)
fn validate_update_request(req: &UpdateBlogRequest) -> Result<(), ApiError> {
    let mut errors = FieldErrors::default();
    if req.title.is_some() {
        errors.check("title", validate_title(req.title.as_deref()));
    }
    if req.url.is_some() {
        errors.check("url", validate_url(req.url.as_deref()));
    }
    if let Some(likes) = req.likes {
        errors.check("likes", validate_likes(likes));
    }
    errors.into_result()
}

fn check_id(id: &str) -> Result<(), ApiError> {
    validate_object_id(id, "blog_id").map_err(|e| ApiError::invalid_field("blog_id", e))
}

/// List all blogs with their owners
///
/// GET /api/blogs
pub async fn list_blogs(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Blog>>, ApiError> {
    let blogs = blogs::list_all(&state.db).await?;
    Ok(Json(blogs))
}

/// GET /api/blogs/:id
pub async fn get_blog(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Blog>, ApiError> {
    check_id(&id)?;

    let blog = blogs::find_by_id(&state.db, &id).await?;
    Ok(Json(blog))
}

/// Create a blog owned by the caller
///
/// POST /api/blogs
pub async fn create_blog(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    payload: Result<Json<CreateBlogRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Blog>), ApiError> {
    let Json(req) = payload?;
    validate_create_request(&req)?;

    // The token may outlive its user (e.g. after re-seeding)
    match users::find_by_id(&state.db, &user.id).await {
        Ok(_) => {}
        Err(StoreError::NotFound(_)) | Err(StoreError::Validation { .. }) => {
            return Err(ApiError::unauthorized("Token user no longer exists"));
        }
        Err(e) => return Err(e.into()),
    }

    let new_blog = NewBlog {
        title: req.title.unwrap_or_default(),
        author: req.author.unwrap_or_default(),
        url: req.url.unwrap_or_default(),
        likes: req.likes.unwrap_or(0),
    };

    let blog = blogs::create(&state.db, &new_blog, &user.id).await?;

    Ok((StatusCode::CREATED, Json(blog)))
}

/// Update any subset of a blog's fields. Open to unauthenticated callers.
///
/// PUT /api/blogs/:id
pub async fn update_blog(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateBlogRequest>, JsonRejection>,
) -> Result<Json<Blog>, ApiError> {
    check_id(&id)?;

    let Json(req) = payload?;
    validate_update_request(&req)?;

    let changes = BlogChanges {
        title: req.title,
        author: req.author,
        url: req.url,
        likes: req.likes,
    };

    let blog = blogs::update(&state.db, &id, &changes).await?;
    Ok(Json(blog))
}

/// Delete a blog; only its owner may do so
///
/// DELETE /api/blogs/:id
pub async fn delete_blog(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    check_id(&id)?;

    blogs::delete(&state.db, &id, &user.id).await?;

    info!(blog_id = %id, user = %user.username, "Blog removed via API");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_create_request() {
        let req = CreateBlogRequest {
            title: Some("T".to_string()),
            author: None,
            url: Some("U".to_string()),
            likes: None,
        };
        assert!(validate_create_request(&req).is_ok());
    }

    #[test]
    fn test_validate_create_request_missing_fields() {
        let req = CreateBlogRequest {
            title: Some(String::new()),
            ..Default::default()
        };
        let err = validate_create_request(&req).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_validate_create_request_negative_likes() {
        let req = CreateBlogRequest {
            title: Some("T".to_string()),
            url: Some("U".to_string()),
            likes: Some(-3),
            ..Default::default()
        };
        assert!(validate_create_request(&req).is_err());
    }

    #[test]
    fn test_validate_update_request_only_checks_present_fields() {
        let req = UpdateBlogRequest {
            likes: Some(10),
            ..Default::default()
        };
        assert!(validate_update_request(&req).is_ok());
        assert!(validate_update_request(&UpdateBlogRequest::default()).is_ok());

        let req = UpdateBlogRequest {
            title: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(validate_update_request(&req).is_err());
    }

    #[test]
    fn test_check_id() {
        assert!(check_id("507f1f77bcf86cd799439011").is_ok());
        assert_eq!(check_id("invalid-id").unwrap_err().status(), StatusCode::BAD_REQUEST);
    }
}
