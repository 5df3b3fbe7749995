//! Field checks for request bodies and path ids.
//!
//! Each check returns the user-facing message on failure; handlers gather them
//! with `FieldErrors`.

use lazy_static::lazy_static;
use regex::Regex;

use crate::db::is_object_id;

/// Minimum username length
pub const MIN_USERNAME_LEN: usize = 3;

/// Minimum password length
pub const MIN_PASSWORD_LEN: usize = 3;

pub const MAX_USERNAME_LEN: usize = 64;
pub const MAX_TITLE_LEN: usize = 512;
pub const MAX_URL_LEN: usize = 2048;

lazy_static! {
    /// Usernames are a single token with no whitespace
    static ref USERNAME_REGEX: Regex = Regex::new(r"^\S+$").unwrap();
}

/// Validate a username for registration
pub fn validate_username(username: Option<&str>) -> Result<(), String> {
    let username = match username {
        Some(u) if !u.is_empty() => u,
        _ => return Err("Username is required".to_string()),
    };

    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(format!(
            "Username must be at least {} characters",
            MIN_USERNAME_LEN
        ));
    }

    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(format!(
            "Username is too long (max {} characters)",
            MAX_USERNAME_LEN
        ));
    }

    if !USERNAME_REGEX.is_match(username) {
        return Err("Username must not contain whitespace".to_string());
    }

    Ok(())
}

/// Validate a password for registration
pub fn validate_password(password: Option<&str>) -> Result<(), String> {
    let password = match password {
        Some(p) if !p.is_empty() => p,
        _ => return Err("Password is required".to_string()),
    };

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        ));
    }

    Ok(())
}

/// Validate a blog title (required, non-blank)
pub fn validate_title(title: Option<&str>) -> Result<(), String> {
    match title {
        Some(t) if !t.trim().is_empty() => {
            if t.chars().count() > MAX_TITLE_LEN {
                Err(format!("Title is too long (max {} characters)", MAX_TITLE_LEN))
            } else {
                Ok(())
            }
        }
        _ => Err("Title is required".to_string()),
    }
}

/// Validate a blog URL (required, non-blank)
pub fn validate_url(url: Option<&str>) -> Result<(), String> {
    match url {
        Some(u) if !u.trim().is_empty() => {
            if u.chars().count() > MAX_URL_LEN {
                Err(format!("URL is too long (max {} characters)", MAX_URL_LEN))
            } else {
                Ok(())
            }
        }
        _ => Err("URL is required".to_string()),
    }
}

/// Validate a like count
pub fn validate_likes(likes: i64) -> Result<(), String> {
    if likes < 0 {
        return Err("Likes must not be negative".to_string());
    }
    Ok(())
}

/// Validate a record id taken from a path segment
pub fn validate_object_id(id: &str, field_name: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err(format!("{} is required", field_name));
    }

    if !is_object_id(id) {
        return Err(format!("Malformed {}", field_name));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username(Some("johndoe")).is_ok());
        assert!(validate_username(Some("abc")).is_ok());
        assert!(validate_username(Some("testuser_1700000000000")).is_ok());

        assert!(validate_username(None).is_err());
        assert!(validate_username(Some("")).is_err());
        assert!(validate_username(Some("ab")).is_err()); // too short
        assert!(validate_username(Some("john doe")).is_err()); // whitespace
        assert!(validate_username(Some(&"a".repeat(65))).is_err());
    }

    #[test]
    fn test_length_limits_count_characters() {
        // 64 two-byte characters is 128 bytes but still within the limit
        assert!(validate_username(Some(&"é".repeat(MAX_USERNAME_LEN))).is_ok());
        assert!(validate_username(Some(&"é".repeat(MAX_USERNAME_LEN + 1))).is_err());

        assert!(validate_title(Some(&"日".repeat(MAX_TITLE_LEN))).is_ok());
        assert!(validate_title(Some(&"日".repeat(MAX_TITLE_LEN + 1))).is_err());

        assert!(validate_url(Some(&"ü".repeat(MAX_URL_LEN))).is_ok());
        assert!(validate_url(Some(&"ü".repeat(MAX_URL_LEN + 1))).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password(Some("password123")).is_ok());
        assert!(validate_password(Some("abc")).is_ok());

        assert!(validate_password(None).is_err());
        assert!(validate_password(Some("")).is_err());
        assert!(validate_password(Some("ab")).is_err());
    }

    #[test]
    fn test_validate_title_and_url() {
        assert!(validate_title(Some("First Blog")).is_ok());
        assert!(validate_title(Some("")).is_err());
        assert!(validate_title(Some("   ")).is_err());
        assert!(validate_title(None).is_err());

        assert!(validate_url(Some("https://example.com")).is_ok());
        assert!(validate_url(Some("U")).is_ok());
        assert!(validate_url(None).is_err());
        assert!(validate_url(Some(&"u".repeat(2049))).is_err());
    }

    #[test]
    fn test_validate_likes() {
        assert!(validate_likes(0).is_ok());
        assert!(validate_likes(10).is_ok());
        assert!(validate_likes(-1).is_err());
    }

    #[test]
    fn test_validate_object_id() {
        assert!(validate_object_id("507f1f77bcf86cd799439011", "blog_id").is_ok());
        assert!(validate_object_id("invalid-id", "blog_id").is_err());
        assert!(validate_object_id("", "blog_id").is_err());
    }
}
