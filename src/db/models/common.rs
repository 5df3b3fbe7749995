//! Record identifiers shared by users and blogs.
//!
//! An id is 12 bytes rendered as 24 lowercase hex characters: four bytes of
//! big-endian seconds since the epoch followed by eight random bytes.

use rand::Rng;

/// Length of an id in hex characters
pub const OBJECT_ID_LEN: usize = 24;

/// Generate a fresh record id
pub fn new_object_id() -> String {
    let mut bytes = [0u8; OBJECT_ID_LEN / 2];
    let secs = u32::try_from(chrono::Utc::now().timestamp()).unwrap_or(u32::MAX);
    bytes[..4].copy_from_slice(&secs.to_be_bytes());
    rand::rng().fill(&mut bytes[4..]);
    hex::encode(bytes)
}

/// Check that `id` has the shape of a record id (24 hex digits, any case)
pub fn is_object_id(id: &str) -> bool {
    id.len() == OBJECT_ID_LEN && id.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Canonical (lowercase) form of a well-formed id, or `None`
pub fn normalize_object_id(id: &str) -> Option<String> {
    is_object_id(id).then(|| id.to_ascii_lowercase())
}
