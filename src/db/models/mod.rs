//! Database models split into domain-specific modules.

pub mod blog;
pub mod common;
pub mod user;

pub use blog::*;
pub use common::*;
pub use user::*;
