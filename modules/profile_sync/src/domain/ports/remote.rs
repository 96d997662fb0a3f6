use async_trait::async_trait;
use serde_json::Value;

use crate::contract::model::{Profile, UserId, UserRecord};
use crate::domain::error::DomainError;

/// Transport-agnostic port to the remote profile store.
/// Any failure to reach the store or decode its answer is a `Transport` error.
#[async_trait]
pub trait ProfileRemote: Send + Sync {
    /// All user records whose email matches exactly (usually zero or one).
    async fn find_users_by_email(&self, email: &str) -> Result<Vec<UserRecord>, DomainError>;

    /// Posts authored by the given user. Only the count is interpreted.
    async fn list_posts_by_author(&self, author: &UserId) -> Result<Vec<Value>, DomainError>;

    /// Full-record replace of the user; returns the canonical stored record.
    async fn put_user(&self, id: &UserId, profile: &Profile) -> Result<UserRecord, DomainError>;
}
