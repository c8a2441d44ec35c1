use async_trait::async_trait;

use super::repo_types::User;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email {0} is already registered")]
    DuplicateEmail(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence for user aggregates.
///
/// Email uniqueness is enforced by the store itself: `save` fails with
/// [`StoreError::DuplicateEmail`] when another user already owns the email,
/// whatever the caller checked beforehand.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Insert or update the whole aggregate. The stored phone list is
    /// replaced by `user.phones`; phones no longer listed are deleted.
    /// On update `created` is kept and `modified` is refreshed.
    async fn save(&self, user: User) -> Result<User, StoreError>;
}
