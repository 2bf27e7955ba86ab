//! Storage contract between HTTP handlers and persistence adapters.
//!
//! Handlers depend only on [`DbRepository`]; the Diesel adapter and the
//! in-memory double both implement it and translate their backend failures
//! into the three [`RepositoryError`] kinds.

use async_trait::async_trait;

use crate::domain::{NewPost, NewUser, Post, PostUpdate, User, UserUpdate};

use super::define_port_error;

define_port_error! {
    /// Failures surfaced by storage adapters.
    ///
    /// Anything an adapter cannot classify as a missing row or a broken
    /// uniqueness/referential rule is reported as `Unavailable`.
    pub enum RepositoryError {
        /// No row matched the identifier.
        NotFound => "record not found: {message}",
        /// A uniqueness or referential-integrity rule rejected the write.
        ConstraintViolation => "constraint violated: {message}",
        /// The backend could not be reached or failed unexpectedly.
        Unavailable => "storage unavailable: {message}",
    }
}

/// Connection pool occupancy reported by pooled backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Connections currently open, idle or in use.
    pub open: u32,
    /// Open connections waiting in the pool.
    pub idle: u32,
}

/// Persistence port for users and posts.
///
/// Every operation is a single-row (or single-table read) call; there are no
/// multi-step transactions. Concurrent updates to one row are last-writer-wins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DbRepository: Send + Sync {
    /// Check that the backend is reachable. Used for health reporting only.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Pool statistics of the underlying connection, if the backend has one.
    fn connection(&self) -> Option<ConnectionStats>;

    /// Insert a user and return it with its assigned identifier.
    async fn user_create(&self, user: &NewUser) -> Result<User, RepositoryError>;

    /// All users in insertion order.
    async fn user_get_all(&self) -> Result<Vec<User>, RepositoryError>;

    /// Fetch one user.
    async fn user_get_by_id(&self, id: u64) -> Result<User, RepositoryError>;

    /// Remove one user together with the posts it owns.
    async fn user_delete_by_id(&self, id: u64) -> Result<(), RepositoryError>;

    /// Replace the name and email of an existing user.
    async fn user_update(&self, update: &UserUpdate) -> Result<User, RepositoryError>;

    /// Insert a post owned by an existing user.
    async fn post_create(&self, post: &NewPost) -> Result<Post, RepositoryError>;

    /// All posts in insertion order.
    async fn post_get_all(&self) -> Result<Vec<Post>, RepositoryError>;

    /// Fetch one post.
    async fn post_get_by_id(&self, id: u64) -> Result<Post, RepositoryError>;

    /// Remove one post.
    async fn post_delete_by_id(&self, id: u64) -> Result<(), RepositoryError>;

    /// Replace the title and content of an existing post.
    async fn post_update(&self, update: &PostUpdate) -> Result<Post, RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RepositoryError::not_found("user 3"), "record not found: user 3")]
    #[case(
        RepositoryError::constraint_violation("users_email_key"),
        "constraint violated: users_email_key"
    )]
    #[case(RepositoryError::unavailable("timeout"), "storage unavailable: timeout")]
    fn errors_render_kind_and_detail(#[case] error: RepositoryError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }
}
