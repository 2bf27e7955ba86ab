//! Post data model.
//!
//! A post belongs to exactly one user for its whole lifetime. `PostUpdate`
//! deliberately has no owner field: ownership never changes after creation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Validation errors returned by the post payload constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostValidationError {
    /// Title is empty once trimmed.
    #[error("title must not be empty")]
    EmptyTitle,
    /// Content is empty once trimmed.
    #[error("content must not be empty")]
    EmptyContent,
    /// Owning user id is zero, which no stored user can have.
    #[error("user_id must reference a user")]
    MissingOwner,
}

fn validate_text(title: &str, content: &str) -> Result<(), PostValidationError> {
    if title.trim().is_empty() {
        return Err(PostValidationError::EmptyTitle);
    }
    if content.trim().is_empty() {
        return Err(PostValidationError::EmptyContent);
    }
    Ok(())
}

/// Stored post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Post {
    /// Server-assigned identifier.
    #[schema(example = 1)]
    pub id: u64,
    /// Headline.
    #[schema(example = "Notes on the analytical engine")]
    pub title: String,
    /// Body text.
    #[schema(example = "The engine weaves algebraic patterns.")]
    pub content: String,
    /// Owning user.
    #[schema(example = 1)]
    pub user_id: u64,
}

/// Validated payload for creating a post.
///
/// # Examples
/// ```
/// use userpost_api::domain::{NewPost, PostValidationError};
///
/// let post = NewPost::try_new("Title", "Body", 1).expect("valid post");
/// assert_eq!(post.user_id(), 1);
/// assert_eq!(
///     NewPost::try_new("Title", "Body", 0),
///     Err(PostValidationError::MissingOwner)
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    title: String,
    content: String,
    user_id: u64,
}

impl NewPost {
    /// Validate and construct a creation payload.
    pub fn try_new(
        title: impl Into<String>,
        content: impl Into<String>,
        user_id: u64,
    ) -> Result<Self, PostValidationError> {
        let title = title.into();
        let content = content.into();
        validate_text(&title, &content)?;
        if user_id == 0 {
            return Err(PostValidationError::MissingOwner);
        }
        Ok(Self {
            title,
            content,
            user_id,
        })
    }

    /// Headline.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Body text.
    pub fn content(&self) -> &str {
        self.content.as_str()
    }

    /// Owning user.
    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    /// Materialise the stored record once the store has assigned `id`.
    pub fn into_post(self, id: u64) -> Post {
        Post {
            id,
            title: self.title,
            content: self.content,
            user_id: self.user_id,
        }
    }
}

/// Validated title and content, not yet bound to a post.
///
/// Lets callers validate an update body before they know which row it
/// targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFields {
    title: String,
    content: String,
}

impl PostFields {
    /// Validate a title and content pair.
    pub fn try_new(
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, PostValidationError> {
        let title = title.into();
        let content = content.into();
        validate_text(&title, &content)?;
        Ok(Self { title, content })
    }

    /// Bind the fields to post `id`.
    pub fn into_update(self, id: u64) -> PostUpdate {
        PostUpdate {
            id,
            title: self.title,
            content: self.content,
        }
    }
}

/// Validated replacement of a post's title and content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostUpdate {
    id: u64,
    title: String,
    content: String,
}

impl PostUpdate {
    /// Validate and construct an update for the post identified by `id`.
    pub fn try_new(
        id: u64,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, PostValidationError> {
        let title = title.into();
        let content = content.into();
        validate_text(&title, &content)?;
        Ok(Self { id, title, content })
    }

    /// Row targeted by the update.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Replacement headline.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Replacement body text.
    pub fn content(&self) -> &str {
        self.content.as_str()
    }

    /// Apply the update to the stored post, keeping its owner.
    pub fn apply_to(self, post: &Post) -> Post {
        Post {
            id: post.id,
            title: self.title,
            content: self.content,
            user_id: post.user_id,
        }
    }
}
