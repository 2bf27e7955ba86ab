//! User data model.
//!
//! `User` is the stored record. `NewUser` and `UserUpdate` are validated
//! write payloads; they can only be built through their fallible
//! constructors, so the storage adapters never see a blank name or a
//! malformed email.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Validation errors returned by the user payload constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Name is empty once trimmed.
    #[error("name must not be empty")]
    EmptyName,
    /// Email is empty once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Email does not look like `local@domain.tld`.
    #[error("email must be a valid address")]
    InvalidEmail,
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn validate_fields(name: &str, email: &str) -> Result<(), UserValidationError> {
    if name.trim().is_empty() {
        return Err(UserValidationError::EmptyName);
    }
    if email.trim().is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }
    if !email_regex().is_match(email) {
        return Err(UserValidationError::InvalidEmail);
    }
    Ok(())
}

/// Stored user.
///
/// ```json
/// {"id":1,"name":"A","email":"a@x.com"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Server-assigned identifier.
    #[schema(example = 1)]
    pub id: u64,
    /// Display name.
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    /// Unique email address.
    #[schema(example = "ada@example.com")]
    pub email: String,
}

/// Validated payload for creating a user.
///
/// # Examples
/// ```
/// use userpost_api::domain::{NewUser, UserValidationError};
///
/// let user = NewUser::try_new("Ada", "ada@example.com").expect("valid user");
/// assert_eq!(user.email(), "ada@example.com");
/// assert_eq!(
///     NewUser::try_new("Ada", "not-an-email"),
///     Err(UserValidationError::InvalidEmail)
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    name: String,
    email: String,
}

impl NewUser {
    /// Validate and construct a creation payload.
    pub fn try_new(
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        let name = name.into();
        let email = email.into();
        validate_fields(&name, &email)?;
        Ok(Self { name, email })
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Email address.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Materialise the stored record once the store has assigned `id`.
    pub fn into_user(self, id: u64) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
        }
    }

    /// Reuse already validated fields as a replacement for user `id`.
    pub fn into_update(self, id: u64) -> UserUpdate {
        UserUpdate {
            id,
            name: self.name,
            email: self.email,
        }
    }
}

/// Validated replacement of a user's mutable fields.
///
/// The identifier only targets the row; it is never written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUpdate {
    id: u64,
    name: String,
    email: String,
}

impl UserUpdate {
    /// Validate and construct an update for the user identified by `id`.
    pub fn try_new(
        id: u64,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        let name = name.into();
        let email = email.into();
        validate_fields(&name, &email)?;
        Ok(Self { id, name, email })
    }

    /// Row targeted by the update.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Replacement display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Replacement email address.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// The stored record after the update has been applied.
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
        }
    }
}
