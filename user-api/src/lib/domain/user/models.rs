use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;
use validator::ValidationError;

use crate::domain::user::errors::EmailError;
use crate::domain::user::errors::UserIdError;

/// User record as held by the store.
///
/// Carries the password hash, so it is deliberately not `Serialize`; anything
/// leaving the service layer goes through [`PublicUser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Authorization tag attached to a user and copied into issued tokens.
///
/// The API attaches no meaning to its value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub const DEFAULT: &'static str = "user";

    pub fn new(role: impl Into<String>) -> Self {
        Self(role.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// User as exposed outside the service layer: no password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser {
    pub id: UserId,
    pub email: EmailAddress,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Selection criteria for store reads and deletes.
///
/// Set fields are combined with AND; an empty filter selects every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub id: Option<UserId>,
    pub email: Option<EmailAddress>,
    pub role: Option<Role>,
}

impl UserFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: UserId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn by_email(email: EmailAddress) -> Self {
        Self {
            email: Some(email),
            ..Self::default()
        }
    }

    pub fn by_role(role: Role) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.email.is_none() && self.role.is_none()
    }

    pub fn matches(&self, user: &User) -> bool {
        self.id.map_or(true, |id| user.id == id)
            && self.email.as_ref().map_or(true, |email| &user.email == email)
            && self.role.as_ref().map_or(true, |role| &user.role == role)
    }
}

/// Data for a new record; id and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub email: EmailAddress,
    pub password_hash: String,
    pub role: Role,
}

/// Partial update. Only provided fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub email: Option<EmailAddress>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password_hash.is_none() && self.role.is_none()
    }

    /// Apply the provided fields to `user`.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(password_hash) = &self.password_hash {
            user.password_hash = password_hash.clone();
        }
        if let Some(role) = &self.role {
            user.role = role.clone();
        }
    }
}

/// Require a dotted domain part, so `user@localhost` is rejected.
///
/// Addresses without `@` are left to the `email` rule.
fn validate_dotted_domain(email: &str) -> Result<(), ValidationError> {
    match email.rsplit_once('@') {
        Some((_, domain)) if !domain.contains('.') => Err(ValidationError::new("email")
            .with_message(Cow::Borrowed("must be a valid email address"))),
        _ => Ok(()),
    }
}

/// Login credentials as received on the wire.
///
/// Missing fields deserialize as empty strings so they are reported by
/// validation rather than rejected by the JSON parser.
#[derive(Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(
        email(code = "email", message = "must be a valid email address"),
        custom(function = "validate_dotted_domain")
    )]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 6, code = "length", message = "must be at least 6 characters"))]
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login: signed token plus the sanitized user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Query for the user listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListUsersQuery {
    pub role: Option<String>,
}
