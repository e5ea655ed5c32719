//! Authentication utilities library
//!
//! Provides the credential side of the API:
//! - Password hashing and verification (Argon2id)
//! - Access token issuance and validation (HS256 JWT)
//! - Authentication coordination
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, TokenPolicy};
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!", TokenPolicy::default());
//!
//! let hash = auth.hash_password("password123").unwrap();
//!
//! let claims = auth.claims_for("user123", "admin");
//! let result = auth.authenticate("password123", &hash, &claims).unwrap();
//!
//! let decoded = auth.validate_token(&result.access_token).unwrap();
//! assert_eq!(decoded.sub, "user123");
//! assert_eq!(decoded.role, "admin");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenPolicy;
pub use password::PasswordError;
pub use password::PasswordHasher;
