use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::TokenPolicy;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and JWT issuance.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
}

/// Result of successful authentication.
#[derive(Debug)]
pub struct AuthenticationResult {
    /// Signed access token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create an authenticator with default Argon2id parameters.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    /// * `policy` - Issuer, audience and lifetime of issued tokens
    pub fn new(jwt_secret: &[u8], policy: TokenPolicy) -> Self {
        Self::with_hasher(jwt_secret, policy, PasswordHasher::new())
    }

    /// Create an authenticator around a preconfigured password hasher.
    pub fn with_hasher(
        jwt_secret: &[u8],
        policy: TokenPolicy,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            password_hasher: hasher,
            jwt_handler: JwtHandler::new(jwt_secret, policy),
        }
    }

    pub fn policy(&self) -> &TokenPolicy {
        self.jwt_handler.policy()
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Build claims for a user under this authenticator's policy.
    pub fn claims_for(&self, user_id: impl ToString, role: impl ToString) -> Claims {
        Claims::for_user(user_id, role, self.policy())
    }

    /// Verify credentials and sign a token for `claims`.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `claims` - Claims to encode in the token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash is unusable
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        claims: &Claims,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        let is_valid = self.password_hasher.verify(password, stored_hash)?;

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.jwt_handler.encode(claims)?;

        Ok(AuthenticationResult { access_token })
    }

    /// Spend the cost of a password verification without an account.
    ///
    /// Call on lookup misses so unknown identifiers are not distinguishable
    /// by response time. Yields `InvalidCredentials`, or `PasswordError` when
    /// the decoy verification itself could not run.
    pub fn reject(&self, password: &str) -> AuthenticationError {
        match self.password_hasher.verify_decoy(password) {
            Ok(()) => AuthenticationError::InvalidCredentials,
            Err(e) => AuthenticationError::PasswordError(e),
        }
    }

    /// Sign claims without password verification.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn generate_token(&self, claims: &Claims) -> Result<String, JwtError> {
        self.jwt_handler.encode(claims)
    }

    /// Validate a token and return its claims.
    ///
    /// # Errors
    /// * `JwtError` - Token validation or decoding failed
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.decode(token)
    }
}
