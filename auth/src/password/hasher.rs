use std::sync::OnceLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as _;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

/// Plaintext used to build the decoy hash for unknown accounts.
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

/// Argon2id password hasher and verifier.
///
/// Hashes are stored in PHC string format, so the parameters used at hash time
/// travel with the hash and verification works across parameter changes.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    decoy: OnceLock<String>,
}

impl PasswordHasher {
    /// Hasher with the argon2 crate's recommended Argon2id parameters.
    pub fn new() -> Self {
        Self::from_argon2(Argon2::default())
    }

    /// Hasher with explicit cost parameters.
    ///
    /// # Arguments
    /// * `memory_kib` - Memory cost in KiB
    /// * `iterations` - Number of passes
    /// * `parallelism` - Degree of parallelism
    ///
    /// # Errors
    /// * `InvalidParameters` - Parameters are outside the ranges argon2 accepts
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| PasswordError::InvalidParameters(e.to_string()))?;

        Ok(Self::from_argon2(Argon2::new(
            Algorithm::Argon2id,
            Version::V0x13,
            params,
        )))
    }

    fn from_argon2(argon2: Argon2<'static>) -> Self {
        Self {
            argon2,
            decoy: OnceLock::new(),
        }
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Errors
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a plaintext password against a stored PHC hash.
    ///
    /// The digest comparison inside argon2 is constant-time.
    ///
    /// # Returns
    /// `true` when the password matches
    ///
    /// # Errors
    /// * `MalformedHash` - Stored hash is not a valid PHC string
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Run a full verification against a decoy hash and discard the result.
    ///
    /// Used when no account matches, so the response takes as long as a
    /// wrong-password attempt. The decoy is hashed on first use and cached
    /// only once hashing succeeds.
    ///
    /// # Errors
    /// * `HashingFailed` - The decoy hash could not be built
    /// * `MalformedHash` - The cached decoy is not a valid PHC string
    pub fn verify_decoy(&self, password: &str) -> Result<(), PasswordError> {
        let decoy = match self.decoy.get() {
            Some(decoy) => decoy,
            None => {
                let hash = self.hash(DECOY_PASSWORD)?;
                self.decoy.get_or_init(|| hash)
            }
        };

        self.verify(password, decoy).map(|_| ())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
