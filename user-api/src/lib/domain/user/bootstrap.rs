use std::sync::Arc;

use auth::Authenticator;
use validator::Validate;

use crate::domain::store::StoreError;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginRequest;
use crate::domain::user::models::Role;
use crate::domain::user::models::UserDraft;
use crate::domain::user::models::UserFilter;
use crate::domain::user::ports::UserStore;
use crate::domain::user::run_blocking;

/// Account created at startup when it does not exist yet.
#[derive(Clone)]
pub struct BootstrapUser {
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Create `seed` unless a user with the same email is already stored.
///
/// An existing account is left untouched, including its password.
///
/// # Returns
/// `true` when the user was created
///
/// # Errors
/// * `Validation` - Seed credentials would never pass login validation
/// * `Password` - Hashing failed
/// * `Store` - Persistence failure
pub async fn ensure_user<S>(
    store: &S,
    authenticator: &Arc<Authenticator>,
    seed: &BootstrapUser,
) -> Result<bool, UserError>
where
    S: UserStore,
{
    LoginRequest::new(seed.email.clone(), seed.password.clone()).validate()?;
    let email = EmailAddress::new(seed.email.clone())?;

    if store
        .get_one(&UserFilter::by_email(email.clone()))
        .await?
        .is_some()
    {
        tracing::debug!(email = %email, "Bootstrap user already present");
        return Ok(false);
    }

    let hasher = Arc::clone(authenticator);
    let password = seed.password.clone();
    let password_hash = run_blocking(move || hasher.hash_password(&password)).await??;

    let draft = UserDraft {
        email,
        password_hash,
        role: seed.role.clone(),
    };

    match store.create(draft).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, role = %user.role, "Bootstrap user created");
            Ok(true)
        }
        // Another instance created it between the lookup and the insert.
        Err(StoreError::Duplicate(_)) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
