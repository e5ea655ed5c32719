use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use validator::Validate;

use crate::domain::service::Service;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginRequest;
use crate::domain::user::models::LoginResponse;
use crate::domain::user::models::User;
use crate::domain::user::models::UserFilter;
use crate::domain::user::ports::UserStore;
use crate::domain::user::run_blocking;

/// Exchanges email and password for a signed access token.
///
/// Runs validate, lookup, verify, issue and sanitize in that order. An
/// unknown email and a wrong password fail with the same
/// [`UserError::InvalidCredentials`].
pub struct LoginService<S>
where
    S: UserStore,
{
    store: Arc<S>,
    authenticator: Arc<Authenticator>,
}

impl<S> LoginService<S>
where
    S: UserStore,
{
    /// # Arguments
    /// * `store` - Shared user store; its lifecycle is owned by the caller
    /// * `authenticator` - Password verifier and token signer
    pub fn new(store: Arc<S>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            store,
            authenticator,
        }
    }

    async fn find_user_by_email(
        &self,
        email: EmailAddress,
        password: &str,
    ) -> Result<User, UserError> {
        match self.store.get_one(&UserFilter::by_email(email)).await? {
            Some(user) => Ok(user),
            None => {
                let authenticator = Arc::clone(&self.authenticator);
                let password = password.to_string();
                let rejection = run_blocking(move || authenticator.reject(&password)).await?;
                Err(rejection.into())
            }
        }
    }
}

#[async_trait]
impl<S> Service for LoginService<S>
where
    S: UserStore,
{
    type Request = LoginRequest;
    type Output = LoginResponse;
    type Error = UserError;

    async fn execute(&self, request: LoginRequest) -> Result<LoginResponse, UserError> {
        request.validate()?;

        let LoginRequest { email, password } = request;
        let email = EmailAddress::new(email)?;

        let user = self.find_user_by_email(email, &password).await?;

        let claims = self.authenticator.claims_for(user.id, &user.role);
        let authenticator = Arc::clone(&self.authenticator);
        let stored_hash = user.password_hash.clone();
        let result = run_blocking(move || {
            authenticator.authenticate(&password, &stored_hash, &claims)
        })
        .await??;

        tracing::info!(user_id = %user.id, role = %user.role, "user logged in successfully");

        Ok(LoginResponse {
            token: result.access_token,
            user: user.into(),
        })
    }
}
