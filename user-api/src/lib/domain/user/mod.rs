pub mod bootstrap;
pub mod errors;
pub mod list;
pub mod login;
pub mod models;
pub mod ports;

pub use bootstrap::ensure_user;
pub use bootstrap::BootstrapUser;
pub use list::ListUsersService;
pub use login::LoginService;

use errors::UserError;

/// Run password hashing or verification on the blocking pool.
pub(crate) async fn run_blocking<F, T>(work: F) -> Result<T, UserError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| UserError::Worker(e.to_string()))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_trait::async_trait;
    use auth::Authenticator;
    use auth::PasswordHasher;
    use auth::TokenPolicy;
    use chrono::Utc;
    use mockall::mock;

    use super::models::EmailAddress;
    use super::models::Role;
    use super::models::User;
    use super::models::UserChanges;
    use super::models::UserDraft;
    use super::models::UserFilter;
    use super::models::UserId;
    use crate::domain::store::RecordStore;
    use crate::domain::store::StoreError;

    pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

    mock! {
        pub UserStore {}

        #[async_trait]
        impl RecordStore for UserStore {
            type Record = User;
            type Filter = UserFilter;
            type Draft = UserDraft;
            type Changes = UserChanges;
            type Id = UserId;

            async fn get_all(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError>;
            async fn get_one(&self, filter: &UserFilter) -> Result<Option<User>, StoreError>;
            async fn create(&self, data: UserDraft) -> Result<User, StoreError>;
            async fn update(&self, data: UserChanges, id: &UserId) -> Result<u64, StoreError>;
            async fn delete(&self, filter: &UserFilter) -> Result<u64, StoreError>;
        }
    }

    /// Authenticator with cheap hashing parameters.
    pub fn authenticator() -> Arc<Authenticator> {
        let hasher = PasswordHasher::with_params(1024, 1, 1).expect("valid argon2 params");
        Arc::new(Authenticator::with_hasher(
            TEST_SECRET,
            TokenPolicy::default(),
            hasher,
        ))
    }

    pub fn stored_user(
        authenticator: &Authenticator,
        email: &str,
        password: &str,
        role: &str,
    ) -> User {
        User {
            id: UserId::new(),
            email: EmailAddress::new(email.to_string()).expect("valid email"),
            password_hash: authenticator.hash_password(password).expect("hashable"),
            role: Role::new(role),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
