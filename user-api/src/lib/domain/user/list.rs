use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::service::Service;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::ListUsersQuery;
use crate::domain::user::models::PublicUser;
use crate::domain::user::models::Role;
use crate::domain::user::models::UserFilter;
use crate::domain::user::ports::UserStore;

/// Lists users, optionally restricted to one role, without password hashes.
pub struct ListUsersService<S>
where
    S: UserStore,
{
    store: Arc<S>,
}

impl<S> ListUsersService<S>
where
    S: UserStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> Service for ListUsersService<S>
where
    S: UserStore,
{
    type Request = ListUsersQuery;
    type Output = Vec<PublicUser>;
    type Error = UserError;

    async fn execute(&self, query: ListUsersQuery) -> Result<Vec<PublicUser>, UserError> {
        let filter = match query.role {
            Some(role) => UserFilter::by_role(Role::new(role)),
            None => UserFilter::all(),
        };

        let users = self.store.get_all(&filter).await?;

        Ok(users.into_iter().map(PublicUser::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::store::StoreError;
    use crate::domain::user::test_support::authenticator;
    use crate::domain::user::test_support::stored_user;
    use crate::domain::user::test_support::MockUserStore;

    #[tokio::test]
    async fn test_list_all_users() {
        let authenticator = authenticator();
        let users = vec![
            stored_user(&authenticator, "a@b.com", "password1", "user"),
            stored_user(&authenticator, "c@d.com", "password2", "admin"),
        ];

        let mut store = MockUserStore::new();
        let returned = users.clone();
        store
            .expect_get_all()
            .withf(|filter| filter.is_empty())
            .times(1)
            .returning(move |_| Ok(returned.clone()));

        let service = ListUsersService::new(Arc::new(store));
        let listed = service.execute(ListUsersQuery::default()).await.unwrap();

        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, users[0].id);
        assert_eq!(listed[1].role.as_str(), "admin");

        let json = serde_json::to_value(&listed).unwrap();
        for user in json.as_array().unwrap() {
            assert!(user.get("password_hash").is_none());
        }
    }

    #[tokio::test]
    async fn test_list_users_by_role() {
        let mut store = MockUserStore::new();
        store
            .expect_get_all()
            .withf(|filter| {
                filter.role.as_ref().map(Role::as_str) == Some("admin")
                    && filter.email.is_none()
                    && filter.id.is_none()
            })
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let service = ListUsersService::new(Arc::new(store));
        let listed = service
            .execute(ListUsersQuery {
                role: Some("admin".to_string()),
            })
            .await
            .unwrap();

        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_list_users_store_failure() {
        let mut store = MockUserStore::new();
        store
            .expect_get_all()
            .times(1)
            .returning(|_| Err(StoreError::Database("timeout".to_string())));

        let service = ListUsersService::new(Arc::new(store));
        let result = service.execute(ListUsersQuery::default()).await;

        assert!(matches!(result, Err(UserError::Store(_))));
    }
}
