use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::store::RecordStore;
use crate::domain::store::StoreError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserChanges;
use crate::domain::user::models::UserDraft;
use crate::domain::user::models::UserFilter;
use crate::domain::user::models::UserId;

const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Process-local user store.
///
/// Records are kept in insertion order, which is also the order `get_all`
/// returns them in. Email uniqueness is enforced like the `users_email_key`
/// constraint of the Postgres schema.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

fn email_taken(users: &[User], email: &EmailAddress, except: Option<UserId>) -> bool {
    users
        .iter()
        .any(|user| &user.email == email && Some(user.id) != except)
}

#[async_trait]
impl RecordStore for InMemoryUserStore {
    type Record = User;
    type Filter = UserFilter;
    type Draft = UserDraft;
    type Changes = UserChanges;
    type Id = UserId;

    async fn get_all(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|user| filter.matches(user))
            .cloned()
            .collect())
    }

    async fn get_one(&self, filter: &UserFilter) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| filter.matches(user)).cloned())
    }

    async fn create(&self, data: UserDraft) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if email_taken(&users, &data.email, None) {
            return Err(StoreError::Duplicate(EMAIL_CONSTRAINT.to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            email: data.email,
            password_hash: data.password_hash,
            role: data.role,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());

        Ok(user)
    }

    async fn update(&self, data: UserChanges, id: &UserId) -> Result<u64, StoreError> {
        let mut users = self.users.write().await;

        if let Some(email) = &data.email {
            if email_taken(&users, email, Some(*id)) {
                return Err(StoreError::Duplicate(EMAIL_CONSTRAINT.to_string()));
            }
        }

        match users.iter_mut().find(|user| user.id == *id) {
            Some(user) => {
                data.apply_to(user);
                user.updated_at = Utc::now();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, filter: &UserFilter) -> Result<u64, StoreError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|user| !filter.matches(user));
        Ok((before - users.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::models::Role;

    fn draft(email: &str, role: &str) -> UserDraft {
        UserDraft {
            email: EmailAddress::new(email.to_string()).unwrap(),
            password_hash: "$argon2id$test_hash".to_string(),
            role: Role::new(role),
        }
    }

    fn email(value: &str) -> EmailAddress {
        EmailAddress::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamps() {
        let store = InMemoryUserStore::new();

        let first = store.create(draft("a@b.com", "user")).await.unwrap();
        let second = store.create(draft("c@d.com", "admin")).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.created_at, first.updated_at);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let store = InMemoryUserStore::new();
        store.create(draft("a@b.com", "user")).await.unwrap();

        let result = store.create(draft("a@b.com", "admin")).await;

        assert_eq!(
            result,
            Err(StoreError::Duplicate("users_email_key".to_string()))
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_all_filters_and_keeps_insertion_order() {
        let store = InMemoryUserStore::new();
        store.create(draft("a@b.com", "user")).await.unwrap();
        store.create(draft("c@d.com", "admin")).await.unwrap();
        store.create(draft("e@f.com", "admin")).await.unwrap();

        let all = store.get_all(&UserFilter::all()).await.unwrap();
        let emails: Vec<&str> = all.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, vec!["a@b.com", "c@d.com", "e@f.com"]);

        let admins = store
            .get_all(&UserFilter::by_role(Role::new("admin")))
            .await
            .unwrap();
        assert_eq!(admins.len(), 2);

        let none = store
            .get_all(&UserFilter::by_role(Role::new("owner")))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_get_one_is_repeatable() {
        let store = InMemoryUserStore::new();
        let created = store.create(draft("a@b.com", "user")).await.unwrap();

        let filter = UserFilter::by_email(email("a@b.com"));
        let first = store.get_one(&filter).await.unwrap();
        let second = store.get_one(&filter).await.unwrap();

        assert_eq!(first, Some(created));
        assert_eq!(first, second);
        assert_eq!(
            store
                .get_one(&UserFilter::by_email(email("ghost@b.com")))
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_update_changes_only_target() {
        let store = InMemoryUserStore::new();
        let target = store.create(draft("a@b.com", "user")).await.unwrap();
        let other = store.create(draft("c@d.com", "user")).await.unwrap();

        let changes = UserChanges {
            role: Some(Role::new("admin")),
            ..UserChanges::default()
        };
        let affected = store.update(changes, &target.id).await.unwrap();
        assert_eq!(affected, 1);

        let updated = store
            .get_one(&UserFilter::by_id(target.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.role.as_str(), "admin");
        assert!(updated.updated_at >= target.updated_at);

        let untouched = store
            .get_one(&UserFilter::by_id(other.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(untouched, other);
    }

    #[tokio::test]
    async fn test_update_missing_id_affects_nothing() {
        let store = InMemoryUserStore::new();
        store.create(draft("a@b.com", "user")).await.unwrap();

        let affected = store
            .update(UserChanges::default(), &UserId::new())
            .await
            .unwrap();
        assert_eq!(affected, 0);
    }

    #[tokio::test]
    async fn test_update_rejects_taken_email() {
        let store = InMemoryUserStore::new();
        let first = store.create(draft("a@b.com", "user")).await.unwrap();
        store.create(draft("c@d.com", "user")).await.unwrap();

        let changes = UserChanges {
            email: Some(email("c@d.com")),
            ..UserChanges::default()
        };
        assert!(matches!(
            store.update(changes, &first.id).await,
            Err(StoreError::Duplicate(_))
        ));

        // Keeping one's own email is not a conflict.
        let changes = UserChanges {
            email: Some(email("a@b.com")),
            ..UserChanges::default()
        };
        assert_eq!(store.update(changes, &first.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_returns_removed_count() {
        let store = InMemoryUserStore::new();
        store.create(draft("a@b.com", "user")).await.unwrap();
        store.create(draft("c@d.com", "admin")).await.unwrap();
        store.create(draft("e@f.com", "admin")).await.unwrap();

        let removed = store
            .delete(&UserFilter::by_role(Role::new("admin")))
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.len().await, 1);

        let removed = store
            .delete(&UserFilter::by_role(Role::new("admin")))
            .await
            .unwrap();
        assert_eq!(removed, 0);
    }
}
