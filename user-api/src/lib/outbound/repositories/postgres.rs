use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use sqlx::Postgres;
use sqlx::QueryBuilder;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::domain::store::RecordStore;
use crate::domain::store::StoreError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::models::UserChanges;
use crate::domain::user::models::UserDraft;
use crate::domain::user::models::UserFilter;
use crate::domain::user::models::UserId;

const SELECT_USERS: &str = "SELECT id, email, password_hash, role, created_at, updated_at FROM users";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = EmailAddress::new(row.email)
            .map_err(|e| StoreError::Corrupted(format!("user {}: {}", row.id, e)))?;

        Ok(User {
            id: UserId(row.id),
            email,
            password_hash: row.password_hash,
            role: Role::new(row.role),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// User store backed by the `users` table.
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool and bring the schema up to date.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, anyhow::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await?;
        tracing::info!(
            max_connections = config.max_connections,
            database = "postgresql",
            "Database connection pool created"
        );

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!(database = "postgresql", "Database migrations completed");

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    if filter.is_empty() {
        return;
    }

    builder.push(" WHERE ");
    let mut conditions = builder.separated(" AND ");
    if let Some(id) = filter.id {
        conditions.push("id = ").push_bind_unseparated(id.0);
    }
    if let Some(email) = &filter.email {
        conditions
            .push("email = ")
            .push_bind_unseparated(email.as_str().to_owned());
    }
    if let Some(role) = &filter.role {
        conditions
            .push("role = ")
            .push_bind_unseparated(role.as_str().to_owned());
    }
}

fn read_error(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

fn write_error(e: sqlx::Error) -> StoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return StoreError::Duplicate(db_err.constraint().unwrap_or("unique").to_string());
        }
    }
    StoreError::Database(e.to_string())
}

#[async_trait]
impl RecordStore for PostgresUserStore {
    type Record = User;
    type Filter = UserFilter;
    type Draft = UserDraft;
    type Changes = UserChanges;
    type Id = UserId;

    async fn get_all(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_USERS);
        push_filter(&mut builder, filter);
        builder.push(" ORDER BY created_at, id");

        let rows = builder
            .build_query_as::<UserRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(read_error)?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn get_one(&self, filter: &UserFilter) -> Result<Option<User>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_USERS);
        push_filter(&mut builder, filter);
        builder.push(" ORDER BY created_at, id LIMIT 1");

        let row = builder
            .build_query_as::<UserRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error)?;

        row.map(User::try_from).transpose()
    }

    async fn create(&self, data: UserDraft) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, role, created_at, updated_at
            "#,
        )
        .bind(UserId::new().0)
        .bind(data.email.as_str())
        .bind(&data.password_hash)
        .bind(data.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)?;

        User::try_from(row)
    }

    async fn update(&self, data: UserChanges, id: &UserId) -> Result<u64, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        {
            let mut assignments = builder.separated(", ");
            if let Some(email) = data.email {
                assignments
                    .push("email = ")
                    .push_bind_unseparated(email.as_str().to_owned());
            }
            if let Some(password_hash) = data.password_hash {
                assignments
                    .push("password_hash = ")
                    .push_bind_unseparated(password_hash);
            }
            if let Some(role) = data.role {
                assignments
                    .push("role = ")
                    .push_bind_unseparated(role.as_str().to_owned());
            }
            assignments.push("updated_at = now()");
        }
        builder.push(" WHERE id = ").push_bind(id.0);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(write_error)?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, filter: &UserFilter) -> Result<u64, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new("DELETE FROM users");
        push_filter(&mut builder, filter);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(write_error)?;

        Ok(result.rows_affected())
    }
}
