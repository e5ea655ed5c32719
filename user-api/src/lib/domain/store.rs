use async_trait::async_trait;
use thiserror::Error;

/// Persistence failures surfaced by a [`RecordStore`].
///
/// Absence of a record is never an error: reads return `None` or an empty
/// vector and writes report zero affected rows.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Duplicate value for unique field: {0}")]
    Duplicate(String),

    #[error("Stored record is invalid: {0}")]
    Corrupted(String),
}

/// Generic CRUD access to one entity collection.
///
/// The store has no query logic beyond matching a filter; callers compose
/// behavior on top. It performs no row-level authorization: whoever holds a
/// store can update or delete any record.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Entity as read back from storage.
    type Record: Send + Sync;
    /// Selection criteria; the empty filter selects all records.
    type Filter: Send + Sync;
    /// Data for a new record, before store-assigned fields.
    type Draft: Send;
    /// Partial update payload.
    type Changes: Send;
    /// Primary key.
    type Id: Send + Sync;

    /// Retrieve every record matching `filter`.
    ///
    /// # Errors
    /// * `StoreError` - Underlying persistence failure
    async fn get_all(&self, filter: &Self::Filter) -> Result<Vec<Self::Record>, StoreError>;

    /// Retrieve one record matching `filter`.
    ///
    /// # Returns
    /// `None` when nothing matches
    ///
    /// # Errors
    /// * `StoreError` - Underlying persistence failure
    async fn get_one(&self, filter: &Self::Filter) -> Result<Option<Self::Record>, StoreError>;

    /// Persist a new record.
    ///
    /// # Returns
    /// The stored record including generated id and timestamps
    ///
    /// # Errors
    /// * `Duplicate` - A unique field is already taken
    /// * `StoreError` - Underlying persistence failure
    async fn create(&self, data: Self::Draft) -> Result<Self::Record, StoreError>;

    /// Apply `data` to the record identified by `id`.
    ///
    /// # Returns
    /// Number of affected records (0 if `id` does not exist)
    ///
    /// # Errors
    /// * `Duplicate` - A unique field would be duplicated
    /// * `StoreError` - Underlying persistence failure
    async fn update(&self, data: Self::Changes, id: &Self::Id) -> Result<u64, StoreError>;

    /// Remove every record matching `filter`.
    ///
    /// # Returns
    /// Number of removed records
    ///
    /// # Errors
    /// * `StoreError` - Underlying persistence failure
    async fn delete(&self, filter: &Self::Filter) -> Result<u64, StoreError>;
}
