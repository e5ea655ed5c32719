use crate::domain::store::RecordStore;
use crate::domain::user::models::User;
use crate::domain::user::models::UserChanges;
use crate::domain::user::models::UserDraft;
use crate::domain::user::models::UserFilter;
use crate::domain::user::models::UserId;

/// Persistence for the user collection.
///
/// Implemented for every [`RecordStore`] over [`User`].
pub trait UserStore:
    RecordStore<
    Record = User,
    Filter = UserFilter,
    Draft = UserDraft,
    Changes = UserChanges,
    Id = UserId,
>
{
}

impl<T> UserStore for T where
    T: RecordStore<
        Record = User,
        Filter = UserFilter,
        Draft = UserDraft,
        Changes = UserChanges,
        Id = UserId,
    >
{
}
