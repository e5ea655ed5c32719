use axum::extract::Query;
use axum::extract::State;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::ListUsersQuery;
use crate::domain::user::models::PublicUser;
use crate::domain::user::ports::UserStore;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn list_users<S>(
    State(state): State<AppState<S>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Query(query): Query<ListUsersQuery>,
) -> Result<ApiSuccess<Vec<PublicUser>>, ApiError>
where
    S: UserStore,
{
    tracing::debug!(
        user_id = %caller.user_id,
        role = %caller.role,
        filter_role = ?query.role,
        "Listing users"
    );
    state.list_users.handle(query).await
}
