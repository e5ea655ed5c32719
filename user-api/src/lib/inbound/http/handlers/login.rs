use axum::extract::State;

use super::ApiError;
use super::ApiSuccess;
use super::JsonBody;
use crate::domain::user::models::LoginRequest;
use crate::domain::user::models::LoginResponse;
use crate::domain::user::ports::UserStore;
use crate::inbound::http::router::AppState;

pub async fn login<S>(
    State(state): State<AppState<S>>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<ApiSuccess<LoginResponse>, ApiError>
where
    S: UserStore,
{
    state.login.handle(body).await
}
