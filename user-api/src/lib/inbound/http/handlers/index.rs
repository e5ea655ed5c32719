use axum::extract::State;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::info::ServiceInfo;
use crate::domain::user::ports::UserStore;
use crate::inbound::http::router::AppState;

pub async fn index<S>(State(state): State<AppState<S>>) -> Result<ApiSuccess<ServiceInfo>, ApiError>
where
    S: UserStore,
{
    state.info.handle(()).await
}
