use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::gateway::Gateway;
use super::handlers::index::index;
use super::handlers::list_users::list_users;
use super::handlers::login::login;
use super::middleware::authenticate as auth_middleware;
use super::middleware::security_headers;
use super::rate_limit::rate_limited;
use super::rate_limit::RateLimitError;
use crate::config::RateLimitConfig;
use crate::domain::info::ServiceInfoService;
use crate::domain::user::ports::UserStore;
use crate::domain::user::ListUsersService;
use crate::domain::user::LoginService;

pub const API_BASE: &str = "/api/v1";

/// Services shared by every request, one gateway per endpoint.
pub struct AppState<S>
where
    S: UserStore,
{
    pub login: Arc<Gateway<LoginService<S>>>,
    pub list_users: Arc<Gateway<ListUsersService<S>>>,
    pub info: Arc<Gateway<ServiceInfoService>>,
}

impl<S> Clone for AppState<S>
where
    S: UserStore,
{
    fn clone(&self) -> Self {
        Self {
            login: Arc::clone(&self.login),
            list_users: Arc::clone(&self.list_users),
            info: Arc::clone(&self.info),
        }
    }
}

impl<S> AppState<S>
where
    S: UserStore,
{
    pub fn new(store: Arc<S>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            login: Arc::new(Gateway::new(LoginService::new(
                Arc::clone(&store),
                authenticator,
            ))),
            list_users: Arc::new(Gateway::new(ListUsersService::new(store))),
            info: Arc::new(Gateway::new(ServiceInfoService::new(env!("CARGO_PKG_NAME")))),
        }
    }
}

/// Build the HTTP application.
///
/// # Errors
/// * `InvalidConfig` - The rate limit cannot be enforced with these values
pub fn create_router<S>(
    store: Arc<S>,
    authenticator: Arc<Authenticator>,
    rate_limit: &RateLimitConfig,
) -> Result<Router, RateLimitError>
where
    S: UserStore,
{
    let state = AppState::new(store, Arc::clone(&authenticator));

    let public_routes = Router::new()
        .route("/", get(index::<S>))
        .route(&format!("{}/users/login", API_BASE), post(login::<S>));

    let protected_routes = Router::new()
        .route(&format!("{}/users", API_BASE), get(list_users::<S>))
        .route_layer(middleware::from_fn_with_state(authenticator, auth_middleware));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    let application = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state);

    Ok(rate_limited(application, rate_limit)?
        .layer(middleware::from_fn(security_headers))
        .layer(trace_layer)
        .layer(CorsLayer::permissive()))
}
