use std::sync::Arc;
use std::time::Duration;

use axum::middleware::map_response;
use axum::Router;
use thiserror::Error;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::key_extractor::SmartIpKeyExtractor;
use tower_governor::GovernorLayer;

use super::middleware::rate_limit_envelope;
use crate::config::RateLimitConfig;

/// How often fully replenished clients are dropped from the limiter state.
const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RateLimitError {
    #[error("Invalid rate limit configuration: {0:?}")]
    InvalidConfig(RateLimitConfig),
}

/// Seconds between two replenished requests, never below one.
pub fn replenish_period_secs(config: &RateLimitConfig) -> u64 {
    (config.window_secs / u64::from(config.max_requests.max(1))).max(1)
}

/// Limit `router` per client IP.
///
/// A client starts with `max_requests` requests and regains one every
/// `window_secs / max_requests` seconds. Clients are keyed by peer address,
/// so the router must be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`. With
/// `trust_forwarded_headers` the forwarding headers are consulted first.
pub fn rate_limited(router: Router, config: &RateLimitConfig) -> Result<Router, RateLimitError> {
    let invalid = || RateLimitError::InvalidConfig(config.clone());

    let mut builder = GovernorConfigBuilder::default();
    builder
        .per_second(replenish_period_secs(config))
        .burst_size(config.max_requests);

    let router = if config.trust_forwarded_headers {
        let governor_config = Arc::new(
            builder
                .key_extractor(SmartIpKeyExtractor)
                .finish()
                .ok_or_else(invalid)?,
        );
        let limiter = governor_config.limiter().clone();
        evict_idle_clients(EVICTION_INTERVAL, move || {
            limiter.retain_recent();
            limiter.len()
        });
        router.layer(GovernorLayer::<_, _, axum::body::Body>::new(governor_config))
    } else {
        let governor_config = Arc::new(
            builder
                .key_extractor(PeerIpKeyExtractor)
                .finish()
                .ok_or_else(invalid)?,
        );
        let limiter = governor_config.limiter().clone();
        evict_idle_clients(EVICTION_INTERVAL, move || {
            limiter.retain_recent();
            limiter.len()
        });
        router.layer(GovernorLayer::<_, _, axum::body::Body>::new(governor_config))
    };

    tracing::debug!(
        max_requests = config.max_requests,
        window_secs = config.window_secs,
        trust_forwarded_headers = config.trust_forwarded_headers,
        "Rate limiting enabled"
    );

    Ok(router.layer(map_response(rate_limit_envelope)))
}

/// Run `evict` every `period` on the current runtime.
///
/// `evict` returns the number of clients still tracked.
fn evict_idle_clients<F>(period: Duration, evict: F)
where
    F: Fn() -> usize + Send + 'static,
{
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        tracing::warn!("No tokio runtime, idle rate limit state will not be evicted");
        return;
    };

    runtime.spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let tracked_clients = evict();
            tracing::debug!(tracked_clients, "Evicted idle rate limit state");
        }
    });
}
