pub mod gateway;
pub mod handlers;
pub mod middleware;
pub mod rate_limit;
pub mod router;
