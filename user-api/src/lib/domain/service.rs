use async_trait::async_trait;

/// A unit of business logic reachable from one endpoint.
///
/// Services are stateless between calls and shared across requests, so
/// `execute` takes `&self`.
#[async_trait]
pub trait Service: Send + Sync + 'static {
    type Request: Send;
    type Output: Send;
    type Error: Send;

    async fn execute(&self, request: Self::Request) -> Result<Self::Output, Self::Error>;
}
