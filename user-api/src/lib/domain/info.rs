use std::convert::Infallible;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::service::Service;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
}

/// Describes the running API on the root route.
pub struct ServiceInfoService {
    info: ServiceInfo,
}

impl ServiceInfoService {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            info: ServiceInfo {
                name: name.into(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}

#[async_trait]
impl Service for ServiceInfoService {
    type Request = ();
    type Output = ServiceInfo;
    type Error = Infallible;

    async fn execute(&self, _request: ()) -> Result<ServiceInfo, Infallible> {
        Ok(self.info.clone())
    }
}
