use std::io;
use std::path::Path;

use axum::body::Body;
use axum::http::header;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;
use tokio_util::io::ReaderStream;

use super::handlers::ApiError;
use super::handlers::ApiSuccess;
use crate::domain::service::Service;

pub const FILE_CONTENT_SECURITY_POLICY: &str = "script-src 'self' 'unsafe-inline';";

/// How a file produced by a service is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// Download as opaque bytes.
    Raw,
    /// Render as an HTML page.
    Html,
}

impl FileMode {
    fn content_type(self) -> &'static str {
        match self {
            FileMode::Raw => "application/octet-stream",
            FileMode::Html => "text/html; charset=utf-8",
        }
    }
}

/// Adapts a [`Service`] to HTTP.
///
/// Every outcome goes through the same envelope: a successful output is
/// wrapped in `{"success": true, "data": ...}` and a failure is converted
/// into [`ApiError`], which renders and logs it.
pub struct Gateway<S> {
    service: S,
}

impl<S> Gateway<S>
where
    S: Service,
    S::Error: Into<ApiError>,
{
    pub fn new(service: S) -> Self {
        Self { service }
    }

    async fn run(&self, request: S::Request) -> Result<S::Output, ApiError> {
        self.service.execute(request).await.map_err(Into::into)
    }
}

impl<S> Gateway<S>
where
    S: Service,
    S::Output: Serialize,
    S::Error: Into<ApiError>,
{
    pub async fn handle(&self, request: S::Request) -> Result<ApiSuccess<S::Output>, ApiError> {
        let output = self.run(request).await?;
        Ok(ApiSuccess::new(StatusCode::OK, output))
    }
}

impl<S> Gateway<S>
where
    S: Service,
    S::Output: AsRef<Path>,
    S::Error: Into<ApiError>,
{
    /// Stream the file whose path the service returns.
    ///
    /// # Errors
    /// * `NotFound` - The path does not exist
    /// * `InternalServerError` - The file could not be opened
    pub async fn handle_file(
        &self,
        request: S::Request,
        mode: FileMode,
    ) -> Result<Response, ApiError> {
        let output = self.run(request).await?;
        let path = output.as_ref();

        let file = match tokio::fs::File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Requested file does not exist");
                return Err(ApiError::NotFound("file not found".to_string()));
            }
            Err(e) => return Err(ApiError::internal(e)),
        };

        let body = Body::from_stream(ReaderStream::new(file));
        let headers = [
            (header::CONTENT_TYPE, mode.content_type()),
            (header::CONTENT_SECURITY_POLICY, FILE_CONTENT_SECURITY_POLICY),
        ];

        Ok((headers, body).into_response())
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::path::PathBuf;

    use async_trait::async_trait;
    use http_body_util::BodyExt;

    use super::*;
    use crate::domain::user::errors::UserError;

    struct Echo;

    #[async_trait]
    impl Service for Echo {
        type Request = String;
        type Output = String;
        type Error = Infallible;

        async fn execute(&self, request: String) -> Result<String, Infallible> {
            Ok(request)
        }
    }

    struct Rejecting;

    #[async_trait]
    impl Service for Rejecting {
        type Request = ();
        type Output = String;
        type Error = UserError;

        async fn execute(&self, _request: ()) -> Result<String, UserError> {
            Err(UserError::InvalidCredentials)
        }
    }

    struct FileAt;

    #[async_trait]
    impl Service for FileAt {
        type Request = PathBuf;
        type Output = PathBuf;
        type Error = Infallible;

        async fn execute(&self, request: PathBuf) -> Result<PathBuf, Infallible> {
            Ok(request)
        }
    }

    fn temp_file(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("gateway-{}.html", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn test_handle_wraps_output() {
        let gateway = Gateway::new(Echo);

        let success = gateway.handle("hello".to_string()).await.unwrap();
        assert_eq!(success.status(), StatusCode::OK);
        assert_eq!(success.data(), "hello");
    }

    #[tokio::test]
    async fn test_handle_converts_errors() {
        let gateway = Gateway::new(Rejecting);

        let error = gateway.handle(()).await.unwrap_err();
        assert_eq!(error, ApiError::Unauthorized("invalid credentials".to_string()));
    }

    #[tokio::test]
    async fn test_handle_file_html() {
        let path = temp_file("<h1>hi</h1>");
        let gateway = Gateway::new(FileAt);

        let response = gateway
            .handle_file(path.clone(), FileMode::Html)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        assert_eq!(
            response.headers()[header::CONTENT_SECURITY_POLICY],
            "script-src 'self' 'unsafe-inline';"
        );

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"<h1>hi</h1>");

        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_handle_file_raw() {
        let path = temp_file("raw-bytes");
        let gateway = Gateway::new(FileAt);

        let response = gateway
            .handle_file(path.clone(), FileMode::Raw)
            .await
            .unwrap();

        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/octet-stream"
        );

        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_handle_file_missing() {
        let gateway = Gateway::new(FileAt);
        let missing = std::env::temp_dir().join(format!("missing-{}", uuid::Uuid::new_v4()));

        let error = gateway
            .handle_file(missing, FileMode::Raw)
            .await
            .unwrap_err();

        assert_eq!(error.status(), StatusCode::NOT_FOUND);
    }
}
