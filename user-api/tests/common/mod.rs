#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use auth::Authenticator;
use auth::Claims;
use auth::PasswordHasher;
use auth::TokenPolicy;
use user_api::config::RateLimitConfig;
use user_api::domain::user::ensure_user;
use user_api::domain::user::models::Role;
use user_api::domain::user::BootstrapUser;
use user_api::inbound::http::router::create_router;
use user_api::outbound::repositories::InMemoryUserStore;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const MEMBER_EMAIL: &str = "member@example.com";
pub const MEMBER_PASSWORD: &str = "member-password";

/// Test application that spawns a real server over the in-memory store
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: Arc<InMemoryUserStore>,
    pub authenticator: Arc<Authenticator>,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spawn with an admin and a regular user already stored
    pub async fn spawn() -> Self {
        Self::spawn_with_rate_limit(RateLimitConfig::default()).await
    }

    pub async fn spawn_with_rate_limit(rate_limit: RateLimitConfig) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let hasher = PasswordHasher::with_params(1024, 1, 1).expect("valid argon2 params");
        let authenticator = Arc::new(Authenticator::with_hasher(
            TEST_SECRET,
            TokenPolicy::default(),
            hasher,
        ));

        let store = Arc::new(InMemoryUserStore::new());
        for (email, password, role) in [
            (ADMIN_EMAIL, ADMIN_PASSWORD, "admin"),
            (MEMBER_EMAIL, MEMBER_PASSWORD, "user"),
        ] {
            let seed = BootstrapUser {
                email: email.to_string(),
                password: password.to_string(),
                role: Role::new(role),
            };
            ensure_user(store.as_ref(), &authenticator, &seed)
                .await
                .expect("Failed to seed user");
        }

        let router = create_router(Arc::clone(&store), Arc::clone(&authenticator), &rate_limit)
            .expect("Failed to build router");

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Server error");
        });

        Self {
            address,
            port,
            store,
            authenticator,
            api_client: reqwest::Client::builder()
                .build()
                .expect("Failed to create reqwest client"),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Log in and return the issued token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .post("/api/v1/users/login")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["token"]
            .as_str()
            .expect("token in response")
            .to_string()
    }

    pub fn decode(&self, token: &str) -> Claims {
        self.authenticator
            .validate_token(token)
            .expect("token should validate")
    }
}
