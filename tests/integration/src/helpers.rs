//! Test helpers for integration tests
//!
//! A [`TestServer`] owns one in-memory application. Users are just
//! Snowflake ids with a signed access token.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use anyhow::Result;
use league_api::{create_app, create_app_state};
use league_common::{AppConfig, JwtService};
use league_core::Snowflake;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const TEST_SECRET: &str = "integration-test-secret";

/// Counter for unique user ids across servers
static NEXT_USER: AtomicI64 = AtomicI64::new(1_000_000);

/// A caller with a valid bearer token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Snowflake,
    pub token: String,
}

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    jwt: JwtService,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server over the memory backend
    pub async fn start() -> Result<Self> {
        Self::start_with_config(AppConfig::in_memory(TEST_SECRET)).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let jwt = JwtService::new(&config.jwt.secret, config.jwt.access_token_expiry);
        let state = create_app_state(config).await?;
        let app = create_app(state);

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            jwt,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    /// A fresh user with a signed token
    pub fn user(&self, name: &str) -> Result<TestUser> {
        let id = Snowflake::new(NEXT_USER.fetch_add(1, Ordering::SeqCst));
        let token = self.jwt.issue_access_token(id, Some(name))?;
        Ok(TestUser { id, token })
    }

    fn request(&self, method: reqwest::Method, path: &str, user: Option<&TestUser>) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url(), path));
        match user {
            Some(user) => builder.bearer_auth(&user.token),
            None => builder,
        }
    }

    /// GET without credentials
    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.request(reqwest::Method::GET, path, None).send().await?)
    }

    pub async fn get_auth(&self, path: &str, user: &TestUser) -> Result<Response> {
        Ok(self
            .request(reqwest::Method::GET, path, Some(user))
            .send()
            .await?)
    }

    pub async fn post_auth<T: Serialize>(&self, path: &str, user: &TestUser, body: &T) -> Result<Response> {
        Ok(self
            .request(reqwest::Method::POST, path, Some(user))
            .json(body)
            .send()
            .await?)
    }

    /// POST with no body
    pub async fn post_empty(&self, path: &str, user: &TestUser) -> Result<Response> {
        Ok(self
            .request(reqwest::Method::POST, path, Some(user))
            .send()
            .await?)
    }

    pub async fn put_auth<T: Serialize>(&self, path: &str, user: &TestUser, body: &T) -> Result<Response> {
        Ok(self
            .request(reqwest::Method::PUT, path, Some(user))
            .json(body)
            .send()
            .await?)
    }

    /// PUT with no body
    pub async fn put_empty(&self, path: &str, user: &TestUser) -> Result<Response> {
        Ok(self
            .request(reqwest::Method::PUT, path, Some(user))
            .send()
            .await?)
    }

    pub async fn patch_auth<T: Serialize>(&self, path: &str, user: &TestUser, body: &T) -> Result<Response> {
        Ok(self
            .request(reqwest::Method::PATCH, path, Some(user))
            .json(body)
            .send()
            .await?)
    }

    pub async fn delete_auth(&self, path: &str, user: &TestUser) -> Result<Response> {
        Ok(self
            .request(reqwest::Method::DELETE, path, Some(user))
            .send()
            .await?)
    }
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(response: Response, expected_status: StatusCode) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}

/// Assert an error response and return its `error.code`
pub async fn assert_error(response: Response, expected_status: StatusCode) -> Result<String> {
    let body: crate::fixtures::ErrorResponse = assert_json(response, expected_status).await?;
    Ok(body.error.code)
}
