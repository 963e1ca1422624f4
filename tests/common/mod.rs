use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{header, redirect, Client, StatusCode};

use product_inventory::config::AppConfig;
use product_inventory::{app, bootstrap, AppState};

pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
}

impl TestServer {
    /// Memory-backed server with the sample products and built-in accounts,
    /// served on a free port for the lifetime of the calling test's runtime.
    pub async fn start(config: AppConfig) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = AppState::in_memory(config)?;
        bootstrap::run(&state).await?;

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        let router = app(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self { base_url, state };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn start_default() -> Result<TestServer> {
    TestServer::start(AppConfig::development()).await
}

/// Client that surfaces redirects instead of following them.
pub fn client() -> Client {
    Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .expect("reqwest client")
}

pub fn location(resp: &reqwest::Response) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Form login; returns the `INVENTORY_SESSION=<token>` pair to send back as a Cookie header.
pub async fn login(server: &TestServer, username: &str, password: &str) -> Result<String> {
    let resp = client()
        .post(server.url("/login"))
        .form(&[("username", username), ("password", password)])
        .send()
        .await?;
    anyhow::ensure!(
        resp.status() == StatusCode::SEE_OTHER && location(&resp) == "/",
        "login for {} failed: {} -> {}",
        username,
        resp.status(),
        location(&resp)
    );

    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .context("login response has no Set-Cookie")?
        .to_str()?;
    let pair = set_cookie.split(';').next().unwrap_or_default().to_string();
    Ok(pair)
}

/// JSON login; returns the bearer token.
pub async fn api_token(server: &TestServer, username: &str, password: &str) -> Result<String> {
    let resp = client()
        .post(server.url("/api/auth/login"))
        .json(&serde_json::json!({ "username": username, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(resp.status() == StatusCode::OK, "api login failed: {}", resp.status());

    let body: serde_json::Value = resp.json().await?;
    body["data"]["token"]
        .as_str()
        .map(str::to_string)
        .context("login response has no token")
}
