use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use uuid::Uuid;

use recipe_api_rust::database::memory::MemoryStore;
use recipe_api_rust::routes;
use recipe_api_rust::state::AppState;

pub struct TestServer {
    pub base_url: String,
    pub store: Arc<MemoryStore>,
}

/// Serve the app over a real socket against the in-memory store. Each test
/// gets its own server and port, so suites can run in parallel.
pub async fn start_server() -> Result<TestServer> {
    let (state, store) = AppState::in_memory();
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });

    Ok(TestServer {
        base_url: format!("http://{}", addr),
        store,
    })
}

/// Register an account and return its id.
pub async fn register(
    client: &reqwest::Client,
    base_url: &str,
    name: &str,
    lastname: &str,
    email: &str,
    password: &str,
) -> Result<Uuid> {
    let res = client
        .post(format!("{}/api/users/register", base_url))
        .json(&json!({
            "name": name,
            "lastname": lastname,
            "email": email,
            "password": password,
        }))
        .send()
        .await?;

    anyhow::ensure!(
        res.status().is_success(),
        "registration failed with {}",
        res.status()
    );

    let body: Value = res.json().await?;
    let id = body["data"]["id"]
        .as_str()
        .context("registration response missing id")?;
    Ok(Uuid::parse_str(id)?)
}

/// Log in and return the bearer token.
pub async fn login(
    client: &reqwest::Client,
    base_url: &str,
    email: &str,
    password: &str,
) -> Result<String> {
    let res = client
        .post(format!("{}/api/auth/login", base_url))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await?;

    anyhow::ensure!(res.status().is_success(), "login failed with {}", res.status());

    let body: Value = res.json().await?;
    let token = body["data"]["token"]
        .as_str()
        .context("login response missing token")?;
    Ok(token.to_string())
}
