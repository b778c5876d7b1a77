#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;

use echofeed::api::Envelope;
use echofeed::store::{DocumentStore, MemoryStore};
use echofeed::testing::{test_app_with_store, StubLanguageModel, StubWebSearch};

/// The real `echofeed` binary on the in-memory store. The process is
/// killed when the handle is dropped.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_echofeed"));
        cmd.env("ECHOFEED_HOST", "127.0.0.1")
            .env("ECHOFEED_PORT", port.to_string())
            .env("STORE_BACKEND", "memory")
            .env("ECHOFEED_CONFIG", "")
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Start a dedicated server for one test and wait until it answers
pub async fn spawn_server() -> Result<TestServer> {
    let server = TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Serve the router in-process with stubbed content helpers. The server
/// lives as long as the calling test's runtime.
pub async fn spawn_app(llm: StubLanguageModel, search: StubWebSearch) -> Result<String> {
    spawn_app_with_store(Arc::new(MemoryStore::new()), llm, search).await
}

pub async fn spawn_app_with_store(
    store: Arc<dyn DocumentStore>,
    llm: StubLanguageModel,
    search: StubWebSearch,
) -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;
    let app = test_app_with_store(store, llm, search);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(format!("http://127.0.0.1:{}", port))
}

pub async fn default_app() -> Result<String> {
    spawn_app(StubLanguageModel::replying("news"), StubWebSearch::default()).await
}

/// Send a request and decode the envelope, checking the HTTP status
/// matches the envelope code.
pub async fn envelope(request: reqwest::RequestBuilder) -> Result<Envelope> {
    let response = request.send().await?;
    let status = response.status().as_u16();
    let envelope: Envelope = response.json().await?;
    anyhow::ensure!(
        status == envelope.code,
        "HTTP status {} differs from envelope code {}",
        status,
        envelope.code
    );
    Ok(envelope)
}

pub fn str_field<'a>(envelope: &'a Envelope, key: &str) -> &'a str {
    envelope.get(key).and_then(Value::as_str).unwrap_or_default()
}
