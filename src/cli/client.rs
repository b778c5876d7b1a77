use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use url::Url;

use crate::api::Envelope;

/// Thin HTTP client for the EchoFeed API. Every call returns the response
/// envelope, failures included; only transport problems are errors.
pub struct ApiClient {
    base: Url,
    http: Client,
}

impl ApiClient {
    pub fn new(server: &str) -> anyhow::Result<Self> {
        let mut base = Url::parse(server).with_context(|| format!("invalid server URL: {}", server))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("invalid server URL: {}", server);
        }
        // API paths join below any prefix only when the base ends in '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self { base, http })
    }

    pub fn url(&self, path: &str) -> anyhow::Result<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("invalid API path: {}", path))
    }

    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> anyhow::Result<Envelope> {
        self.send(self.http.get(self.url(path)?).query(query)).await
    }

    pub async fn delete(&self, path: &str, query: &[(&str, &str)]) -> anyhow::Result<Envelope> {
        self.send(self.http.delete(self.url(path)?).query(query)).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> anyhow::Result<Envelope> {
        self.send(self.http.post(self.url(path)?).json(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> anyhow::Result<Envelope> {
        self.send(self.http.put(self.url(path)?).json(body)).await
    }

    async fn send(&self, request: RequestBuilder) -> anyhow::Result<Envelope> {
        let response = request
            .send()
            .await
            .with_context(|| format!("cannot reach EchoFeed API at {}", self.base))?;

        let status = response.status();
        let body = response.text().await?;
        serde_json::from_str(&body)
            .with_context(|| format!("unexpected response (HTTP {}): {}", status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_join_onto_the_base() {
        let client = ApiClient::new("http://localhost:8080").unwrap();
        assert_eq!(
            client.url("/api/v1/articles/all").unwrap().as_str(),
            "http://localhost:8080/api/v1/articles/all"
        );
        assert!(ApiClient::new("not a url").is_err());
    }

    #[test]
    fn paths_keep_the_server_prefix() {
        for server in ["http://host/echofeed", "http://host/echofeed/"] {
            let client = ApiClient::new(server).unwrap();
            assert_eq!(
                client.url("/api/v1/users/login").unwrap().as_str(),
                "http://host/echofeed/api/v1/users/login"
            );
        }
    }
}
