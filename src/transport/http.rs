//! HTTP transport to a running simulation server.
//!
//! The server answers plain GET requests below a per-session key path:
//! `init?state=N` and `succ?state=N&mode=M` return JSON, `ping` and `quit`
//! return text.

use crate::config::{ServerPaths, SimConfig};
use crate::transport::{
    decode_init, decode_state, InitPayload, StatePayload, Transport, TransportError,
};
use tracing::debug;

/// [`Transport`] over HTTP via `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    paths: ServerPaths,
}

impl HttpTransport {
    /// Create a transport for the server described by `config`.
    pub fn new(config: &SimConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Request {
                path: config.base_url.clone(),
                reason: format!("cannot build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            paths: config.paths.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get(&self, path: &str, query: &[(&str, u64)]) -> Result<String, TransportError> {
        let url = self.url(path);
        debug!(url = %url, ?query, "server request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                path: path.to_owned(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(TransportError::Status {
                path: path.to_owned(),
                status: status.as_u16(),
                body,
            });
        }

        response.text().await.map_err(|e| TransportError::Request {
            path: path.to_owned(),
            reason: format!("cannot read body: {e}"),
        })
    }

    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, u64)],
    ) -> Result<serde_json::Value, TransportError> {
        let body = self.get(path, query).await?;
        serde_json::from_str(&body).map_err(|e| TransportError::Request {
            path: path.to_owned(),
            reason: format!("invalid JSON: {e}"),
        })
    }
}

impl Transport for HttpTransport {
    async fn init(&self, state: u64) -> Result<InitPayload, TransportError> {
        let value = self.get_json(&self.paths.init, &[("state", state)]).await?;
        Ok(decode_init(&value)?)
    }

    async fn succ(&self, state: u64, mode: u64) -> Result<StatePayload, TransportError> {
        let value = self
            .get_json(&self.paths.succ, &[("state", state), ("mode", mode)])
            .await?;
        Ok(decode_state(&value)?)
    }

    async fn ping(&self) -> Result<String, TransportError> {
        self.get(&self.paths.ping, &[]).await
    }

    async fn quit(&self) -> Result<String, TransportError> {
        self.get(&self.paths.quit, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base: &str) -> HttpTransport {
        let config = SimConfig::builder().base_url(base).build().unwrap();
        HttpTransport::new(&config).unwrap()
    }

    #[test]
    fn urls_are_joined_below_the_key() {
        let transport = transport("http://127.0.0.1:8000/s3cr3t/");
        assert_eq!(transport.url("init"), "http://127.0.0.1:8000/s3cr3t/init");
        assert_eq!(transport.url("/succ"), "http://127.0.0.1:8000/s3cr3t/succ");
    }

    #[test]
    fn custom_paths_are_used() {
        let config = SimConfig::builder()
            .base_url("http://localhost:1234/k")
            .paths(ServerPaths {
                succ: "next".to_owned(),
                ..ServerPaths::default()
            })
            .build()
            .unwrap();
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(
            transport.url(&transport.paths.succ),
            "http://localhost:1234/k/next"
        );
    }

    #[tokio::test]
    async fn unreachable_server_is_a_request_error() {
        let config = SimConfig::builder()
            .base_url("http://127.0.0.1:1/k")
            .request_timeout(std::time::Duration::from_millis(200))
            .build()
            .unwrap();
        let transport = HttpTransport::new(&config).unwrap();

        let result = transport.ping().await;
        assert!(matches!(result, Err(TransportError::Request { .. })));
    }
}
