//! [`Embedder`] backed by an external embedding service over HTTP.
//!
//! Wire format: `POST {url}` with `{"channel": "AccX", "samples": [...]}`,
//! answered by `{"embedding": [...]}`.

use motiondx_core::{Channel, Embedder, Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct RemoteEmbedderConfig {
    /// Full endpoint URL
    pub url: String,
    /// Expected embedding length
    pub dimension: usize,
    pub timeout: Duration,
    /// Retries after the first attempt on transport or 5xx failures
    pub max_retries: u32,
    /// Doubles each retry
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RemoteEmbedderConfig {
    pub fn new(url: impl Into<String>, dimension: usize) -> Self {
        Self {
            url: url.into(),
            dimension,
            ..Self::default()
        }
    }
}

impl Default for RemoteEmbedderConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            dimension: 256,
            timeout: Duration::from_secs(30),
            max_retries: 2,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(5),
        }
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    channel: Channel,
    samples: &'a [f32],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

fn embed_err(reason: impl Into<String>) -> Error {
    Error::Embedding(reason.into())
}

/// Blocking HTTP embedder. Call it off the async runtime.
#[derive(Debug)]
pub struct RemoteEmbedder {
    config: RemoteEmbedderConfig,
    // built on first use so construction is safe inside an async runtime
    client: OnceLock<reqwest::blocking::Client>,
}

impl RemoteEmbedder {
    pub fn new(config: RemoteEmbedderConfig) -> Self {
        Self {
            config,
            client: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &RemoteEmbedderConfig {
        &self.config
    }

    fn client(&self) -> Result<&reqwest::blocking::Client> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(|e| embed_err(e.to_string()))?;
        Ok(self.client.get_or_init(|| client))
    }
}

impl Embedder for RemoteEmbedder {
    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn embed(&self, channel: Channel, samples: &[f32]) -> Result<Vec<f32>> {
        let client = self.client()?;
        let body = EmbedRequest { channel, samples };

        let mut backoff = self.config.initial_backoff;
        let mut last_err = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                debug!(
                    "embedder: retry attempt {}/{} after {:?}",
                    attempt, self.config.max_retries, backoff
                );
                std::thread::sleep(backoff);
                backoff = (backoff * 2).min(self.config.max_backoff);
            }

            match client.post(&self.config.url).json(&body).send() {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let parsed: EmbedResponse = resp
                            .json()
                            .map_err(|e| embed_err(format!("invalid response: {e}")))?;
                        return Ok(parsed.embedding);
                    }
                    if status.is_client_error() {
                        let text = resp.text().unwrap_or_default();
                        return Err(embed_err(format!("HTTP {status}: {text}")));
                    }
                    last_err = format!("HTTP {status}");
                }
                Err(e) => {
                    last_err = e.to_string();
                }
            }
            warn!(channel = %channel, attempt, error = %last_err, "embedding request failed");
        }

        Err(embed_err(format!(
            "all {} retries exhausted: {last_err}",
            self.config.max_retries
        )))
    }
}
