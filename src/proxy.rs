use anyhow::Context;
use bytes::Bytes;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

pub const FETCH_FAILURE_MESSAGE: &str = "ERR_CONNECTION_REFUSED";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("upstream answered with HTTP {0}")]
    Status(u16),
    #[error("network failure: {0}")]
    Network(String),
    #[error("audio body exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

pub type FetchOutcome = Result<Bytes, FetchError>;

pub trait AudioFetcher: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = FetchOutcome> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, max_bytes: usize) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client, max_bytes })
    }
}

impl AudioFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let limit = self.max_bytes;
        if response
            .content_length()
            .is_some_and(|len| len > limit as u64)
        {
            return Err(FetchError::TooLarge { limit });
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|err| FetchError::Network(err.to_string()))?
        {
            if body.len() + chunk.len() > limit {
                return Err(FetchError::TooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }
        Ok(Bytes::from(body))
    }
}

pub struct AudioProxy<F = HttpFetcher> {
    fetcher: F,
    cache: Mutex<HashMap<String, Arc<OnceCell<FetchOutcome>>>>,
}

impl<F: AudioFetcher> AudioProxy<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub async fn fetch_once(&self, url: &str) -> FetchOutcome {
        let cell = {
            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            cache.entry(url.to_string()).or_default().clone()
        };

        cell.get_or_init(|| async {
            let outcome = self.fetcher.fetch(url).await;
            match &outcome {
                Ok(bytes) => debug!(url, bytes = bytes.len(), "cached audio"),
                Err(err) => warn!(url, error = %err, "audio fetch failed"),
            }
            outcome
        })
        .await
        .clone()
    }

    pub fn cached_urls(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
