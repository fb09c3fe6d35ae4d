//! Downloading rendered graphs.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::AdapterError;

/// Retrieves the body behind a URL.
///
/// Any closure `Fn(&str) -> Result<Vec<u8>, AdapterError>` is a fetcher,
/// which keeps tests free of a real HTTP server.
pub trait Fetch {
    /// Fetch `url`, failing on transport errors and non-success statuses.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, AdapterError>;
}

impl<F> Fetch for F
where
    F: Fn(&str) -> Result<Vec<u8>, AdapterError>,
{
    fn fetch(&self, url: &str) -> Result<Vec<u8>, AdapterError> {
        self(url)
    }
}

/// Blocking HTTP fetcher with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a new builder for configuring the fetcher.
    pub fn builder() -> HttpFetcherBuilder {
        HttpFetcherBuilder::default()
    }

    /// Timeout applied to each request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, AdapterError> {
        let response = self.client.get(url).send()?;

        if !response.status().is_success() {
            return Err(AdapterError::Http(format!(
                "{} returned status {}",
                url,
                response.status()
            )));
        }

        Ok(response.bytes()?.to_vec())
    }
}

/// Builder for HttpFetcher.
#[derive(Debug, Default)]
pub struct HttpFetcherBuilder {
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl HttpFetcherBuilder {
    /// Set the request timeout (default: 60 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the User-Agent header (default: "pcpgraph/<version>").
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the fetcher.
    pub fn build(self) -> Result<HttpFetcher, AdapterError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(60));
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("pcpgraph/{}", env!("CARGO_PKG_VERSION")));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| AdapterError::Client(e.to_string()))?;

        Ok(HttpFetcher { client, timeout })
    }
}
