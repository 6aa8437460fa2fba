use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::FetchError;

/// A fetched resource body.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub url: String,
    pub body: Vec<u8>,
}

impl FetchedDocument {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

// --- WebFetcher trait ---

/// Plain HTTP access for scraped catalog pages and script documents.
#[async_trait]
pub trait WebFetcher: Send + Sync {
    /// GET a URL. Non-success statuses are `FetchError::Status`.
    async fn get(&self, url: &str) -> Result<FetchedDocument, FetchError>;

    /// HEAD a URL and report the status code, whatever it is.
    async fn head(&self, url: &str) -> Result<u16, FetchError>;
}

// --- reqwest implementation ---

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WebFetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<FetchedDocument, FetchError> {
        let parsed = url::Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        debug!(url, "GET");

        let resp = self.client.get(parsed).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await?.to_vec();

        info!(url, bytes = body.len(), "Fetched");
        Ok(FetchedDocument {
            url: url.to_string(),
            body,
        })
    }

    async fn head(&self, url: &str) -> Result<u16, FetchError> {
        let parsed = url::Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        let resp = self.client.head(parsed).send().await?;
        let status = resp.status().as_u16();
        debug!(url, status, "HEAD");
        Ok(status)
    }
}

