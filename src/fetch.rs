use tracing::debug;

use crate::error::{Result, ScrapeError};

/// Where documents come from. One request is awaited at a time.
#[allow(async_fn_in_trait)]
pub trait Source {
    async fn fetch(&self, url: &str) -> Result<String>;
}

pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Source for HttpSource {
    async fn fetch(&self, url: &str) -> Result<String> {
        let fetch_err = |source| ScrapeError::Fetch {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(fetch_err)?;
        let status = response.status();
        debug!(%url, status = status.as_u16(), "fetched");
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(fetch_err)
    }
}
