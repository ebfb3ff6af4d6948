use crate::error::{MirrorError, Result};
use crate::traits::DirectoryFetcher;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// 通过 HTTP 下载镜像目录 (单次请求)
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MirrorError::Custom(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DirectoryFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let fetch_err = |reason: String| MirrorError::Fetch {
            url: url.to_string(),
            reason,
        };

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| fetch_err(e.to_string()))?;
        let body = resp.text().await.map_err(|e| fetch_err(e.to_string()))?;

        if body.trim().is_empty() {
            return Err(fetch_err("empty response body".to_string()));
        }
        tracing::debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn fetches_document() -> Result<()> {
        let base = test_support::serve("200 OK", b"## Sweden\nServer = https://a/\n".to_vec()).await;
        let fetcher = HttpFetcher::new(Duration::from_secs(3))?;
        let body = fetcher.fetch(&base).await?;
        assert!(body.starts_with("## Sweden"));
        Ok(())
    }

    #[tokio::test]
    async fn empty_body_is_fetch_error() -> Result<()> {
        let base = test_support::serve("200 OK", b"  \n".to_vec()).await;
        let fetcher = HttpFetcher::new(Duration::from_secs(3))?;
        assert!(matches!(
            fetcher.fetch(&base).await,
            Err(MirrorError::Fetch { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn server_error_is_fetch_error() -> Result<()> {
        let base = test_support::serve("500 Internal Server Error", b"oops".to_vec()).await;
        let fetcher = HttpFetcher::new(Duration::from_secs(3))?;
        assert!(matches!(
            fetcher.fetch(&base).await,
            Err(MirrorError::Fetch { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn refused_is_fetch_error() -> Result<()> {
        let base = test_support::refused().await;
        let fetcher = HttpFetcher::new(Duration::from_secs(3))?;
        assert!(matches!(
            fetcher.fetch(&base).await,
            Err(MirrorError::Fetch { .. })
        ));
        Ok(())
    }
}
