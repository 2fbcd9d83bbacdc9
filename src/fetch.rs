// src/fetch.rs

use crate::config::Config;
use crate::decode::{DecodeReport, RawFeed};
use crate::index::DeviceIndex;
use crate::registry::DeviceRegistry;
use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// A downloaded, still-encoded feed body.
#[derive(Debug, Clone)]
pub struct FetchedFeed {
    pub url: Url,
    pub body: Vec<u8>,
    /// `Content-Length` as reported by the server, if any.
    pub content_length: Option<u64>,
}

impl FetchedFeed {
    pub fn raw(&self) -> RawFeed<'_> {
        RawFeed::utf16le(&self.body)
    }
}

pub fn build_client(config: &Config) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout)
        .build()
        .context("building HTTP client")
}

async fn get_bytes_core(client: &Client, url: &Url) -> Result<FetchedFeed> {
    debug!("Fetching {}", url);
    let resp = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", url))?;
    let content_length = resp.content_length();
    let body = resp
        .bytes()
        .await
        .with_context(|| format!("Reading body from {}", url))?;
    Ok(FetchedFeed {
        url: url.clone(),
        body: body.to_vec(),
        content_length,
    })
}

/// Download the feed, retrying with exponential backoff.
#[instrument(level = "info", skip(client, config), fields(url = %config.feed_url))]
pub async fn fetch_feed(client: &Client, config: &Config) -> Result<FetchedFeed> {
    let url = &config.feed_url;
    let mut attempts = 0;
    loop {
        match get_bytes_core(client, url).await {
            Ok(feed) => {
                info!(
                    bytes = feed.body.len(),
                    content_length = ?feed.content_length,
                    "downloaded feed"
                );
                return Ok(feed);
            }
            Err(e) if attempts < config.max_retries => {
                attempts += 1;
                let backoff = config.initial_backoff_ms * 2u64.pow(attempts - 1);
                warn!(%url, attempt = attempts, delay_ms = backoff, error = %e, "Retrying");
                sleep(Duration::from_millis(backoff)).await;
            }
            Err(e) => {
                error!(%url, error = %e, "Exhausted retries");
                return Err(e);
            }
        }
    }
}

/// Fetch and decode the feed, then publish the new index to `registry`.
///
/// Nothing is published if the fetch or decode fails; readers keep the
/// previous index.
pub async fn refresh(
    registry: &DeviceRegistry,
    client: &Client,
    config: &Config,
) -> Result<DecodeReport> {
    let feed = fetch_feed(client, config).await?;
    let (index, report) = DeviceIndex::load(&feed.raw(), &config.decode_options())
        .with_context(|| format!("decoding feed from {}", feed.url))?;
    registry.replace(index);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::test_support::{init_test_logging, utf16le_with_bom};
    use crate::error::FeedError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve `body` over HTTP, failing the first `failures` requests with a 503.
    async fn serve(body: Vec<u8>, failures: usize) -> Result<(Url, Arc<AtomicUsize>)> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = Url::parse(&format!("http://{}/supported_devices.csv", listener.local_addr()?))?;
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        tokio::spawn(async move {
            loop {
                let Ok((mut sock, _)) = listener.accept().await else {
                    return;
                };
                let mut buf = [0u8; 4096];
                let _ = sock.read(&mut buf).await;
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let response = if n < failures {
                    b"HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
                        .to_vec()
                } else {
                    let mut r = format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: text/csv\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                        body.len()
                    )
                    .into_bytes();
                    r.extend_from_slice(&body);
                    r
                };
                let _ = sock.write_all(&response).await;
                let _ = sock.shutdown().await;
            }
        });

        Ok((url, hits))
    }

    fn config_for(url: Url) -> Config {
        Config {
            feed_url: url,
            max_retries: 2,
            initial_backoff_ms: 1,
            timeout: Duration::from_secs(5),
            ..Config::default()
        }
    }

    /// Loopback client; ignores any proxy configured in the environment.
    fn local_client(config: &Config) -> Result<Client> {
        Ok(Client::builder().timeout(config.timeout).no_proxy().build()?)
    }

    const FEED: &str = "Retail Branding,Marketing Name,Device,Model\r\n\
        Samsung,Galaxy S7,heroqltevzw,SM-G930V\r\n\
        Google,Pixel,sailfish,Pixel\r\n";

    #[tokio::test]
    async fn fetches_and_publishes_after_transient_failure() -> Result<()> {
        init_test_logging();
        let body = utf16le_with_bom(FEED);
        let (url, hits) = serve(body, 1).await?;
        let config = config_for(url);
        let client = local_client(&config)?;
        let registry = DeviceRegistry::default();

        let report = refresh(&registry, &client, &config).await?;

        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(report.records, 2);
        let index = registry.snapshot();
        assert_eq!(index.brands(), ["Samsung", "Google"]);
        Ok(())
    }

    #[test]
    fn default_client_builds() {
        assert!(build_client(&Config::default()).is_ok());
    }

    #[tokio::test]
    async fn reports_content_length() -> Result<()> {
        let body = utf16le_with_bom(FEED);
        let (url, _) = serve(body.clone(), 0).await?;
        let config = config_for(url);
        let feed = fetch_feed(&local_client(&config)?, &config).await?;
        assert_eq!(feed.content_length, Some(body.len() as u64));
        assert_eq!(feed.body, body);
        Ok(())
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() -> Result<()> {
        let (url, hits) = serve(Vec::new(), usize::MAX).await?;
        let config = config_for(url);
        let err = fetch_feed(&local_client(&config)?, &config).await.unwrap_err();
        assert!(format!("{:#}", err).contains("Non-success status"));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        Ok(())
    }

    #[tokio::test]
    async fn empty_feed_keeps_previous_index() -> Result<()> {
        let body = utf16le_with_bom("Retail Branding,Marketing Name,Device,Model\r\n");
        let (url, _) = serve(body, 0).await?;
        let config = config_for(url);
        let registry = DeviceRegistry::new(DeviceIndex::from_records(vec![
            crate::decode::DeviceRecord::new("Old", "n", "d", "m"),
        ]));

        let err = refresh(&registry, &local_client(&config)?, &config)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<FeedError>(),
            Some(FeedError::EmptyFeed { .. })
        ));
        assert_eq!(registry.snapshot().brands(), ["Old"]);
        Ok(())
    }
}
