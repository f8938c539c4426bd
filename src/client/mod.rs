//! Image server client.
//!
//! [`ImageClient`] owns one pooled `reqwest::Client` shared by every request it
//! makes, so concurrent fetches reuse connections. Batch fetches go through a
//! [`TaskPool`] configured from [`Config::parallel`] and [`Config::retry`].
//! The connection pool lives as long as the client (and its clones) does.
//!
//! - [`ImageClient::get`] / [`ImageClient::save`] handle one image
//! - [`ImageClient::get_many`] streams `(id, bytes)` in completion-wave order
//! - [`ImageClient::save_many`] streams `(id, path)` as each file is written

mod persist;


use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use futures::stream::BoxStream;
use url::Url;

use crate::config::{Config, PoolConfig};
use crate::error::{Error, Result};
use crate::pool::{Items, TaskPool};
use crate::types::{ImageId, Size};
use crate::utils::{image_url, normalize_image_path};

/// Name under which image fetches show up in logs and retry errors
const GET_IMAGE: &str = "get_image";

/// Client for the image server
#[derive(Clone, Debug)]
pub struct ImageClient {
    http: reqwest::Client,
    config: Arc<Config>,
    pool: TaskPool,
}

impl ImageClient {
    /// Create a client with its own connection pool
    ///
    /// The HTTP client applies [`Config::request_timeout`] to every request.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Self::with_http_client(config, http)
    }

    /// Create a client around an existing `reqwest::Client`
    ///
    /// [`Config::request_timeout`] is not applied; configure it on `http`.
    pub fn with_http_client(config: Config, http: reqwest::Client) -> Result<Self> {
        config.validate()?;
        let pool = TaskPool::new(config.pool_config())?;
        Ok(Self {
            http,
            config: Arc::new(config),
            pool,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Server URL of one image
    pub fn image_url(&self, id: ImageId, size: Size) -> Result<Url> {
        image_url(&self.config.api_url, self.config.image_modulo, id, size)
    }

    /// Fetch the raw bytes of one image
    ///
    /// Non-success statuses become [`Error::Http`]; transport failures (including
    /// the request timeout) become [`Error::Network`].
    pub async fn get(&self, id: ImageId, size: Size) -> Result<Bytes> {
        let url = self.image_url(id, size)?;
        tracing::debug!(image_id = id, url = %url, "Fetching image");

        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.bytes().await?)
    }

    /// Fetch one image and write it to `path`
    ///
    /// The extension of `path` is forced to `.jpg`. Returns the absolute path
    /// written.
    pub async fn save(&self, path: impl AsRef<Path>, id: ImageId, size: Size) -> Result<PathBuf> {
        let path = normalize_image_path(path.as_ref());
        let bytes = self.get(id, size).await?;
        tokio::fs::write(&path, &bytes).await?;
        tracing::debug!(image_id = id, path = %path.display(), bytes = bytes.len(), "Image saved");
        Ok(path)
    }

    /// Fetch many images, yielding `(id, bytes)` as fetches complete
    ///
    /// At most [`Config::parallel`] requests are in flight. Failures listed in
    /// [`RetryConfig::retry_on`](crate::config::RetryConfig::retry_on) are retried
    /// up to `try_limit` attempts; the first unrecoverable failure ends the stream.
    pub fn get_many<'a, I>(&self, ids: I, size: Size) -> BoxStream<'a, Result<(ImageId, Bytes)>>
    where
        I: Into<Items<'a, ImageId>>,
    {
        self.fetch_in_pool(&self.pool, ids, size)
    }

    /// [`ImageClient::get_many`] with explicit concurrency and retry settings
    pub fn get_many_with<'a, I>(
        &self,
        ids: I,
        size: Size,
        pool_config: PoolConfig,
    ) -> Result<BoxStream<'a, Result<(ImageId, Bytes)>>>
    where
        I: Into<Items<'a, ImageId>>,
    {
        let pool = TaskPool::new(pool_config)?;
        Ok(self.fetch_in_pool(&pool, ids, size))
    }

    fn fetch_in_pool<'a, I>(
        &self,
        pool: &TaskPool,
        ids: I,
        size: Size,
    ) -> BoxStream<'a, Result<(ImageId, Bytes)>>
    where
        I: Into<Items<'a, ImageId>>,
    {
        let client = self.clone();
        pool.run(ids, GET_IMAGE, move |id: ImageId| {
            let client = client.clone();
            async move {
                let bytes = client.get(id, size).await?;
                Ok::<_, Error>((id, bytes))
            }
        })
    }
}
