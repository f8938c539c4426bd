//! Batch saving: fetch many images and write each one to its own destination.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future;
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use tokio::sync::Mutex;

use super::ImageClient;
use crate::error::{Error, Result};
use crate::pool::Items;
use crate::types::{ImageId, Size};
use crate::utils::normalize_image_path;

/// Destination recorded for each id before it is fetched
type Destinations = Arc<Mutex<HashMap<ImageId, PathBuf>>>;

impl ImageClient {
    /// Fetch every `(id, destination)` pair and write the image to its destination
    ///
    /// Destinations get a `.jpg` extension and are made absolute. Each pair's
    /// destination is recorded before its id is handed to the fetcher, and
    /// `(id, path)` is yielded once the file is written. Output follows
    /// completion-wave order like [`ImageClient::get_many`].
    ///
    /// A repeated id overwrites the earlier destination. The stream ends after
    /// the first error.
    pub fn save_many<'a, I, P>(
        &self,
        images: I,
        size: Size,
    ) -> BoxStream<'a, Result<(ImageId, PathBuf)>>
    where
        I: Into<Items<'a, (ImageId, P)>>,
        P: AsRef<Path> + Send + 'a,
    {
        let destinations: Destinations = Arc::default();

        let recorder = Arc::clone(&destinations);
        let ids = images
            .into()
            .into_stream()
            .then(move |(id, destination)| {
                let recorder = Arc::clone(&recorder);
                let path = normalize_image_path(destination.as_ref());
                async move {
                    if let Some(previous) = recorder.lock().await.insert(id, path) {
                        tracing::debug!(
                            image_id = id,
                            previous = %previous.display(),
                            "Duplicate image id, destination replaced"
                        );
                    }
                    id
                }
            });

        self.get_many(Items::from_stream(ids), size)
            .and_then(move |(id, bytes)| {
                let destinations = Arc::clone(&destinations);
                async move {
                    let path = destinations
                        .lock()
                        .await
                        .get(&id)
                        .cloned()
                        .ok_or(Error::UnmappedImage(id))?;
                    tokio::fs::write(&path, &bytes).await?;
                    tracing::debug!(
                        image_id = id,
                        path = %path.display(),
                        bytes = bytes.len(),
                        "Image saved"
                    );
                    Ok::<_, Error>((id, path))
                }
            })
            .scan(false, |failed, item| {
                if *failed {
                    return future::ready(None);
                }
                *failed = item.is_err();
                future::ready(Some(item))
            })
            .boxed()
    }

    /// Run [`ImageClient::save_many`] to completion and return every destination
    pub async fn save_many_collect<'a, I, P>(
        &self,
        images: I,
        size: Size,
    ) -> Result<HashMap<ImageId, PathBuf>>
    where
        I: Into<Items<'a, (ImageId, P)>>,
        P: AsRef<Path> + Send + 'a,
    {
        self.save_many(images, size).try_collect().await
    }
}
