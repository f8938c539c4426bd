//! Save covers example
//!
//! Fetches a handful of cover images with bounded concurrency and writes each
//! one to its own file:
//! - Configuring the image client
//! - Streaming `(id, path)` results as files are written
//! - Fetching raw bytes without touching the filesystem

use futures::StreamExt;
use mugimugi_image::config::{Config, RetryConfig};
use mugimugi_image::{ErrorKind, ImageClient, Size};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    let config = Config {
        parallel: 4,
        request_timeout: Duration::from_secs(15),
        retry: RetryConfig {
            try_limit: 3,
            retry_on: vec![ErrorKind::Timeout, ErrorKind::Connect],
            initial_delay: Duration::from_millis(250),
            ..Default::default()
        },
        ..Default::default()
    };
    let client = ImageClient::new(config)?;

    let out_dir = std::path::Path::new("downloads");
    tokio::fs::create_dir_all(out_dir).await?;

    // Destinations may carry any extension; files are always written as .jpg
    let covers = (1000..1010u64)
        .map(|id| (id, out_dir.join(format!("cover-{id}.png"))))
        .collect::<Vec<_>>();

    let mut saved = client.save_many(covers, Size::Big);
    while let Some(result) = saved.next().await {
        match result {
            Ok((id, path)) => println!("✓ Saved #{} to {}", id, path.display()),
            Err(e) => {
                eprintln!("✗ Batch aborted: {}", e);
                return Err(e.into());
            }
        }
    }

    // Thumbnails straight into memory
    let mut thumbs = client.get_many(vec![1000u64, 1001, 1002], Size::Thumbnail);
    while let Some(result) = thumbs.next().await {
        let (id, bytes) = result?;
        println!("Thumbnail #{}: {} bytes", id, bytes.len());
    }

    Ok(())
}
