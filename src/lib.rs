//! # mugimugi-image
//!
//! Streaming image fetcher for the doujinshi.org image server.
//!
//! ## Design Philosophy
//!
//! mugimugi-image is designed to be:
//! - **Bounded** - A fixed number of requests in flight, whatever the input size
//! - **Streaming** - Results are yielded as soon as a completion wave is ready
//! - **Selective about retries** - Only the failure kinds you list are retried
//! - **Fail-fast** - The first unrecoverable failure ends the batch
//!
//! ## Quick Start
//!
//! ```no_run
//! use futures::StreamExt;
//! use mugimugi_image::{Config, ImageClient, Size};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ImageClient::new(Config {
//!         parallel: 4,
//!         ..Default::default()
//!     })?;
//!
//!     let mut saved = client.save_many(
//!         vec![(1234u64, "covers/1234"), (5678, "covers/5678.png")],
//!         Size::Big,
//!     );
//!     while let Some(result) = saved.next().await {
//!         let (id, path) = result?;
//!         println!("#{id} -> {}", path.display());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! The pool itself is generic and can run any fallible async operation:
//!
//! ```
//! use futures::TryStreamExt;
//! use mugimugi_image::{PoolConfig, TaskPool};
//!
//! # #[tokio::main]
//! # async fn main() -> mugimugi_image::Result<()> {
//! let pool = TaskPool::new(PoolConfig { concurrency: 2, ..Default::default() })?;
//! let mut doubled: Vec<u32> = pool
//!     .run(vec![1u32, 2, 3], "double", |n: u32| async move { Ok(n * 2) })
//!     .try_collect()
//!     .await?;
//! doubled.sort_unstable();
//! assert_eq!(doubled, vec![2, 4, 6]);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Image server client
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Bounded-concurrency task pool
pub mod pool;
/// Retry logic with exponential backoff
pub mod retry;
/// Core types
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use client::ImageClient;
pub use config::{Config, PoolConfig, RetryConfig};
pub use error::{Error, ErrorKind, Result};
pub use pool::{Items, TaskPool};
pub use types::{ImageId, Size};
