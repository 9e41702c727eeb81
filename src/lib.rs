//! Client-side access layer for the Staffhub talent platform.
//!
//! Wraps the platform's HTTP API in typed resource handles whose reads go
//! through a staleness-aware in-memory cache and whose writes reconcile
//! that cache, so callers get request deduplication, bounded staleness and
//! precise invalidation without managing any of it themselves.
//!
//! ```no_run
//! use std::sync::Arc;
//! use staffhub::{Config, FileTokenStore, Staffhub};
//!
//! # async fn run() -> staffhub::ApiResult<()> {
//! let config = Config::load(None)?;
//! let tokens = Arc::new(FileTokenStore::open()?);
//! let hub = Staffhub::new(&config, tokens)?;
//!
//! let jobs = hub.jobs.list(&Default::default()).await?;
//! println!("{} open roles", jobs.pagination.total);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod upload;
pub mod util;

pub use api::Staffhub;
pub use cache::{QueryCache, QueryKey};
pub use client::ApiClient;
pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use session::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use upload::ProgressFn;
pub use util::{Debouncer, RetryPolicy};
