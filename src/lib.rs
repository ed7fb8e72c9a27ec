//! A fixed-capacity buffer pool over pluggable page stores.
//!
//! The pool caches variable-length byte pages from a slower
//! [`store::PageStore`] in a fixed array of slots, pins resident pages
//! while clients use them, tracks recency of access, and applies a
//! pluggable [`pool::Evictor`] when the cache is full. Dirty pages are
//! written back on eviction and on [`pool::BufferPool::fsync`].
//!
//! ```
//! use std::sync::Arc;
//!
//! use pagepool::pool::{BottomEvictor, BufferPool};
//! use pagepool::store::MemStore;
//!
//! # fn main() -> pagepool::error::Result<()> {
//! let store = Arc::new(MemStore::new(8));
//! let pool = BufferPool::new(2, store, Box::new(BottomEvictor));
//!
//! pool.write_page(0, b"hello".to_vec())?;
//! let page = pool.acquire(0)?;
//! assert_eq!(page.clone_data(), b"hello");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod frame;
pub mod pool;
pub mod recency;
pub mod store;
