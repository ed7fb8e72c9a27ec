use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::frame::PageFrame;

pub mod dir;
pub mod memory;

pub use dir::DirStore;
pub use memory::MemStore;

/// A logical page identifier: a dense non-negative index into a store.
/// Identifiers are allocated by `falloc` and are stable for the lifetime
/// of the store.
pub type PageId = usize;

/// A frame-addressable substrate holding the authoritative copy of every
/// page. The trait is object safe; implementations use interior locking so
/// a store can sit behind an `Arc` shared by a pool and its embedder.
pub trait PageStore: Debug + Send + Sync {
    /// Authoritative page count, taken by inspecting the substrate. May
    /// refresh the cached count returned by `size`.
    fn assess_size(&self) -> Result<usize>;

    /// The cached page count. Cheap and non-failing.
    fn size(&self) -> usize;

    /// Fetch the bytes of page `id` as a fresh frame. Fails with
    /// `OutOfRange` when `id` is beyond the allocated range.
    fn read_frame(&self, id: PageId) -> Result<PageFrame>;

    /// Write the bytes for page `id`. Takes the raw bytes rather than a
    /// frame so a caller already holding a frame exclusively can write it
    /// back without re-locking.
    fn write_frame(&self, id: PageId, data: &[u8]) -> Result<()>;

    /// Extend the substrate by `n` pages at the next contiguous
    /// identifiers, initialized to empty content where newly created.
    /// Pages already present at those identifiers are left as-is.
    fn falloc(&self, n: usize) -> Result<()>;
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreType {
    Memory,
    Dir,
}

pub fn new_store(
    typ: StoreType,
    capacity: usize,
    path: Option<&str>,
) -> Result<Arc<dyn PageStore>> {
    match typ {
        StoreType::Memory => Ok(Arc::new(MemStore::new(capacity))),
        StoreType::Dir => {
            let path =
                path.ok_or_else(|| Error::internal("directory store requires a path"))?;
            Ok(Arc::new(DirStore::new(capacity, path)?))
        }
    }
}
