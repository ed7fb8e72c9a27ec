use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::Result;
use crate::frame::PageFrame;
use crate::recency::RecencySet;
use crate::store::PageId;

pub mod bufferpool;
pub mod evict;

pub use bufferpool::{BufferPool, PageHandle, PageScan, PoolOptions};
pub use evict::{BottomEvictor, EvictorType, RandomEvictor};

/// A position in the pool's fixed slot array, in `[0, capacity)`. Slot
/// identifiers are internal to one pool instance.
pub type SlotId = usize;

/// Selects a victim slot when the pool is full.
///
/// A policy is stateless and non-destructive: it mutates neither the
/// recency set nor the mappings, and the caller performs the actual
/// eviction. The returned slot must hold a frame with pin count zero.
pub trait Evictor: Debug + Send + Sync {
    fn evict(
        &self,
        slots: &[Option<Arc<PageFrame>>],
        page_to_slot: &HashMap<PageId, SlotId>,
        recency: &RecencySet<PageId>,
    ) -> Result<SlotId>;
}
