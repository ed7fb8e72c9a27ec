use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{Error, Result};
use crate::frame::PageFrame;
use crate::store::{PageId, PageStore};

#[derive(Debug, Default)]
struct MemStoreInner {
    frames: HashMap<PageId, Vec<u8>>,
    // high-water mark of preallocated ids, independent of direct writes
    alloced: usize,
}

/// Ephemeral store: page contents live in a map and vanish with the value.
/// Nothing fails here beyond reading an unallocated identifier.
#[derive(Debug, Default)]
pub struct MemStore {
    inner: RwLock<MemStoreInner>,
}

impl MemStore {
    pub fn new(capacity: usize) -> MemStore {
        let store = MemStore::default();
        if capacity > 0 {
            store.grow(capacity);
        }
        store
    }

    fn grow(&self, n: usize) {
        let mut inner = self.inner.write().unwrap();
        let prior = inner.alloced;
        for i in 0..n {
            inner.frames.entry(prior + i).or_default();
        }
        inner.alloced += n;
    }
}

impl PageStore for MemStore {
    fn assess_size(&self) -> Result<usize> {
        Ok(self.size())
    }

    fn size(&self) -> usize {
        let inner = self.inner.read().unwrap();
        inner.frames.len()
    }

    fn read_frame(&self, id: PageId) -> Result<PageFrame> {
        let inner = self.inner.read()?;
        let data = inner
            .frames
            .get(&id)
            .ok_or_else(|| Error::out_of_range(format!("page {} is not in the store", id)))?;
        Ok(PageFrame::new(data.clone()))
    }

    fn write_frame(&self, id: PageId, data: &[u8]) -> Result<()> {
        let mut inner = self.inner.write()?;
        inner.frames.insert(id, data.to_vec());
        Ok(())
    }

    fn falloc(&self, n: usize) -> Result<()> {
        self.grow(n);
        Ok(())
    }
}
