use std::ops::Deref;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockWriteGuard};

use crate::error::Result;

/// A resident page: its bytes, a pin count and a dirty bit.
///
/// The bytes are guarded by a reader-writer lock; `with_read` runs under
/// the shared side, `with_write` and `take_exclusive` under the exclusive
/// side. The pin count and the dirty bit are atomics so they stay
/// observable while the caller holds the byte lock exclusively; the lock
/// itself orders those observations against content changes.
#[derive(Debug)]
pub struct PageFrame {
    data: RwLock<Vec<u8>>,
    // number of outstanding acquisitions; a pinned frame may not be evicted
    pins: AtomicUsize,
    // set by any write discipline, true iff the frame diverged from the store
    dirty: AtomicBool,
}

impl PageFrame {
    pub fn new(data: Vec<u8>) -> PageFrame {
        PageFrame {
            data: RwLock::new(data),
            pins: AtomicUsize::new(0),
            dirty: AtomicBool::new(false),
        }
    }

    /// A deep copy of the current contents, safe to mutate without
    /// affecting the frame.
    pub fn clone_data(&self) -> Vec<u8> {
        let data = self.data.read().unwrap();
        data.clone()
    }

    pub fn len(&self) -> usize {
        let data = self.data.read().unwrap();
        data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` with a read-only view of the contents. Multiple readers may
    /// execute concurrently; no writer runs while a reader does.
    pub fn with_read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[u8]) -> R,
    {
        let data = self.data.read().unwrap();
        f(&data)
    }

    /// Run `f` with an exclusive mutable view of the contents. The dirty
    /// flag is set before `f` runs; if `f` fails the error propagates and
    /// the flag stays set, since the contents may be half-written.
    pub fn with_write<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<u8>) -> Result<()>,
    {
        let mut data = self.data.write().unwrap();
        self.dirty.store(true, Ordering::SeqCst);
        f(&mut data)
    }

    pub fn inc_pin(&self) {
        self.pins.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the pin count. Saturates at zero: the count never goes
    /// negative.
    pub fn dec_pin(&self) {
        let _ = self
            .pins
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |p| p.checked_sub(1));
    }

    pub fn pins(&self) -> usize {
        self.pins.load(Ordering::SeqCst)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    pub(crate) fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    /// Take the frame's exclusive section and hold it across multiple
    /// observations. Flushing uses this to keep the dirty check and the
    /// write-back of the bytes coherent. The section is released when the
    /// guard drops.
    pub fn take_exclusive(&self) -> FrameGuard<'_> {
        FrameGuard { guard: self.data.write().unwrap() }
    }
}

/// Exclusive access to a frame's bytes, released on drop.
pub struct FrameGuard<'a> {
    guard: RwLockWriteGuard<'a, Vec<u8>>,
}

impl Deref for FrameGuard<'_> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}
