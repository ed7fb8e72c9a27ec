use std::collections::HashMap;
use std::ops::Deref;
use std::sync::{Arc, Mutex};

use log::debug;

use crate::error::{Error, Result};
use crate::frame::PageFrame;
use crate::pool::{Evictor, SlotId};
use crate::recency::RecencySet;
use crate::store::{PageId, PageStore};

/// Pool behavior knobs.
#[derive(Copy, Clone, Debug, Default)]
pub struct PoolOptions {
    /// Clear a frame's dirty bit after `fsync` writes it back. Off by
    /// default: the bit stays set, so a later eviction writes the page
    /// again even though the store already has it.
    pub sync_clears_dirty: bool,
}

struct PoolState {
    /// The fixed slot array; an empty cell is an unoccupied slot.
    slots: Vec<Option<Arc<PageFrame>>>,
    /// Occupied slots to the page they hold.
    slot_to_page: HashMap<SlotId, PageId>,
    /// Inverse of `slot_to_page`, same domain.
    page_to_slot: HashMap<PageId, SlotId>,
    /// Recency of the currently-resident pages, least recent at bottom.
    recency: RecencySet<PageId>,
    /// Failures observed in guaranteed-exit scopes, kept for inspection
    /// instead of masking the primary return value.
    failure: Option<Error>,
}

/// The cache engine: brokers access between random-access clients and a
/// slower frame-addressable store. A fixed number of slots hold resident
/// pages; the pool keeps the slot and page mappings mutually inverse,
/// pins frames while clients use them, and applies the eviction policy
/// when every slot is occupied. Dirty frames are written back before
/// their slot is reused and on `fsync`.
///
/// Mapping and residency changes run under the pool's exclusive lock;
/// client work on an acquired frame happens after that lock is released,
/// so a long-running reader or writer does not block the pool.
pub struct BufferPool {
    capacity: usize,
    state: Mutex<PoolState>,
    store: Arc<dyn PageStore>,
    evictor: Box<dyn Evictor>,
    options: PoolOptions,
}

impl BufferPool {
    pub fn new(capacity: usize, store: Arc<dyn PageStore>, evictor: Box<dyn Evictor>) -> BufferPool {
        Self::new_with_options(capacity, store, evictor, PoolOptions::default())
    }

    pub fn new_with_options(
        capacity: usize,
        store: Arc<dyn PageStore>,
        evictor: Box<dyn Evictor>,
        options: PoolOptions,
    ) -> BufferPool {
        let mut slots = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            slots.push(None);
        }
        BufferPool {
            capacity,
            state: Mutex::new(PoolState {
                slots,
                slot_to_page: HashMap::new(),
                page_to_slot: HashMap::new(),
                recency: RecencySet::new(),
                failure: None,
            }),
            store,
            evictor,
            options,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of pages currently resident.
    pub fn resident_pages(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.page_to_slot.len()
    }

    /// The most recent failure observed in a guaranteed-exit scope (a
    /// release running on handle drop), if any.
    pub fn last_failure(&self) -> Option<Error> {
        let state = self.state.lock().unwrap();
        state.failure.clone()
    }

    /// Ensure `id` is resident, pin its frame and hand out a handle. The
    /// pin is released when the handle drops; `PageHandle::detach` opts
    /// out of that for a manual `release` call.
    pub fn acquire(&self, id: PageId) -> Result<PageHandle<'_>> {
        let frame = {
            let mut state = self.state.lock()?;
            let frame = self.fault_in(&mut state, id)?;
            // pin before the pool lock drops so a concurrent fault-in
            // cannot pick this frame as a victim in between
            frame.inc_pin();
            frame
        };
        Ok(PageHandle { pool: self, page_id: id, frame: Some(frame) })
    }

    /// Decrement the pin on the frame holding `id`. A non-resident `id`
    /// beyond the store's allocated range is reported as out of range,
    /// any other non-resident `id` as not resident.
    pub fn release(&self, id: PageId) -> Result<()> {
        let state = self.state.lock()?;
        let &slot = match state.page_to_slot.get(&id) {
            Some(slot) => slot,
            None if id >= self.store.size() => {
                return Err(Error::out_of_range(format!("index out of range: {}", id)));
            }
            None => return Err(Error::not_resident(format!("page {}", id))),
        };
        let frame = state.slots[slot]
            .as_ref()
            .ok_or_else(|| Error::incoherent(format!("page {} maps to empty slot {}", id, slot)))?;
        frame.dec_pin();
        Ok(())
    }

    /// Replace the contents of page `id` under the write discipline. The
    /// page is acquired and released around the write; a failure of the
    /// release lands on the pool's failure flag rather than masking the
    /// write's own result.
    pub fn write_page(&self, id: PageId, data: Vec<u8>) -> Result<()> {
        let page = self.acquire(id)?;
        page.with_write(|buf| {
            *buf = data;
            Ok(())
        })
    }

    /// Write every dirty resident frame back to the store, stopping at
    /// the first failure. Each frame is held exclusively across the dirty
    /// check and the write-back. Frames stay resident; whether the dirty
    /// bit survives a successful write-back is governed by
    /// `PoolOptions::sync_clears_dirty`.
    pub fn fsync(&self) -> Result<()> {
        let resident: Vec<(PageId, Arc<PageFrame>)> = {
            let state = self.state.lock()?;
            state
                .page_to_slot
                .iter()
                .filter_map(|(&page, &slot)| {
                    state.slots[slot].as_ref().map(|frame| (page, Arc::clone(frame)))
                })
                .collect()
        };
        for (page, frame) in resident {
            let data = frame.take_exclusive();
            if frame.is_dirty() {
                self.store.write_frame(page, &data)?;
                debug!("fsync wrote back page {}", page);
                if self.options.sync_clears_dirty {
                    frame.clear_dirty();
                }
            }
        }
        Ok(())
    }

    /// Iterate over every page of the store in identifier order, faulting
    /// pages through the cache as the scan advances.
    pub fn scan(&self) -> PageScan<'_> {
        PageScan { pool: self, next: 0, total: self.store.size() }
    }

    fn fault_in(&self, state: &mut PoolState, id: PageId) -> Result<Arc<PageFrame>> {
        if id >= self.store.size() {
            return Err(Error::out_of_range(format!("pool index out of range: {}", id)));
        }
        if let Some(&slot) = state.page_to_slot.get(&id) {
            let frame = state.slots[slot].clone().ok_or_else(|| {
                Error::incoherent(format!("page {} maps to empty slot {}", id, slot))
            })?;
            state.recency.push(id);
            return Ok(frame);
        }
        if state.page_to_slot.len() == self.capacity {
            self.evict_one(state)?;
            // postcondition: one slot is empty
        }
        let slot = state
            .slots
            .iter()
            .position(|s| s.is_none())
            .ok_or(Error::NoEmptySlot)?;
        let frame = Arc::new(self.store.read_frame(id)?);
        state.slots[slot] = Some(Arc::clone(&frame));
        state.slot_to_page.insert(slot, id);
        state.page_to_slot.insert(id, slot);
        state.recency.push(id);
        debug!("faulted page {} into slot {}", id, slot);
        Ok(frame)
    }

    fn evict_one(&self, state: &mut PoolState) -> Result<()> {
        let victim_slot =
            self.evictor.evict(&state.slots, &state.page_to_slot, &state.recency)?;
        let victim_page = *state.slot_to_page.get(&victim_slot).ok_or_else(|| {
            Error::incoherent(format!("victim slot {} has no page mapping", victim_slot))
        })?;
        let frame = state.slots[victim_slot]
            .clone()
            .ok_or_else(|| Error::incoherent(format!("victim slot {} is empty", victim_slot)))?;
        if frame.pins() > 0 {
            return Err(Error::AllPinned);
        }
        if frame.is_dirty() {
            // a failure here returns before any bookkeeping changes, so
            // the victim stays fully in place
            let data = frame.clone_data();
            self.store.write_frame(victim_page, &data)?;
            debug!("wrote back dirty page {} before eviction", victim_page);
        }
        state.slots[victim_slot] = None;
        state.slot_to_page.remove(&victim_slot);
        state.page_to_slot.remove(&victim_page);
        state.recency.remove(&victim_page)?;
        debug!("evicted page {} from slot {}", victim_page, victim_slot);
        Ok(())
    }

    fn record_failure(&self, err: Error) {
        if let Ok(mut state) = self.state.lock() {
            state.failure = Some(err);
        }
    }
}

/// A pinned page. Derefs to the underlying [`PageFrame`]; dropping the
/// handle releases the pin, and a failure of that release is recorded on
/// the pool's failure flag.
pub struct PageHandle<'a> {
    pool: &'a BufferPool,
    page_id: PageId,
    frame: Option<Arc<PageFrame>>,
}

impl PageHandle<'_> {
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Keep the pin and hand back the frame. The caller takes over the
    /// obligation to call `release` exactly once.
    pub fn detach(mut self) -> Arc<PageFrame> {
        self.frame.take().unwrap()
    }
}

impl Deref for PageHandle<'_> {
    type Target = PageFrame;

    fn deref(&self) -> &Self::Target {
        self.frame.as_ref().unwrap()
    }
}

impl Drop for PageHandle<'_> {
    fn drop(&mut self) {
        if self.frame.take().is_some() {
            if let Err(err) = self.pool.release(self.page_id) {
                self.pool.record_failure(err);
            }
        }
    }
}

/// Iterator over every page in the store, yielding a copy of each page's
/// bytes. Pages fault through the cache, so eviction happens transparently
/// mid-scan.
pub struct PageScan<'a> {
    pool: &'a BufferPool,
    next: PageId,
    total: usize,
}

impl Iterator for PageScan<'_> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total {
            return None;
        }
        let item = self.pool.acquire(self.next).map(|page| page.clone_data());
        self.next += 1;
        Some(item)
    }
}
