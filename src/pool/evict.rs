use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::frame::PageFrame;
use crate::pool::{Evictor, SlotId};
use crate::recency::RecencySet;
use crate::store::PageId;

fn unpinned(slot: &Option<Arc<PageFrame>>) -> bool {
    matches!(slot, Some(frame) if frame.pins() == 0)
}

/// Uniformly samples slots until one holds an unpinned frame. Sampling is
/// bounded at `slots.len() + 1` trials; past the bound the slots are swept
/// once, so a lone unpinned slot cannot be missed before `AllPinned` is
/// declared.
#[derive(Debug, Default)]
pub struct RandomEvictor;

impl Evictor for RandomEvictor {
    fn evict(
        &self,
        slots: &[Option<Arc<PageFrame>>],
        _page_to_slot: &HashMap<PageId, SlotId>,
        _recency: &RecencySet<PageId>,
    ) -> Result<SlotId> {
        if slots.is_empty() {
            return Err(Error::AllPinned);
        }
        let mut rng = rand::thread_rng();
        let mut trials = 0;
        while trials <= slots.len() {
            let candidate = rng.gen_range(0..slots.len());
            if unpinned(&slots[candidate]) {
                return Ok(candidate);
            }
            trials += 1;
        }
        slots.iter().position(unpinned).ok_or(Error::AllPinned)
    }
}

/// Walks the recency set bottom-up and selects the slot of the least
/// recent page whose frame is unpinned. A recency member with no slot
/// mapping, or a mapping onto an empty slot, is an invariant violation of
/// the pool and surfaces as `StateIncoherent`.
#[derive(Debug, Default)]
pub struct BottomEvictor;

impl Evictor for BottomEvictor {
    fn evict(
        &self,
        slots: &[Option<Arc<PageFrame>>],
        page_to_slot: &HashMap<PageId, SlotId>,
        recency: &RecencySet<PageId>,
    ) -> Result<SlotId> {
        for page in recency.ordered() {
            let &slot = page_to_slot.get(&page).ok_or_else(|| {
                Error::incoherent(format!(
                    "unable to find recency member {} in the page map",
                    page
                ))
            })?;
            let frame = slots.get(slot).and_then(|s| s.as_ref()).ok_or_else(|| {
                Error::incoherent(format!("page {} maps to empty slot {}", page, slot))
            })?;
            if frame.pins() == 0 {
                return Ok(slot);
            }
        }
        Err(Error::AllPinned)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictorType {
    Random,
    Bottom,
}

pub fn new_evictor(typ: EvictorType) -> Box<dyn Evictor> {
    match typ {
        EvictorType::Random => Box::new(RandomEvictor),
        EvictorType::Bottom => Box::new(BottomEvictor),
    }
}
