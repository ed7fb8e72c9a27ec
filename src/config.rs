use serde::Deserialize;

use crate::error::Result;
use crate::pool::evict::new_evictor;
use crate::pool::{BufferPool, EvictorType, PoolOptions};
use crate::store::{new_store, StoreType};

/// Embedder-facing configuration: defaults, overridden by an optional
/// file, overridden by `PAGEPOOL_*` environment variables.
#[derive(Debug, PartialEq, Deserialize)]
pub struct Config {
    /// Number of cache slots.
    pub capacity: usize,
    pub store_type: StoreType,
    /// Directory holding the page files; required for the `dir` store.
    pub store_path: Option<String>,
    /// Pages preallocated in the store at open.
    pub store_size: usize,
    pub evictor: EvictorType,
    /// Whether `fsync` clears the dirty bit after a successful
    /// write-back.
    pub sync_clears_dirty: bool,
}

impl Config {
    pub fn new(file: &str) -> Result<Config> {
        let mut cfg = config::Config::builder()
            .set_default("capacity", 64)?
            .set_default("store_type", "memory")?
            .set_default("store_size", 0)?
            .set_default("evictor", "bottom")?
            .set_default("sync_clears_dirty", false)?;
        if !file.is_empty() {
            cfg = cfg.add_source(config::File::with_name(file))
        }
        cfg = cfg.add_source(config::Environment::with_prefix("PAGEPOOL"));
        Ok(cfg.build()?.try_deserialize()?)
    }

    /// Assemble a ready pool: the store and the evictor come from their
    /// factories, the knobs from this configuration.
    pub fn open(&self) -> Result<BufferPool> {
        let store = new_store(self.store_type, self.store_size, self.store_path.as_deref())?;
        let evictor = new_evictor(self.evictor);
        let options = PoolOptions { sync_clears_dirty: self.sync_clears_dirty };
        Ok(BufferPool::new_with_options(self.capacity, store, evictor, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() -> Result<()> {
        let cfg = Config::new("")?;
        assert_eq!(cfg.capacity, 64);
        assert_eq!(StoreType::Memory, cfg.store_type);
        assert_eq!(cfg.store_path, None);
        assert_eq!(cfg.store_size, 0);
        assert_eq!(EvictorType::Bottom, cfg.evictor);
        assert!(!cfg.sync_clears_dirty);
        Ok(())
    }

    #[test]
    fn test_open_assembles_a_pool() -> Result<()> {
        let cfg = Config::new("")?;
        let pool = cfg.open()?;
        assert_eq!(pool.capacity(), 64);
        Ok(())
    }
}
