use std::fs::{self, OpenOptions};
use std::io::Write;
use std::sync::RwLock;

use log::debug;

use crate::error::{Error, Result};
use crate::frame::PageFrame;
use crate::store::{PageId, PageStore};

/// Directory-backed store: page `i` is one file named `page_<i>` under the
/// directory chosen at construction, holding the raw page bytes with no
/// framing. The cached page count starts at whatever `falloc` allocates
/// and is refreshed by `assess_size`, which counts `page_`-prefixed
/// regular files. Gaps in the identifier range are not detected by
/// `assess_size` and are not tolerated by `read_frame`: a missing file
/// inside the range surfaces as `StoreIo`.
#[derive(Debug)]
pub struct DirStore {
    dir: String,
    // cached count of page files, guarded as the store's file index
    known: RwLock<usize>,
}

impl DirStore {
    /// Open a store over `dir`, which must already exist and be a
    /// directory, then preallocate `capacity` pages. Pages whose files
    /// already exist are left as-is.
    pub fn new(capacity: usize, dir: &str) -> Result<DirStore> {
        let meta = fs::metadata(dir)?;
        if !meta.is_dir() {
            return Err(Error::store_io(format!("{} is not a directory", dir)));
        }
        let store = DirStore { dir: dir.to_string(), known: RwLock::new(0) };
        store.falloc(capacity)?;
        Ok(store)
    }

    /// The file name for page `id`. Composed with a literal `/` on every
    /// host so page directories stay interchangeable across platforms.
    pub fn page_file_name(&self, id: PageId) -> String {
        format!("{}/page_{}", self.dir, id)
    }

    fn open_options() -> OpenOptions {
        let mut opts = OpenOptions::new();
        opts.write(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(0o600);
        }
        opts
    }

    fn create_page_file(&self, path: &str) -> Result<()> {
        match Self::open_options().create_new(true).open(path) {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

impl PageStore for DirStore {
    fn assess_size(&self) -> Result<usize> {
        let mut count = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if entry.file_name().to_string_lossy().starts_with("page_") {
                count += 1;
            }
        }
        let mut known = self.known.write()?;
        *known = count;
        Ok(count)
    }

    fn size(&self) -> usize {
        *self.known.read().unwrap()
    }

    fn read_frame(&self, id: PageId) -> Result<PageFrame> {
        if id >= self.size() {
            return Err(Error::out_of_range(format!("frame index too large: {}", id)));
        }
        let bytes = fs::read(self.page_file_name(id))?;
        Ok(PageFrame::new(bytes))
    }

    fn write_frame(&self, id: PageId, data: &[u8]) -> Result<()> {
        if id >= self.size() {
            return Err(Error::out_of_range(format!("frame index too large: {}", id)));
        }
        let path = self.page_file_name(id);
        let mut file = Self::open_options().create(true).truncate(true).open(path)?;
        file.write_all(data)?;
        Ok(())
    }

    fn falloc(&self, n: usize) -> Result<()> {
        let mut known = self.known.write()?;
        let prior = *known;
        for i in 0..n {
            self.create_page_file(&self.page_file_name(prior + i))?;
        }
        // The count grows by the full amount even when some of the files
        // already existed, so reopening over a populated directory can
        // double-count until assess_size runs.
        *known += n;
        if n > 0 {
            debug!("falloc extended {} to {} pages", self.dir, *known);
        }
        Ok(())
    }
}
