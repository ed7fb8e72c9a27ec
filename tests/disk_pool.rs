use std::fs;
use std::sync::Arc;
use std::thread;

use pagepool::error::Result;
use pagepool::pool::{BottomEvictor, BufferPool, RandomEvictor};
use pagepool::store::{DirStore, PageStore};

#[test]
fn test_fsync_persists_written_pages() -> Result<()> {
    let td = tempfile::tempdir().unwrap();
    let dir = td.path().to_str().unwrap().to_string();
    let store = Arc::new(DirStore::new(10, &dir)?);
    let pool = BufferPool::new(3, store, Box::new(RandomEvictor));

    for id in 0..3 {
        pool.write_page(id, format!("X-{}", id).into_bytes())?;
    }
    pool.fsync()?;

    for id in 0..3 {
        let bytes = fs::read(format!("{}/page_{}", dir, id))?;
        assert_eq!(bytes, format!("X-{}", id).into_bytes());
    }
    Ok(())
}

#[test]
fn test_churn_past_capacity_with_write_back() -> Result<()> {
    let td = tempfile::tempdir().unwrap();
    let dir = td.path().to_str().unwrap().to_string();
    let store = Arc::new(DirStore::new(10, &dir)?);
    let pool = BufferPool::new(3, store, Box::new(BottomEvictor));

    // More pages than slots: every write past the third faults and evicts.
    let payloads: Vec<Vec<u8>> = (0..10)
        .map(|id| format!("payload for page {}", id).into_bytes())
        .collect();
    for (id, data) in payloads.iter().enumerate() {
        pool.write_page(id, data.clone())?;
    }

    // Everything reads back through the cache, resident or not.
    for (id, data) in payloads.iter().enumerate() {
        let page = pool.acquire(id)?;
        assert_eq!(&page.clone_data(), data);
    }
    pool.fsync()?;

    // A fresh store over the same directory sees every page.
    let reopened = DirStore::new(0, &dir)?;
    assert_eq!(reopened.assess_size()?, 10);
    for (id, data) in payloads.iter().enumerate() {
        assert_eq!(&reopened.read_frame(id)?.clone_data(), data);
    }
    Ok(())
}

#[test]
fn test_scan_streams_the_whole_directory() -> Result<()> {
    let td = tempfile::tempdir().unwrap();
    let dir = td.path().to_str().unwrap().to_string();
    let store = Arc::new(DirStore::new(16, &dir)?);
    for id in 0..16 {
        store.write_frame(id, format!("row-{}", id).as_bytes())?;
    }

    let pool = BufferPool::new(4, store, Box::new(BottomEvictor));
    let pages = pool.scan().collect::<Result<Vec<_>>>()?;
    assert_eq!(pages.len(), 16);
    for (id, data) in pages.iter().enumerate() {
        assert_eq!(data, format!("row-{}", id).as_bytes());
    }
    assert!(pool.resident_pages() <= 4);
    Ok(())
}

#[test]
fn test_reopened_pool_sees_persisted_pages() -> Result<()> {
    let td = tempfile::tempdir().unwrap();
    let dir = td.path().to_str().unwrap().to_string();

    {
        let store = Arc::new(DirStore::new(4, &dir)?);
        let pool = BufferPool::new(2, store, Box::new(BottomEvictor));
        pool.write_page(0, b"persists".to_vec())?;
        pool.write_page(3, b"also persists".to_vec())?;
        pool.fsync()?;
    }

    let store = Arc::new(DirStore::new(0, &dir)?);
    store.assess_size()?;
    assert_eq!(store.size(), 4);
    let pool = BufferPool::new(2, store, Box::new(BottomEvictor));
    assert_eq!(pool.acquire(0)?.clone_data(), b"persists");
    assert_eq!(pool.acquire(3)?.clone_data(), b"also persists");
    assert!(pool.acquire(1)?.is_empty());
    Ok(())
}

#[test]
fn test_threaded_writers_share_one_pool() -> Result<()> {
    let td = tempfile::tempdir().unwrap();
    let dir = td.path().to_str().unwrap().to_string();
    let store = Arc::new(DirStore::new(8, &dir)?);
    let pool = Arc::new(BufferPool::new(6, store, Box::new(BottomEvictor)));

    let mut handles = vec![];
    for t in 0..4usize {
        let pool = Arc::clone(&pool);
        handles.push(thread::spawn(move || {
            // each writer owns two pages, so final contents are exact
            for round in 0..50usize {
                for offset in 0..2 {
                    let id = t * 2 + offset;
                    let data = format!("t{}-r{}-p{}", t, round, id).into_bytes();
                    pool.write_page(id, data).unwrap();
                }
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    pool.fsync()?;
    assert!(pool.last_failure().is_none());
    for t in 0..4usize {
        for offset in 0..2 {
            let id = t * 2 + offset;
            let bytes = fs::read(format!("{}/page_{}", dir, id))?;
            assert_eq!(bytes, format!("t{}-r49-p{}", t, id).into_bytes());
        }
    }
    Ok(())
}
