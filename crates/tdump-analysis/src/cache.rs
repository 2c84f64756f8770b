//! Content-addressed result cache for parsed dumps.
//!
//! Keys are the hex SHA-256 digest of the raw input bytes (before gzip inflation). Entries are
//! kept in access order and the least recently used one is evicted once the cache grows past
//! its capacity. Parsing happens outside the lock: two concurrent misses on the same bytes both
//! parse and the later store wins. Failures are never cached.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use tdump_core::prelude::*;
use tdump_core::ThreadDump;

/// Entries retained by default
pub const DEFAULT_CACHE_CAPACITY: usize = 10;

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, Arc<ThreadDump>>,
    /// Keys, least recently used at the front
    recency: VecDeque<String>,
}

impl CacheState {
    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.recency.iter().position(|k| k == key) {
            if let Some(k) = self.recency.remove(pos) {
                self.recency.push_back(k);
            }
        }
    }

    fn insert(&mut self, key: String, dump: Arc<ThreadDump>, capacity: usize) {
        if self.entries.insert(key.clone(), dump).is_some() {
            self.touch(&key);
        } else {
            self.recency.push_back(key);
        }

        while self.entries.len() > capacity {
            let Some(oldest) = self.recency.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            debug!("Evicted cached dump {}", oldest);
        }
    }
}

/// Thread-safe LRU cache of parsed dumps, shared behind `&self`.
#[derive(Debug)]
pub struct DumpCache {
    state: Mutex<CacheState>,
    capacity: usize,
}

impl DumpCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            capacity,
        }
    }

    /// Return the cached dump for these bytes, or decode, detect, parse and store it.
    pub fn load(&self, bytes: &[u8]) -> Result<Arc<ThreadDump>> {
        let key = digest(bytes);

        {
            let mut state = self.state.lock();
            if let Some(dump) = state.entries.get(&key).cloned() {
                state.touch(&key);
                trace!("Cache hit for {}", key);
                return Ok(dump);
            }
        }

        trace!("Cache miss for {}", key);
        let dump = Arc::new(tdump_parser::parse_bytes(bytes)?);
        self.state
            .lock()
            .insert(key, Arc::clone(&dump), self.capacity);
        Ok(dump)
    }

    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Arc<ThreadDump>> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        self.load(&bytes)
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.recency.clear();
        debug!("Cleared dump cache");
    }

    /// Whether these exact bytes are cached. Does not refresh recency.
    pub fn contains(&self, bytes: &[u8]) -> bool {
        self.state.lock().entries.contains_key(&digest(bytes))
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for DumpCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
