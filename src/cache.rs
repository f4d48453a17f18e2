//! # Address Cache
//!
//! Bounded least-recently-used cache mapping a coordinate to its resolved
//! address string. Keys use exact coordinate formatting, so only repeats
//! of the same fix are cheap; nearby-but-different fixes still resolve.
//!
//! The cache is shared between concurrent address resolutions, so the
//! whole state sits behind a mutex. Lookups are not coalesced: two
//! concurrent misses for the same key may both issue a network request,
//! with the later `put` winning. That matches the source behavior and is
//! accepted.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::types::LatLng;

/// Default number of cached addresses.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

#[derive(Debug)]
struct CacheEntry {
    address: String,
    last_access: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    access_counter: u64,
}

/// LRU cache of resolved addresses with O(n) eviction.
///
/// At 100 entries the linear scan on eviction is acceptable and simpler
/// than maintaining a linked list.
#[derive(Debug)]
pub struct AddressCache {
    capacity: usize,
    state: Mutex<CacheState>,
}

impl AddressCache {
    /// Create a cache holding at most `capacity` addresses.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Cache key for a coordinate: exact float formatting, so equality
    /// is exact floating-point equality.
    pub fn key_for(position: &LatLng) -> String {
        format!("{},{}", position.latitude, position.longitude)
    }

    /// Look up the address for a coordinate, refreshing its recency.
    pub fn get(&self, position: &LatLng) -> Option<String> {
        let key = Self::key_for(position);
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.access_counter += 1;
        let counter = state.access_counter;

        state.entries.get_mut(&key).map(|entry| {
            entry.last_access = counter;
            entry.address.clone()
        })
    }

    /// Store an address, evicting the least recently used entry when full.
    pub fn put(&self, position: &LatLng, address: String) {
        let key = Self::key_for(position);
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.access_counter += 1;
        let counter = state.access_counter;

        if let Some(entry) = state.entries.get_mut(&key) {
            entry.address = address;
            entry.last_access = counter;
            return;
        }

        if state.entries.len() >= self.capacity {
            let oldest = state
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_access)
                .map(|(k, _)| k.clone());
            if let Some(k) = oldest {
                state.entries.remove(&k);
            }
        }

        state.entries.insert(
            key,
            CacheEntry {
                address,
                last_access: counter,
            },
        );
    }

    /// Number of cached addresses.
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AddressCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
