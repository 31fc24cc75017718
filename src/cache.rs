//! Memoized render results.
//!
//! Entries are bounded by a byte budget and evicted least-recently-used
//! first, so any entry may disappear between two calls; a miss after an
//! earlier hit simply recomputes. Fills are single-flight per key: while one
//! caller computes a key, other callers for that key wait for it instead of
//! computing the same thing again. Callers for different keys do not block
//! each other during computation.

use image::RgbaImage;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{BoxError, Result, ViewerError};

/// Memory cost of a cached value, in bytes.
pub trait Weigh {
    fn weight(&self) -> u64;
}

impl Weigh for Arc<RgbaImage> {
    fn weight(&self) -> u64 {
        self.as_raw().len() as u64
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub used_bytes: u64,
    pub budget: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub failures: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

type Slot = Arc<Mutex<()>>;

/// A key being computed and the number of callers interested in it.
struct InFlight {
    slot: Slot,
    callers: usize,
}

struct CacheState<K, V> {
    entries: HashMap<K, V>,
    /// Least recently used at the front.
    order: VecDeque<K>,
    in_flight: HashMap<K, InFlight>,
    used_bytes: u64,
    budget: u64,
    stats: CacheStats,
}

impl<K, V> CacheState<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Weigh,
{
    fn new(budget: u64) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            in_flight: HashMap::new(),
            used_bytes: 0,
            budget,
            stats: CacheStats::default(),
        }
    }

    fn lookup(&mut self, key: &K) -> Option<V> {
        let value = self.entries.get(key).cloned()?;
        self.touch(key);
        Some(value)
    }

    fn touch(&mut self, key: &K) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }

    fn insert(&mut self, key: K, value: V) {
        if let Some(old) = self.entries.remove(&key) {
            self.used_bytes = self.used_bytes.saturating_sub(old.weight());
            self.order.retain(|k| k != &key);
        }
        self.used_bytes += value.weight();
        self.entries.insert(key.clone(), value);
        self.order.push_back(key);
        self.evict_to_budget();
    }

    /// The newest entry always survives, even if it alone exceeds the budget.
    fn evict_to_budget(&mut self) {
        while self.used_bytes > self.budget && self.entries.len() > 1 {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            if let Some(value) = self.entries.remove(&oldest) {
                self.used_bytes = self.used_bytes.saturating_sub(value.weight());
                self.stats.evictions += 1;
                log::debug!(
                    "[cache] evicted {} bytes ({}/{} used)",
                    value.weight(),
                    self.used_bytes,
                    self.budget
                );
            }
        }
    }

    fn join(&mut self, key: &K) -> Slot {
        let entry = self.in_flight.entry(key.clone()).or_insert_with(|| InFlight {
            slot: Slot::default(),
            callers: 0,
        });
        entry.callers += 1;
        Arc::clone(&entry.slot)
    }

    /// The last interested caller removes the in-flight entry.
    fn leave(&mut self, key: &K) {
        if let Some(entry) = self.in_flight.get_mut(key) {
            entry.callers -= 1;
            if entry.callers == 0 {
                self.in_flight.remove(key);
            }
        }
    }
}

pub struct RenderCache<K, V> {
    state: Mutex<CacheState<K, V>>,
}

impl<K, V> RenderCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Weigh,
{
    pub fn new(budget_bytes: u64) -> Self {
        Self {
            state: Mutex::new(CacheState::new(budget_bytes)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<K, V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the cached value for `key`, or run `compute` once, cache its
    /// result and return it.
    ///
    /// A failing `compute` surfaces as [`ViewerError::ComputationFailed`] and
    /// leaves no entry behind.
    pub fn compute_if_absent<F, E>(&self, key: K, compute: F) -> Result<V>
    where
        F: FnOnce() -> std::result::Result<V, E>,
        E: Into<BoxError>,
    {
        let slot = {
            let mut state = self.lock();
            if let Some(value) = state.lookup(&key) {
                state.stats.hits += 1;
                log::trace!("[cache] hit");
                return Ok(value);
            }
            state.join(&key)
        };

        let _fill = slot.lock().unwrap_or_else(PoisonError::into_inner);

        // Someone else may have filled the key while we waited on the slot.
        {
            let mut state = self.lock();
            if let Some(value) = state.lookup(&key) {
                state.stats.hits += 1;
                state.leave(&key);
                log::trace!("[cache] hit after wait");
                return Ok(value);
            }
            state.stats.misses += 1;
        }

        log::trace!("[cache] miss, computing");
        let result = compute();

        let mut state = self.lock();
        let outcome = match result {
            Ok(value) => {
                state.insert(key.clone(), value.clone());
                Ok(value)
            }
            Err(err) => {
                state.stats.failures += 1;
                let err: BoxError = err.into();
                log::warn!("[cache] computation failed: {}", err);
                Err(ViewerError::ComputationFailed(err))
            }
        };
        state.leave(&key);
        outcome
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.lock().lookup(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.lock().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Reclaim every entry. Later accesses recompute.
    pub fn clear(&self) {
        let mut state = self.lock();
        let dropped = state.entries.len();
        state.entries.clear();
        state.order.clear();
        state.used_bytes = 0;
        state.stats.evictions += dropped as u64;
        log::debug!("[cache] reclaimed {} entries", dropped);
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        CacheStats {
            entries: state.entries.len(),
            used_bytes: state.used_bytes,
            budget: state.budget,
            ..state.stats
        }
    }
}

impl<K, V> fmt::Debug for RenderCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Weigh,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderCache").field("stats", &self.stats()).finish()
    }
}
