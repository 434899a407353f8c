//! Bounded, thread-safe LRU cache mapping a canonical `(amount, pack sizes)`
//! key to a previously solved pack multiset.
//!
//! Structure is a `HashMap<String, usize>` index over a slab (`Vec<Slot>`) of
//! doubly linked nodes, with two sentinel nodes (`head`, `tail`) so splice
//! operations never need to special-case the ends of the chain. The slab
//! plus sentinels gives O(1) promotion/eviction without `unsafe` pointers.
//!
//! Locking discipline follows the spec exactly: `get` takes the shared lock
//! only to look up and clone the payload, releases it, bumps the hit/miss
//! counters (plain atomics, no lock at all), then re-acquires the lock
//! exclusively just long enough to splice the node to the head of the
//! recency chain. `set` and `clear` hold the exclusive lock for their whole
//! duration.

pub mod key;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;

pub use key::build_key;

use crate::solver::Solution;

/// What actually gets cached: the multiset and the shipped total. Pack
/// count is intentionally NOT stored here — per the design notes, `P` is
/// recomputed from `packs` on every cache hit rather than kept as a
/// redundant denormalization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedSolution {
    pub packs: std::collections::BTreeMap<u64, u64>,
    pub total_items: u64,
}

impl From<&Solution> for CachedSolution {
    fn from(s: &Solution) -> Self {
        Self {
            packs: s.packs.clone(),
            total_items: s.total_items,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

enum Slot {
    Free,
    Used {
        key: String,
        value: CachedSolution,
        expires_at: Instant,
        prev: usize,
        next: usize,
    },
}

/// Sentinel slab index for the most-recently-used end of the chain.
const HEAD: usize = 0;
/// Sentinel slab index for the least-recently-used end of the chain.
const TAIL: usize = 1;

struct Inner {
    map: HashMap<String, usize>,
    slab: Vec<Slot>,
    free: Vec<usize>,
    max_size: usize,
}

impl Inner {
    fn new(max_size: usize) -> Self {
        // Sentinels occupy slab[HEAD] and slab[TAIL]; they never hold a
        // value and are linked to each other when the chain is empty.
        let slab = vec![
            Slot::Used {
                key: String::new(),
                value: CachedSolution {
                    packs: Default::default(),
                    total_items: 0,
                },
                expires_at: Instant::now(),
                prev: TAIL,
                next: TAIL,
            },
            Slot::Used {
                key: String::new(),
                value: CachedSolution {
                    packs: Default::default(),
                    total_items: 0,
                },
                expires_at: Instant::now(),
                prev: HEAD,
                next: HEAD,
            },
        ];

        Self {
            map: HashMap::new(),
            slab,
            free: Vec::new(),
            max_size: max_size.max(1),
        }
    }

    fn link(&mut self, node: usize, prev: usize, next: usize) {
        if let Slot::Used {
            prev: p, next: n, ..
        } = &mut self.slab[node]
        {
            *p = prev;
            *n = next;
        }
        self.set_next(prev, node);
        self.set_prev(next, node);
    }

    fn set_next(&mut self, node: usize, next: usize) {
        if let Slot::Used { next: n, .. } = &mut self.slab[node] {
            *n = next;
        }
    }

    fn set_prev(&mut self, node: usize, prev: usize) {
        if let Slot::Used { prev: p, .. } = &mut self.slab[node] {
            *p = prev;
        }
    }

    fn detach(&mut self, node: usize) {
        let (prev, next) = match &self.slab[node] {
            Slot::Used { prev, next, .. } => (*prev, *next),
            Slot::Free => return,
        };
        self.set_next(prev, next);
        self.set_prev(next, prev);
    }

    fn push_front(&mut self, node: usize) {
        let old_front = match &self.slab[HEAD] {
            Slot::Used { next, .. } => *next,
            Slot::Free => unreachable!("sentinel is never freed"),
        };
        self.link(node, HEAD, old_front);
    }

    /// Moves an already-linked node to the front of the recency chain.
    fn promote(&mut self, node: usize) {
        self.detach(node);
        self.push_front(node);
    }

    fn evict_lru(&mut self) {
        let victim = match &self.slab[TAIL] {
            Slot::Used { prev, .. } => *prev,
            Slot::Free => unreachable!("sentinel is never freed"),
        };
        if victim == HEAD {
            return; // chain is empty
        }
        self.remove_node(victim);
    }

    fn remove_node(&mut self, node: usize) {
        self.detach(node);
        if let Slot::Used { key, .. } = &self.slab[node] {
            self.map.remove(key);
        }
        self.slab[node] = Slot::Free;
        self.free.push(node);
    }

    fn alloc(&mut self, key: String, value: CachedSolution, expires_at: Instant) -> usize {
        let slot = Slot::Used {
            key,
            value,
            expires_at,
            prev: HEAD,
            next: HEAD,
        };
        if let Some(idx) = self.free.pop() {
            self.slab[idx] = slot;
            idx
        } else {
            self.slab.push(slot);
            self.slab.len() - 1
        }
    }

    fn clear(&mut self) {
        self.map.clear();
        self.slab.truncate(2);
        self.free.clear();
        self.link(HEAD, TAIL, TAIL);
        self.link(TAIL, HEAD, HEAD);
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

/// Outcome of a `get`: whether the key was present (and unexpired), and the
/// cloned payload if so.
pub struct GetResult {
    pub hit: bool,
    pub value: Option<CachedSolution>,
}

/// The result cache itself. Construct one per process and share it via `Arc`.
pub struct ResultCache {
    inner: RwLock<Inner>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    pub fn new(max_size: usize) -> Self {
        Self {
            inner: RwLock::new(Inner::new(max_size)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Looks up `key`. Promotion happens lazily and under a brief exclusive
    /// lock taken only after the shared lookup has already released its lock.
    pub fn get(&self, key: &str) -> GetResult {
        let found = {
            let guard = self.inner.read();
            guard.map.get(key).and_then(|&idx| match &guard.slab[idx] {
                Slot::Used {
                    value, expires_at, ..
                } if *expires_at > Instant::now() => Some((idx, value.clone())),
                _ => None,
            })
        };

        match found {
            Some((idx, value)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                // Promotion is best-effort ordering-wise: a racing `set`/`clear`
                // may have already removed this node, in which case this is a
                // harmless no-op re-check under the exclusive lock.
                {
                    let mut guard = self.inner.write();
                    if guard.map.get(key).copied() == Some(idx) {
                        guard.promote(idx);
                    }
                }
                GetResult {
                    hit: true,
                    value: Some(value),
                }
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                // Lazily displace an expired entry so it cannot be served again.
                let mut guard = self.inner.write();
                if let Some(&idx) = guard.map.get(key) {
                    let expired = matches!(&guard.slab[idx], Slot::Used { expires_at, .. } if *expires_at <= Instant::now());
                    if expired {
                        guard.remove_node(idx);
                    }
                }
                GetResult {
                    hit: false,
                    value: None,
                }
            }
        }
    }

    /// Inserts or refreshes `key`. Holds the exclusive lock for the whole
    /// operation, including eviction when at capacity.
    pub fn set(&self, key: &str, value: CachedSolution, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        let mut guard = self.inner.write();

        if let Some(&idx) = guard.map.get(key) {
            if let Slot::Used {
                value: v,
                expires_at: e,
                ..
            } = &mut guard.slab[idx]
            {
                *v = value;
                *e = expires_at;
            }
            guard.promote(idx);
            return;
        }

        if guard.len() >= guard.max_size {
            guard.evict_lru();
        }

        let idx = guard.alloc(key.to_string(), value, expires_at);
        guard.map.insert(key.to_string(), idx);
        guard.push_front(idx);
    }

    /// Discards the entire structure and resets both counters to zero.
    pub fn clear(&self) {
        let mut guard = self.inner.write();
        guard.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        let size = self.inner.read().len();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size,
        }
    }
}
