//! Bounded integer dynamic-programming solver for the pack-shipping problem.
//!
//! Given an order amount `A` and a set of pack sizes `S`, finds the multiset
//! of packs minimizing total shipped items `T` first, then total pack count
//! `P`, among all combinations with `T >= A`. See the DP sketch in the
//! module-level design doc for the optimality argument; in short, `packs[i]`
//! is the minimum pack count summing to exactly `i` over the half-open range
//! `[0, A + max(S)]`, and `choice[i]` records the last pack used on the best
//! path to `i` so the winning multiset can be reconstructed in O(U).

use std::collections::BTreeMap;
use thiserror::Error;

/// Sentinel marking a DP cell as unreached.
const UNREACHABLE: u32 = u32::MAX;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverError {
    #[error("amount must be a positive integer")]
    InvalidAmount,
    #[error("pack configuration is empty")]
    NoConfig,
    #[error("no combination of the configured pack sizes reaches the requested amount")]
    NoSolution,
}

/// A solved bill of packs: how many of each size to ship, plus the derived
/// totals. `packs` is kept in ascending key order so it serializes and
/// canonicalizes deterministically.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    pub packs: BTreeMap<u64, u64>,
    pub total_items: u64,
    pub total_packs: u64,
}

impl Solution {
    /// Recomputes `total_packs` from `packs`. Used on the cache hit path,
    /// where only `packs` and `total_items` are stored (see `CachedSolution`).
    pub fn total_packs_of(packs: &BTreeMap<u64, u64>) -> u64 {
        packs.values().sum()
    }
}

/// Stateless, pure pack solver. Cheap to construct per request.
#[derive(Clone, Copy, Debug, Default)]
pub struct PackSolver;

impl PackSolver {
    pub fn new() -> Self {
        Self
    }

    /// Solves for the optimal pack multiset. `sizes` need not be sorted or
    /// deduplicated; both are done internally before the DP sweep.
    pub fn solve(&self, amount: u64, sizes: &[u64]) -> Result<Solution, SolverError> {
        solve(amount, sizes)
    }
}

/// Canonicalizes `sizes` into ascending, deduplicated order. Duplicates are
/// permitted by the configuration but redundant: they never change `reach(S)`.
fn canonicalize(sizes: &[u64]) -> Vec<u64> {
    let mut s: Vec<u64> = sizes.to_vec();
    s.sort_unstable();
    s.dedup();
    s
}

pub fn solve(amount: u64, sizes: &[u64]) -> Result<Solution, SolverError> {
    if amount == 0 {
        return Err(SolverError::InvalidAmount);
    }
    if sizes.is_empty() {
        return Err(SolverError::NoConfig);
    }

    let sizes = canonicalize(sizes);
    let max_size = *sizes.last().expect("non-empty after canonicalization");

    // Horizon: any T* minimizing total items with T* >= A must lie within one
    // largest-pack-step above A, otherwise dropping the largest pack used
    // would yield a smaller feasible T, contradicting minimality of T*.
    let horizon = amount
        .checked_add(max_size)
        .ok_or(SolverError::NoSolution)?;
    let u = usize::try_from(horizon).map_err(|_| SolverError::NoSolution)?;

    let mut packs = vec![UNREACHABLE; u + 1];
    let mut choice = vec![0u64; u + 1];
    packs[0] = 0;

    for i in 0..=u {
        if packs[i] == UNREACHABLE {
            continue;
        }
        for &s in &sizes {
            let s_usize = s as usize;
            let Some(next) = i.checked_add(s_usize) else {
                continue;
            };
            if next > u {
                continue;
            }
            let candidate = packs[i] + 1;
            if candidate < packs[next] {
                packs[next] = candidate;
                choice[next] = s;
            }
        }
    }

    let amount_usize = amount as usize;
    let total_items = (amount_usize..=u)
        .find(|&i| packs[i] != UNREACHABLE)
        .ok_or(SolverError::NoSolution)?;

    let mut multiset: BTreeMap<u64, u64> = BTreeMap::new();
    let mut cursor = total_items;
    while cursor > 0 {
        let used = choice[cursor];
        debug_assert!(used > 0, "reachable cell must carry a recorded choice");
        *multiset.entry(used).or_insert(0) += 1;
        cursor -= used as usize;
    }

    let total_packs = multiset.values().sum();

    Ok(Solution {
        packs: multiset,
        total_items: total_items as u64,
        total_packs,
    })
}
