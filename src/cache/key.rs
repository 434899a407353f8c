//! Canonical cache-key construction.
//!
//! Two requests that specify the same pack configuration in different
//! orders, or with duplicate sizes, must hash to the same cache entry. The
//! key is therefore built from the amount plus the ascending, deduplicated
//! pack sizes rather than the request's raw ordering.

use std::fmt::Write as _;

pub fn build_key(amount: u64, sizes: &[u64]) -> String {
    let mut sorted: Vec<u64> = sizes.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut key = String::with_capacity(16 + sorted.len() * 8);
    let _ = write!(key, "{amount}:");
    for (i, s) in sorted.iter().enumerate() {
        if i > 0 {
            key.push(',');
        }
        let _ = write!(key, "{s}");
    }
    key
}
