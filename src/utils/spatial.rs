//! # Spatial Hash
//!
//! Bucketed point index for nearest-tile lookups on large maps.

use crate::world::Position;
use std::collections::HashMap;

/// Points bucketed into square cells of `cell_size` tiles.
///
/// Queries return results in a fixed order independent of hash iteration
/// order.
#[derive(Debug, Clone)]
pub struct SpatialHash<T> {
    cell_size: i32,
    buckets: HashMap<(i32, i32), Vec<(Position, T)>>,
    len: usize,
    min_bucket: (i32, i32),
    max_bucket: (i32, i32),
}

impl<T: Clone> SpatialHash<T> {
    /// Creates an empty index. `cell_size` is clamped to at least 1.
    pub fn new(cell_size: u32) -> Self {
        Self {
            cell_size: cell_size.max(1) as i32,
            buckets: HashMap::new(),
            len: 0,
            min_bucket: (i32::MAX, i32::MAX),
            max_bucket: (i32::MIN, i32::MIN),
        }
    }

    fn bucket_of(&self, pos: Position) -> (i32, i32) {
        (pos.x.div_euclid(self.cell_size), pos.y.div_euclid(self.cell_size))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Adds an entry. Duplicate positions are kept.
    pub fn insert(&mut self, pos: Position, value: T) {
        let bucket = self.bucket_of(pos);
        self.min_bucket = (self.min_bucket.0.min(bucket.0), self.min_bucket.1.min(bucket.1));
        self.max_bucket = (self.max_bucket.0.max(bucket.0), self.max_bucket.1.max(bucket.1));
        self.buckets.entry(bucket).or_default().push((pos, value));
        self.len += 1;
    }

    /// Returns up to `k` entries nearest to `origin` by Manhattan distance,
    /// ties broken by `(y, x)` and then insertion order.
    ///
    /// Rings of buckets are scanned outward from the origin's bucket. After
    /// ring `r` every unscanned entry is at least `r * cell_size + 1` away,
    /// so the scan stops once `k` candidates are at most that far.
    pub fn nearest(&self, origin: Position, k: usize) -> Vec<(Position, T)> {
        if k == 0 || self.is_empty() {
            return Vec::new();
        }

        let center = self.bucket_of(origin);
        let max_ring = [
            center.0 - self.min_bucket.0,
            self.max_bucket.0 - center.0,
            center.1 - self.min_bucket.1,
            self.max_bucket.1 - center.1,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
        .max(0);

        let mut candidates: Vec<(u32, usize, Position, T)> = Vec::new();
        let mut sequence = 0_usize;
        for ring in 0..=max_ring {
            for bucket in ring_buckets(center, ring) {
                let Some(entries) = self.buckets.get(&bucket) else {
                    continue;
                };
                for (pos, value) in entries {
                    candidates.push((origin.manhattan_distance(*pos), sequence, *pos, value.clone()));
                    sequence += 1;
                }
            }

            if candidates.len() >= k {
                candidates.sort_by_key(|(distance, order, pos, _)| (*distance, pos.y, pos.x, *order));
                let guaranteed = (ring as i64 * self.cell_size as i64) as u32;
                if candidates[k - 1].0 <= guaranteed {
                    break;
                }
            }
        }

        candidates.sort_by_key(|(distance, order, pos, _)| (*distance, pos.y, pos.x, *order));
        candidates
            .into_iter()
            .take(k)
            .map(|(_, _, pos, value)| (pos, value))
            .collect()
    }

    /// Linear-scan reference for [`SpatialHash::nearest`].
    pub fn nearest_linear(&self, origin: Position, k: usize) -> Vec<(Position, T)> {
        let mut all: Vec<(u32, Position, usize, T)> = Vec::with_capacity(self.len);
        let mut keys: Vec<&(i32, i32)> = self.buckets.keys().collect();
        keys.sort();
        for key in keys {
            for (index, (pos, value)) in self.buckets[key].iter().enumerate() {
                all.push((origin.manhattan_distance(*pos), *pos, index, value.clone()));
            }
        }
        all.sort_by_key(|(distance, pos, index, _)| (*distance, pos.y, pos.x, *index));
        all.into_iter().take(k).map(|(_, pos, _, value)| (pos, value)).collect()
    }
}

/// Buckets at Chebyshev distance exactly `ring` from `center`.
fn ring_buckets(center: (i32, i32), ring: i32) -> Vec<(i32, i32)> {
    if ring == 0 {
        return vec![center];
    }
    let mut buckets = Vec::with_capacity(ring as usize * 8);
    for dy in -ring..=ring {
        if dy == -ring || dy == ring {
            for dx in -ring..=ring {
                buckets.push((center.0 + dx, center.1 + dy));
            }
        } else {
            buckets.push((center.0 - ring, center.1 + dy));
            buckets.push((center.0 + ring, center.1 + dy));
        }
    }
    buckets
}
