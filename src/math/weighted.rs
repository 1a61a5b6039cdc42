//! Weighted random selection
//!
//! Two flavours are provided: a linear walk for one-off draws against a
//! small weight set, and [`WeightedTable`] which precomputes cumulative
//! weights so repeated draws are a binary search.

use rand::Rng;

/// Clamp a weight into the usable range. Negative and NaN weights count as 0.
#[inline]
fn sanitize(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 { weight } else { 0.0 }
}

/// Draw one key with probability proportional to its weight.
///
/// Draws `r` uniformly in `[0, total)` and walks the entries subtracting each
/// weight, returning the entry at which the remainder reaches zero. Returns
/// `None` for an empty slice or a non-positive total weight.
///
/// # Arguments
/// * `entries` - Key/weight pairs, in iteration order
/// * `rng` - Random source
pub fn pick_weighted<K: Clone, R: Rng + ?Sized>(entries: &[(K, f64)], rng: &mut R) -> Option<K> {
    let total: f64 = entries.iter().map(|(_, w)| sanitize(*w)).sum();
    if total <= 0.0 {
        return None;
    }

    let mut remaining = rng.gen_range(0.0..total);
    for (key, weight) in entries {
        let weight = sanitize(*weight);
        if weight == 0.0 {
            continue;
        }
        remaining -= weight;
        if remaining <= 0.0 {
            return Some(key.clone());
        }
    }

    // Floating point leftovers land on the last usable entry
    entries
        .iter()
        .rev()
        .find(|(_, w)| sanitize(*w) > 0.0)
        .map(|(k, _)| k.clone())
}

/// Like [`pick_weighted`], falling back to `default` when nothing can be drawn
pub fn pick_weighted_or<K: Clone, R: Rng + ?Sized>(entries: &[(K, f64)], default: K, rng: &mut R) -> K {
    pick_weighted(entries, rng).unwrap_or(default)
}

/// Precomputed cumulative weight table for repeated draws
#[derive(Clone, Debug)]
pub struct WeightedTable<K> {
    keys: Vec<K>,
    cumulative: Vec<f64>,
    total: f64,
}

impl<K: Clone> WeightedTable<K> {
    /// Build a table from key/weight pairs. Zero-weight entries are dropped.
    pub fn new(entries: impl IntoIterator<Item = (K, f64)>) -> Self {
        let mut keys = Vec::new();
        let mut cumulative = Vec::new();
        let mut total = 0.0;

        for (key, weight) in entries {
            let weight = sanitize(weight);
            if weight == 0.0 {
                continue;
            }
            total += weight;
            keys.push(key);
            cumulative.push(total);
        }

        Self { keys, cumulative, total }
    }

    /// Total of all usable weights
    pub fn total_weight(&self) -> f64 {
        self.total
    }

    /// Number of drawable entries
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Draw one key, or `None` if the table holds no positive weight
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<K> {
        if self.total <= 0.0 {
            return None;
        }
        let r = rng.gen_range(0.0..self.total);
        let idx = self.cumulative.partition_point(|&c| c <= r);
        self.keys.get(idx.min(self.keys.len() - 1)).cloned()
    }

    /// Draw one key, falling back to `default`
    pub fn pick_or<R: Rng + ?Sized>(&self, default: K, rng: &mut R) -> K {
        self.pick(rng).unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_empty_and_zero_weights() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let empty: [(u8, f64); 0] = [];
        assert_eq!(pick_weighted(&empty, &mut rng), None);
        assert_eq!(pick_weighted(&[('a', 0.0), ('b', -2.0)], &mut rng), None);
        assert_eq!(pick_weighted_or(&empty, 7u8, &mut rng), 7);

        let table: WeightedTable<char> = WeightedTable::new([('a', 0.0)]);
        assert!(table.is_empty());
        assert_eq!(table.pick(&mut rng), None);
    }

    #[test]
    fn test_single_positive_entry_always_wins() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let entries = [("skip", 0.0), ("only", 4.0), ("neg", -1.0)];
        for _ in 0..100 {
            assert_eq!(pick_weighted(&entries, &mut rng), Some("only"));
        }
    }

    #[test]
    fn test_linear_ratio_converges() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let entries = [('A', 1.0), ('B', 3.0)];
        let (mut a, mut b) = (0u32, 0u32);
        for _ in 0..10_000 {
            match pick_weighted(&entries, &mut rng) {
                Some('A') => a += 1,
                Some('B') => b += 1,
                other => panic!("unexpected pick {:?}", other),
            }
        }
        let ratio = b as f64 / a as f64;
        assert!((ratio - 3.0).abs() < 0.3, "ratio was {}", ratio);
    }

    #[test]
    fn test_table_ratio_converges() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let table = WeightedTable::new([('A', 1.0), ('B', 3.0)]);
        assert_eq!(table.total_weight(), 4.0);
        let (mut a, mut b) = (0u32, 0u32);
        for _ in 0..10_000 {
            match table.pick(&mut rng) {
                Some('A') => a += 1,
                Some('B') => b += 1,
                other => panic!("unexpected pick {:?}", other),
            }
        }
        let ratio = b as f64 / a as f64;
        assert!((ratio - 3.0).abs() < 0.3, "ratio was {}", ratio);
    }
}
