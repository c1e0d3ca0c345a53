use anyhow::{bail, Result};
use std::collections::BTreeSet;

use super::entropy::RandomSource;

/// Retry budget per requested number. Realistic weights need a handful.
const MAX_ATTEMPTS_PER_PICK: usize = 100_000;

/// Running sums of the weights, searched to map a uniform draw to an index.
#[derive(Debug, Clone)]
pub struct CumulativeTable {
    cumulative: Vec<f64>,
    total: f64,
    last_positive: usize,
    reachable: usize,
}

impl CumulativeTable {
    pub fn new(weights: &[f64]) -> Result<Self> {
        if weights.is_empty() {
            bail!("Cannot sample from an empty weight vector");
        }
        let mut cumulative = Vec::with_capacity(weights.len());
        let mut total = 0.0f64;
        let mut last_positive = weights.len() - 1;
        let mut reachable = 0;
        for (i, &w) in weights.iter().enumerate() {
            if !w.is_finite() || w < 0.0 {
                bail!("Weight of number {} is invalid: {}", i + 1, w);
            }
            let next = total + w;
            // A weight too small to move the running sum can never be drawn.
            if next > total {
                last_positive = i;
                reachable += 1;
            }
            total = next;
            cumulative.push(total);
        }
        if !total.is_finite() {
            bail!("Sum of weights is not finite");
        }
        Ok(Self {
            cumulative,
            total,
            last_positive,
            reachable,
        })
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Numbers the search can actually land on.
    pub fn reachable(&self) -> usize {
        self.reachable
    }

    /// Smallest index whose running sum is strictly greater than `r`.
    ///
    /// `r` rounding up to `total` maps to the last positive weight.
    pub fn index_for(&self, r: f64) -> usize {
        let idx = self.cumulative.partition_point(|&c| c <= r);
        if idx == self.cumulative.len() {
            self.last_positive
        } else {
            idx
        }
    }
}

/// Draws `count` distinct numbers (1-based) with probability proportional to
/// `weights`, returned in ascending order.
///
/// When every weight is zero the draw falls back to a uniform choice over the
/// whole pool. Zero-weight numbers, and weights lost to rounding next to much
/// larger ones, are otherwise never picked, so fewer than `count` reachable
/// numbers is an error rather than an endless retry.
pub fn sample_unique(
    weights: &[f64],
    count: usize,
    source: &mut dyn RandomSource,
) -> Result<Vec<u8>> {
    if count == 0 {
        bail!("Pick count must be at least 1");
    }
    if count > weights.len() {
        bail!(
            "Cannot pick {} distinct numbers from a pool of {}",
            count,
            weights.len()
        );
    }
    if weights.len() > u8::MAX as usize {
        bail!("Pool of {} numbers is too large", weights.len());
    }

    let mut table = CumulativeTable::new(weights)?;
    if table.total() == 0.0 {
        log::warn!("All weights are zero, falling back to a uniform draw");
        table = CumulativeTable::new(&vec![1.0; weights.len()])?;
    } else if table.reachable() < count {
        bail!(
            "Only {} numbers have a usable positive weight, cannot pick {} distinct ones",
            table.reachable(),
            count
        );
    }

    let max_attempts = MAX_ATTEMPTS_PER_PICK * count;
    let mut picked = BTreeSet::new();
    let mut attempts = 0;
    while picked.len() < count {
        if attempts == max_attempts {
            bail!(
                "Gave up after {} draws with only {} distinct numbers",
                attempts,
                picked.len()
            );
        }
        attempts += 1;
        let r = source.next_unit()? * table.total();
        let number = (table.index_for(r) + 1) as u8;
        if picked.insert(number) {
            log::debug!("picked {} (r = {:.4})", number, r);
        }
    }

    Ok(picked.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::entropy::PseudoRandom;
    use lotto645_db::models::{BUNDLED_FREQUENCIES, POOL_SIZE};

    /// Replays a fixed list of values, then fails.
    struct Scripted {
        values: Vec<f64>,
        next: usize,
    }

    impl Scripted {
        fn new(values: &[f64]) -> Self {
            Self { values: values.to_vec(), next: 0 }
        }
    }

    impl RandomSource for Scripted {
        fn next_unit(&mut self) -> Result<f64> {
            let Some(&v) = self.values.get(self.next) else {
                bail!("script exhausted");
            };
            self.next += 1;
            Ok(v)
        }
    }

    fn bundled_weights() -> Vec<f64> {
        BUNDLED_FREQUENCIES.iter().map(|&c| c as f64).collect()
    }

    #[test]
    fn test_index_for_is_strict() {
        let table = CumulativeTable::new(&[1.0, 1.0, 1.0, 1.0, 1.0]).unwrap();
        assert_eq!(table.index_for(0.0), 0);
        assert_eq!(table.index_for(0.25), 0);
        assert_eq!(table.index_for(1.0), 1);
        assert_eq!(table.index_for(2.75), 2);
        assert_eq!(table.index_for(4.999), 4);
    }

    #[test]
    fn test_index_for_at_total_skips_trailing_zeros() {
        let table = CumulativeTable::new(&[1.0, 3.0, 0.0, 0.0]).unwrap();
        assert_eq!(table.index_for(table.total()), 1);
    }

    #[test]
    fn test_worked_example() {
        // r = 0.05 * 5 = 0.25 -> cum [1,2,3,4,5] -> index 0 -> number 1
        // r = 0.55 * 5 = 2.75 -> index 2 -> number 3
        let mut source = Scripted::new(&[0.05, 0.55]);
        let picks = sample_unique(&[1.0; 5], 2, &mut source).unwrap();
        assert_eq!(picks, vec![1, 3]);
    }

    #[test]
    fn test_exact_boundary_goes_to_next_number() {
        // r = 0.5 * 4 = 2.0 equals cum[0], so the first strictly greater is cum[1].
        let mut source = Scripted::new(&[0.5, 0.0]);
        let picks = sample_unique(&[2.0, 2.0], 2, &mut source).unwrap();
        assert_eq!(picks, vec![1, 2]);
        assert_eq!(source.next, 2);
    }

    #[test]
    fn test_duplicates_are_discarded() {
        let mut source = Scripted::new(&[0.1, 0.1, 0.15, 0.9]);
        let picks = sample_unique(&[1.0; 5], 2, &mut source).unwrap();
        assert_eq!(picks, vec![1, 5]);
        assert_eq!(source.next, 4);
    }

    #[test]
    fn test_zero_weight_never_picked() {
        // cum [2,2,4]: r = 0.5 * 4 = 2.0 skips the zero-weight number 2.
        let mut source = Scripted::new(&[0.5, 0.0]);
        let picks = sample_unique(&[2.0, 0.0, 2.0], 2, &mut source).unwrap();
        assert_eq!(picks, vec![1, 3]);

        let mut weights = vec![1.0; POOL_SIZE];
        weights[9] = 0.0;
        weights[30] = 0.0;
        let mut rng = PseudoRandom::new(Some(1));
        for _ in 0..300 {
            let picks = sample_unique(&weights, 6, &mut rng).unwrap();
            assert!(!picks.contains(&10));
            assert!(!picks.contains(&31));
        }
    }

    #[test]
    fn test_all_zero_weights_fall_back_to_uniform() {
        let mut source = Scripted::new(&[0.0, 0.1, 0.3, 0.5, 0.7, 0.9]);
        let picks = sample_unique(&[0.0; POOL_SIZE], 6, &mut source).unwrap();
        assert_eq!(picks, vec![1, 5, 14, 23, 32, 41]);
    }

    #[test]
    fn test_all_zero_weights_terminate_with_pseudo() {
        let mut rng = PseudoRandom::new(Some(42));
        let picks = sample_unique(&[0.0; POOL_SIZE], 6, &mut rng).unwrap();
        assert_eq!(picks.len(), 6);
    }

    #[test]
    fn test_too_few_positive_weights_is_error() {
        let mut weights = vec![0.0; POOL_SIZE];
        for w in weights.iter_mut().take(5) {
            *w = 3.0;
        }
        let mut rng = PseudoRandom::new(Some(0));
        let err = sample_unique(&weights, 6, &mut rng).unwrap_err();
        assert!(err.to_string().contains("positive weight"));
    }

    #[test]
    fn test_weights_lost_to_rounding_are_unreachable() {
        let weights = [1e20, 1.0, 1.0, 1.0, 1.0, 1.0];
        let table = CumulativeTable::new(&weights).unwrap();
        assert_eq!(table.reachable(), 1);

        let mut rng = PseudoRandom::new(Some(5));
        let err = sample_unique(&weights, 6, &mut rng).unwrap_err();
        assert!(err.to_string().contains("positive weight"));
    }

    #[test]
    fn test_unhittable_interval_gives_up() {
        // Number 2 is reachable on paper but a source stuck at 0.0 never lands on it.
        struct Zero;
        impl RandomSource for Zero {
            fn next_unit(&mut self) -> Result<f64> {
                Ok(0.0)
            }
        }
        let err = sample_unique(&[1.0, 1.0], 2, &mut Zero).unwrap_err();
        assert!(err.to_string().contains("Gave up"));
    }

    #[test]
    fn test_infinite_weight_sum_rejected() {
        assert!(CumulativeTable::new(&[f64::MAX, f64::MAX]).is_err());
    }

    #[test]
    fn test_invalid_arguments() {
        let mut rng = PseudoRandom::new(Some(0));
        assert!(sample_unique(&[], 1, &mut rng).is_err());
        assert!(sample_unique(&[1.0; 5], 0, &mut rng).is_err());
        assert!(sample_unique(&[1.0; 5], 6, &mut rng).is_err());
        assert!(sample_unique(&[1.0, -1.0, 1.0], 1, &mut rng).is_err());
        assert!(sample_unique(&[1.0, f64::NAN, 1.0], 1, &mut rng).is_err());
    }

    #[test]
    fn test_six_distinct_sorted_in_range() {
        let weights = bundled_weights();
        for seed in 0..200 {
            let mut rng = PseudoRandom::new(Some(seed));
            let picks = sample_unique(&weights, 6, &mut rng).unwrap();
            assert_eq!(picks.len(), 6);
            assert!(picks.windows(2).all(|w| w[0] < w[1]), "{:?}", picks);
            assert!(picks.iter().all(|&n| (1..=45).contains(&n)));
        }
    }

    #[test]
    fn test_seed_determinism() {
        let weights = bundled_weights();
        let mut a = PseudoRandom::new(Some(20260101));
        let mut b = PseudoRandom::new(Some(20260101));
        for _ in 0..10 {
            assert_eq!(
                sample_unique(&weights, 6, &mut a).unwrap(),
                sample_unique(&weights, 6, &mut b).unwrap()
            );
        }
    }

    #[test]
    fn test_source_failure_propagates() {
        let mut source = Scripted::new(&[0.1]);
        let err = sample_unique(&[1.0; 5], 2, &mut source).unwrap_err();
        assert!(err.to_string().contains("exhausted"));
    }
}
