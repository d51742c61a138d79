//! Ordered threshold tables
//!
//! Colour bands, surface tiers and difficulty steps are all fixed ordered
//! arrays of `(threshold, value)` pairs consulted by linear scan. Construction
//! rejects tables whose thresholds are not strictly monotonic.

use std::time::Duration;

use crate::error::ConfigError;

/// Bands ordered by strictly decreasing threshold.
///
/// A value belongs to the first band whose threshold it strictly exceeds, and
/// to `floor` when it exceeds none, so the bands partition the whole line.
#[derive(Debug, Clone, PartialEq)]
pub struct BandTable<T> {
    bands: Vec<(f32, T)>,
    floor: T,
}

impl<T: Copy> BandTable<T> {
    pub fn new(
        table: &'static str,
        bands: Vec<(f32, T)>,
        floor: T,
    ) -> Result<Self, ConfigError> {
        for (index, pair) in bands.windows(2).enumerate() {
            if pair[1].0.partial_cmp(&pair[0].0) != Some(std::cmp::Ordering::Less) {
                return Err(ConfigError::NonMonotonic {
                    table,
                    index: index + 1,
                });
            }
        }
        if let Some(index) = bands.iter().position(|(t, _)| !t.is_finite()) {
            return Err(ConfigError::NonMonotonic { table, index });
        }
        Ok(Self { bands, floor })
    }

    /// Classify `value`; NaN falls through to the floor band
    pub fn classify(&self, value: f32) -> T {
        self.bands
            .iter()
            .find(|(threshold, _)| value > *threshold)
            .map(|(_, band)| *band)
            .unwrap_or(self.floor)
    }

    /// Number of bands including the floor
    pub fn band_count(&self) -> usize {
        self.bands.len() + 1
    }

    pub fn thresholds(&self) -> impl Iterator<Item = f32> + '_ {
        self.bands.iter().map(|(t, _)| *t)
    }
}

/// Step function from distance to spawn interval.
///
/// Thresholds are inclusive lower bounds in strictly increasing order, the
/// first one is 0, and intervals never grow. Lookups are floored at `min`.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalTable {
    steps: Vec<(u64, Duration)>,
    min: Duration,
}

impl IntervalTable {
    pub fn new(
        table: &'static str,
        steps: Vec<(u64, Duration)>,
        min: Duration,
    ) -> Result<Self, ConfigError> {
        let Some(&(first, _)) = steps.first() else {
            return Err(ConfigError::EmptyTable { table });
        };
        if first != 0 {
            return Err(ConfigError::MissingBase { table, first });
        }
        if min.is_zero() || steps.iter().any(|(_, interval)| interval.is_zero()) {
            return Err(ConfigError::NonPositive { field: table });
        }
        for (index, pair) in steps.windows(2).enumerate() {
            let (prev_distance, prev_interval) = pair[0];
            let (distance, interval) = pair[1];
            if distance <= prev_distance || interval > prev_interval {
                return Err(ConfigError::NonMonotonic {
                    table,
                    index: index + 1,
                });
            }
        }
        Ok(Self { steps, min })
    }

    /// Interval in effect at `distance`
    pub fn interval_at(&self, distance: u64) -> Duration {
        let mut current = self.steps[0].1;
        for &(threshold, interval) in &self.steps {
            if distance < threshold {
                break;
            }
            current = interval;
        }
        current.max(self.min)
    }

    /// Interval at the start of a run
    pub fn base(&self) -> Duration {
        self.interval_at(0)
    }

    pub fn min(&self) -> Duration {
        self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn difficulty() -> IntervalTable {
        IntervalTable::new(
            "asteroid interval",
            vec![
                (0, ms(3000)),
                (800, ms(2500)),
                (1500, ms(2000)),
                (2200, ms(1200)),
                (2800, ms(800)),
                (3300, ms(600)),
                (3700, ms(450)),
                (4000, ms(300)),
                (4200, ms(250)),
            ],
            ms(250),
        )
        .unwrap()
    }

    #[test]
    fn test_band_lookup_first_match_wins() {
        let table = BandTable::new("tiers", vec![(0.04, 'h'), (0.02, 'm')], 'l').unwrap();
        assert_eq!(table.classify(0.05), 'h');
        assert_eq!(table.classify(0.04), 'm'); // strictly greater only
        assert_eq!(table.classify(0.03), 'm');
        assert_eq!(table.classify(0.0), 'l');
        assert_eq!(table.classify(f32::NAN), 'l');
        assert_eq!(table.band_count(), 3);
    }

    #[test]
    fn test_band_rejects_unordered() {
        let err = BandTable::new("tiers", vec![(0.02, 'm'), (0.04, 'h')], 'l').unwrap_err();
        assert!(matches!(err, ConfigError::NonMonotonic { index: 1, .. }));

        let dup = BandTable::new("tiers", vec![(0.02, 'm'), (0.02, 'h')], 'l');
        assert!(dup.is_err());
    }

    #[test]
    fn test_interval_breakpoints() {
        let table = difficulty();
        assert_eq!(table.interval_at(0), ms(3000));
        assert_eq!(table.interval_at(799), ms(3000));
        assert_eq!(table.interval_at(800), ms(2500));
        assert_eq!(table.interval_at(4000), ms(300));
        assert_eq!(table.interval_at(4199), ms(300));
        assert_eq!(table.interval_at(4200), ms(250));
        assert_eq!(table.interval_at(u64::MAX), ms(250));
    }

    #[test]
    fn test_interval_floor() {
        let table =
            IntervalTable::new("floored", vec![(0, ms(500)), (10, ms(100))], ms(200)).unwrap();
        assert_eq!(table.interval_at(50), ms(200));
        assert_eq!(table.base(), ms(500));
    }

    #[test]
    fn test_interval_rejects_malformed() {
        assert!(matches!(
            IntervalTable::new("t", vec![], ms(1)),
            Err(ConfigError::EmptyTable { .. })
        ));
        assert!(matches!(
            IntervalTable::new("t", vec![(5, ms(10))], ms(1)),
            Err(ConfigError::MissingBase { first: 5, .. })
        ));
        assert!(matches!(
            IntervalTable::new("t", vec![(0, ms(10)), (0, ms(5))], ms(1)),
            Err(ConfigError::NonMonotonic { index: 1, .. })
        ));
        assert!(matches!(
            IntervalTable::new("t", vec![(0, ms(10)), (5, ms(20))], ms(1)),
            Err(ConfigError::NonMonotonic { index: 1, .. })
        ));
        assert!(matches!(
            IntervalTable::new("t", vec![(0, ms(10))], Duration::ZERO),
            Err(ConfigError::NonPositive { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_interval_non_increasing(d1 in 0u64..10_000, d2 in 0u64..10_000) {
            let table = difficulty();
            let (lo, hi) = if d1 <= d2 { (d1, d2) } else { (d2, d1) };
            prop_assert!(table.interval_at(hi) <= table.interval_at(lo));
            prop_assert!(table.interval_at(hi) >= table.min());
        }
    }
}
