//! Series reconciliation
//!
//! Matches two snapshots by canonical key and classifies every series as
//! present on the left only, the right only, or on both sides.
//!
//! Deviation is `|right| - |left|`, signed. A matched pair is reported when
//! `deviation >= threshold`, so at a positive threshold only series whose
//! magnitude grew on the right side show up. A shrinking series is never
//! reported unless the threshold itself is negative.

use std::fmt;

use crate::diff::sample::SeriesMap;

/// Which side(s) a result belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LeftOnly,
    RightOnly,
    Both,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self {
            Self::LeftOnly => "<",
            Self::RightOnly => ">",
            Self::Both => "|",
        };
        f.write_str(marker)
    }
}

/// One classified series
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled {
    LeftOnly {
        key: String,
        value: f64,
    },
    RightOnly {
        key: String,
        value: f64,
    },
    /// Present on both sides with a deviation at or above the threshold
    Deviated {
        key: String,
        left: f64,
        right: f64,
        deviation: f64,
    },
}

impl Reconciled {
    pub fn key(&self) -> &str {
        match self {
            Self::LeftOnly { key, .. } | Self::RightOnly { key, .. } | Self::Deviated { key, .. } => {
                key
            }
        }
    }

    pub fn relation(&self) -> Relation {
        match self {
            Self::LeftOnly { .. } => Relation::LeftOnly,
            Self::RightOnly { .. } => Relation::RightOnly,
            Self::Deviated { .. } => Relation::Both,
        }
    }

    pub fn left_name(&self) -> Option<&str> {
        match self {
            Self::RightOnly { .. } => None,
            _ => Some(self.key()),
        }
    }

    pub fn right_name(&self) -> Option<&str> {
        match self {
            Self::LeftOnly { .. } => None,
            _ => Some(self.key()),
        }
    }

    /// Left value, NaN when the series is absent on the left
    pub fn left_value(&self) -> f64 {
        match self {
            Self::LeftOnly { value, .. } => *value,
            Self::Deviated { left, .. } => *left,
            Self::RightOnly { .. } => f64::NAN,
        }
    }

    /// Right value, NaN when the series is absent on the right
    pub fn right_value(&self) -> f64 {
        match self {
            Self::RightOnly { value, .. } => *value,
            Self::Deviated { right, .. } => *right,
            Self::LeftOnly { .. } => f64::NAN,
        }
    }

    /// Deviation, NaN for one-sided results
    pub fn deviation(&self) -> f64 {
        match self {
            Self::Deviated { deviation, .. } => *deviation,
            _ => f64::NAN,
        }
    }

    pub fn is_deviated(&self) -> bool {
        matches!(self, Self::Deviated { .. })
    }
}

/// `|right| - |left|`
pub fn deviation(left: f64, right: f64) -> f64 {
    right.abs() - left.abs()
}

/// Reconcile two snapshots
///
/// Neither map is modified. Unsupported samples count as absent on their
/// side. Results are ordered by canonical key.
pub fn reconcile(left: &SeriesMap, right: &SeriesMap, threshold: f64) -> Vec<Reconciled> {
    let mut results = Vec::new();

    for (key, left_value) in left {
        let Some(left_value) = left_value.as_f64() else {
            continue;
        };

        match right.get(key).and_then(|v| v.as_f64()) {
            None => results.push(Reconciled::LeftOnly {
                key: key.clone(),
                value: left_value,
            }),
            Some(right_value) => {
                let deviation = deviation(left_value, right_value);
                if deviation >= threshold {
                    results.push(Reconciled::Deviated {
                        key: key.clone(),
                        left: left_value,
                        right: right_value,
                        deviation,
                    });
                }
            }
        }
    }

    for (key, right_value) in right {
        let Some(right_value) = right_value.as_f64() else {
            continue;
        };
        let matched = left.get(key).and_then(|v| v.as_f64()).is_some();
        if !matched {
            results.push(Reconciled::RightOnly {
                key: key.clone(),
                value: right_value,
            });
        }
    }

    results.sort_by(|a, b| a.key().cmp(b.key()));
    results
}

/// Per-variant result counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub left_only: usize,
    pub right_only: usize,
    pub deviated: usize,
}

impl Summary {
    pub fn of(results: &[Reconciled]) -> Self {
        results.iter().fold(Self::default(), |mut acc, r| {
            match r.relation() {
                Relation::LeftOnly => acc.left_only += 1,
                Relation::RightOnly => acc.right_only += 1,
                Relation::Both => acc.deviated += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.left_only + self.right_only + self.deviated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::sample::SampleValue;
    use std::collections::HashSet;

    fn series(entries: &[(&str, f64)]) -> SeriesMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), SampleValue::Supported(*v)))
            .collect()
    }

    #[test]
    fn test_equal_values_at_zero_threshold() {
        let left = series(&[("up", 10.0)]);
        let right = series(&[("up", 10.0)]);

        let results = reconcile(&left, &right, 0.0);

        assert_eq!(
            results,
            vec![Reconciled::Deviated {
                key: "up".to_string(),
                left: 10.0,
                right: 10.0,
                deviation: 0.0,
            }]
        );
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let left = series(&[("a", 10.0), ("b", 10.0)]);
        let right = series(&[("a", 10.5), ("b", 10.49)]);

        let results = reconcile(&left, &right, 0.5);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key(), "a");
        assert_eq!(results[0].deviation(), 0.5);
    }

    #[test]
    fn test_shrinking_series_excluded_at_positive_threshold() {
        let left = series(&[("queue_depth", 100.0)]);
        let right = series(&[("queue_depth", 1.0)]);

        assert!(reconcile(&left, &right, 1.0).is_empty());
        // Still visible with a negative threshold
        let results = reconcile(&left, &right, -1000.0);
        assert_eq!(results[0].deviation(), -99.0);
    }

    #[test]
    fn test_deviation_uses_magnitudes() {
        assert_eq!(deviation(-5.0, 3.0), -2.0);
        assert_eq!(deviation(2.0, -7.0), 5.0);
    }

    #[test]
    fn test_one_sided_ignore_threshold() {
        let left = series(&[("only_left", 1.0)]);
        let right = series(&[("only_right", 2.0)]);

        let results = reconcile(&left, &right, 1_000_000.0);

        assert_eq!(
            results,
            vec![
                Reconciled::LeftOnly {
                    key: "only_left".to_string(),
                    value: 1.0,
                },
                Reconciled::RightOnly {
                    key: "only_right".to_string(),
                    value: 2.0,
                },
            ]
        );
        assert!(results[0].right_value().is_nan());
        assert!(results[0].deviation().is_nan());
        assert!(results[1].left_value().is_nan());
    }

    #[test]
    fn test_inputs_not_modified() {
        let left = series(&[("a", 1.0), ("b", 2.0)]);
        let right = series(&[("a", 1.0), ("c", 3.0)]);
        let right_before = right.clone();

        reconcile(&left, &right, 0.0);

        assert_eq!(right, right_before);
    }

    #[test]
    fn test_every_key_accounted_once() {
        let left = series(&[("a", 1.0), ("b", 2.0), ("c", 3.0)]);
        let right = series(&[("b", 5.0), ("c", 3.0), ("d", 4.0)]);

        let results = reconcile(&left, &right, 0.0);
        let keys: Vec<&str> = results.iter().map(|r| r.key()).collect();
        let unique: HashSet<&str> = keys.iter().copied().collect();

        assert_eq!(keys, vec!["a", "b", "c", "d"]);
        assert_eq!(unique.len(), keys.len());
        assert_eq!(results[0].relation(), Relation::LeftOnly);
        assert_eq!(results[1].relation(), Relation::Both);
        assert_eq!(results[2].relation(), Relation::Both);
        assert_eq!(results[3].relation(), Relation::RightOnly);
    }

    #[test]
    fn test_matched_below_threshold_dropped_not_one_sided() {
        let left = series(&[("a", 5.0)]);
        let right = series(&[("a", 5.0)]);

        assert!(reconcile(&left, &right, 1.0).is_empty());
    }

    #[test]
    fn test_unsupported_counts_as_absent() {
        let mut left = series(&[("latency", 0.0)]);
        left.insert("latency".to_string(), SampleValue::Unsupported);
        left.insert("both_unsupported".to_string(), SampleValue::Unsupported);
        let mut right = series(&[("latency", 3.0)]);
        right.insert("both_unsupported".to_string(), SampleValue::Unsupported);

        let results = reconcile(&left, &right, 0.0);

        assert_eq!(
            results,
            vec![Reconciled::RightOnly {
                key: "latency".to_string(),
                value: 3.0,
            }]
        );
    }

    #[test]
    fn test_end_to_end_scenario() {
        let left = series(&[("up", 1.0), ("cpu_seconds", 5.0)]);
        let right = series(&[("up", 1.0), ("cpu_seconds", 9.0), ("mem_bytes", 1024.0)]);

        let results = reconcile(&left, &right, 3.0);

        assert_eq!(
            results,
            vec![
                Reconciled::Deviated {
                    key: "cpu_seconds".to_string(),
                    left: 5.0,
                    right: 9.0,
                    deviation: 4.0,
                },
                Reconciled::RightOnly {
                    key: "mem_bytes".to_string(),
                    value: 1024.0,
                },
            ]
        );
        assert_eq!(
            Summary::of(&results),
            Summary {
                left_only: 0,
                right_only: 1,
                deviated: 1,
            }
        );
    }

    #[test]
    fn test_relation_markers() {
        assert_eq!(Relation::LeftOnly.to_string(), "<");
        assert_eq!(Relation::RightOnly.to_string(), ">");
        assert_eq!(Relation::Both.to_string(), "|");
    }
}
