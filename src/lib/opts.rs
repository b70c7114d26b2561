//! Configuration of the [`crate::decoder::BarcodeDecoder`].

use log::debug;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::decoder::DecodeFilterConfig;
use crate::matcher::{BarcodeMatch, MatcherKind, DEFAULT_CACHE_SIZE};

/// The error that may occur when validating [`DecoderOpts`].
#[derive(Error, Debug)]
pub enum OptsError {
    #[error("{name} must have 1 or {expected} values (one per index), found {actual}")]
    ThresholdCount { name: &'static str, actual: usize, expected: usize },

    #[error("cache_size must be greater than zero when using the {matcher} matcher")]
    ZeroCacheSize { matcher: MatcherKind },
}

/// How the distance between the best and second best barcode is used to accept a match.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum DistancePolicy {
    /// An exact match without no-calls is always accepted, otherwise the best barcode must be at
    /// least `min_delta` mismatches closer than the second best.
    ExactMatchBypass,
    /// The best barcode must always be at least `min_delta` mismatches closer than the second
    /// best.
    Strict,
}

impl Default for DistancePolicy {
    fn default() -> Self {
        Self::ExactMatchBypass
    }
}

impl DistancePolicy {
    /// True if the match is far enough from the second best barcode to be assigned.
    pub fn accepts(self, barcode_match: &BarcodeMatch, min_delta: usize) -> bool {
        let far_enough = barcode_match.delta() >= min_delta;
        let exact = barcode_match.mismatches() == 0 && barcode_match.num_no_calls() == 0;
        match self {
            Self::ExactMatchBypass => exact || far_enough,
            Self::Strict => far_enough,
        }
    }
}

/// Options for decoding sample barcodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderOpts {
    /// Maximum mismatches for a barcode to be considered a match.  Either one value used for
    /// every index or one value per index.
    pub max_mismatches: Vec<usize>,

    /// Minimum difference between the mismatches to the best and second best barcode for a
    /// barcode to be considered a match.  Either one value used for every index or one value per
    /// index.
    pub min_delta: Vec<usize>,

    /// Maximum no-calls in a matched barcode, unlimited when `None`.
    pub max_no_calls: Option<usize>,

    /// Count a no-call as a mismatch.
    pub n_as_mismatch: bool,

    pub distance_policy: DistancePolicy,

    /// The algorithm used to match observed barcodes.
    pub matcher: MatcherKind,

    /// The number of observed barcodes to cache per index when using a cached matcher.
    pub cache_size: usize,
}

impl Default for DecoderOpts {
    fn default() -> Self {
        Self {
            max_mismatches: vec![1],
            min_delta: vec![1],
            max_no_calls: None,
            n_as_mismatch: false,
            distance_policy: DistancePolicy::default(),
            matcher: MatcherKind::default(),
            cache_size: DEFAULT_CACHE_SIZE,
        }
    }
}

impl DecoderOpts {
    /// Broadcast a threshold with a single value to every index.
    fn per_index(
        name: &'static str,
        values: &[usize],
        num_indices: usize,
    ) -> Result<Vec<usize>, OptsError> {
        match values.len() {
            1 => Ok(vec![values[0]; num_indices]),
            n if n == num_indices => Ok(values.to_vec()),
            actual => Err(OptsError::ThresholdCount { name, actual, expected: num_indices }),
        }
    }

    /// Builds the filter configuration for decoding barcodes with `num_indices` indices.
    ///
    /// # Errors
    ///
    /// - [`OptsError::ThresholdCount`] if `max_mismatches` or `min_delta` do not have one value or
    ///   one value per index
    /// - [`OptsError::ZeroCacheSize`] if a cached matcher is used with a zero `cache_size`
    pub fn as_filter_config(&self, num_indices: usize) -> Result<DecodeFilterConfig, OptsError> {
        if self.matcher == MatcherKind::CachedHammingDistance && self.cache_size == 0 {
            return Err(OptsError::ZeroCacheSize { matcher: self.matcher });
        }
        let max_mismatches = Self::per_index("max_mismatches", &self.max_mismatches, num_indices)?;
        let min_delta = Self::per_index("min_delta", &self.min_delta, num_indices)?;
        debug!(
            "Per-index thresholds: max_mismatches={:?} min_delta={:?} max_no_calls={:?}",
            max_mismatches, min_delta, self.max_no_calls
        );
        Ok(DecodeFilterConfig {
            max_mismatches,
            min_delta,
            max_no_calls: self.max_no_calls,
            distance_policy: self.distance_policy,
        })
    }
}

#[cfg(test)]
mod test {
    use bstr::{ByteSlice, B};
    use matches::assert_matches;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_broadcast_single_value() {
        let opts =
            DecoderOpts { max_mismatches: vec![2], min_delta: vec![3], ..DecoderOpts::default() };
        let config = opts.as_filter_config(3).unwrap();
        assert_eq!(config.max_mismatches, vec![2, 2, 2]);
        assert_eq!(config.min_delta, vec![3, 3, 3]);
        assert_eq!(config.max_no_calls, None);
        assert_eq!(config.distance_policy, DistancePolicy::ExactMatchBypass);
    }

    #[test]
    fn test_one_value_per_index() {
        let opts = DecoderOpts {
            max_mismatches: vec![0, 1],
            min_delta: vec![2, 1],
            max_no_calls: Some(1),
            ..DecoderOpts::default()
        };
        let config = opts.as_filter_config(2).unwrap();
        assert_eq!(config.max_mismatches, vec![0, 1]);
        assert_eq!(config.min_delta, vec![2, 1]);
        assert_eq!(config.max_no_calls, Some(1));
    }

    #[rstest]
    #[case(vec![0, 1], vec![1], "max_mismatches", 2)]
    #[case(vec![1], vec![1, 1], "min_delta", 2)]
    #[case(vec![], vec![1], "max_mismatches", 0)]
    fn test_wrong_threshold_count(
        #[case] max_mismatches: Vec<usize>,
        #[case] min_delta: Vec<usize>,
        #[case] expected_name: &str,
        #[case] expected_actual: usize,
    ) {
        let opts = DecoderOpts { max_mismatches, min_delta, ..DecoderOpts::default() };
        let result = opts.as_filter_config(3);
        assert_matches!(result, Err(OptsError::ThresholdCount { expected: 3, .. }));
        if let Err(OptsError::ThresholdCount { name, actual, .. }) = result {
            assert_eq!(name, expected_name);
            assert_eq!(actual, expected_actual);
        }
    }

    #[test]
    fn test_zero_cache_size() {
        let opts = DecoderOpts { cache_size: 0, ..DecoderOpts::default() };
        assert_matches!(opts.as_filter_config(1), Err(OptsError::ZeroCacheSize { .. }));

        let opts = DecoderOpts {
            cache_size: 0,
            matcher: MatcherKind::HammingDistance,
            ..DecoderOpts::default()
        };
        assert!(opts.as_filter_config(1).is_ok());
    }

    #[test]
    fn test_distance_policy_from_str() {
        assert_eq!("strict".parse::<DistancePolicy>().unwrap(), DistancePolicy::Strict);
        assert_eq!(
            "exact-match-bypass".parse::<DistancePolicy>().unwrap(),
            DistancePolicy::ExactMatchBypass
        );
        assert!("lenient".parse::<DistancePolicy>().is_err());
    }

    #[rstest]
    // exact matches
    #[case(DistancePolicy::ExactMatchBypass, 0, 1, 0, 2, true)]
    #[case(DistancePolicy::Strict, 0, 1, 0, 2, false)]
    // exact but with a no-call
    #[case(DistancePolicy::ExactMatchBypass, 0, 1, 1, 2, false)]
    // far enough
    #[case(DistancePolicy::ExactMatchBypass, 1, 3, 0, 2, true)]
    #[case(DistancePolicy::Strict, 1, 3, 0, 2, true)]
    // too close
    #[case(DistancePolicy::ExactMatchBypass, 1, 2, 0, 2, false)]
    #[case(DistancePolicy::Strict, 1, 2, 0, 2, false)]
    // a zero min delta accepts ties
    #[case(DistancePolicy::ExactMatchBypass, 1, 1, 0, 0, true)]
    #[case(DistancePolicy::Strict, 1, 1, 0, 0, true)]
    fn test_distance_policy_accepts(
        #[case] policy: DistancePolicy,
        #[case] mismatches: usize,
        #[case] second: usize,
        #[case] num_no_calls: usize,
        #[case] min_delta: usize,
        #[case] expected: bool,
    ) {
        let barcode_match = BarcodeMatch::Matched {
            index: 0,
            ordinal: 0,
            barcode: B("ACGT").as_bstr(),
            mismatches,
            mismatches_to_second_best: second,
            num_no_calls,
        };
        assert_eq!(policy.accepts(&barcode_match, min_delta), expected);
    }

    #[test]
    fn test_distance_policy_uses_absolute_delta() {
        let barcode_match = BarcodeMatch::Matched {
            index: 0,
            ordinal: 0,
            barcode: B("ACGT").as_bstr(),
            mismatches: 3,
            mismatches_to_second_best: 1,
            num_no_calls: 0,
        };
        assert_eq!(barcode_match.delta(), 2);
        assert!(DistancePolicy::Strict.accepts(&barcode_match, 2));
        assert!(!DistancePolicy::Strict.accepts(&barcode_match, 3));
    }
}
