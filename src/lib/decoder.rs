//! Functionality directly related to decoding the sample of a read from its per-index barcodes.
//!
//! Each observed barcode is matched independently against the distinct reference barcodes at its
//! index and then passed through a fixed series of filters.  The matches that survive are
//! combined into a single sample:
//!
//! 1. if no index survives, the read is undetermined,
//! 2. the first surviving index whose barcode belongs to exactly one sample decides the sample,
//! 3. otherwise each surviving index votes for every sample carrying its barcode, and a single
//!    sample with the most votes wins.  A tie is undetermined.

use bstr::BStr;
use itertools::Itertools;
use log::{info, trace};

use crate::{
    dictionary::{BarcodeDictionary, SampleRecord},
    matcher::{BarcodeMatch, Matcher},
    metrics::{DecoderMetrics, DiscardReason},
    opts::{DecoderOpts, DistancePolicy, OptsError},
};

/// Helper struct to hold onto the per-index filter parameters used by the [`BarcodeDecoder`].
#[derive(Debug, Clone)]
pub struct DecodeFilterConfig {
    /// The maximum mismatches allowed at each index.
    pub max_mismatches: Vec<usize>,
    /// The minimum difference in mismatches between the best and second best barcode at each
    /// index.
    pub min_delta: Vec<usize>,
    /// Max no-calls (N's) in a matched barcode.
    ///
    /// A barcode with total N's greater than `max_no_calls` is discarded.
    pub max_no_calls: Option<usize>,
    pub distance_policy: DistancePolicy,
}

/// Decodes the sample for the barcodes of a read.
///
/// A decoder is used from one thread at a time.  Create one decoder per thread from a shared
/// [`BarcodeDictionary`] and combine their metrics with [`DecoderMetrics::update_with`].
pub struct BarcodeDecoder<'a> {
    dictionary: &'a BarcodeDictionary,
    filter_config: DecodeFilterConfig,
    /// One matcher per index.
    matchers: Vec<Box<dyn Matcher<'a> + 'a>>,
    metrics: DecoderMetrics,
}

impl<'a> BarcodeDecoder<'a> {
    /// Create a new [`BarcodeDecoder`].
    ///
    /// # Errors
    ///
    /// - any [`OptsError`] from validating `opts` against the number of indices in the dictionary
    pub fn new(dictionary: &'a BarcodeDictionary, opts: &DecoderOpts) -> Result<Self, OptsError> {
        let filter_config = opts.as_filter_config(dictionary.num_indices())?;
        let matchers = (0..dictionary.num_indices())
            .map(|index| {
                opts.matcher.build(
                    index,
                    dictionary.distinct_barcodes(index),
                    opts.n_as_mismatch,
                    opts.cache_size,
                )
            })
            .collect();
        info!(
            "Decoding {} samples over {} indices with the {} matcher and {} distance policy",
            dictionary.num_samples(),
            dictionary.num_indices(),
            opts.matcher,
            opts.distance_policy
        );
        Ok(Self { dictionary, filter_config, matchers, metrics: DecoderMetrics::new(dictionary) })
    }

    pub fn dictionary(&self) -> &'a BarcodeDictionary {
        self.dictionary
    }

    /// The metrics collected so far.
    pub fn metrics(&self) -> &DecoderMetrics {
        &self.metrics
    }

    pub fn into_metrics(self) -> DecoderMetrics {
        self.metrics
    }

    /// Decodes the combined barcode of the sample for the barcodes of a read, or
    /// [`BarcodeDictionary::unknown_barcode`] if no sample could be determined.
    ///
    /// # Panics
    ///
    /// - if there is not one barcode per index
    pub fn decode<B: AsRef<[u8]>>(&mut self, barcodes: &[B]) -> &'a BStr {
        match self.decode_ordinal(barcodes) {
            Some(ordinal) => self.dictionary.combined_barcode(ordinal),
            None => self.dictionary.unknown_barcode(),
        }
    }

    /// Decodes the sample for the barcodes of a read, or
    /// [`BarcodeDictionary::unknown_sample`] if no sample could be determined.
    ///
    /// # Panics
    ///
    /// - if there is not one barcode per index
    pub fn decode_sample<B: AsRef<[u8]>>(&mut self, barcodes: &[B]) -> &'a SampleRecord {
        match self.decode_ordinal(barcodes) {
            Some(ordinal) => self.dictionary.sample(ordinal),
            None => self.dictionary.unknown_sample(),
        }
    }

    /// Decodes the ordinal of the sample for the barcodes of a read, `None` if undetermined.
    ///
    /// # Panics
    ///
    /// - if there is not one barcode per index
    pub fn decode_ordinal<B: AsRef<[u8]>>(&mut self, barcodes: &[B]) -> Option<usize> {
        assert_eq!(
            barcodes.len(),
            self.dictionary.num_indices(),
            "Expected one barcode per index ({}), found {}",
            self.dictionary.num_indices(),
            barcodes.len()
        );

        let mut accepted = Vec::with_capacity(barcodes.len());
        for (index, observed) in barcodes.iter().enumerate() {
            let barcode_match = self.matchers[index].find(observed.as_ref());
            match self.apply_filters(&barcode_match) {
                Some(reason) => self.metrics.record_discard(reason),
                None => accepted.push(barcode_match),
            }
        }

        let decision = self.assign(&accepted);
        self.metrics.record_assignment(decision);
        trace!(
            "Accepted {} of {} indices, assigned to {:?}",
            accepted.len(),
            barcodes.len(),
            decision
        );
        decision
    }

    /// Apply the per-index filters to a match, in order.
    ///
    /// If `Some(DiscardReason)` is returned, the match should not be used to assign the read.
    ///
    /// This will record the match in the barcode stats.
    fn apply_filters(&mut self, barcode_match: &BarcodeMatch) -> Option<DiscardReason> {
        let (index, ordinal, mismatches, num_no_calls) = match *barcode_match {
            BarcodeMatch::Matched { index, ordinal, mismatches, num_no_calls, .. } => {
                (index, ordinal, mismatches, num_no_calls)
            }
            BarcodeMatch::Unmatched { .. } => return Some(DiscardReason::NoMatch),
        };

        self.metrics.record_match(index, ordinal, mismatches, num_no_calls);

        let config = &self.filter_config;
        if config.max_no_calls.map_or(false, |max_no_calls| num_no_calls > max_no_calls) {
            Some(DiscardReason::TooManyNoCalls)
        } else if mismatches > config.max_mismatches[index] {
            Some(DiscardReason::TooManyMismatches)
        } else if !config.distance_policy.accepts(barcode_match, config.min_delta[index]) {
            Some(DiscardReason::TooCloseToSecondBest)
        } else {
            None
        }
    }

    /// The samples carrying the barcode of an accepted match.
    fn samples_for(&self, barcode_match: &BarcodeMatch) -> &'a [usize] {
        let (index, barcode) = match barcode_match {
            BarcodeMatch::Matched { index, barcode, .. } => (*index, *barcode),
            BarcodeMatch::Unmatched { index, .. } => {
                panic!("Bug: an unmatched barcode was accepted at index {}", index)
            }
        };
        let samples = self.dictionary.samples_with_barcode(index, barcode);
        assert!(
            !samples.is_empty(),
            "Bug: matched barcode {} at index {} is not in the dictionary",
            barcode,
            index
        );
        samples
    }

    /// Assign a sample from the accepted matches.
    fn assign(&self, accepted: &[BarcodeMatch]) -> Option<usize> {
        if accepted.is_empty() {
            return None;
        }

        // A barcode that belongs to a single sample decides the sample
        if let Some(samples) =
            accepted.iter().map(|m| self.samples_for(m)).find(|samples| samples.len() == 1)
        {
            return Some(samples[0]);
        }

        let mut votes = vec![0_usize; self.dictionary.num_samples()];
        for barcode_match in accepted {
            for &ordinal in self.samples_for(barcode_match) {
                votes[ordinal] += 1;
            }
        }
        let most = votes.iter().copied().max().unwrap_or(0);
        if most == 0 {
            return None;
        }
        votes.iter().positions(|&v| v == most).exactly_one().ok()
    }
}

#[cfg(test)]
mod test {
    use bstr::B;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::dictionary::UNKNOWN_BARCODE;
    use crate::matcher::MatcherKind;
    use crate::utils::test_commons::{
        create_dictionary, create_opts, create_preset_dual_index_dictionary, init_logging,
    };

    fn three_sample_dictionary() -> BarcodeDictionary {
        create_dictionary(&[("s1", &["ACGT"]), ("s2", &["TGCA"]), ("s3", &["AGGC"])])
    }

    fn opts(matcher: MatcherKind) -> DecoderOpts {
        DecoderOpts { matcher, ..create_opts(1, 1, Some(0)) }
    }

    #[rstest]
    #[case("ACGT", "ACGT")]
    #[case("ACGA", "ACGT")]
    #[case("TGCA", "TGCA")]
    #[case("AGGT", UNKNOWN_BARCODE)]
    #[case("ANGT", UNKNOWN_BARCODE)]
    #[case("GGGG", UNKNOWN_BARCODE)]
    fn test_decode_single_index(
        #[case] observed: &str,
        #[case] expected: &str,
        #[values(MatcherKind::HammingDistance, MatcherKind::CachedHammingDistance)]
        matcher: MatcherKind,
    ) {
        init_logging();
        let dict = three_sample_dictionary();
        let mut decoder = BarcodeDecoder::new(&dict, &opts(matcher)).unwrap();
        assert_eq!(decoder.decode(&[observed]), B(expected));
    }

    #[rstest]
    fn test_decode_end_to_end(
        #[values(MatcherKind::HammingDistance, MatcherKind::CachedHammingDistance)]
        matcher: MatcherKind,
    ) {
        let dict = three_sample_dictionary();
        let mut decoder = BarcodeDecoder::new(&dict, &opts(matcher)).unwrap();
        assert_eq!(decoder.decode(&["ACGT"]), B("ACGT"));
        assert_eq!(decoder.decode(&["ACGA"]), B("ACGT"));
        assert_eq!(decoder.decode(&["AGGT"]), B(UNKNOWN_BARCODE));

        let metrics = decoder.metrics();
        assert_eq!(metrics.per_sample_counts(), &[2, 0, 0, 1]);
        assert_eq!(metrics.discarded(DiscardReason::TooCloseToSecondBest), 1);
        let acgt = dict.barcode_ordinal(0, b"ACGT").unwrap();
        assert_eq!(metrics.barcode_stats(0, acgt).matched(), 3);
        assert_eq!(metrics.barcode_stats(0, acgt).mismatch_histogram(), &[1, 2, 0, 0, 0]);

        // Without the third sample the second best is far enough away
        let dict = create_dictionary(&[("s1", &["ACGT"]), ("s2", &["TGCA"])]);
        let mut decoder = BarcodeDecoder::new(&dict, &opts(matcher)).unwrap();
        assert_eq!(decoder.decode(&["AGGT"]), B("ACGT"));
    }

    #[test]
    fn test_decode_sample() {
        let dict = three_sample_dictionary();
        let mut decoder = BarcodeDecoder::new(&dict, &opts(MatcherKind::default())).unwrap();
        assert_eq!(decoder.decode_sample(&["TGCA"]).sample_id, "s2");
        assert_eq!(decoder.decode_sample(&["TGCA"]).ordinal, 1);
        assert_eq!(decoder.decode_sample(&["AGGT"]), dict.unknown_sample());
        assert_eq!(decoder.decode_ordinal(&["AGGC"]), Some(2));
        assert_eq!(decoder.decode_ordinal(&["AGGT"]), None);
        assert_eq!(decoder.metrics().total_reads(), 5);
    }

    #[rstest]
    fn test_unique_exact_match_wins_regardless_of_other_index(
        #[values(MatcherKind::HammingDistance, MatcherKind::CachedHammingDistance)]
        matcher: MatcherKind,
    ) {
        let dict = create_preset_dual_index_dictionary();
        let opts = DecoderOpts { matcher, ..create_opts(0, 1, Some(0)) };
        let mut decoder = BarcodeDecoder::new(&dict, &opts).unwrap();

        // The second index matches Sample3 exactly, but the first index is checked first
        assert_eq!(decoder.decode(&["AAAAAAAA", "TTTTTTTT"]), B("AAAAAAAA+CCCCCCCC"));
        // The second index is discarded
        assert_eq!(decoder.decode(&["AAAAAAAA", "ACGTACGT"]), B("AAAAAAAA+CCCCCCCC"));

        let metrics = decoder.metrics();
        assert_eq!(metrics.sample_count(0), 2);
        assert_eq!(metrics.discarded(DiscardReason::TooManyMismatches), 1);
        // Stats are recorded before the match is discarded
        assert_eq!(metrics.barcode_stats(1, 2).matched(), 1);
        assert_eq!(metrics.barcode_stats(1, 0).matched(), 1);
        assert_eq!(metrics.barcode_stats(1, 0).mismatch_histogram()[6], 1);
    }

    #[test]
    fn test_too_many_mismatches_at_every_index() {
        let dict = create_preset_dual_index_dictionary();
        let mut decoder = BarcodeDecoder::new(&dict, &create_opts(0, 1, Some(0))).unwrap();
        assert_eq!(decoder.decode(&["AAAAAAAC", "CCCCCCCA"]), B(UNKNOWN_BARCODE));

        let metrics = decoder.metrics();
        assert_eq!(metrics.discarded(DiscardReason::TooManyMismatches), 2);
        assert_eq!(metrics.unknown_count(), 1);
        assert_eq!(metrics.total_reads(), 1);
    }

    #[test]
    fn test_no_match_at_every_index() {
        let dict = create_dictionary(&[("X", &["AAAA", "CCCC"]), ("Y", &["CCCC", "AAAA"])]);
        let mut decoder = BarcodeDecoder::new(&dict, &create_opts(1, 1, None)).unwrap();
        assert_eq!(decoder.decode(&["GGGG", "TTTT"]), B(UNKNOWN_BARCODE));
        assert_eq!(decoder.metrics().discarded(DiscardReason::NoMatch), 2);
        assert!(decoder.metrics().index_stats(0).iter().all(|s| s.matched() == 0));
    }

    #[test]
    fn test_majority_vote() {
        let dict = create_dictionary(&[
            ("X", &["AAAA", "CCCC"]),
            ("Y", &["AAAA", "GGGG"]),
            ("Z", &["TTTT", "CCCC"]),
        ]);
        let mut decoder = BarcodeDecoder::new(&dict, &create_opts(0, 1, Some(0))).unwrap();
        assert_eq!(decoder.decode_sample(&["AAAA", "CCCC"]).sample_id, "X");

        // Removing Z's vote for CCCC makes CCCC unique to X
        let dict = create_dictionary(&[
            ("X", &["AAAA", "CCCC"]),
            ("Y", &["AAAA", "GGGG"]),
            ("Z", &["TTTT", "TTTT"]),
        ]);
        let mut decoder = BarcodeDecoder::new(&dict, &create_opts(0, 1, Some(0))).unwrap();
        assert_eq!(decoder.decode_sample(&["AAAA", "CCCC"]).sample_id, "X");
    }

    #[test]
    fn test_unique_barcode_at_later_index() {
        let dict = create_dictionary(&[("X", &["AAAA", "CCCC"]), ("Y", &["AAAA", "GGGG"])]);
        let mut decoder = BarcodeDecoder::new(&dict, &create_opts(0, 1, Some(0))).unwrap();
        assert_eq!(decoder.decode_sample(&["AAAA", "GGGG"]).sample_id, "Y");
        assert_eq!(decoder.decode_sample(&["AAAA", "CCCC"]).sample_id, "X");
    }

    #[test]
    fn test_vote_tie_is_undetermined() {
        let dict = create_dictionary(&[("X", &["AAAA", "CCCC"]), ("Y", &["AAAA", "GGGG"])]);
        let mut decoder = BarcodeDecoder::new(&dict, &create_opts(0, 1, Some(0))).unwrap();
        assert_eq!(decoder.decode(&["AAAA", "TTTT"]), B(UNKNOWN_BARCODE));

        let metrics = decoder.metrics();
        assert_eq!(metrics.per_sample_counts(), &[0, 0, 1]);
        assert_eq!(metrics.discarded(DiscardReason::NoMatch), 1);
    }

    #[rstest]
    #[case("ACGT", "ACGT")]
    #[case("ACGA", "ACGT")]
    #[case("AGGT", UNKNOWN_BARCODE)]
    fn test_trailing_bases_are_ignored(
        #[case] observed: &str,
        #[case] expected: &str,
        #[values("", "T", "GATTACA")] suffix: &str,
    ) {
        let dict = three_sample_dictionary();
        let mut with_suffix = BarcodeDecoder::new(&dict, &opts(MatcherKind::default())).unwrap();
        let mut without = BarcodeDecoder::new(&dict, &opts(MatcherKind::default())).unwrap();
        let observed_with_suffix = format!("{}{}", observed, suffix);
        assert_eq!(with_suffix.decode(&[observed_with_suffix]), B(expected));
        assert_eq!(without.decode(&[observed]), B(expected));
        assert_eq!(with_suffix.metrics(), without.metrics());
    }

    #[rstest]
    #[case(false, "ACGT")]
    #[case(true, UNKNOWN_BARCODE)]
    fn test_no_calls_as_mismatches(#[case] n_as_mismatch: bool, #[case] expected: &str) {
        let dict = create_dictionary(&[("s1", &["ACGT"]), ("s2", &["TGCA"])]);
        let opts = DecoderOpts { n_as_mismatch, ..create_opts(0, 1, None) };
        let mut decoder = BarcodeDecoder::new(&dict, &opts).unwrap();
        assert_eq!(decoder.decode(&["ANGT"]), B(expected));
        if n_as_mismatch {
            assert_eq!(decoder.metrics().discarded(DiscardReason::TooManyMismatches), 1);
        }
        assert!((decoder.metrics().barcode_stats(0, 0).mean_no_calls() - 1.0).abs() < 1e-9);
    }

    #[rstest]
    #[case(None, "ACGT")]
    #[case(Some(2), "ACGT")]
    #[case(Some(1), UNKNOWN_BARCODE)]
    #[case(Some(0), UNKNOWN_BARCODE)]
    fn test_max_no_calls(#[case] max_no_calls: Option<usize>, #[case] expected: &str) {
        let dict = create_dictionary(&[("s1", &["ACGT"]), ("s2", &["TGCA"])]);
        let mut decoder = BarcodeDecoder::new(&dict, &create_opts(1, 1, max_no_calls)).unwrap();
        assert_eq!(decoder.decode(&["ANNT"]), B(expected));
        let discarded = decoder.metrics().discarded(DiscardReason::TooManyNoCalls);
        assert_eq!(discarded, usize::from(expected == UNKNOWN_BARCODE));
        assert_eq!(decoder.metrics().barcode_stats(0, 0).matched(), 1);
    }

    #[test]
    fn test_no_calls_are_checked_before_mismatches() {
        let dict = create_dictionary(&[("s1", &["ACGTACGT"]), ("s2", &["TGCATGCA"])]);
        let opts = DecoderOpts { n_as_mismatch: true, ..create_opts(0, 1, Some(0)) };
        let mut decoder = BarcodeDecoder::new(&dict, &opts).unwrap();
        assert_eq!(decoder.decode(&["ACNNACGT"]), B(UNKNOWN_BARCODE));
        assert_eq!(decoder.metrics().discarded(DiscardReason::TooManyNoCalls), 1);
        assert_eq!(decoder.metrics().discarded(DiscardReason::TooManyMismatches), 0);
    }

    #[rstest]
    // an exact match one mismatch from the second best
    #[case(DistancePolicy::ExactMatchBypass, 2, "ACGT", "ACGT")]
    #[case(DistancePolicy::Strict, 2, "ACGT", UNKNOWN_BARCODE)]
    #[case(DistancePolicy::Strict, 1, "ACGT", "ACGT")]
    // a tie is accepted with a zero minimum delta, and the first barcode wins
    #[case(DistancePolicy::ExactMatchBypass, 0, "ACGC", "ACGT")]
    #[case(DistancePolicy::Strict, 0, "ACGC", "ACGT")]
    #[case(DistancePolicy::Strict, 1, "ACGC", UNKNOWN_BARCODE)]
    fn test_distance_policy(
        #[case] distance_policy: DistancePolicy,
        #[case] min_delta: usize,
        #[case] observed: &str,
        #[case] expected: &str,
    ) {
        let dict = create_dictionary(&[("s1", &["ACGT"]), ("s2", &["ACGA"])]);
        let opts = DecoderOpts { distance_policy, ..create_opts(1, min_delta, None) };
        let mut decoder = BarcodeDecoder::new(&dict, &opts).unwrap();
        assert_eq!(decoder.decode(&[observed]), B(expected));
    }

    #[test]
    fn test_per_index_thresholds() {
        let dict = create_preset_dual_index_dictionary();
        let opts = DecoderOpts { max_mismatches: vec![0, 2], ..create_opts(0, 1, None) };
        let mut decoder = BarcodeDecoder::new(&dict, &opts).unwrap();
        // two mismatches are allowed at the second index only
        assert_eq!(decoder.decode(&["AAAAAATT", "GGGGGGGG"]), B("CCCCCCCC+GGGGGGGG"));
        assert_eq!(decoder.decode(&["AAAAAATT", "GGGGGGAA"]), B("CCCCCCCC+GGGGGGGG"));
        assert_eq!(decoder.decode(&["CCCCCCTT", "GGGGGAAA"]), B(UNKNOWN_BARCODE));
    }

    #[test]
    fn test_decoding_is_deterministic() {
        let dict = create_preset_dual_index_dictionary();
        let reads = [
            ["AAAAAAAA", "CCCCCCCC"],
            ["AAAAAAAC", "CCCCCCCC"],
            ["AANAAAAA", "GGGGGGGG"],
            ["ACGTACGT", "ACGTACGT"],
            ["TTTTTTTT", "AAAAAAAT"],
        ];
        let results = MatcherKind::iter()
            .map(|matcher| {
                let opts = DecoderOpts { matcher, ..create_opts(1, 2, Some(1)) };
                let mut decoder = BarcodeDecoder::new(&dict, &opts).unwrap();
                let decoded = reads
                    .iter()
                    .chain(reads.iter())
                    .map(|read| decoder.decode(read).to_string())
                    .collect::<Vec<_>>();
                (decoded, decoder.into_metrics())
            })
            .collect::<Vec<_>>();
        let (decoded, metrics) = &results[0];
        assert_eq!(decoded[..reads.len()], decoded[reads.len()..]);
        for (other_decoded, other_metrics) in &results[1..] {
            assert_eq!(decoded, other_decoded);
            assert_eq!(metrics, other_metrics);
        }
    }

    #[test]
    fn test_decoding_does_not_modify_dictionary() {
        let dict = create_preset_dual_index_dictionary();
        let before = (0..dict.num_indices())
            .map(|index| (dict.barcodes(index).to_vec(), dict.distinct_barcodes(index).to_vec()))
            .collect::<Vec<_>>();
        {
            let mut decoder = BarcodeDecoder::new(&dict, &create_opts(1, 1, None)).unwrap();
            for read in [["AAAAAAAA", "CCCCCCCC"], ["ACGTACGT", "ACGTACGT"]] {
                let _ = decoder.decode(&read);
            }
        }
        let after = (0..dict.num_indices())
            .map(|index| (dict.barcodes(index).to_vec(), dict.distinct_barcodes(index).to_vec()))
            .collect::<Vec<_>>();
        assert_eq!(before, after);
        assert_eq!(dict.samples().len(), 4);
    }

    #[test]
    fn test_merge_metrics_from_decoders() {
        let dict = create_preset_dual_index_dictionary();
        let opts = create_opts(1, 1, None);
        let mut first = BarcodeDecoder::new(&dict, &opts).unwrap();
        let mut second = BarcodeDecoder::new(&dict, &opts).unwrap();
        let _ = first.decode(&["AAAAAAAA", "CCCCCCCC"]);
        let _ = second.decode(&["AAAAAAAA", "CCCCCCCC"]);
        let _ = second.decode(&["GGGGGGGG", "TTTTTTTT"]);

        let mut metrics = first.into_metrics();
        metrics.update_with(second.metrics());
        assert_eq!(metrics.per_sample_counts(), &[2, 0, 1, 0, 0]);
        assert_eq!(metrics.barcode_stats(0, 0).matched(), 2);
        assert_eq!(metrics.barcode_stats(1, 2).matched(), 1);
    }

    #[test]
    fn test_invalid_opts() {
        let dict = create_preset_dual_index_dictionary();
        let opts = DecoderOpts { max_mismatches: vec![1, 1, 1], ..create_opts(1, 1, None) };
        assert!(BarcodeDecoder::new(&dict, &opts).is_err());
    }

    #[test]
    #[should_panic(expected = "Expected one barcode per index (2), found 1")]
    fn test_decode_wrong_number_of_barcodes() {
        let dict = create_preset_dual_index_dictionary();
        let mut decoder = BarcodeDecoder::new(&dict, &create_opts(1, 1, None)).unwrap();
        let _ = decoder.decode(&["AAAAAAAA"]);
    }
}
