//! Functionality pertaining to the collection of metrics during barcode decoding.
//!
//! A [`DecoderMetrics`] is owned by each [`crate::decoder::BarcodeDecoder`] and is pre-allocated
//! from the [`BarcodeDictionary`] so that samples and barcodes that never see a read are still
//! reported.  It tracks:
//!
//! - the number of reads assigned to each sample, with a trailing slot for reads that could not
//!   be assigned,
//! - for each index and each distinct reference barcode at that index, a [`BarcodeStats`] with the
//!   number of reads matching the barcode, a histogram of mismatches, and the mean number of
//!   no-calls,
//! - the number of per-index matches discarded for each [`DiscardReason`].
//!
//! Metrics from decoders running on separate threads may be combined with
//! [`DecoderMetrics::update_with`].  All metrics are writable to files.

use std::path::Path;

use anyhow::{Context, Result};
use fgoxide::io::DelimFile;
use log::debug;
use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter, IntoEnumIterator};

use crate::dictionary::BarcodeDictionary;

/// The reason a matched barcode at an index was not used when assigning a read to a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, EnumIter, EnumCount)]
#[strum(serialize_all = "snake_case")]
pub enum DiscardReason {
    /// No reference barcode matched.
    NoMatch,
    /// The observed barcode had too many no-calls.
    TooManyNoCalls,
    /// The best reference barcode had too many mismatches.
    TooManyMismatches,
    /// The second best reference barcode was too close to the best.
    TooCloseToSecondBest,
}

/// A mean that is updated one value at a time.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RunningMean {
    count: u64,
    mean: f64,
}

impl RunningMean {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.mean += (value - self.mean) / self.count as f64;
    }

    /// The number of values seen.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// The mean of the values seen, zero when no values have been seen.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Combine with the values seen by another [`RunningMean`].
    pub fn update_with(&mut self, other: &Self) {
        let count = self.count + other.count;
        if count > 0 {
            self.mean = (self.mean * self.count as f64 + other.mean * other.count as f64)
                / count as f64;
            self.count = count;
        }
    }
}

/// The statistics for one reference barcode at one index.
#[derive(Debug, Clone, PartialEq)]
pub struct BarcodeStats {
    /// The number of observed barcodes that matched this barcode, regardless of filtering.
    matched: usize,
    /// The number of matches with `i` mismatches at position `i`.
    mismatch_histogram: Vec<usize>,
    /// The mean number of no-calls in matching observed barcodes.
    mean_no_calls: RunningMean,
}

impl BarcodeStats {
    /// Create the stats for a barcode of the given length.
    pub fn new(barcode_length: usize) -> Self {
        Self {
            matched: 0,
            mismatch_histogram: vec![0; barcode_length + 1],
            mean_no_calls: RunningMean::default(),
        }
    }

    /// Record an observed barcode matching this barcode.
    pub fn record(&mut self, mismatches: usize, num_no_calls: usize) {
        self.matched += 1;
        if mismatches >= self.mismatch_histogram.len() {
            self.mismatch_histogram.resize(mismatches + 1, 0);
        }
        self.mismatch_histogram[mismatches] += 1;
        self.mean_no_calls.push(num_no_calls as f64);
    }

    pub fn matched(&self) -> usize {
        self.matched
    }

    pub fn mismatch_histogram(&self) -> &[usize] {
        &self.mismatch_histogram
    }

    pub fn perfect_matches(&self) -> usize {
        self.mismatch_histogram[0]
    }

    pub fn one_mismatch_matches(&self) -> usize {
        self.mismatch_histogram.get(1).copied().unwrap_or(0)
    }

    /// The mean number of mismatches over all matches, zero if there are none.
    pub fn mean_mismatches(&self) -> f64 {
        if self.matched == 0 {
            0.0
        } else {
            let total: usize =
                self.mismatch_histogram.iter().enumerate().map(|(mm, count)| mm * count).sum();
            total as f64 / self.matched as f64
        }
    }

    pub fn mean_no_calls(&self) -> f64 {
        self.mean_no_calls.mean()
    }

    /// Update this [`BarcodeStats`] with another [`BarcodeStats`].
    pub fn update_with(&mut self, other: &Self) {
        self.matched += other.matched;
        if other.mismatch_histogram.len() > self.mismatch_histogram.len() {
            self.mismatch_histogram.resize(other.mismatch_histogram.len(), 0);
        }
        for (s, o) in self.mismatch_histogram.iter_mut().zip(other.mismatch_histogram.iter()) {
            *s += o;
        }
        self.mean_no_calls.update_with(&other.mean_no_calls);
    }
}

/// The metrics collected by a [`crate::decoder::BarcodeDecoder`].
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderMetrics {
    /// The reads assigned to each sample, by ordinal, with the undetermined sample last.
    per_sample_counts: Vec<usize>,
    /// For each index, the stats for each distinct barcode, in the dictionary's order.
    per_index_barcode_stats: Vec<Vec<BarcodeStats>>,
    /// Discarded per-index matches, by [`DiscardReason`].
    discards: [usize; DiscardReason::COUNT],
}

impl DecoderMetrics {
    /// Create empty metrics for every sample and barcode in the dictionary.
    pub fn new(dictionary: &BarcodeDictionary) -> Self {
        let per_index_barcode_stats = (0..dictionary.num_indices())
            .map(|index| {
                dictionary
                    .distinct_barcodes(index)
                    .iter()
                    .map(|barcode| BarcodeStats::new(barcode.len()))
                    .collect()
            })
            .collect();
        Self {
            per_sample_counts: vec![0; dictionary.num_samples() + 1],
            per_index_barcode_stats,
            discards: [0; DiscardReason::COUNT],
        }
    }

    pub(crate) fn record_match(
        &mut self,
        index: usize,
        ordinal: usize,
        mismatches: usize,
        num_no_calls: usize,
    ) {
        self.per_index_barcode_stats[index][ordinal].record(mismatches, num_no_calls);
    }

    pub(crate) fn record_discard(&mut self, reason: DiscardReason) {
        self.discards[reason as usize] += 1;
    }

    /// Record a read assigned to the sample with the given ordinal, or to the undetermined sample
    /// when `None`.
    pub(crate) fn record_assignment(&mut self, ordinal: Option<usize>) {
        let undetermined = self.per_sample_counts.len() - 1;
        self.per_sample_counts[ordinal.unwrap_or(undetermined)] += 1;
    }

    /// The reads assigned to each sample by ordinal, with the undetermined sample last.
    pub fn per_sample_counts(&self) -> &[usize] {
        &self.per_sample_counts
    }

    /// The number of reads assigned to the sample with the given ordinal.
    pub fn sample_count(&self, ordinal: usize) -> usize {
        assert!(
            ordinal < self.per_sample_counts.len() - 1,
            "Sample ordinal {} is out of range",
            ordinal
        );
        self.per_sample_counts[ordinal]
    }

    /// The number of reads that could not be assigned to a sample.
    pub fn unknown_count(&self) -> usize {
        self.per_sample_counts[self.per_sample_counts.len() - 1]
    }

    /// The total number of reads decoded.
    pub fn total_reads(&self) -> usize {
        self.per_sample_counts.iter().sum()
    }

    #[inline]
    fn check_index(&self, index: usize) {
        assert!(
            index < self.per_index_barcode_stats.len(),
            "Index {} is out of range, the metrics have {} indices",
            index,
            self.per_index_barcode_stats.len()
        );
    }

    /// The stats for every distinct barcode at the index.
    pub fn index_stats(&self, index: usize) -> &[BarcodeStats] {
        self.check_index(index);
        &self.per_index_barcode_stats[index]
    }

    /// The stats for the distinct barcode with the given ordinal at the index.
    pub fn barcode_stats(&self, index: usize, ordinal: usize) -> &BarcodeStats {
        let stats = self.index_stats(index);
        assert!(
            ordinal < stats.len(),
            "Barcode ordinal {} is out of range, index {} has {} distinct barcodes",
            ordinal,
            index,
            stats.len()
        );
        &stats[ordinal]
    }

    /// The number of per-index matches discarded for the reason.
    pub fn discarded(&self, reason: DiscardReason) -> usize {
        self.discards[reason as usize]
    }

    /// Update these metrics with the metrics from another decoder using the same dictionary.
    ///
    /// **Note** that no checking is done to ensure that both [`DecoderMetrics`] originate from the
    /// same dictionary.  It is assumed that they line up correctly.
    pub fn update_with(&mut self, other: &Self) {
        for (s, o) in self.per_sample_counts.iter_mut().zip(other.per_sample_counts.iter()) {
            *s += o;
        }
        for (s, o) in
            self.per_index_barcode_stats.iter_mut().zip(other.per_index_barcode_stats.iter())
        {
            for (s, o) in s.iter_mut().zip(o.iter()) {
                s.update_with(o);
            }
        }
        for (s, o) in self.discards.iter_mut().zip(other.discards.iter()) {
            *s += o;
        }
    }

    /// Builds the per-sample metrics, with the undetermined sample last.
    pub fn sample_metrics(&self, dictionary: &BarcodeDictionary) -> Vec<SampleMetrics> {
        let total_templates = self.total_reads();
        // Don't include unmatched when determining the "best" barcode.
        let best_barcode_count =
            self.per_sample_counts[..self.per_sample_counts.len() - 1].iter().max().copied();
        let best_barcode_count = best_barcode_count.unwrap_or(0);

        let ratio = |count: usize, total: usize| {
            if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            }
        };

        dictionary
            .samples()
            .iter()
            .map(|sample| (sample, dictionary.combined_barcode(sample.ordinal).to_string()))
            .chain(std::iter::once((
                dictionary.unknown_sample(),
                dictionary.unknown_barcode().to_string(),
            )))
            .zip(self.per_sample_counts.iter())
            .map(|((sample, barcode), &templates)| SampleMetrics {
                sample_id: sample.sample_id.clone(),
                library_name: sample.library_name.clone().unwrap_or_default(),
                barcode,
                templates,
                fraction_matches: ratio(templates, total_templates),
                ratio_this_barcode_to_best_barcode: ratio(templates, best_barcode_count),
            })
            .collect()
    }

    /// Builds the per-barcode metrics, ordered by index then by barcode.
    pub fn barcode_metrics(&self, dictionary: &BarcodeDictionary) -> Vec<BarcodeMetrics> {
        self.per_index_barcode_stats
            .iter()
            .enumerate()
            .flat_map(|(index, stats)| {
                dictionary
                    .distinct_barcodes(index)
                    .iter()
                    .zip(stats.iter())
                    .zip(dictionary.barcode_sample_counts(index))
                    .map(move |((barcode, stats), samples)| BarcodeMetrics {
                        index: index + 1,
                        barcode: barcode.to_string(),
                        samples,
                        matched: stats.matched(),
                        perfect_matches: stats.perfect_matches(),
                        one_mismatch_matches: stats.one_mismatch_matches(),
                        mean_mismatches: stats.mean_mismatches(),
                        mean_no_calls: stats.mean_no_calls(),
                    })
            })
            .collect()
    }

    /// Builds the discard metrics, one per [`DiscardReason`].
    pub fn discard_metrics(&self) -> Vec<DiscardMetrics> {
        DiscardReason::iter()
            .map(|reason| DiscardMetrics {
                reason: reason.to_string(),
                count: self.discarded(reason),
            })
            .collect()
    }

    /// Write the metrics files associated with the [`DecoderMetrics`].
    ///
    /// This will create a `per_sample_metrics.tsv`, a `per_barcode_metrics.tsv`, and a
    /// `discard_metrics.tsv` file in the provided `output_dir`, each prefixed with `prefix`.
    pub fn write_metrics_files<P: AsRef<Path>>(
        &self,
        dictionary: &BarcodeDictionary,
        output_dir: P,
        prefix: &str,
    ) -> Result<()> {
        let delim = DelimFile::default();

        let filename = [prefix.to_string(), "per_sample_metrics.tsv".to_string()].concat();
        let output_path = output_dir.as_ref().join(filename);
        delim
            .write_tsv(&output_path, self.sample_metrics(dictionary))
            .with_context(|| format!("Failed to write {:?}", output_path))?;

        let filename = [prefix.to_string(), "per_barcode_metrics.tsv".to_string()].concat();
        let output_path = output_dir.as_ref().join(filename);
        delim
            .write_tsv(&output_path, self.barcode_metrics(dictionary))
            .with_context(|| format!("Failed to write {:?}", output_path))?;

        let filename = [prefix.to_string(), "discard_metrics.tsv".to_string()].concat();
        let output_path = output_dir.as_ref().join(filename);
        delim
            .write_tsv(&output_path, self.discard_metrics())
            .with_context(|| format!("Failed to write {:?}", output_path))?;

        debug!("Wrote metrics files to {:?}", output_dir.as_ref());
        Ok(())
    }
}

/// The reads assigned to one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleMetrics {
    pub sample_id: String,
    /// The library name, empty if none.
    pub library_name: String,
    /// The combined barcode, dual index barcodes are delimited by a `+`.
    pub barcode: String,
    /// The number of reads assigned to the sample.
    pub templates: usize,
    /// The fraction of all reads assigned to the sample.
    pub fraction_matches: f64,
    /// The reads assigned to the sample relative to the sample with the most reads, not including
    /// the undetermined sample.
    pub ratio_this_barcode_to_best_barcode: f64,
}

/// The matches to one reference barcode at one index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarcodeMetrics {
    /// The index, starting at 1.
    pub index: usize,
    pub barcode: String,
    /// The number of samples with this barcode at the index.
    pub samples: usize,
    /// The number of observed barcodes matching, before filtering.
    pub matched: usize,
    pub perfect_matches: usize,
    pub one_mismatch_matches: usize,
    pub mean_mismatches: f64,
    pub mean_no_calls: f64,
}

/// The per-index matches discarded for one reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardMetrics {
    pub reason: String,
    pub count: usize,
}
