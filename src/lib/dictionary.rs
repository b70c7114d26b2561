#![forbid(unsafe_code)]
#![allow(clippy::must_use_candidate)]

//! The immutable reference table of expected sample barcodes.
//!
//! A [`BarcodeDictionary`] holds one [`SampleRecord`] per sample and, for each index position
//! (e.g. `i7` and `i5` for dual-indexed runs), one reference barcode per sample.  The barcodes at
//! an index are positionally aligned with the samples, so sample `k`'s barcode at index `i` is
//! `barcodes(i)[k]`.
//!
//! On construction the dictionary derives the lookups needed while decoding: an insertion-ordered
//! view of the distinct barcodes at each index, the samples carrying each barcode, and a map from
//! the combined barcode (all index barcodes joined with [`BARCODE_DELIMITER`]) to its sample.
//! Nothing mutates the dictionary afterwards, so a single instance may be shared across any number
//! of decoders and threads.

use std::fmt::Display;

use ahash::{AHashMap, AHashSet};
use bstr::{BStr, BString, ByteSlice};
use itertools::Itertools;
use thiserror::Error;

use crate::utils::s;

/// The bases that are allowed in a reference barcode.
pub const ALLOWED_BASES: &[u8] = &[b'A', b'C', b'G', b'T', b'N'];

/// The name given to the "undetermined" sample
pub const UNDETERMINED_NAME: &str = "Undetermined";

/// The combined barcode reported for reads that could not be assigned to a sample.
///
/// Contains bases outside of [`ALLOWED_BASES`] so it can never collide with a real sample.
pub const UNKNOWN_BARCODE: &str = "UNKNOWN";

/// The delimiter placed between the per-index barcodes of a combined barcode.
pub const BARCODE_DELIMITER: u8 = b'+';

/// The reason that a barcode has been deemed invalid.
#[derive(Debug)]
#[non_exhaustive]
pub enum ReasonBarcodeInvalid {
    EmptyString,
    InvalidBase(char),
}

impl Display for ReasonBarcodeInvalid {
    /// Proper error wording for each reason a barcode is invalid.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyString => write!(f, "Barcode is an empty string"),
            Self::InvalidBase(base) => write!(f, "Barcode contains an invalid base '{}'", base),
        }
    }
}

/// The error that may occur when building a [`BarcodeDictionary`].
#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("The dictionary must include at least one sample")]
    ZeroSamples,

    #[error("The dictionary must include at least one index")]
    ZeroIndices,

    #[error("Index {index} has {actual} barcodes, expected one per sample ({expected})")]
    UnalignedBarcodes { index: usize, actual: usize, expected: usize },

    #[error("Sample {id} has {actual} index barcodes, expected {expected}")]
    UnequalIndexCount { id: String, actual: usize, expected: usize },

    #[error("Invalid barcode sequence for {id} at index {index} `{barcode}` - {reason}")]
    InvalidBarcode { id: String, index: usize, barcode: String, reason: ReasonBarcodeInvalid },

    #[error("Duplicate sample_id found: {id}")]
    DuplicateSampleId { id: String },

    #[error("{sample_a} and {sample_b} have the same combined barcode {barcode}")]
    DuplicateCombinedBarcode { sample_a: String, sample_b: String, barcode: String },

    #[error("The undetermined sample name '{name}' is also used as a sample_id")]
    UndeterminedNameCollision { name: String },
}

/// Metadata about a sample, used only for reporting.
#[derive(Debug, Clone, PartialEq, Hash, Eq)]
pub struct SampleRecord {
    /// The unique identifier for the sample.
    pub sample_id: String,

    /// The library the sample was prepared in.
    pub library_name: Option<String>,

    /// The position of the sample in the dictionary, starts at 0.  The undetermined sample has an
    /// ordinal equal to the number of samples.
    pub ordinal: usize,
}

impl SampleRecord {
    /// Create a new [`SampleRecord`].  The ordinal is assigned when the record is added to a
    /// [`BarcodeDictionary`].
    pub fn new(sample_id: impl Into<String>, library_name: Option<String>) -> Self {
        Self { sample_id: sample_id.into(), library_name, ordinal: 0 }
    }
}

/// A distinct barcode at one index and the samples that carry it.
#[derive(Debug, Clone)]
struct IndexEntry {
    /// The position of the barcode in the distinct barcodes for the index.
    ordinal: usize,
    /// The ordinals of the samples with this barcode at the index, in ascending order.
    samples: Vec<usize>,
}

/// The immutable reference table of sample barcodes.  See the module documentation.
#[derive(Debug, Clone)]
pub struct BarcodeDictionary {
    /// The samples, ordered by ordinal.
    samples: Vec<SampleRecord>,
    /// For each index, one (upper-cased) barcode per sample.
    barcodes_by_index: Vec<Vec<BString>>,
    /// The sentinel sample for reads that are not assigned.
    undetermined: SampleRecord,
    /// The combined barcode of the sentinel sample.
    unknown_barcode: BString,
    /// The combined barcode for each sample.
    combined: Vec<BString>,
    /// For each index, the distinct barcodes in the order they were first seen.
    distinct_by_index: Vec<Vec<BString>>,
    /// For each index, a lookup from barcode to its distinct position and samples.
    entries_by_index: Vec<AHashMap<Vec<u8>, IndexEntry>>,
    /// A lookup from combined barcode to sample ordinal.
    combined_lookup: AHashMap<Vec<u8>, usize>,
}

impl BarcodeDictionary {
    /// Create a new [`BarcodeDictionary`].
    ///
    /// The ordinal of each sample is set to its position in `samples`.  Barcodes are upper-cased.
    ///
    /// # Errors
    ///
    /// - [`DictionaryError::ZeroSamples`] / [`DictionaryError::ZeroIndices`]
    /// - [`DictionaryError::UnalignedBarcodes`] if an index does not have one barcode per sample
    /// - [`DictionaryError::InvalidBarcode`] if a barcode is empty or has bases other than `ACGTN`
    /// - [`DictionaryError::DuplicateSampleId`]
    /// - [`DictionaryError::DuplicateCombinedBarcode`] if two samples have the same barcodes at
    ///   every index
    /// - [`DictionaryError::UndeterminedNameCollision`]
    pub fn new(
        samples: Vec<SampleRecord>,
        barcodes_by_index: Vec<Vec<BString>>,
        undetermined_name: &str,
    ) -> Result<Self, DictionaryError> {
        if samples.is_empty() {
            return Err(DictionaryError::ZeroSamples);
        }
        if barcodes_by_index.is_empty() {
            return Err(DictionaryError::ZeroIndices);
        }

        // Check for duplicate sample identifiers
        let mut ids = AHashSet::with_capacity(samples.len());
        for sample in &samples {
            if !ids.insert(sample.sample_id.as_str()) {
                return Err(DictionaryError::DuplicateSampleId { id: sample.sample_id.clone() });
            }
        }
        if ids.contains(undetermined_name) {
            return Err(DictionaryError::UndeterminedNameCollision {
                name: undetermined_name.to_string(),
            });
        }

        let samples: Vec<SampleRecord> = samples
            .into_iter()
            .enumerate()
            .map(|(ordinal, sample)| SampleRecord { ordinal, ..sample })
            .collect();

        let mut sanitized = Vec::with_capacity(barcodes_by_index.len());
        for (index, barcodes) in barcodes_by_index.into_iter().enumerate() {
            if barcodes.len() != samples.len() {
                return Err(DictionaryError::UnalignedBarcodes {
                    index,
                    actual: barcodes.len(),
                    expected: samples.len(),
                });
            }
            let mut fixed = Vec::with_capacity(barcodes.len());
            for (sample, barcode) in samples.iter().zip(barcodes.into_iter()) {
                let barcode = Self::sanitize_barcode(barcode.as_bstr());
                Self::validate_barcode(barcode.as_bstr(), &sample.sample_id, index)?;
                fixed.push(barcode);
            }
            sanitized.push(fixed);
        }

        let (distinct_by_index, entries_by_index) = Self::build_index_lookups(&sanitized);

        let mut combined = Vec::with_capacity(samples.len());
        let mut combined_lookup = AHashMap::with_capacity(samples.len());
        for sample in &samples {
            let parts: Vec<&[u8]> =
                sanitized.iter().map(|barcodes| barcodes[sample.ordinal].as_slice()).collect();
            let barcode = BString::from(parts.join(&BARCODE_DELIMITER));
            if let Some(other) = combined_lookup.insert(barcode.to_vec(), sample.ordinal) {
                return Err(DictionaryError::DuplicateCombinedBarcode {
                    sample_a: samples[other].sample_id.clone(),
                    sample_b: sample.sample_id.clone(),
                    barcode: barcode.to_string(),
                });
            }
            combined.push(barcode);
        }

        let undetermined = SampleRecord {
            sample_id: undetermined_name.to_string(),
            library_name: None,
            ordinal: samples.len(),
        };

        Ok(Self {
            samples,
            barcodes_by_index: sanitized,
            undetermined,
            unknown_barcode: BString::from(UNKNOWN_BARCODE),
            combined,
            distinct_by_index,
            entries_by_index,
            combined_lookup,
        })
    }

    /// Create a new [`BarcodeDictionary`] from per-sample rows of `(sample, barcodes)`, with one
    /// barcode per index in each row.
    ///
    /// # Errors
    ///
    /// - [`DictionaryError::UnequalIndexCount`] if the rows have different numbers of barcodes
    /// - any error from [`BarcodeDictionary::new`]
    pub fn from_samples<I, B>(rows: I, undetermined_name: &str) -> Result<Self, DictionaryError>
    where
        I: IntoIterator<Item = (SampleRecord, Vec<B>)>,
        B: Into<BString>,
    {
        let mut samples = vec![];
        let mut barcodes_by_index: Vec<Vec<BString>> = vec![];
        for (sample, barcodes) in rows {
            if samples.is_empty() {
                barcodes_by_index = (0..barcodes.len()).map(|_| vec![]).collect();
            } else if barcodes.len() != barcodes_by_index.len() {
                return Err(DictionaryError::UnequalIndexCount {
                    id: sample.sample_id,
                    actual: barcodes.len(),
                    expected: barcodes_by_index.len(),
                });
            }
            for (index, barcode) in barcodes.into_iter().enumerate() {
                barcodes_by_index[index].push(barcode.into());
            }
            samples.push(sample);
        }
        Self::new(samples, barcodes_by_index, undetermined_name)
    }

    /// Builds, for each index, the distinct barcodes in insertion order and the lookup from
    /// barcode to the samples carrying it.
    fn build_index_lookups(
        barcodes_by_index: &[Vec<BString>],
    ) -> (Vec<Vec<BString>>, Vec<AHashMap<Vec<u8>, IndexEntry>>) {
        barcodes_by_index
            .iter()
            .map(|barcodes| {
                let mut distinct: Vec<BString> = vec![];
                let mut entries: AHashMap<Vec<u8>, IndexEntry> =
                    AHashMap::with_capacity(barcodes.len());
                for (sample, barcode) in barcodes.iter().enumerate() {
                    let entry = entries.entry(barcode.to_vec()).or_insert_with(|| {
                        distinct.push(barcode.clone());
                        IndexEntry { ordinal: distinct.len() - 1, samples: vec![] }
                    });
                    entry.samples.push(sample);
                }
                (distinct, entries)
            })
            .unzip()
    }

    /// Upper-case a barcode sequence.
    pub fn sanitize_barcode(raw_barcode: &BStr) -> BString {
        BString::from(raw_barcode.to_ascii_uppercase())
    }

    /// Run a set of validations on a barcode to ensure that it is well formed.
    ///
    /// # Errors
    ///
    /// - [`DictionaryError::InvalidBarcode`] if the barcode is invalid
    pub fn validate_barcode(barcode: &BStr, id: &str, index: usize) -> Result<(), DictionaryError> {
        let reason = if barcode.is_empty() {
            Some(ReasonBarcodeInvalid::EmptyString)
        } else {
            barcode
                .iter()
                .find(|b| !ALLOWED_BASES.contains(*b))
                .map(|b| ReasonBarcodeInvalid::InvalidBase(char::from(*b)))
        };
        match reason {
            None => Ok(()),
            Some(reason) => Err(DictionaryError::InvalidBarcode {
                id: id.to_owned(),
                index,
                barcode: s(barcode),
                reason,
            }),
        }
    }

    #[inline]
    fn check_index(&self, index: usize) {
        assert!(
            index < self.barcodes_by_index.len(),
            "Index {} is out of range, the dictionary has {} indices",
            index,
            self.barcodes_by_index.len()
        );
    }

    #[inline]
    fn check_ordinal(&self, ordinal: usize) {
        assert!(
            ordinal < self.samples.len(),
            "Sample ordinal {} is out of range, the dictionary has {} samples",
            ordinal,
            self.samples.len()
        );
    }

    #[inline]
    fn entry(&self, index: usize, barcode: &[u8]) -> Option<&IndexEntry> {
        self.check_index(index);
        self.entries_by_index[index].get(barcode)
    }

    /// The number of index positions.
    pub fn num_indices(&self) -> usize {
        self.barcodes_by_index.len()
    }

    /// The number of samples, not including the undetermined sample.
    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    /// The samples, ordered by ordinal.
    pub fn samples(&self) -> &[SampleRecord] {
        &self.samples
    }

    /// The sample with the given ordinal.
    pub fn sample(&self, ordinal: usize) -> &SampleRecord {
        self.check_ordinal(ordinal);
        &self.samples[ordinal]
    }

    /// The sentinel sample for reads that could not be assigned.
    pub fn unknown_sample(&self) -> &SampleRecord {
        &self.undetermined
    }

    /// The combined barcode reported for reads that could not be assigned.
    pub fn unknown_barcode(&self) -> &BStr {
        self.unknown_barcode.as_bstr()
    }

    /// The barcodes of the given sample at every index, joined by [`BARCODE_DELIMITER`].
    pub fn combined_barcode(&self, ordinal: usize) -> &BStr {
        self.check_ordinal(ordinal);
        self.combined[ordinal].as_bstr()
    }

    /// The barcodes at the given index, one per sample.
    pub fn barcodes(&self, index: usize) -> &[BString] {
        self.check_index(index);
        &self.barcodes_by_index[index]
    }

    /// The distinct barcodes at the given index, in the order they were first seen.
    pub fn distinct_barcodes(&self, index: usize) -> &[BString] {
        self.check_index(index);
        &self.distinct_by_index[index]
    }

    /// True if exactly one sample has this barcode at the given index.
    pub fn is_unique(&self, index: usize, barcode: &[u8]) -> bool {
        self.entry(index, barcode).map_or(false, |entry| entry.samples.len() == 1)
    }

    /// The ordinals of the samples with this barcode at the given index, empty if none.
    pub fn samples_with_barcode(&self, index: usize, barcode: &[u8]) -> &[usize] {
        self.entry(index, barcode).map(|entry| entry.samples.as_slice()).unwrap_or_default()
    }

    /// The position of this barcode in [`BarcodeDictionary::distinct_barcodes`] for the index.
    pub fn barcode_ordinal(&self, index: usize, barcode: &[u8]) -> Option<usize> {
        self.entry(index, barcode).map(|entry| entry.ordinal)
    }

    /// The sample with the given combined barcode, or the undetermined sample if there is none.
    ///
    /// The lookup is case-insensitive.
    pub fn sample_for_combined(&self, combined: &[u8]) -> &SampleRecord {
        self.combined_lookup
            .get(combined.to_ascii_uppercase().as_slice())
            .map_or(&self.undetermined, |&k| &self.samples[k])
    }

    /// The number of samples carrying each distinct barcode at the index.
    pub fn barcode_sample_counts(&self, index: usize) -> Vec<usize> {
        self.distinct_barcodes(index)
            .iter()
            .map(|barcode| self.samples_with_barcode(index, barcode).len())
            .collect_vec()
    }
}
