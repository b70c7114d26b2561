//! Find the reference barcode at a single index that best matches an observed barcode, along with
//! the hamming distance to it and to the next best reference barcode.

use bstr::{BStr, BString, ByteSlice};
use cached::{Cached, SizedCache};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::utils::count_no_calls;

/// The no-call base.
pub const NO_CALL: u8 = b'N';

/// The default number of observed barcodes to cache per index for the
/// [`CachedHammingDistanceMatcher`].
pub const DEFAULT_CACHE_SIZE: usize = 100_000;

/// The result of matching an observed barcode against the reference barcodes at one index.
#[derive(Debug, Hash, PartialEq, Eq, Clone)]
pub enum BarcodeMatch<'a> {
    Matched {
        /// The index the observed barcode came from.
        index: usize,
        /// The position of the matched barcode in the distinct barcodes for the index.
        ordinal: usize,
        /// The matched reference barcode.
        barcode: &'a BStr,
        mismatches: usize,
        mismatches_to_second_best: usize,
        num_no_calls: usize,
    },
    Unmatched {
        index: usize,
        mismatches: usize,
        mismatches_to_second_best: usize,
        num_no_calls: usize,
    },
}

impl<'a> BarcodeMatch<'a> {
    pub fn index(&self) -> usize {
        match self {
            Self::Matched { index, .. } | Self::Unmatched { index, .. } => *index,
        }
    }

    /// The matched reference barcode, `None` when unmatched.
    pub fn barcode(&self) -> Option<&'a BStr> {
        match self {
            Self::Matched { barcode, .. } => Some(*barcode),
            Self::Unmatched { .. } => None,
        }
    }

    /// The position of the matched barcode in the distinct barcodes for the index.
    pub fn ordinal(&self) -> Option<usize> {
        match self {
            Self::Matched { ordinal, .. } => Some(*ordinal),
            Self::Unmatched { .. } => None,
        }
    }

    pub fn mismatches(&self) -> usize {
        match self {
            Self::Matched { mismatches, .. } | Self::Unmatched { mismatches, .. } => *mismatches,
        }
    }

    pub fn mismatches_to_second_best(&self) -> usize {
        match self {
            Self::Matched { mismatches_to_second_best, .. }
            | Self::Unmatched { mismatches_to_second_best, .. } => *mismatches_to_second_best,
        }
    }

    pub fn num_no_calls(&self) -> usize {
        match self {
            Self::Matched { num_no_calls, .. } | Self::Unmatched { num_no_calls, .. } => {
                *num_no_calls
            }
        }
    }

    /// The absolute difference between the mismatches to the second best and the best barcode.
    pub fn delta(&self) -> usize {
        self.mismatches_to_second_best().abs_diff(self.mismatches())
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    pub fn is_no_match(&self) -> bool {
        !self.is_match()
    }

    /// True if the second best barcode is no further away than the best barcode.
    pub fn is_ambiguous(&self) -> bool {
        self.mismatches_to_second_best() <= self.mismatches()
    }
}

#[inline]
fn is_no_call(base: u8) -> bool {
    base.eq_ignore_ascii_case(&NO_CALL)
}

#[inline]
fn is_mismatch(observed: u8, expected: u8, n_as_mismatch: bool) -> bool {
    if is_no_call(observed) || is_no_call(expected) {
        n_as_mismatch && observed != expected
    } else {
        !observed.eq_ignore_ascii_case(&expected)
    }
}

/// Case-insensitive hamming distance from an observed to an expected barcode.
///
/// The observed barcode is truncated to the length of the expected barcode.  When the observed
/// barcode is shorter, each missing base counts as a mismatch.  A position with a no-call in
/// either barcode is a mismatch only when `n_as_mismatch` is set and the bases differ.
pub fn hamming_distance(observed: &[u8], expected: &[u8], n_as_mismatch: bool) -> usize {
    let compared = observed.len().min(expected.len());
    let dist = observed[..compared]
        .iter()
        .zip(expected[..compared].iter())
        .filter(|(o, e)| is_mismatch(**o, **e, n_as_mismatch))
        .count();
    dist + (expected.len() - compared)
}

/// Finds the reference barcode closest to the observed barcode.
///
/// References are visited in order, so on a tie the earlier reference is the best match.  If the
/// best and second best distances are both at least the length of the best barcode, the observed
/// barcode shares nothing with the references and is unmatched.
pub fn find_best_match<'a>(
    index: usize,
    observed: &[u8],
    references: &'a [BString],
    n_as_mismatch: bool,
) -> BarcodeMatch<'a> {
    let mut best: Option<usize> = None;
    let mut best_dist = observed.len();
    let mut next_best_dist = observed.len();
    for (ordinal, reference) in references.iter().enumerate() {
        let dist = hamming_distance(observed, reference, n_as_mismatch);
        if dist < best_dist {
            next_best_dist = best_dist;
            best_dist = dist;
            best = Some(ordinal);
        } else if dist < next_best_dist {
            next_best_dist = dist;
        }
    }

    match best {
        Some(ordinal)
            if best_dist < references[ordinal].len()
                || next_best_dist < references[ordinal].len() =>
        {
            let barcode = references[ordinal].as_bstr();
            let compared = observed.len().min(barcode.len());
            BarcodeMatch::Matched {
                index,
                ordinal,
                barcode,
                mismatches: best_dist,
                mismatches_to_second_best: next_best_dist,
                num_no_calls: count_no_calls(&observed[..compared]),
            }
        }
        _ => BarcodeMatch::Unmatched {
            index,
            mismatches: observed.len(),
            mismatches_to_second_best: observed.len(),
            num_no_calls: count_no_calls(observed),
        },
    }
}

/// The matching algorithm used for each index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum MatcherKind {
    HammingDistance,
    CachedHammingDistance,
}

impl Default for MatcherKind {
    fn default() -> Self {
        Self::CachedHammingDistance
    }
}

impl MatcherKind {
    /// Build a matcher of this kind for the reference barcodes at one index.
    ///
    /// `cache_size` is ignored by uncached matchers and must be greater than zero otherwise.
    pub fn build<'a>(
        self,
        index: usize,
        references: &'a [BString],
        n_as_mismatch: bool,
        cache_size: usize,
    ) -> Box<dyn Matcher<'a> + 'a> {
        let matcher = HammingDistanceMatcher::new(index, references, n_as_mismatch);
        match self {
            Self::HammingDistance => Box::new(matcher),
            Self::CachedHammingDistance => {
                Box::new(CachedHammingDistanceMatcher::new(matcher, cache_size))
            }
        }
    }
}

/// The base trait for all matching algorithms.
pub trait Matcher<'a>: Send {
    fn find(&mut self, observed: &[u8]) -> BarcodeMatch<'a>;
}

/// Matches by hamming distance against every reference barcode.
#[derive(Debug, Clone)]
pub struct HammingDistanceMatcher<'a> {
    pub index: usize,
    pub references: &'a [BString],
    pub n_as_mismatch: bool,
}

impl<'a> HammingDistanceMatcher<'a> {
    pub fn new(index: usize, references: &'a [BString], n_as_mismatch: bool) -> Self {
        Self { index, references, n_as_mismatch }
    }
}

impl<'a> Matcher<'a> for HammingDistanceMatcher<'a> {
    fn find(&mut self, observed: &[u8]) -> BarcodeMatch<'a> {
        find_best_match(self.index, observed, self.references, self.n_as_mismatch)
    }
}

// Matches based on hamming distance with a cache
pub struct CachedHammingDistanceMatcher<'a> {
    inner: HammingDistanceMatcher<'a>,
    cache: SizedCache<Vec<u8>, BarcodeMatch<'a>>,
}

impl<'a> CachedHammingDistanceMatcher<'a> {
    /// Wraps the given matcher with a cache holding up to `cache_size` observed barcodes.
    ///
    /// # Panics
    ///
    /// - if `cache_size` is zero
    pub fn new(inner: HammingDistanceMatcher<'a>, cache_size: usize) -> Self {
        assert!(cache_size > 0, "The barcode cache size must be greater than zero");
        Self { inner, cache: SizedCache::with_size(cache_size) }
    }

    /// The number of observed barcodes currently cached.
    pub fn cached(&self) -> usize {
        self.cache.cache_size()
    }
}

impl<'a> Matcher<'a> for CachedHammingDistanceMatcher<'a> {
    fn find(&mut self, observed: &[u8]) -> BarcodeMatch<'a> {
        let key = observed.to_vec();
        if let Some(result) = self.cache.cache_get(&key) {
            return result.clone();
        }
        let result = self.inner.find(observed);
        self.cache.cache_set(key, result.clone());
        result
    }
}
