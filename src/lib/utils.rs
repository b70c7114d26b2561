//! Utility functions.

use crate::matcher::NO_CALL;

pub fn s(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).to_string()
}

/// Count the number of no-calls (`N` or `n`) in the bases.
pub fn count_no_calls(bases: &[u8]) -> usize {
    bytecount::count(bases, NO_CALL) + bytecount::count(bases, NO_CALL.to_ascii_lowercase())
}
