//! A library of functionality for decoding the sample of a read from its sample barcodes.
//!
//! # Overview
//!
//! The flow of data is as follows:
//!
//! - A [`dictionary::BarcodeDictionary`] is built once from the samples and their expected
//!   barcodes at each index, and is shared read-only by every decoder.
//! - A [`decoder::BarcodeDecoder`] is created per thread with [`opts::DecoderOpts`].  For each
//!   read it matches the observed barcode at every index with a [`matcher::Matcher`], filters the
//!   [`matcher::BarcodeMatch`]es, and combines the surviving matches into a single sample.
//! - [`metrics`] are collected by each decoder, may be combined across decoders, and written to
//!   files.
#![deny(unsafe_code)]
#![allow(
    clippy::must_use_candidate,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions
)]
pub mod decoder;
pub mod dictionary;
pub mod matcher;
pub mod metrics;
pub mod opts;
pub mod utils;
