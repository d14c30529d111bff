//! # Core Module
//!
//! Foundation shared by input sets and generators: the error taxonomy, the
//! single-file [`io::traits::InputFile`] interface with its on-disk helpers,
//! and the structured (TOML) form used to round-trip configuration.

pub mod error;
pub mod io;
pub mod serialization;
