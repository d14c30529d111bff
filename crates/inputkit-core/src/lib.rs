//! # inputkit Core Library
//!
//! An abstract interface for representing, generating and persisting the input
//! files of scientific simulation codes.
//!
//! ## Architectural Philosophy
//!
//! The library is layered so that each piece can be used on its own:
//!
//! - **[`core`]: The Foundation.** The error taxonomy, the single-file
//!   [`InputFile`] interface with transparent compression, zip archiving, and
//!   the structured (TOML) form used to round-trip configuration.
//!
//! - **[`sets`]: The Collection.** [`InputSet`] maps filenames to contents and
//!   writes them to disk, merges with other sets, and copies itself shallowly
//!   or deeply. Concrete kinds of sets plug in through [`InputSetKind`].
//!
//! - **[`generators`]: The Recipes.** [`InputGenerator`] turns system-specific
//!   data (such as a structure) into an [`InputSet`] according to a fixed,
//!   serializable configuration.

pub mod core;
pub mod generators;
pub mod sets;

pub use crate::core::error::{InputError, ParseError};
pub use crate::core::io::keyvalue::KeyValueFile;
pub use crate::core::io::traits::{InputFile, SharedFile, share};
pub use crate::core::serialization::ContentRegistry;
pub use crate::generators::InputGenerator;
pub use crate::sets::content::Content;
pub use crate::sets::copy::CopyMemo;
pub use crate::sets::input_set::{InputSet, InputSetKind, Inputs, Plain, WriteOptions};
