//! Reading and writing of individual input files.
//!
//! This module holds the [`traits::InputFile`] interface every file format
//! implements, the extension-driven compression shared by all reads and
//! writes, zip consolidation of written files and one ready-made format.

pub mod archive;
pub mod compression;
pub mod keyvalue;
pub mod traits;
