//! Input sets: complete collections of calculation input files.
//!
//! An [`input_set::InputSet`] maps filenames to [`content::Content`] and knows
//! how to write itself to a directory, merge with another set, and copy
//! itself shallowly or deeply. The concrete kind of a set is a type
//! parameter implementing [`input_set::InputSetKind`].

pub mod content;
pub mod copy;
pub mod input_set;
