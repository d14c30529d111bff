//! # Generators
//!
//! An [`InputGenerator`] is a reusable recipe. It is configured once with
//! every setting that is independent of the system being simulated, then
//! applied to any number of systems to produce an [`InputSet`] for each.
//!
//! Everything passed to a generator at construction must be kept as a field
//! so that its structured form (see [`InputGenerator::to_structured`])
//! rebuilds a generator producing identical inputs. System-specific data
//! (typically a structure) is supplied through [`InputGenerator::Input`] and
//! must never be folded back into the generator's configuration.

use crate::core::error::{InputError, short_type_name};
use crate::core::serialization;
use crate::sets::input_set::{InputSet, InputSetKind, WriteOptions};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use toml::Table;
use tracing::info;

pub trait InputGenerator: Serialize + DeserializeOwned {
    /// The kind of input set this generator produces.
    type Kind: InputSetKind;

    /// System-specific data the recipe is applied to.
    type Input: ?Sized;

    fn class_name() -> &'static str {
        short_type_name::<Self>()
    }

    /// Applies the recipe to `input`.
    ///
    /// # Errors
    ///
    /// The default implementation returns [`InputError::NotImplemented`]
    /// naming the generator type.
    fn get_input_set(&self, input: &Self::Input) -> Result<InputSet<Self::Kind>, InputError> {
        let _ = input;
        Err(InputError::not_implemented(
            "get_input_set",
            Self::class_name(),
        ))
    }

    /// Produces the input set for `input` and writes it to `directory`.
    fn write_inputs(
        &self,
        input: &Self::Input,
        directory: &Path,
        options: &WriteOptions,
    ) -> Result<InputSet<Self::Kind>, InputError> {
        let set = self.get_input_set(input)?;
        info!(
            "{} produced {} with {} file(s).",
            Self::class_name(),
            set.name(),
            set.len()
        );
        set.write_input(directory, options)?;
        Ok(set)
    }

    fn to_structured(&self) -> Result<Table, InputError> {
        serialization::to_structured(self, Self::class_name())
    }

    fn from_structured(table: &Table) -> Result<Self, InputError> {
        serialization::from_structured(table, Self::class_name())
    }
}
