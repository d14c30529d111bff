//! Structured (TOML) form of generators, input sets and their files.
//!
//! Every structured form is a [`toml::Table`] tagged with an `@class` key
//! naming the Rust type it was produced from and an `@version` key recording
//! the library version. Keys starting with `@` are metadata and never reach
//! the deserialized value.

use crate::core::error::{InputError, short_type_name};
use crate::core::io::traits::{InputFile, SharedFile, share};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use toml::{Table, Value};

pub const CLASS_KEY: &str = "@class";
pub const VERSION_KEY: &str = "@version";

/// Serializes `value` and tags the result with `class`.
pub fn to_structured<T: Serialize + ?Sized>(
    value: &T,
    class: &'static str,
) -> Result<Table, InputError> {
    let fields = match Value::try_from(value)? {
        Value::Table(fields) => fields,
        other => {
            return Err(<toml::ser::Error as serde::ser::Error>::custom(format!(
                "{} serialized to a {} instead of a table",
                class,
                other.type_str()
            ))
            .into());
        }
    };

    let mut table = tagged(class);
    table.extend(fields);
    Ok(table)
}

/// Rebuilds a `T` from a table produced by [`to_structured`] with the same `class`.
pub fn from_structured<T: DeserializeOwned>(
    table: &Table,
    class: &'static str,
) -> Result<T, InputError> {
    check_class(table, class)?;
    let fields: Table = table
        .iter()
        .filter(|(key, _)| !key.starts_with('@'))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Ok(Value::Table(fields).try_into::<T>()?)
}

pub(crate) fn tagged(class: &str) -> Table {
    let mut table = Table::new();
    table.insert(CLASS_KEY.to_string(), Value::String(class.to_string()));
    table.insert(
        VERSION_KEY.to_string(),
        Value::String(env!("CARGO_PKG_VERSION").to_string()),
    );
    table
}

pub(crate) fn class_of(table: &Table) -> Option<&str> {
    table.get(CLASS_KEY).and_then(Value::as_str)
}

pub(crate) fn check_class(table: &Table, expected: &'static str) -> Result<(), InputError> {
    match class_of(table) {
        Some(found) if found == expected => Ok(()),
        found => Err(InputError::ClassMismatch {
            expected,
            found: found.unwrap_or("<missing>").to_string(),
        }),
    }
}

type ParseFn = fn(&str) -> Result<SharedFile, InputError>;

fn parse_shared<T: InputFile + Clone + 'static>(contents: &str) -> Result<SharedFile, InputError> {
    Ok(share(T::parse(contents)?))
}

/// Maps input file class names to their parsers so that file entries of a
/// structured input set can be rebuilt as the right concrete type.
#[derive(Clone, Default)]
pub struct ContentRegistry {
    parsers: HashMap<&'static str, ParseFn>,
}

impl fmt::Debug for ContentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.parsers.keys()).finish()
    }
}

impl ContentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: InputFile + Clone + 'static>(&mut self) -> &mut Self {
        self.parsers
            .insert(short_type_name::<T>(), parse_shared::<T> as ParseFn);
        self
    }

    pub fn with<T: InputFile + Clone + 'static>(mut self) -> Self {
        self.register::<T>();
        self
    }

    pub fn contains(&self, class: &str) -> bool {
        self.parsers.contains_key(class)
    }

    pub fn parse(&self, class: &str, contents: &str) -> Result<SharedFile, InputError> {
        let parser = self
            .parsers
            .get(class)
            .ok_or_else(|| InputError::UnknownContentClass(class.to_string()))?;
        parser(contents)
    }
}
