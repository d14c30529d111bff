use crate::error::{CliError, Result};
use inputkit::core::serialization::CLASS_KEY;
use inputkit::{ContentRegistry, InputSet, InputSetKind, KeyValueFile, Plain};
use std::path::Path;
use toml::{Table, Value};
use tracing::debug;

/// Parsers available to file entries of a manifest.
pub fn registry() -> ContentRegistry {
    ContentRegistry::new().with::<KeyValueFile>()
}

/// Loads a manifest: the structured form of a plain input set. Hand-written
/// manifests may leave out the `@class` tag.
pub fn load(path: &Path) -> Result<InputSet> {
    debug!("Loading manifest from file: {:?}", path);
    let content = std::fs::read_to_string(path)?;
    let mut table: Table = toml::from_str(&content).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e,
    })?;
    table
        .entry(CLASS_KEY)
        .or_insert_with(|| Value::String(Plain::name().to_string()));

    Ok(InputSet::<Plain>::from_structured(&table, &registry())?)
}
