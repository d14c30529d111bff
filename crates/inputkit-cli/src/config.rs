use crate::cli::WriteArgs;
use crate::error::{CliError, Result};
use inputkit::WriteOptions;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialWriteConfig {
    #[serde(rename = "make-dir")]
    make_dir: Option<bool>,
    overwrite: Option<bool>,
    zip: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    write: Option<PartialWriteConfig>,
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Resolves the final write options: command-line flags first, then the
    /// config file, then the library defaults.
    pub fn merge_with_cli(self, args: &WriteArgs) -> WriteOptions {
        let file = self.write.unwrap_or_default();
        let defaults = WriteOptions::default();

        let make_dir = if args.no_make_dir {
            false
        } else {
            file.make_dir.unwrap_or(defaults.make_dir)
        };

        let overwrite = if args.overwrite.overwrite {
            true
        } else if args.overwrite.no_overwrite {
            false
        } else {
            file.overwrite.unwrap_or(defaults.overwrite)
        };

        let zip_inputs = args.zip || file.zip.unwrap_or(defaults.zip_inputs);

        WriteOptions::new()
            .make_dir(make_dir)
            .overwrite(overwrite)
            .zip_inputs(zip_inputs)
    }
}
