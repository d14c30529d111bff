use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu",
    version,
    about = "inputkit CLI - write calculation input sets described by TOML manifests.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write every file of an input set manifest into a directory.
    Write(WriteArgs),
    /// Summarize the parameters and files of an input set manifest.
    Show(ShowArgs),
}

/// Arguments for the `write` subcommand.
#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Path to the input set manifest in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub manifest: PathBuf,

    /// Directory the input files are written to.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output: PathBuf,

    /// Path to a configuration file with default write options.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Consolidate the written files into a single zip archive.
    #[arg(long)]
    pub zip: bool,

    /// Fail instead of creating the output directory when it is missing.
    #[arg(long)]
    pub no_make_dir: bool,

    /// Override `write.overwrite` from the config file.
    #[command(flatten)]
    pub overwrite: OverwriteMode,
}

/// A group to handle mutually exclusive flags for replacing existing files.
#[derive(Args, Debug, Clone, Copy)]
#[group(required = false, multiple = false)]
pub struct OverwriteMode {
    /// Replace input files that already exist in the output directory.
    #[arg(long)]
    pub overwrite: bool,
    /// Abort when an input file already exists in the output directory.
    #[arg(long)]
    pub no_overwrite: bool,
}

/// Arguments for the `show` subcommand.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Path to the input set manifest in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub manifest: PathBuf,
}
