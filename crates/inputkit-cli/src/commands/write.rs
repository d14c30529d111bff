use crate::cli::WriteArgs;
use crate::config::PartialConfig;
use crate::error::{CliError, Result};
use crate::manifest;
use tracing::info;

pub fn run(args: WriteArgs) -> Result<()> {
    let options = PartialConfig::load(args.config.as_deref())?.merge_with_cli(&args);
    info!("Resolved write options: {:?}", options);

    let set = manifest::load(&args.manifest)?;
    info!(
        "Loaded {} file(s) from manifest {:?}.",
        set.len(),
        &args.manifest
    );

    if args.output.exists() && !args.output.is_dir() {
        return Err(CliError::Argument(format!(
            "Output path {:?} exists and is not a directory",
            args.output
        )));
    }

    set.write_input(&args.output, &options)?;

    if options.zip_inputs {
        println!(
            "✓ Archived {} file(s) into {:?}",
            set.len(),
            args.output.join(format!("{}.zip", set.name()))
        );
    } else {
        println!("✓ Wrote {} file(s) to {:?}", set.len(), args.output);
    }
    Ok(())
}
