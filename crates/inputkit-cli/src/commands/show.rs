use crate::cli::ShowArgs;
use crate::error::Result;
use crate::manifest;
use inputkit::{Content, InputSet, InputSetKind};
use std::fmt::Write;

pub fn run(args: ShowArgs) -> Result<()> {
    let set = manifest::load(&args.manifest)?;
    print!("{}", describe(&set));
    Ok(())
}

/// Human-readable summary of a set: its parameters, then one line per file with its class and size.
pub fn describe<K: InputSetKind>(set: &InputSet<K>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({} file(s))", set.name(), set.len());

    if !set.params().is_empty() {
        let _ = writeln!(out, "Parameters:");
        for (name, value) in set.params() {
            let _ = writeln!(out, "  {} = {}", name, value);
        }
    }

    let _ = writeln!(out, "Files:");
    for (filename, content) in set {
        let kind = match content {
            Content::Text(_) => "text".to_string(),
            Content::File(file) => file.borrow().class_name().to_string(),
        };
        let size = content.render().len();
        let _ = writeln!(
            out,
            "  {:<16} {:<14} {} byte(s)",
            filename.display(),
            kind,
            size
        );
    }
    out
}
