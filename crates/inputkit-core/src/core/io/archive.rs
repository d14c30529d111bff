use crate::core::error::InputError;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Consolidates already-written files of `directory` into
/// `directory/archive_name`, deleting each file once it is stored.
///
/// Entries are named after `filenames` (relative to `directory`). Files that
/// have vanished since they were written are skipped. Returns the names that
/// ended up in the archive.
pub fn archive_files<'a>(
    directory: &Path,
    archive_name: &str,
    filenames: impl IntoIterator<Item = &'a Path>,
) -> Result<Vec<PathBuf>, InputError> {
    let archive_path = directory.join(archive_name);
    let file = File::create(&archive_path).map_err(|e| InputError::io(&archive_path, e))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut archived = Vec::new();
    for filename in filenames {
        let file_path = directory.join(filename);
        let bytes = match fs::read(&file_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                trace!("Skipping {:?}: no longer on disk.", file_path);
                continue;
            }
            Err(e) => return Err(InputError::io(&file_path, e)),
        };

        zip.start_file(entry_name(filename), options)
            .map_err(|e| archive_error(&archive_path, e))?;
        zip.write_all(&bytes)
            .map_err(|e| InputError::io(&archive_path, e))?;

        match fs::remove_file(&file_path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(InputError::io(&file_path, e)),
        }
        debug!("Archived {:?} into {:?}.", filename, archive_path);
        archived.push(filename.to_path_buf());
    }

    zip.finish().map_err(|e| archive_error(&archive_path, e))?;
    Ok(archived)
}

fn entry_name(filename: &Path) -> String {
    filename
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn archive_error(path: &Path, source: zip::result::ZipError) -> InputError {
    InputError::Archive {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;
    use zip::ZipArchive;

    #[test]
    fn archives_files_and_removes_originals() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("INCAR"), "ENCUT = 520\n").unwrap();
        fs::write(dir.path().join("KPOINTS"), "Gamma\n").unwrap();

        let names = [Path::new("INCAR"), Path::new("KPOINTS")];
        let archived = archive_files(dir.path(), "Set.zip", names).unwrap();
        assert_eq!(archived.len(), 2);

        assert!(!dir.path().join("INCAR").exists());
        assert!(!dir.path().join("KPOINTS").exists());

        let mut archive = ZipArchive::new(File::open(dir.path().join("Set.zip")).unwrap()).unwrap();
        assert_eq!(archive.len(), 2);
        let mut incar = String::new();
        archive
            .by_name("INCAR")
            .unwrap()
            .read_to_string(&mut incar)
            .unwrap();
        assert_eq!(incar, "ENCUT = 520\n");
    }

    #[test]
    fn missing_files_are_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("INCAR"), "ISMEAR = 0\n").unwrap();

        let names = [Path::new("INCAR"), Path::new("GONE")];
        let archived = archive_files(dir.path(), "Set.zip", names).unwrap();
        assert_eq!(archived, vec![PathBuf::from("INCAR")]);

        let archive = ZipArchive::new(File::open(dir.path().join("Set.zip")).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn nested_filenames_use_forward_slashes() {
        assert_eq!(entry_name(Path::new("sub").join("INCAR").as_path()), "sub/INCAR");
    }
}
