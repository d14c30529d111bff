use crate::core::error::{InputError, short_type_name};
use crate::core::io::compression;
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

/// An input file shared between the entries of one or more input sets.
pub type SharedFile = Rc<RefCell<dyn InputFile>>;

/// Defines the interface for a single calculation input file.
///
/// Implementors only have to say how their content is rendered as text;
/// reading and writing to disk, including transparent compression chosen by
/// the file extension, is provided on top of [`render`](InputFile::render)
/// and [`parse`](InputFile::parse).
pub trait InputFile: InputFileObject + fmt::Debug {
    /// Returns the complete contents of the file.
    fn render(&self) -> String;

    /// Reconstructs the file from its complete textual contents.
    ///
    /// # Errors
    ///
    /// The default implementation always returns
    /// [`InputError::NotImplemented`] naming the implementing type.
    fn parse(contents: &str) -> Result<Self, InputError>
    where
        Self: Sized,
    {
        let _ = contents;
        Err(InputError::not_implemented(
            "parse",
            short_type_name::<Self>(),
        ))
    }

    /// Writes the rendered file to `path`, compressing it when the extension
    /// asks for it (e.g. `INCAR.gz`).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    fn write_to_path(&self, path: &Path) -> Result<(), InputError> {
        compression::write_text(path, &self.render()).map_err(|e| InputError::io(path, e))
    }

    /// Reads and parses the file at `path`, decompressing it by extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or [`parse`](InputFile::parse) fails.
    fn read_from_path(path: &Path) -> Result<Self, InputError>
    where
        Self: Sized,
    {
        let contents = compression::read_text(path).map_err(|e| InputError::io(path, e))?;
        Self::parse(&contents)
    }
}

/// Object-safe plumbing every [`InputFile`] gets for free: its class name,
/// downcasting and duplication behind a fresh [`SharedFile`].
pub trait InputFileObject: Any {
    fn class_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn clone_shared(&self) -> SharedFile;
}

impl<T: InputFile + Clone + 'static> InputFileObject for T {
    fn class_name(&self) -> &'static str {
        short_type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_shared(&self) -> SharedFile {
        share(self.clone())
    }
}

/// Wraps an input file so it can be placed in (and shared between) input sets.
pub fn share<T: InputFile + 'static>(file: T) -> SharedFile {
    Rc::new(RefCell::new(file))
}

impl fmt::Display for dyn InputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
