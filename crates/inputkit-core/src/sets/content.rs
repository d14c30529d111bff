use crate::core::io::traits::{InputFile, SharedFile, share};
use std::cell::{Ref, RefMut};
use std::fmt;
use std::rc::Rc;

/// The contents stored under one filename of an input set.
#[derive(Debug, Clone)]
pub enum Content {
    /// The entire file as text, written as is.
    Text(String),
    /// A structured file, written through [`InputFile::write_to_path`].
    File(SharedFile),
}

impl Content {
    /// Text entry from anything with a string form.
    pub fn text(value: impl ToString) -> Self {
        Self::Text(value.to_string())
    }

    pub fn file<T: InputFile + 'static>(file: T) -> Self {
        Self::File(share(file))
    }

    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::File(file) => file.borrow().render(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::File(_) => None,
        }
    }

    pub fn as_shared(&self) -> Option<&SharedFile> {
        match self {
            Self::Text(_) => None,
            Self::File(file) => Some(file),
        }
    }

    /// Borrows the nested file as its concrete type `T`.
    pub fn file_ref<T: InputFile + 'static>(&self) -> Option<Ref<'_, T>> {
        let file = self.as_shared()?;
        Ref::filter_map(file.borrow(), |f| f.as_any().downcast_ref::<T>()).ok()
    }

    /// Mutably borrows the nested file as its concrete type `T`.
    ///
    /// The file may be shared with other entries or shallow copies, which
    /// all observe the change.
    pub fn file_mut<T: InputFile + 'static>(&self) -> Option<RefMut<'_, T>> {
        let file = self.as_shared()?;
        RefMut::filter_map(file.borrow_mut(), |f| f.as_any_mut().downcast_mut::<T>()).ok()
    }

    /// Whether both contents hold the same shared file (not merely equal
    /// text). Text contents never share.
    pub fn shares_with(&self, other: &Content) -> bool {
        match (self, other) {
            (Self::File(a), Self::File(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::File(file) => write!(f, "{}", &*file.borrow()),
        }
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<SharedFile> for Content {
    fn from(file: SharedFile) -> Self {
        Self::File(file)
    }
}
