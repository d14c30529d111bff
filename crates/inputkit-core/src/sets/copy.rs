use crate::core::io::traits::SharedFile;
use crate::sets::content::Content;
use std::collections::HashMap;
use std::rc::Rc;

/// Remembers which shared files have already been duplicated during a deep
/// copy, so that a file referenced from several entries (or several sets)
/// is copied once and the copies keep sharing it.
///
/// Entries are keyed by address, so a memo must not outlive the sets it was
/// used to copy from.
#[derive(Default)]
pub struct CopyMemo {
    copies: HashMap<*const (), SharedFile>,
}

impl CopyMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct files duplicated so far.
    pub fn len(&self) -> usize {
        self.copies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.copies.is_empty()
    }

    pub fn copy_file(&mut self, file: &SharedFile) -> SharedFile {
        let key = Rc::as_ptr(file) as *const ();
        self.copies
            .entry(key)
            .or_insert_with(|| file.borrow().clone_shared())
            .clone()
    }

    pub fn copy_content(&mut self, content: &Content) -> Content {
        match content {
            Content::Text(text) => Content::Text(text.clone()),
            Content::File(file) => Content::File(self.copy_file(file)),
        }
    }
}
