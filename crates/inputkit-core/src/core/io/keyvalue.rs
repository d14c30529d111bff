use crate::core::error::{InputError, ParseError};
use crate::core::io::traits::InputFile;
use indexmap::IndexMap;
use indexmap::map::Entry;
use std::fmt;

/// A `KEY = value` parameter file, the layout shared by many simulation codes
/// (INCAR-style control files).
///
/// Blank lines and lines starting with `#` or `!` are ignored on parsing and
/// are not preserved. Keys keep the order in which they were first set.
/// Keys and values are stored trimmed, so every file that can be built
/// renders to text that parses back to the same file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValueFile {
    entries: IndexMap<String, String>,
}

impl KeyValueFile {
    /// Creates an empty file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](KeyValueFile::set).
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the key or value cannot be rendered.
    pub fn with(
        mut self,
        key: impl Into<String>,
        value: impl ToString,
    ) -> Result<Self, ParseError> {
        self.set(key, value)?;
        Ok(self)
    }

    /// Sets `key` to `value`, keeping the position of an existing key.
    ///
    /// Surrounding whitespace is trimmed from both the key and the value.
    ///
    /// # Arguments
    ///
    /// * `key` - The parameter name, e.g. `ENCUT`.
    /// * `value` - Anything with a string form; numbers use their `Display`.
    ///
    /// # Return
    ///
    /// Returns the previous value of `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the key is empty, starts with a comment
    /// marker (`#` or `!`) or contains `=`, or if either part contains a
    /// line break.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl ToString,
    ) -> Result<Option<String>, ParseError> {
        let key = key.into();
        let value = value.to_string();
        let key = key.trim();
        let value = value.trim();

        if key.is_empty() {
            return Err(ParseError::new("key must not be empty"));
        }
        if key.starts_with('#') || key.starts_with('!') {
            return Err(ParseError::new(format!(
                "key '{}' starts with a comment marker",
                key
            )));
        }
        if key.contains('=') {
            return Err(ParseError::new(format!("key '{}' contains '='", key)));
        }
        if has_line_break(key) || has_line_break(value) {
            return Err(ParseError::new(format!(
                "entry '{}' spans more than one line",
                key.escape_debug()
            )));
        }

        Ok(self.entries.insert(key.to_string(), value.to_string()))
    }

    /// Returns the value of `key`, if set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Removes `key`, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn has_line_break(text: &str) -> bool {
    text.contains(['\n', '\r'])
}

fn is_comment(line: &str) -> bool {
    line.is_empty() || line.starts_with('#') || line.starts_with('!')
}

impl fmt::Display for KeyValueFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl InputFile for KeyValueFile {
    fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(key, value)| format!("{} = {}\n", key, value))
            .collect()
    }

    fn parse(contents: &str) -> Result<Self, InputError> {
        let mut entries = IndexMap::new();

        for (line_num, raw) in contents.lines().enumerate() {
            let line_num = line_num + 1;
            let line = raw.trim();
            if is_comment(line) {
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| ParseError::at_line(line_num, "expected 'KEY = value'"))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ParseError::at_line(line_num, "missing key before '='").into());
            }

            match entries.entry(key.to_string()) {
                Entry::Occupied(_) => {
                    return Err(
                        ParseError::at_line(line_num, format!("duplicate key '{}'", key)).into(),
                    );
                }
                Entry::Vacant(slot) => {
                    slot.insert(value.trim().to_string());
                }
            }
        }

        Ok(Self { entries })
    }
}
