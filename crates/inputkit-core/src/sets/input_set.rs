use crate::core::error::{InputError, short_type_name};
use crate::core::io::{archive, compression};
use crate::core::serialization::{self, ContentRegistry};
use crate::sets::content::Content;
use crate::sets::copy::CopyMemo;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use std::any::Any;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::marker::PhantomData;
use std::ops::{BitOr, Index};
use std::path::{Path, PathBuf};
use toml::{Table, Value};
use tracing::{debug, info, instrument};

/// Ordered mapping from filename (relative to the target directory) to contents.
pub type Inputs = IndexMap<PathBuf, Content>;

const PARAMS_KEY: &str = "params";
const INPUTS_KEY: &str = "inputs";
const CONTENTS_KEY: &str = "contents";

/// Identifies a concrete kind of input set and supplies the behaviour that
/// differs between kinds.
///
/// The kind's [`name`](InputSetKind::name) is used for the archive written by
/// [`InputSet::write_input`] and for the `@class` tag of the structured form.
pub trait InputSetKind: Sized + 'static {
    fn name() -> &'static str {
        short_type_name::<Self>()
    }

    /// Rebuilds an input set of this kind from the files in `directory`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::NotImplemented`] unless overridden.
    fn from_directory(directory: &Path) -> Result<InputSet<Self>, InputError> {
        let _ = directory;
        Err(InputError::not_implemented("from_directory", Self::name()))
    }

    /// Checks that `set` is a valid set of inputs for this kind.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::NotImplemented`] unless overridden; there is no
    /// implicit "always valid" default.
    fn validate(set: &InputSet<Self>) -> Result<bool, InputError> {
        let _ = set;
        Err(InputError::not_implemented("validate", Self::name()))
    }
}

/// The kind of an input set that carries no format-specific behaviour.
#[derive(Debug)]
pub enum Plain {}

impl InputSetKind for Plain {
    fn name() -> &'static str {
        "InputSet"
    }
}

/// Controls how [`InputSet::write_input`] treats the target directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Create the directory (and its parents) if it does not exist.
    pub make_dir: bool,
    /// Replace files that already exist.
    pub overwrite: bool,
    /// Consolidate the written files into `<Name>.zip`.
    pub zip_inputs: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            make_dir: true,
            overwrite: true,
            zip_inputs: false,
        }
    }
}

impl WriteOptions {
    /// The default options: create the directory, overwrite, no archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether a missing target directory is created.
    pub fn make_dir(mut self, make_dir: bool) -> Self {
        self.make_dir = make_dir;
        self
    }

    /// Sets whether existing files are replaced instead of failing with
    /// [`InputError::FileExists`].
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Sets whether the written files are consolidated into `<Name>.zip`.
    pub fn zip_inputs(mut self, zip_inputs: bool) -> Self {
        self.zip_inputs = zip_inputs;
        self
    }
}

/// A complete set of calculation inputs: filenames mapped to their contents,
/// plus named parameters describing how the set was made.
///
/// Cloning is shallow: nested [`InputFile`](crate::InputFile)s stay shared,
/// so a change made through one clone is seen by the other. The mapping and
/// parameters themselves are duplicated, however: inserting or removing an
/// entry in a clone leaves the original untouched. Use
/// [`deep_copy`](InputSet::deep_copy) for a fully independent copy.
pub struct InputSet<K: InputSetKind = Plain> {
    inputs: Inputs,
    params: Table,
    kind: PhantomData<fn() -> K>,
}

impl<K: InputSetKind> InputSet<K> {
    /// Creates a set from an ordered filename → content mapping, with no
    /// parameters.
    pub fn new(inputs: Inputs) -> Self {
        Self {
            inputs,
            params: Table::new(),
            kind: PhantomData,
        }
    }

    /// Replaces all named parameters with `params`.
    pub fn with_params(mut self, params: Table) -> Self {
        self.params = params;
        self
    }

    /// Sets one named parameter, replacing any previous value.
    ///
    /// # Arguments
    ///
    /// * `name` - The parameter name, later passed to [`param`](InputSet::param).
    /// * `value` - Any value with a TOML representation.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Builder form of [`insert`](InputSet::insert).
    pub fn with_input(mut self, filename: impl Into<PathBuf>, content: impl Into<Content>) -> Self {
        self.insert(filename, content);
        self
    }

    pub fn name(&self) -> &'static str {
        K::name()
    }

    pub fn inputs(&self) -> &Inputs {
        &self.inputs
    }

    pub fn params(&self) -> &Table {
        &self.params
    }

    /// Looks up a named parameter supplied at construction.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::NoSuchAttribute`] if no parameter has this name.
    pub fn param(&self, name: &str) -> Result<&Value, InputError> {
        self.params
            .get(name)
            .ok_or_else(|| InputError::NoSuchAttribute {
                type_name: K::name(),
                name: name.to_string(),
            })
    }

    /// Looks up a named parameter and deserializes it into `T`.
    ///
    /// # Return
    ///
    /// Returns the typed value, e.g. `u32` for an integer parameter or a
    /// `Vec<String>` for an array of strings.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::NoSuchAttribute`] if the parameter is missing, or
    /// [`InputError::InvalidParameter`] if its value does not fit `T`.
    pub fn param_as<T: DeserializeOwned>(&self, name: &str) -> Result<T, InputError> {
        self.param(name)?
            .clone()
            .try_into::<T>()
            .map_err(|source| InputError::InvalidParameter {
                name: name.to_string(),
                source,
            })
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, PathBuf, Content> {
        self.inputs.iter()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, PathBuf, Content> {
        self.inputs.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, PathBuf, Content> {
        self.inputs.values()
    }

    pub fn contains_key(&self, filename: impl AsRef<Path>) -> bool {
        self.inputs.contains_key(filename.as_ref())
    }

    pub fn get(&self, filename: impl AsRef<Path>) -> Option<&Content> {
        self.inputs.get(filename.as_ref())
    }

    pub fn get_mut(&mut self, filename: impl AsRef<Path>) -> Option<&mut Content> {
        self.inputs.get_mut(filename.as_ref())
    }

    /// Sets the contents of `filename`. An existing entry keeps its position.
    pub fn insert(
        &mut self,
        filename: impl Into<PathBuf>,
        content: impl Into<Content>,
    ) -> Option<Content> {
        self.inputs.insert(filename.into(), content.into())
    }

    /// Removes `filename`, keeping the order of the remaining entries.
    pub fn remove(&mut self, filename: impl AsRef<Path>) -> Option<Content> {
        self.inputs.shift_remove(filename.as_ref())
    }

    /// Merges two sets into a new one: entries of `other` replace entries of
    /// `self` with the same filename, and only `self`'s parameters are kept.
    pub fn union(&self, other: &Self) -> Self {
        let mut inputs = self.inputs.clone();
        inputs.extend(
            other
                .inputs
                .iter()
                .map(|(filename, content)| (filename.clone(), content.clone())),
        );
        Self {
            inputs,
            params: self.params.clone(),
            kind: PhantomData,
        }
    }

    /// [`union`](InputSet::union) with an operand whose type is only known at
    /// runtime. A raw [`Inputs`] mapping is accepted and treated as a set of
    /// this kind.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::UnsupportedMerge`] for any other operand,
    /// including input sets of a different kind.
    pub fn try_union(&self, other: &dyn Any) -> Result<Self, InputError> {
        if let Some(set) = other.downcast_ref::<Self>() {
            return Ok(self.union(set));
        }
        if let Some(inputs) = other.downcast_ref::<Inputs>() {
            return Ok(self.union(&Self::new(inputs.clone())));
        }
        Err(InputError::UnsupportedMerge {
            type_name: K::name(),
        })
    }

    /// Copies the set and every nested file, so that changes to the copy
    /// never reach the original. Files shared between entries stay shared
    /// between the corresponding entries of the copy.
    pub fn deep_copy(&self) -> Self {
        self.deep_copy_with(&mut CopyMemo::new())
    }

    /// Deep copy through a caller-held memo, so that files shared between
    /// several sets stay shared between their copies.
    pub fn deep_copy_with(&self, memo: &mut CopyMemo) -> Self {
        let inputs = self
            .inputs
            .iter()
            .map(|(filename, content)| (filename.clone(), memo.copy_content(content)))
            .collect();
        Self {
            inputs,
            params: self.params.clone(),
            kind: PhantomData,
        }
    }

    /// Writes every entry to `directory/<filename>` in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::FileExists`] when a target already exists and
    /// `options.overwrite` is false; files earlier in the set have been
    /// written by then. I/O and archive failures are returned as they occur.
    #[instrument(skip_all, name = "write_input", fields(set = K::name()))]
    pub fn write_input(
        &self,
        directory: impl AsRef<Path>,
        options: &WriteOptions,
    ) -> Result<(), InputError> {
        let directory = directory.as_ref();
        info!(
            "Writing {} input file(s) to {:?}.",
            self.inputs.len(),
            directory
        );

        for (filename, contents) in &self.inputs {
            let file_path = directory.join(filename);

            if options.make_dir && !directory.exists() {
                debug!("Creating directory {:?}.", directory);
                fs::create_dir_all(directory).map_err(|e| InputError::io(directory, e))?;
            }

            if !options.overwrite && file_path.exists() {
                return Err(InputError::FileExists {
                    filename: filename.clone(),
                });
            }
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&file_path)
                .map_err(|e| InputError::io(&file_path, e))?;

            match contents {
                Content::File(file) => file.borrow().write_to_path(&file_path)?,
                Content::Text(text) => compression::write_text(&file_path, text)
                    .map_err(|e| InputError::io(&file_path, e))?,
            }
            debug!("Wrote {:?}.", file_path);
        }

        if options.zip_inputs {
            let archive_name = format!("{}.zip", K::name());
            let archived = archive::archive_files(
                directory,
                &archive_name,
                self.inputs.keys().map(PathBuf::as_path),
            )?;
            info!(
                "Archived {} file(s) into {:?}.",
                archived.len(),
                directory.join(&archive_name)
            );
        }

        Ok(())
    }

    /// Rebuilds a set of kind `K` from the files in `directory`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::NotImplemented`] naming the kind unless `K`
    /// overrides [`InputSetKind::from_directory`], or whatever error that
    /// override reports.
    pub fn from_directory(directory: impl AsRef<Path>) -> Result<Self, InputError> {
        K::from_directory(directory.as_ref())
    }

    /// Checks that the set is a valid set of inputs for its kind.
    ///
    /// # Return
    ///
    /// Returns `Ok(false)` for a set the kind considers invalid.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::NotImplemented`] naming the kind unless `K`
    /// overrides [`InputSetKind::validate`].
    pub fn validate(&self) -> Result<bool, InputError> {
        K::validate(self)
    }

    /// Structured form: the kind's `@class` tag, the parameters, and every
    /// entry either as text or as a table naming the file class and holding
    /// its rendered contents.
    pub fn to_structured(&self) -> Table {
        let mut inputs = Table::new();
        for (filename, content) in &self.inputs {
            let value = match content {
                Content::Text(text) => Value::String(text.clone()),
                Content::File(file) => {
                    let file = file.borrow();
                    let mut entry = serialization::tagged(file.class_name());
                    entry.insert(CONTENTS_KEY.to_string(), Value::String(file.render()));
                    Value::Table(entry)
                }
            };
            inputs.insert(filename.to_string_lossy().into_owned(), value);
        }

        let mut table = serialization::tagged(K::name());
        table.insert(PARAMS_KEY.to_string(), Value::Table(self.params.clone()));
        table.insert(INPUTS_KEY.to_string(), Value::Table(inputs));
        table
    }

    /// Rebuilds a set from [`to_structured`](InputSet::to_structured) output,
    /// parsing file entries with the parsers in `registry`.
    pub fn from_structured(table: &Table, registry: &ContentRegistry) -> Result<Self, InputError> {
        serialization::check_class(table, K::name())?;

        let params = match table.get(PARAMS_KEY) {
            None => Table::new(),
            Some(Value::Table(params)) => params.clone(),
            Some(other) => return Err(malformed(format!("'params' is a {}", other.type_str()))),
        };

        let mut inputs = Inputs::new();
        match table.get(INPUTS_KEY) {
            None => {}
            Some(Value::Table(entries)) => {
                for (filename, value) in entries {
                    inputs.insert(PathBuf::from(filename), content_from_value(filename, value, registry)?);
                }
            }
            Some(other) => return Err(malformed(format!("'inputs' is a {}", other.type_str()))),
        }

        Ok(Self::new(inputs).with_params(params))
    }
}

fn content_from_value(
    filename: &str,
    value: &Value,
    registry: &ContentRegistry,
) -> Result<Content, InputError> {
    match value {
        Value::String(text) => Ok(Content::Text(text.clone())),
        Value::Table(entry) => {
            let class = serialization::class_of(entry)
                .ok_or_else(|| malformed(format!("entry '{}' has no @class", filename)))?;
            let contents = entry
                .get(CONTENTS_KEY)
                .and_then(Value::as_str)
                .ok_or_else(|| malformed(format!("entry '{}' has no contents", filename)))?;
            Ok(Content::File(registry.parse(class, contents)?))
        }
        other => Err(malformed(format!(
            "entry '{}' is a {}",
            filename,
            other.type_str()
        ))),
    }
}

fn malformed(message: String) -> InputError {
    <toml::de::Error as serde::de::Error>::custom(message).into()
}

impl<K: InputSetKind> Clone for InputSet<K> {
    fn clone(&self) -> Self {
        Self {
            inputs: self.inputs.clone(),
            params: self.params.clone(),
            kind: PhantomData,
        }
    }
}

impl<K: InputSetKind> Default for InputSet<K> {
    fn default() -> Self {
        Self::new(Inputs::new())
    }
}

impl<K: InputSetKind> fmt::Debug for InputSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(K::name())
            .field("inputs", &self.inputs)
            .field("params", &self.params)
            .finish()
    }
}

impl<K: InputSetKind> From<Inputs> for InputSet<K> {
    fn from(inputs: Inputs) -> Self {
        Self::new(inputs)
    }
}

impl<K: InputSetKind, P: Into<PathBuf>, C: Into<Content>> FromIterator<(P, C)> for InputSet<K> {
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<K: InputSetKind, P: Into<PathBuf>, C: Into<Content>> Extend<(P, C)> for InputSet<K> {
    fn extend<I: IntoIterator<Item = (P, C)>>(&mut self, iter: I) {
        for (filename, content) in iter {
            self.insert(filename, content);
        }
    }
}

impl<'a, K: InputSetKind> IntoIterator for &'a InputSet<K> {
    type Item = (&'a PathBuf, &'a Content);
    type IntoIter = indexmap::map::Iter<'a, PathBuf, Content>;

    fn into_iter(self) -> Self::IntoIter {
        self.inputs.iter()
    }
}

impl<K: InputSetKind, Q: AsRef<Path>> Index<Q> for InputSet<K> {
    type Output = Content;

    fn index(&self, filename: Q) -> &Content {
        let filename = filename.as_ref();
        self.get(filename)
            .unwrap_or_else(|| panic!("no input named {:?} in {}", filename, K::name()))
    }
}

impl<K: InputSetKind> BitOr<&InputSet<K>> for &InputSet<K> {
    type Output = InputSet<K>;

    fn bitor(self, rhs: &InputSet<K>) -> InputSet<K> {
        self.union(rhs)
    }
}

impl<K: InputSetKind> BitOr<Inputs> for &InputSet<K> {
    type Output = InputSet<K>;

    fn bitor(self, rhs: Inputs) -> InputSet<K> {
        self.union(&InputSet::new(rhs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::keyvalue::KeyValueFile;
    use crate::core::io::traits::{InputFile, share};
    use std::io::Read;
    use tempfile::tempdir;
    use zip::ZipArchive;

    #[derive(Debug)]
    enum RelaxSet {}

    impl InputSetKind for RelaxSet {
        fn from_directory(directory: &Path) -> Result<InputSet<Self>, InputError> {
            let incar = KeyValueFile::read_from_path(&directory.join("INCAR"))?;
            let kpoints_path = directory.join("KPOINTS");
            let kpoints = compression::read_text(&kpoints_path)
                .map_err(|e| InputError::io(&kpoints_path, e))?;
            Ok(InputSet::default()
                .with_input("INCAR", Content::file(incar))
                .with_input("KPOINTS", kpoints))
        }

        fn validate(set: &InputSet<Self>) -> Result<bool, InputError> {
            Ok(set
                .get("INCAR")
                .and_then(|c| c.file_ref::<KeyValueFile>().map(|f| f.get("ENCUT").is_some()))
                .unwrap_or(false))
        }
    }

    fn plain(entries: &[(&str, &str)]) -> InputSet {
        entries.iter().map(|&(k, v)| (k, v)).collect()
    }

    fn names_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn behaves_as_ordered_mapping() {
        let mut set = plain(&[("POSCAR", "Si"), ("INCAR", "NSW = 0"), ("KPOINTS", "Gamma")]);
        assert_eq!(set.len(), set.keys().count());
        let keys: Vec<_> = set.keys().map(|k| k.to_string_lossy().into_owned()).collect();
        assert_eq!(keys, vec!["POSCAR", "INCAR", "KPOINTS"]);

        let previous = set.insert("POSCAR", "Ge");
        assert_eq!(previous.map(|c| c.render()), Some("Si".to_string()));
        assert_eq!(set["POSCAR"].render(), "Ge");

        assert!(set.remove("INCAR").is_some());
        assert!(!set.contains_key("INCAR"));
        let keys: Vec<_> = (&set).into_iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec![PathBuf::from("POSCAR"), PathBuf::from("KPOINTS")]);
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
    }

    #[test]
    fn params_are_exposed_through_lookup() {
        let set = plain(&[("INCAR", "NSW = 0")])
            .with_param("structure_id", "mp-149")
            .with_param("nelect", 8_i64);

        assert_eq!(set.param("structure_id").unwrap().as_str(), Some("mp-149"));
        assert_eq!(set.param_as::<i64>("nelect").unwrap(), 8);
        assert!(matches!(
            set.param_as::<bool>("nelect"),
            Err(InputError::InvalidParameter { .. })
        ));

        let err = set.param("functional").unwrap_err();
        match err {
            InputError::NoSuchAttribute { type_name, name } => {
                assert_eq!(type_name, "InputSet");
                assert_eq!(name, "functional");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn union_prefers_right_entries_and_left_params() {
        let a = plain(&[("x", "1")]).with_param("origin", "a");
        let b = plain(&[("x", "2"), ("y", "3")]).with_param("origin", "b").with_param("extra", true);

        let merged = a.union(&b);
        let entries: Vec<_> = merged
            .iter()
            .map(|(k, v)| (k.to_string_lossy().into_owned(), v.render()))
            .collect();
        assert_eq!(
            entries,
            vec![("x".to_string(), "2".to_string()), ("y".to_string(), "3".to_string())]
        );
        assert_eq!(merged.param("origin").unwrap().as_str(), Some("a"));
        assert!(merged.param("extra").is_err());

        assert_eq!(a["x"].render(), "1");
        assert_eq!((&a | &b)["x"].render(), "2");
    }

    #[test]
    fn union_coerces_raw_mapping() {
        let a = plain(&[("x", "1")]).with_param("origin", "a");
        let mut raw = Inputs::new();
        raw.insert(PathBuf::from("z"), Content::from("9"));

        let merged = &a | raw.clone();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged["z"].render(), "9");

        let merged = a.try_union(&raw).unwrap();
        assert_eq!(merged.param("origin").unwrap().as_str(), Some("a"));
    }

    #[test]
    fn union_with_incompatible_operand_is_unsupported() {
        let a = plain(&[("x", "1")]);
        let other_kind: InputSet<RelaxSet> = [("x", "2")].into_iter().collect();

        assert!(matches!(
            a.try_union(&other_kind),
            Err(InputError::UnsupportedMerge { type_name: "InputSet" })
        ));
        assert!(matches!(
            a.try_union(&"x = 2".to_string()),
            Err(InputError::UnsupportedMerge { .. })
        ));
        assert_eq!(a.try_union(&a.clone()).unwrap().len(), 1);
    }

    #[test]
    fn deep_copy_is_independent_and_keeps_internal_sharing() {
        let shared = share(KeyValueFile::new().with("ENCUT", 520).unwrap());
        let set = InputSet::<Plain>::default()
            .with_input("INCAR", shared.clone())
            .with_input("INCAR.orig", shared)
            .with_param("tags", vec!["relax"]);

        let deep = set.deep_copy();
        assert!(!deep["INCAR"].shares_with(&set["INCAR"]));
        assert!(deep["INCAR"].shares_with(&deep["INCAR.orig"]));

        deep["INCAR"]
            .file_mut::<KeyValueFile>()
            .unwrap()
            .set("ENCUT", 600)
            .unwrap();
        assert_eq!(set["INCAR"].render(), "ENCUT = 520\n");
        assert_eq!(deep["INCAR.orig"].render(), "ENCUT = 600\n");
        assert_eq!(deep.params(), set.params());
    }

    #[test]
    fn shallow_copy_shares_nested_files() {
        let set = InputSet::<Plain>::default()
            .with_input("INCAR", Content::file(KeyValueFile::new().with("ENCUT", 520).unwrap()));
        let shallow = set.clone();

        shallow["INCAR"]
            .file_mut::<KeyValueFile>()
            .unwrap()
            .set("ENCUT", 700)
            .unwrap();
        assert_eq!(set["INCAR"].render(), "ENCUT = 700\n");
    }

    #[test]
    fn shallow_copy_has_its_own_mapping() {
        let set = plain(&[("KPOINTS", "Gamma\n")]);
        let mut shallow = set.clone();
        shallow.insert("POSCAR", "Si\n");
        shallow.remove("KPOINTS");

        assert_eq!(set.len(), 1);
        assert!(set.contains_key("KPOINTS"));
        assert!(!set.contains_key("POSCAR"));
    }

    #[test]
    fn deep_copy_with_shared_memo_keeps_cross_set_sharing() {
        let shared = share(KeyValueFile::new().with("ISMEAR", 0).unwrap());
        let first = InputSet::<Plain>::default().with_input("INCAR", shared.clone());
        let second = InputSet::<Plain>::default().with_input("INCAR", shared);

        let mut memo = CopyMemo::new();
        let first_copy = first.deep_copy_with(&mut memo);
        let second_copy = second.deep_copy_with(&mut memo);
        assert!(first_copy["INCAR"].shares_with(&second_copy["INCAR"]));
        assert!(!first_copy["INCAR"].shares_with(&first["INCAR"]));
    }

    #[test]
    fn write_input_writes_entries_and_creates_directory() {
        let root = tempdir().unwrap();
        let dir = root.path().join("calc").join("relax");
        let set = InputSet::<Plain>::default()
            .with_input("INCAR", Content::file(KeyValueFile::new().with("NSW", 99).unwrap()))
            .with_input("KPOINTS", "Gamma\n")
            .with_input("POSCAR.gz", "Si\n");

        set.write_input(&dir, &WriteOptions::default()).unwrap();

        assert_eq!(names_in(&dir), vec!["INCAR", "KPOINTS", "POSCAR.gz"]);
        assert_eq!(fs::read_to_string(dir.join("INCAR")).unwrap(), "NSW = 99\n");
        assert_eq!(fs::read_to_string(dir.join("KPOINTS")).unwrap(), "Gamma\n");
        assert_eq!(compression::read_text(&dir.join("POSCAR.gz")).unwrap(), "Si\n");
        assert_ne!(fs::read(dir.join("POSCAR.gz")).unwrap(), b"Si\n");
    }

    #[test]
    fn write_input_without_make_dir_fails_on_missing_directory() {
        let root = tempdir().unwrap();
        let dir = root.path().join("missing");
        let set = plain(&[("INCAR", "NSW = 0\n")]);

        let err = set
            .write_input(&dir, &WriteOptions::new().make_dir(false))
            .unwrap_err();
        assert!(matches!(err, InputError::Io { .. }));
        assert!(!dir.exists());
    }

    #[test]
    fn write_input_without_overwrite_refuses_existing_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("x"), "original").unwrap();
        let set = plain(&[("a", "first"), ("x", "replacement")]);

        let err = set
            .write_input(dir.path(), &WriteOptions::new().overwrite(false))
            .unwrap_err();
        match err {
            InputError::FileExists { filename } => assert_eq!(filename, PathBuf::from("x")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fs::read_to_string(dir.path().join("x")).unwrap(), "original");
        assert_eq!(fs::read_to_string(dir.path().join("a")).unwrap(), "first");
    }

    #[test]
    fn write_input_overwrites_by_default() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("x"), "original").unwrap();
        plain(&[("x", "new")])
            .write_input(dir.path(), &WriteOptions::default())
            .unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("x")).unwrap(), "new");
    }

    #[test]
    fn write_input_with_zip_leaves_only_the_archive() {
        let dir = tempdir().unwrap();
        let set: InputSet<RelaxSet> = InputSet::default()
            .with_input("INCAR", Content::file(KeyValueFile::new().with("ENCUT", 520).unwrap()))
            .with_input("KPOINTS", "Gamma\n");

        set.write_input(dir.path(), &WriteOptions::new().zip_inputs(true))
            .unwrap();
        assert_eq!(names_in(dir.path()), vec!["RelaxSet.zip"]);

        let file = fs::File::open(dir.path().join("RelaxSet.zip")).unwrap();
        let mut archive = ZipArchive::new(file).unwrap();
        let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["INCAR", "KPOINTS"]);

        for (filename, content) in &set {
            let mut text = String::new();
            archive
                .by_name(&filename.to_string_lossy())
                .unwrap()
                .read_to_string(&mut text)
                .unwrap();
            assert_eq!(text, content.render());
        }
    }

    #[test]
    fn plain_kind_has_no_directory_reader_or_validation() {
        let dir = tempdir().unwrap();
        match InputSet::<Plain>::from_directory(dir.path()).unwrap_err() {
            InputError::NotImplemented {
                operation,
                type_name,
            } => {
                assert_eq!(operation, "from_directory");
                assert_eq!(type_name, "InputSet");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = plain(&[("x", "1")]).validate().unwrap_err();
        assert_eq!(err.to_string(), "validate has not been implemented in InputSet");
    }

    #[test]
    fn concrete_kind_reads_back_what_it_wrote() {
        let dir = tempdir().unwrap();
        let set: InputSet<RelaxSet> = InputSet::default()
            .with_input("INCAR", Content::file(KeyValueFile::new().with("ENCUT", 520).unwrap()))
            .with_input("KPOINTS", "Gamma\n");
        set.write_input(dir.path(), &WriteOptions::default()).unwrap();

        let back = InputSet::<RelaxSet>::from_directory(dir.path()).unwrap();
        assert_eq!(back.name(), "RelaxSet");
        assert_eq!(back["INCAR"].render(), "ENCUT = 520\n");
        assert_eq!(back["KPOINTS"].render(), "Gamma\n");
        assert!(back.validate().unwrap());
    }

    #[test]
    fn structured_form_round_trips_through_toml_text() {
        let set = InputSet::<Plain>::default()
            .with_input("INCAR", Content::file(KeyValueFile::new().with("ENCUT", 520).unwrap()))
            .with_input("KPOINTS", "Gamma\n")
            .with_param("structure_id", "mp-149");

        let text = toml::to_string(&set.to_structured()).unwrap();
        let table: Table = toml::from_str(&text).unwrap();
        let registry = ContentRegistry::new().with::<KeyValueFile>();
        let back = InputSet::<Plain>::from_structured(&table, &registry).unwrap();

        assert_eq!(back.len(), 2);
        assert_eq!(back["INCAR"].file_ref::<KeyValueFile>().unwrap().get("ENCUT"), Some("520"));
        assert_eq!(back["KPOINTS"].as_text(), Some("Gamma\n"));
        assert_eq!(back.params(), set.params());
    }

    #[test]
    fn structured_form_requires_matching_kind_and_known_classes() {
        let set = InputSet::<Plain>::default()
            .with_input("INCAR", Content::file(KeyValueFile::new().with("ENCUT", 520).unwrap()));
        let table = set.to_structured();

        assert!(matches!(
            InputSet::<RelaxSet>::from_structured(&table, &ContentRegistry::new()),
            Err(InputError::ClassMismatch { expected: "RelaxSet", .. })
        ));
        assert!(matches!(
            InputSet::<Plain>::from_structured(&table, &ContentRegistry::new()),
            Err(InputError::UnknownContentClass(_))
        ));
    }
}
