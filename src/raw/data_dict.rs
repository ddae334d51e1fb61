//! Variant dictionaries: every public read returns one.

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use super::records::RawVersion;
use crate::util::Error;

/// Parallel instance of a record kind computed under different settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variant {
    /// The primary result, key `"default"`.
    Default,
    /// Results on the alternate k-point grid, key `"kpoints_opt"`.
    KpointsOpt,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Default, Variant::KpointsOpt];

    /// Dictionary key.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::KpointsOpt => "kpoints_opt",
        }
    }

    /// Suffix appended to `results/...` group names.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Default => "",
            Self::KpointsOpt => "_kpoints_opt",
        }
    }

    /// Input namespace holding the k-point generation settings.
    pub const fn kpoints_input(self) -> &'static str {
        match self {
            Self::Default => "input/kpoints",
            Self::KpointsOpt => "input/kpoints_opt",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| Error::other(format!("unknown variant {:?}", s)))
    }
}

/// Named variants of one record kind, tagged with the store's version.
///
/// The keys are fixed per kind and always include `"default"`. A variant
/// that was not computed keeps its key with a `None` value.
#[derive(Clone, Debug, PartialEq)]
pub struct DataDict<T> {
    entries: Vec<(Variant, Option<T>)>,
    version: RawVersion,
}

impl<T> DataDict<T> {
    pub(crate) fn new(entries: Vec<(Variant, Option<T>)>, version: RawVersion) -> Self {
        debug_assert!(entries.iter().any(|(v, _)| *v == Variant::Default));
        Self { entries, version }
    }

    /// Version of the program that wrote the store.
    pub fn version(&self) -> &RawVersion {
        &self.version
    }

    /// Record for `variant`, `None` if absent or not a key of this kind.
    pub fn get(&self, variant: Variant) -> Option<&T> {
        self.entries
            .iter()
            .find(|(v, _)| *v == variant)
            .and_then(|(_, record)| record.as_ref())
    }

    /// The `"default"` record.
    pub fn primary(&self) -> Option<&T> {
        self.get(Variant::Default)
    }

    /// Look up by key name. The outer `None` means the key does not exist
    /// for this kind; `Some(None)` means the variant is absent.
    pub fn entry(&self, name: &str) -> Option<Option<&T>> {
        self.entries
            .iter()
            .find(|(v, _)| v.name() == name)
            .map(|(_, record)| record.as_ref())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.iter().any(|(v, _)| v.name() == name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(v, _)| v.name())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Variant, Option<&T>)> + '_ {
        self.entries.iter().map(|(v, record)| (*v, record.as_ref()))
    }

    /// Number of keys, present or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move the record for `variant` out of the dictionary.
    pub fn take(self, variant: Variant) -> Option<T> {
        self.entries
            .into_iter()
            .find(|(v, _)| *v == variant)
            .and_then(|(_, record)| record)
    }

    /// Transform present records, keeping keys and version.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> DataDict<U> {
        DataDict {
            entries: self
                .entries
                .into_iter()
                .map(|(v, record)| (v, record.map(&mut f)))
                .collect(),
            version: self.version,
        }
    }
}

impl<T> Index<&str> for DataDict<T> {
    type Output = Option<T>;

    /// Panics if `name` is not a key of this kind.
    fn index(&self, name: &str) -> &Option<T> {
        match self.entries.iter().find(|(v, _)| v.name() == name) {
            Some((_, record)) => record,
            None => panic!("no variant {:?} in this dictionary", name),
        }
    }
}

impl<T> IntoIterator for DataDict<T> {
    type Item = (Variant, Option<T>);
    type IntoIter = std::vec::IntoIter<(Variant, Option<T>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
