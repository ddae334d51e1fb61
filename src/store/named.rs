//! Named groups and path resolution.
//!
//! Child 0 of every named group is a data block with the NUL-terminated
//! names of the remaining children, in order. Paths are `/`-separated
//! sequences of those names starting at the root group.

use super::format::NAME_TABLE_INDEX;
use super::reader::{IChild, IGroup};
use crate::util::{Error, Result};

/// Split a buffer of NUL-terminated UTF-8 strings.
///
/// A missing terminator after the last string is tolerated.
pub fn split_strings(bytes: &[u8]) -> Result<Vec<String>> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    let body = bytes.strip_suffix(&[0]).unwrap_or(bytes);
    body.split(|&b| b == 0)
        .map(|s| String::from_utf8(s.to_vec()).map_err(Error::from))
        .collect()
}

/// A group whose children are addressed by name.
pub struct INamedGroup<'a> {
    group: IGroup<'a>,
    names: Vec<String>,
}

impl<'a> INamedGroup<'a> {
    pub fn new(group: IGroup<'a>) -> Result<Self> {
        if group.is_empty() {
            return Ok(Self { group, names: Vec::new() });
        }
        let table = group.data(NAME_TABLE_INDEX)?;
        let names = split_strings(&table.read_all()?)?;
        if names.len() as u64 + 1 != group.num_children() {
            return Err(Error::invalid(format!(
                "group at {} names {} of {} children",
                group.pos(),
                names.len(),
                group.num_children() - 1
            )));
        }
        Ok(Self { group, names })
    }

    #[inline]
    pub fn group(&self) -> &IGroup<'a> {
        &self.group
    }

    /// Child names in storage order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Look up a direct child by name.
    pub fn child_by_name(&self, name: &str) -> Result<Option<IChild<'a>>> {
        match self.names.iter().position(|n| n == name) {
            Some(i) => Ok(Some(self.group.child(i as u64 + 1)?)),
            None => Ok(None),
        }
    }

    /// Iterate over `(name, child)` pairs.
    pub fn entries(&self) -> impl Iterator<Item = Result<(&str, IChild<'a>)>> + '_ {
        self.names
            .iter()
            .enumerate()
            .map(move |(i, name)| Ok((name.as_str(), self.group.child(i as u64 + 1)?)))
    }
}

/// Resolve a `/`-separated path below `root`.
///
/// Returns `Ok(None)` when any segment does not exist or when a dataset is
/// used as an intermediate segment. An empty path resolves to the root.
pub fn resolve<'a>(root: IGroup<'a>, path: &str) -> Result<Option<IChild<'a>>> {
    let mut current = IChild::Group(root);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        let group = match current {
            IChild::Group(g) => g,
            IChild::Data(_) => return Ok(None),
        };
        match INamedGroup::new(group)?.child_by_name(segment)? {
            Some(child) => current = child,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_strings() {
        assert_eq!(split_strings(b"").unwrap(), Vec::<String>::new());
        assert_eq!(split_strings(b"a\0bc\0").unwrap(), vec!["a", "bc"]);
        assert_eq!(split_strings(b"a\0bc").unwrap(), vec!["a", "bc"]);
        assert_eq!(split_strings(b"\0").unwrap(), vec![""]);
    }

    #[test]
    fn test_split_strings_rejects_bad_utf8() {
        assert!(matches!(split_strings(&[0xff, 0xfe, 0]), Err(Error::Utf8(_))));
    }
}
