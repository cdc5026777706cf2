//! Named fragments and the external bases they may extend.

use std::collections::BTreeMap;

use crate::conf;
use crate::error::{Error, Result};
use crate::fragment::Fragment;

#[derive(Debug, Clone)]
enum Entry {
    Fragment(Fragment),
    External,
}

/// What a registered name stands for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Fragment(&'a Fragment),
    /// Resolved by the consumer tool; carried through as-is.
    External,
}

/// Registry of immutable fragments.
///
/// Nothing is ever replaced or removed, so a shared `&Registry` can be read
/// from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: BTreeMap<String, Entry>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in presets and the external bases they
    /// extend.
    ///
    /// # Panics
    /// Panics only if an embedded preset fails to parse, which indicates a
    /// programming error.
    #[must_use]
    pub fn builtin() -> Self {
        let mut reg = Self::new();
        for name in conf::EXTERNAL_BASES {
            reg.declare_external(name)
                .expect("external base names are distinct");
        }
        for name in conf::NAMES {
            let text = conf::builtin(name).expect("every listed preset is embedded");
            let frag = Fragment::from_yaml_str(name, text).expect("builtin preset must parse");
            reg.register(name, frag)
                .expect("builtin preset names are distinct");
        }
        reg
    }

    /// Add a fragment under `name`.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateName`] when `name` is already taken by a
    /// fragment or an external base.
    pub fn register(&mut self, name: &str, fragment: Fragment) -> Result<()> {
        self.insert(name, Entry::Fragment(fragment))
    }

    /// Declare a base that fragments may extend but which the consumer tool
    /// resolves itself.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateName`] when `name` is already taken.
    pub fn declare_external(&mut self, name: &str) -> Result<()> {
        self.insert(name, Entry::External)
    }

    fn insert(&mut self, name: &str, entry: Entry) -> Result<()> {
        if self.entries.contains_key(name) {
            return Err(Error::DuplicateName {
                name: name.to_owned(),
            });
        }
        tracing::trace!(name, "registered");
        self.entries.insert(name.to_owned(), entry);
        Ok(())
    }

    /// Look up a fragment by name.
    ///
    /// # Errors
    /// Returns [`Error::UnknownFragment`] when no fragment has that name.
    /// External bases are not fragments and miss here too; use [`lookup`]
    /// to tell them apart.
    ///
    /// [`lookup`]: Self::lookup
    pub fn resolve(&self, name: &str) -> Result<&Fragment> {
        match self.lookup(name)? {
            Lookup::Fragment(frag) => Ok(frag),
            Lookup::External => Err(unknown(name)),
        }
    }

    /// Look up any registered name.
    ///
    /// # Errors
    /// Returns [`Error::UnknownFragment`] when the name is not registered.
    pub fn lookup(&self, name: &str) -> Result<Lookup<'_>> {
        match self.entries.get(name) {
            Some(Entry::Fragment(frag)) => Ok(Lookup::Fragment(frag)),
            Some(Entry::External) => Ok(Lookup::External),
            None => Err(unknown(name)),
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn is_external(&self, name: &str) -> bool {
        matches!(self.entries.get(name), Some(Entry::External))
    }

    /// Every registered name, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Fragment names only, sorted.
    pub fn fragment_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, entry)| matches!(entry, Entry::Fragment(_)))
            .map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn unknown(name: &str) -> Error {
    Error::UnknownFragment {
        name: name.to_owned(),
        referenced_by: None,
    }
}
