// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reader for the Plan 9 network database (`ndb`) text format.
//!
//! An entry starts on a line beginning in column 0 and continues over the
//! following indented lines. Each entry is a list of `attr=value` tuples:
//!
//! ```text
//! # bulbs
//! sys=kitchen wiz=bulb
//!     ip=192.168.1.40
//! sys=porch ether=a8bb50aabbcc wiz=bulb
//! ```
//!
//! Bulbs are the entries holding `wiz=bulb`; their name is the `sys` value.
//!
//! A file may name the files making up the whole database in a `database`
//! entry. They are searched in the order listed; the opened file sits where
//! it is listed, or first when it is not. Relative names are taken from the
//! opened file's directory, and listed files that cannot be read are
//! skipped:
//!
//! ```text
//! database=
//!     file=/lib/ndb/local
//!     file=/lib/ndb/common
//! ```

use std::path::{Path, PathBuf};

use crate::directory::Registry;
use crate::error::DirectoryError;

/// Attribute and value marking an entry as a bulb.
const BULB_TUPLE: (&str, &str) = ("wiz", "bulb");

/// Attribute holding the system name.
const SYS_ATTR: &str = "sys";

/// Attribute of the entry listing the database files.
const DATABASE_ATTR: &str = "database";

/// Attribute naming one database file.
const FILE_ATTR: &str = "file";

/// One `attr=value` pair. Bare attributes have an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NdbTuple {
    /// Attribute name.
    pub attr: String,
    /// Attribute value.
    pub value: String,
}

/// One database entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NdbEntry {
    tuples: Vec<NdbTuple>,
}

impl NdbEntry {
    /// Returns the tuples in file order.
    #[must_use]
    pub fn tuples(&self) -> &[NdbTuple] {
        &self.tuples
    }

    /// Returns the first value of `attr`.
    #[must_use]
    pub fn value(&self, attr: &str) -> Option<&str> {
        self.tuples
            .iter()
            .find(|t| t.attr == attr)
            .map(|t| t.value.as_str())
    }

    /// Returns `true` if the entry holds the exact tuple.
    #[must_use]
    pub fn has(&self, attr: &str, value: &str) -> bool {
        self.tuples.iter().any(|t| t.attr == attr && t.value == value)
    }
}

/// An `ndb` file read into memory.
///
/// # Examples
///
/// ```
/// use wizfs::directory::{NdbRegistry, Registry};
///
/// let registry = NdbRegistry::from_text("sys=desk wiz=bulb ip=10.0.0.9\n");
/// assert_eq!(registry.bulbs().unwrap(), ["desk"]);
/// ```
#[derive(Debug, Clone)]
pub struct NdbRegistry {
    path: Option<PathBuf>,
    entries: Vec<NdbEntry>,
}

impl NdbRegistry {
    /// Default location of the local network database.
    pub const DEFAULT_PATH: &'static str = "/lib/ndb/local";

    /// Reads and parses an `ndb` file and the files its `database` entry
    /// lists.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Unavailable` if the file itself cannot be
    /// read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DirectoryError::Unavailable {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Read ndb file");

        let own = parse(&text);
        let files = database_files(&own);
        if files.is_empty() {
            return Ok(Self {
                path: Some(path.to_path_buf()),
                entries: own,
            });
        }

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let mut own = Some(own);
        let mut entries = Vec::new();
        for file in files {
            let file = base.join(file);
            if file == path {
                entries.extend(own.take().unwrap_or_default());
                continue;
            }
            match std::fs::read_to_string(&file) {
                Ok(text) => {
                    tracing::debug!(path = %file.display(), "Read ndb file");
                    entries.extend(parse(&text));
                }
                Err(e) => {
                    tracing::warn!(path = %file.display(), error = %e, "Skipping ndb file");
                }
            }
        }
        if let Some(mut own) = own {
            own.append(&mut entries);
            entries = own;
        }

        Ok(Self {
            path: Some(path.to_path_buf()),
            entries,
        })
    }

    /// Parses `ndb` text held in memory.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            path: None,
            entries: parse(text),
        }
    }

    /// Returns the file this registry was read from, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns all entries in file order.
    #[must_use]
    pub fn entries(&self) -> &[NdbEntry] {
        &self.entries
    }

    /// Returns the entries holding `attr=value`, in file order.
    pub fn search<'a>(
        &'a self,
        attr: &'a str,
        value: &'a str,
    ) -> impl Iterator<Item = &'a NdbEntry> {
        self.entries.iter().filter(move |e| e.has(attr, value))
    }
}

impl Registry for NdbRegistry {
    fn bulbs(&self) -> Result<Vec<String>, DirectoryError> {
        let (attr, value) = BULB_TUPLE;
        Ok(self
            .search(attr, value)
            .filter_map(|entry| {
                entry
                    .value(SYS_ATTR)
                    .or_else(|| entry.tuples.first().map(|t| t.value.as_str()))
                    .map(str::to_string)
            })
            .collect())
    }
}

// `file=` values of the first `database` entry.
fn database_files(entries: &[NdbEntry]) -> Vec<PathBuf> {
    entries
        .iter()
        .find(|e| e.tuples.iter().any(|t| t.attr == DATABASE_ATTR))
        .map(|e| {
            e.tuples
                .iter()
                .filter(|t| t.attr == FILE_ATTR && !t.value.is_empty())
                .map(|t| PathBuf::from(&t.value))
                .collect()
        })
        .unwrap_or_default()
}

fn parse(text: &str) -> Vec<NdbEntry> {
    let mut entries: Vec<NdbEntry> = Vec::new();

    for line in text.lines() {
        let tuples = parse_line(line);
        if tuples.is_empty() {
            continue;
        }
        let continuation = line.starts_with([' ', '\t']);
        match entries.last_mut() {
            Some(entry) if continuation => entry.tuples.extend(tuples),
            _ => entries.push(NdbEntry { tuples }),
        }
    }

    entries
}

fn parse_line(line: &str) -> Vec<NdbTuple> {
    let mut tuples = Vec::new();
    let mut rest = line;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() || rest.starts_with('#') {
            break;
        }

        let attr_end = rest
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(rest.len());
        let attr = &rest[..attr_end];
        rest = &rest[attr_end..];

        let value = if let Some(after_eq) = rest.strip_prefix('=') {
            let (value, remaining) = split_value(after_eq);
            rest = remaining;
            value
        } else {
            String::new()
        };

        if !attr.is_empty() {
            tuples.push(NdbTuple {
                attr: attr.to_string(),
                value,
            });
        }
    }

    tuples
}

fn split_value(s: &str) -> (String, &str) {
    if let Some(quoted) = s.strip_prefix('"') {
        return match quoted.find('"') {
            Some(end) => (quoted[..end].to_string(), &quoted[end + 1..]),
            None => (quoted.to_string(), ""),
        };
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    (s[..end].to_string(), &s[end..])
}
