// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device directory loading.
//!
//! The set of bulbs is read once at startup from a [`Registry`] and frozen
//! into a [`DeviceDirectory`]. Each bulb gets one file node, identified by a
//! qid path, that the request bridge resolves back to the bulb name on every
//! request.
//!
//! # Examples
//!
//! ```
//! use wizfs::directory::{DeviceDirectory, NdbRegistry};
//!
//! let registry = NdbRegistry::from_text(
//!     "sys=kitchen wiz=bulb\n\
//!      sys=printer\n\
//!      sys=porch wiz=bulb\n",
//! );
//!
//! let directory = DeviceDirectory::load(&registry).unwrap();
//! let names: Vec<&str> = directory.iter().map(|e| e.name().as_str()).collect();
//! assert_eq!(names, ["kitchen", "porch"]);
//! ```

mod ndb;

pub use ndb::{NdbEntry, NdbRegistry, NdbTuple};

use crate::error::DirectoryError;
use crate::types::DeviceName;

/// Qid path of the first bulb file; lower paths belong to directories.
pub const FIRST_FILE_QID: u64 = 2;

/// Permission bits of a bulb file (read/write for everyone).
pub const FILE_PERM: u32 = 0o666;

/// A source of bulb names.
///
/// Implementations return the system names of every entry tagged as a bulb,
/// in registry order, without deduplication.
pub trait Registry {
    /// Returns the names of all registered bulbs.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Unavailable` if the registry cannot be read.
    fn bulbs(&self) -> Result<Vec<String>, DirectoryError>;
}

/// Reads the bulb names from a registry.
///
/// Names that cannot be used as a file name are skipped with a warning.
///
/// # Errors
///
/// Returns an error if the registry itself is unavailable.
pub fn load(registry: &impl Registry) -> Result<Vec<DeviceName>, DirectoryError> {
    let names = registry
        .bulbs()?
        .into_iter()
        .filter_map(|raw| match DeviceName::new(raw) {
            Ok(name) => Some(name),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping registry entry");
                None
            }
        })
        .collect();
    Ok(names)
}

/// One bulb bound to its file node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEntry {
    name: DeviceName,
    qid: u64,
    perm: u32,
}

impl DeviceEntry {
    /// Returns the bulb name, which is also the file name.
    #[must_use]
    pub fn name(&self) -> &DeviceName {
        &self.name
    }

    /// Returns the qid path of the bulb's file.
    #[must_use]
    pub fn qid(&self) -> u64 {
        self.qid
    }

    /// Returns the permission bits of the bulb's file.
    #[must_use]
    pub fn perm(&self) -> u32 {
        self.perm
    }
}

/// The immutable set of exposed bulbs.
///
/// Built once at startup and shared read-only between requests.
#[derive(Debug, Clone, Default)]
pub struct DeviceDirectory {
    entries: Vec<DeviceEntry>,
}

impl DeviceDirectory {
    /// Binds each name to a file node, keeping the given order.
    #[must_use]
    pub fn new(names: impl IntoIterator<Item = DeviceName>) -> Self {
        let entries = names
            .into_iter()
            .zip(FIRST_FILE_QID..)
            .map(|(name, qid)| DeviceEntry {
                name,
                qid,
                perm: FILE_PERM,
            })
            .collect();
        Self { entries }
    }

    /// Loads the directory from a registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry is unavailable.
    pub fn load(registry: &impl Registry) -> Result<Self, DirectoryError> {
        let directory = Self::new(load(registry)?);
        tracing::info!(bulbs = directory.len(), "Loaded device directory");
        Ok(directory)
    }

    /// Returns the entries in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &DeviceEntry> {
        self.entries.iter()
    }

    /// Returns the number of bulbs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no bulbs were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds the entry owning a qid path.
    #[must_use]
    pub fn by_qid(&self, qid: u64) -> Option<&DeviceEntry> {
        let index = usize::try_from(qid.checked_sub(FIRST_FILE_QID)?).ok()?;
        self.entries.get(index)
    }

    /// Finds the first entry with the given name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&DeviceEntry> {
        self.entries.iter().find(|e| e.name.as_str() == name)
    }
}
