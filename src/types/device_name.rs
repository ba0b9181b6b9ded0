// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device name type.

use std::fmt;
use std::str::FromStr;

use crate::error::DirectoryError;

/// Name of a bulb as listed in the registry.
///
/// The same string is the network host name of the bulb and the name of its
/// file in the tree, so it must be usable as a single path element.
///
/// # Examples
///
/// ```
/// use wizfs::types::DeviceName;
///
/// let name = DeviceName::new("kitchen").unwrap();
/// assert_eq!(name.as_str(), "kitchen");
///
/// assert!(DeviceName::new("a/b").is_err());
/// assert!(DeviceName::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceName(String);

impl DeviceName {
    /// Creates a device name, rejecting values that are not a valid
    /// single path element.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::InvalidName` for empty names, `.`, `..`, or
    /// names containing `/` or whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, DirectoryError> {
        let name = name.into();
        let invalid = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.chars().any(char::is_whitespace);
        if invalid {
            return Err(DirectoryError::InvalidName(name));
        }
        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DeviceName {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for DeviceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
