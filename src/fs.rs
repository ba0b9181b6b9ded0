// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The synthetic file tree.
//!
//! ```text
//! /            qid 0, dr-xr-xr-x
//! /wiz         qid 1, dr-xr-xr-x
//! /wiz/<bulb>  qid 2.., rw-rw-rw-
//! ```
//!
//! A file-serving protocol layer drives the tree through [`FileService`]:
//! it walks names to qids, and forwards reads and writes on bulb files,
//! which [`WizFs`] hands to the [`RequestBridge`].

use std::future::Future;
use std::sync::Arc;

use crate::bridge::RequestBridge;
use crate::directory::{DeviceDirectory, DeviceEntry};
use crate::error::FsError;
use crate::protocol::Transport;

/// Qid path of the root directory.
pub const ROOT_QID: u64 = 0;

/// Qid path of the bulb directory.
pub const WIZ_DIR_QID: u64 = 1;

/// Name of the bulb directory.
pub const WIZ_DIR_NAME: &str = "wiz";

/// Directory bit of a file mode.
pub const DMDIR: u32 = 0x8000_0000;

/// Permission bits of both directories.
const DIR_PERM: u32 = 0o555;

/// Metadata of one node of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    /// Qid path.
    pub qid: u64,
    /// File name; `/` for the root.
    pub name: String,
    /// Mode bits, including [`DMDIR`] for directories.
    pub mode: u32,
    /// Owning user.
    pub owner: String,
}

impl Stat {
    /// Returns `true` for directories.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.mode & DMDIR != 0
    }
}

/// Configuration of the file tree.
///
/// # Examples
///
/// ```
/// use wizfs::fs::FsConfig;
///
/// let config = FsConfig::new().with_owner("glenda");
/// assert_eq!(config.owner(), "glenda");
/// ```
#[derive(Debug, Clone)]
pub struct FsConfig {
    owner: String,
}

impl FsConfig {
    /// Owner used when none is configured and `$USER` is unset.
    pub const DEFAULT_OWNER: &'static str = "none";

    /// Creates a configuration owned by the current user.
    #[must_use]
    pub fn new() -> Self {
        Self {
            owner: std::env::var("USER").unwrap_or_else(|_| Self::DEFAULT_OWNER.to_string()),
        }
    }

    /// Sets the owner of every node.
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// Returns the owner of every node.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }
}

impl Default for FsConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Operations a file-serving protocol layer needs from the tree.
pub trait FileService: Send + Sync {
    /// Returns the metadata of a node.
    ///
    /// # Errors
    ///
    /// Returns `FsError::NotFound` for unknown qids.
    fn stat(&self, qid: u64) -> Result<Stat, FsError>;

    /// Resolves `name` inside the directory `parent`.
    ///
    /// `..` resolves to the parent directory.
    ///
    /// # Errors
    ///
    /// Returns `FsError::NotDirectory` if `parent` is a file and
    /// `FsError::NotFound` if no such entry exists.
    fn walk(&self, parent: u64, name: &str) -> Result<u64, FsError>;

    /// Lists the entries of a directory.
    ///
    /// # Errors
    ///
    /// Returns `FsError::NotDirectory` for files.
    fn list(&self, qid: u64) -> Result<Vec<Stat>, FsError>;

    /// Reads up to `count` bytes at `offset` of a file.
    ///
    /// # Errors
    ///
    /// Returns `FsError::IsDirectory` for directories, or the bulb error.
    fn read(
        &self,
        qid: u64,
        offset: u64,
        count: usize,
    ) -> impl Future<Output = Result<Vec<u8>, FsError>> + Send;

    /// Writes `data` to a file, returning the number of bytes accepted.
    ///
    /// # Errors
    ///
    /// Returns `FsError::PermissionDenied` for directories, or the bulb
    /// error.
    fn write(&self, qid: u64, data: &[u8]) -> impl Future<Output = Result<usize, FsError>> + Send;
}

/// The bulb file tree.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use wizfs::directory::{DeviceDirectory, NdbRegistry};
/// use wizfs::fs::{FileService, FsConfig, WizFs, WIZ_DIR_QID};
/// use wizfs::protocol::UdpTransport;
///
/// # async fn example() -> wizfs::Result<()> {
/// let directory = DeviceDirectory::load(&NdbRegistry::open("/lib/ndb/local")?)?;
/// let fs = WizFs::new(Arc::new(directory), UdpTransport::new(), FsConfig::new());
///
/// let qid = fs.walk(WIZ_DIR_QID, "kitchen")?;
/// fs.write(qid, b"on").await?;
/// let status = fs.read(qid, 0, 8192).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct WizFs<T> {
    bridge: RequestBridge<T>,
    config: FsConfig,
}

impl<T: Transport> WizFs<T> {
    /// Creates the tree for a loaded directory.
    #[must_use]
    pub fn new(directory: Arc<DeviceDirectory>, transport: T, config: FsConfig) -> Self {
        Self {
            bridge: RequestBridge::new(directory, transport),
            config,
        }
    }

    /// Returns the request bridge.
    #[must_use]
    pub fn bridge(&self) -> &RequestBridge<T> {
        &self.bridge
    }

    fn directory(&self) -> &DeviceDirectory {
        self.bridge.directory()
    }

    fn dir_stat(&self, qid: u64, name: &str) -> Stat {
        Stat {
            qid,
            name: name.to_string(),
            mode: DMDIR | DIR_PERM,
            owner: self.config.owner.clone(),
        }
    }

    fn file_stat(&self, entry: &DeviceEntry) -> Stat {
        Stat {
            qid: entry.qid(),
            name: entry.name().to_string(),
            mode: entry.perm(),
            owner: self.config.owner.clone(),
        }
    }

    fn file_entry(&self, qid: u64) -> Result<&DeviceEntry, FsError> {
        match qid {
            ROOT_QID | WIZ_DIR_QID => Err(FsError::IsDirectory),
            _ => self.directory().by_qid(qid).ok_or(FsError::NotFound),
        }
    }
}

impl<T: Transport> FileService for WizFs<T> {
    fn stat(&self, qid: u64) -> Result<Stat, FsError> {
        match qid {
            ROOT_QID => Ok(self.dir_stat(ROOT_QID, "/")),
            WIZ_DIR_QID => Ok(self.dir_stat(WIZ_DIR_QID, WIZ_DIR_NAME)),
            _ => self
                .directory()
                .by_qid(qid)
                .map(|entry| self.file_stat(entry))
                .ok_or(FsError::NotFound),
        }
    }

    fn walk(&self, parent: u64, name: &str) -> Result<u64, FsError> {
        match (parent, name) {
            (ROOT_QID | WIZ_DIR_QID, "..") | (ROOT_QID, ".") => Ok(ROOT_QID),
            (ROOT_QID, WIZ_DIR_NAME) | (WIZ_DIR_QID, ".") => Ok(WIZ_DIR_QID),
            (ROOT_QID, _) => Err(FsError::NotFound),
            (WIZ_DIR_QID, _) => self
                .directory()
                .by_name(name)
                .map(DeviceEntry::qid)
                .ok_or(FsError::NotFound),
            _ => {
                self.stat(parent)?;
                Err(FsError::NotDirectory)
            }
        }
    }

    fn list(&self, qid: u64) -> Result<Vec<Stat>, FsError> {
        match qid {
            ROOT_QID => Ok(vec![self.dir_stat(WIZ_DIR_QID, WIZ_DIR_NAME)]),
            WIZ_DIR_QID => Ok(self
                .directory()
                .iter()
                .map(|entry| self.file_stat(entry))
                .collect()),
            _ => {
                self.stat(qid)?;
                Err(FsError::NotDirectory)
            }
        }
    }

    async fn read(&self, qid: u64, offset: u64, count: usize) -> Result<Vec<u8>, FsError> {
        self.file_entry(qid)?;

        let content = self.bridge.read(qid).await.into_result()?;
        let bytes = content.as_bytes();
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(bytes.len());
        let end = start.saturating_add(count).min(bytes.len());
        Ok(bytes[start..end].to_vec())
    }

    async fn write(&self, qid: u64, data: &[u8]) -> Result<usize, FsError> {
        match self.file_entry(qid) {
            Err(FsError::IsDirectory) => return Err(FsError::PermissionDenied),
            other => other?,
        };

        let input = String::from_utf8_lossy(data);
        self.bridge.write(qid, &input).await?;
        Ok(data.len())
    }
}
