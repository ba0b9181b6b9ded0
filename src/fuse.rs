// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! FUSE front end for the bulb file tree.
//!
//! [`WizFuse`] answers kernel requests from a [`FileService`]. Inode numbers
//! are qids shifted by one, so the tree root is the FUSE root. Reads and
//! writes of bulb files run as tasks on a tokio runtime and reply when the
//! bulb exchange finishes, so a slow bulb does not hold up other requests.
//!
//! Every open bulb file uses direct I/O: the kernel never caches contents
//! and each `read(2)` or `write(2)` reaches the bulb.

use std::ffi::OsStr;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use fuser::{
    FUSE_ROOT_ID, FileAttr, FileType, Filesystem, ReplyAttr, ReplyData, ReplyDirectory,
    ReplyEntry, ReplyOpen, ReplyWrite, Request, TimeOrNow,
};
use libc::{EACCES, EHOSTUNREACH, EINVAL, EIO, EISDIR, ENOENT, ENOTDIR, c_int};
use tokio::runtime::Handle;

use crate::error::{BridgeError, FsError};
use crate::fs::{FileService, Stat};

/// How long the kernel may cache names and attributes. The tree never
/// changes while mounted.
const TTL: Duration = Duration::from_secs(1);

/// Maps a FUSE inode to a qid.
#[must_use]
pub fn qid_of(ino: u64) -> u64 {
    ino.saturating_sub(FUSE_ROOT_ID)
}

/// Maps a qid to a FUSE inode.
#[must_use]
pub fn ino_of(qid: u64) -> u64 {
    qid + FUSE_ROOT_ID
}

/// Returns the errno reported for a failed request.
#[must_use]
pub fn errno(err: &FsError) -> c_int {
    match err {
        FsError::NotFound | FsError::Bridge(BridgeError::DeviceNotFound) => ENOENT,
        FsError::IsDirectory => EISDIR,
        FsError::PermissionDenied => EACCES,
        FsError::NotDirectory => ENOTDIR,
        FsError::Bridge(BridgeError::Unreachable(_)) => EHOSTUNREACH,
        FsError::Bridge(BridgeError::CommandBuild(_)) => EINVAL,
        FsError::Bridge(BridgeError::Device(_) | BridgeError::MalformedReply(_)) => EIO,
    }
}

/// Owner ids reported for every node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Owner {
    /// User id.
    pub uid: u32,
    /// Group id.
    pub gid: u32,
}

impl Owner {
    /// Returns the ids owning the running process, or root if they cannot
    /// be read.
    #[must_use]
    pub fn current() -> Self {
        use std::os::unix::fs::MetadataExt;

        std::fs::metadata("/proc/self")
            .map(|meta| Self {
                uid: meta.uid(),
                gid: meta.gid(),
            })
            .unwrap_or_default()
    }
}

/// Builds the FUSE attributes of a node.
#[must_use]
pub fn attr_of(stat: &Stat, owner: Owner) -> FileAttr {
    let (kind, nlink) = if stat.is_dir() {
        (FileType::Directory, 2)
    } else {
        (FileType::RegularFile, 1)
    };

    FileAttr {
        ino: ino_of(stat.qid),
        size: 0,
        blocks: 0,
        atime: SystemTime::UNIX_EPOCH,
        mtime: SystemTime::UNIX_EPOCH,
        ctime: SystemTime::UNIX_EPOCH,
        crtime: SystemTime::UNIX_EPOCH,
        kind,
        perm: u16::try_from(stat.mode & 0o777).unwrap_or_default(),
        nlink,
        uid: owner.uid,
        gid: owner.gid,
        rdev: 0,
        blksize: 512,
        flags: 0,
    }
}

/// A [`FileService`] mounted through FUSE.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use wizfs::directory::{DeviceDirectory, NdbRegistry};
/// use wizfs::fs::{FsConfig, WizFs};
/// use wizfs::fuse::{Owner, WizFuse};
/// use wizfs::protocol::UdpTransport;
///
/// # async fn example() -> wizfs::Result<()> {
/// let directory = DeviceDirectory::load(&NdbRegistry::open("/lib/ndb/local")?)?;
/// let fs = WizFs::new(Arc::new(directory), UdpTransport::new(), FsConfig::new());
///
/// let fuse = WizFuse::new(Arc::new(fs), tokio::runtime::Handle::current(), Owner::current());
/// let options = [fuser::MountOption::FSName("wizfs".to_string())];
/// let session = fuser::spawn_mount2(fuse, "/n", &options).expect("mount");
/// # drop(session);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct WizFuse<S> {
    service: Arc<S>,
    runtime: Handle,
    owner: Owner,
}

impl<S: FileService + 'static> WizFuse<S> {
    /// Creates the adapter. Bulb requests are spawned on `runtime`.
    #[must_use]
    pub fn new(service: Arc<S>, runtime: Handle, owner: Owner) -> Self {
        Self {
            service,
            runtime,
            owner,
        }
    }

    fn attr(&self, qid: u64) -> Result<FileAttr, FsError> {
        self.service.stat(qid).map(|stat| attr_of(&stat, self.owner))
    }
}

impl<S: FileService + 'static> Filesystem for WizFuse<S> {
    fn lookup(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let Some(name) = name.to_str() else {
            reply.error(ENOENT);
            return;
        };
        match self
            .service
            .walk(qid_of(parent), name)
            .and_then(|qid| self.attr(qid))
        {
            Ok(attr) => reply.entry(&TTL, &attr, 0),
            Err(e) => reply.error(errno(&e)),
        }
    }

    fn getattr(&mut self, _req: &Request<'_>, ino: u64, _fh: Option<u64>, reply: ReplyAttr) {
        match self.attr(qid_of(ino)) {
            Ok(attr) => reply.attr(&TTL, &attr),
            Err(e) => reply.error(errno(&e)),
        }
    }

    // Shell redirections truncate before writing; sizes are always zero,
    // so every attribute change is accepted and ignored.
    fn setattr(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _mode: Option<u32>,
        _uid: Option<u32>,
        _gid: Option<u32>,
        _size: Option<u64>,
        _atime: Option<TimeOrNow>,
        _mtime: Option<TimeOrNow>,
        _ctime: Option<SystemTime>,
        _fh: Option<u64>,
        _crtime: Option<SystemTime>,
        _chgtime: Option<SystemTime>,
        _bkuptime: Option<SystemTime>,
        _flags: Option<u32>,
        reply: ReplyAttr,
    ) {
        match self.attr(qid_of(ino)) {
            Ok(attr) if attr.kind == FileType::Directory => reply.error(EACCES),
            Ok(attr) => reply.attr(&TTL, &attr),
            Err(e) => reply.error(errno(&e)),
        }
    }

    fn open(&mut self, _req: &Request<'_>, ino: u64, _flags: i32, reply: ReplyOpen) {
        match self.service.stat(qid_of(ino)) {
            Ok(stat) if stat.is_dir() => reply.error(EISDIR),
            Ok(_) => reply.opened(0, fuser::consts::FOPEN_DIRECT_IO),
            Err(e) => reply.error(errno(&e)),
        }
    }

    fn read(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        let Ok(offset) = u64::try_from(offset) else {
            reply.error(EINVAL);
            return;
        };
        let service = Arc::clone(&self.service);
        self.runtime.spawn(async move {
            let count = usize::try_from(size).unwrap_or(usize::MAX);
            match service.read(qid_of(ino), offset, count).await {
                Ok(data) => reply.data(&data),
                Err(e) => {
                    tracing::warn!(ino, error = %e, "Read failed");
                    reply.error(errno(&e));
                }
            }
        });
    }

    fn write(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        _offset: i64,
        data: &[u8],
        _write_flags: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyWrite,
    ) {
        let service = Arc::clone(&self.service);
        let data = data.to_vec();
        self.runtime.spawn(async move {
            match service.write(qid_of(ino), &data).await {
                Ok(written) => reply.written(u32::try_from(written).unwrap_or(u32::MAX)),
                Err(e) => {
                    tracing::warn!(ino, error = %e, "Write failed");
                    reply.error(errno(&e));
                }
            }
        });
    }

    fn readdir(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        let qid = qid_of(ino);
        let children = match self.service.list(qid) {
            Ok(children) => children,
            Err(e) => {
                reply.error(errno(&e));
                return;
            }
        };
        let parent = self.service.walk(qid, "..").unwrap_or(qid);

        let entries = [
            (qid, FileType::Directory, ".".to_string()),
            (parent, FileType::Directory, "..".to_string()),
        ]
        .into_iter()
        .chain(children.into_iter().map(|stat| {
            let kind = if stat.is_dir() {
                FileType::Directory
            } else {
                FileType::RegularFile
            };
            (stat.qid, kind, stat.name)
        }));

        let skip = usize::try_from(offset).unwrap_or_default();
        for (i, (qid, kind, name)) in entries.enumerate().skip(skip) {
            let next = i64::try_from(i + 1).unwrap_or(i64::MAX);
            if reply.add(ino_of(qid), next, kind, name) {
                break;
            }
        }
        reply.ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::FIRST_FILE_QID;
    use crate::error::{CommandError, ProtocolError};
    use crate::fs::{DMDIR, ROOT_QID, WIZ_DIR_QID};

    #[test]
    fn root_qid_is_fuse_root() {
        assert_eq!(ino_of(ROOT_QID), FUSE_ROOT_ID);
        assert_eq!(qid_of(FUSE_ROOT_ID), ROOT_QID);
        assert_eq!(qid_of(ino_of(FIRST_FILE_QID)), FIRST_FILE_QID);
    }

    #[test]
    fn errors_map_to_errno() {
        assert_eq!(errno(&FsError::NotFound), ENOENT);
        assert_eq!(errno(&FsError::PermissionDenied), EACCES);
        assert_eq!(
            errno(&BridgeError::Unreachable(ProtocolError::Timeout(1000)).into()),
            EHOSTUNREACH
        );
        assert_eq!(
            errno(&BridgeError::CommandBuild(CommandError::Empty).into()),
            EINVAL
        );
        assert_eq!(
            errno(&BridgeError::Device("Invalid params".to_string()).into()),
            EIO
        );
    }

    #[test]
    fn bulb_file_attributes() {
        let stat = Stat {
            qid: FIRST_FILE_QID,
            name: "desk".to_string(),
            mode: 0o666,
            owner: "glenda".to_string(),
        };
        let attr = attr_of(&stat, Owner { uid: 1000, gid: 100 });
        assert_eq!(attr.ino, FIRST_FILE_QID + 1);
        assert_eq!(attr.kind, FileType::RegularFile);
        assert_eq!(attr.perm, 0o666);
        assert_eq!(attr.uid, 1000);
        assert_eq!(attr.size, 0);
    }

    #[test]
    fn directory_attributes() {
        let stat = Stat {
            qid: WIZ_DIR_QID,
            name: "wiz".to_string(),
            mode: DMDIR | 0o555,
            owner: "glenda".to_string(),
        };
        let attr = attr_of(&stat, Owner::default());
        assert_eq!(attr.kind, FileType::Directory);
        assert_eq!(attr.perm, 0o555);
        assert_eq!(attr.nlink, 2);
    }
}
