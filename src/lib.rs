// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `wizfs` - Philips WiZ smart bulbs as a synthetic file tree.
//!
//! Every bulb listed in the network database gets a file. Reading the file
//! asks the bulb for its current state; writing the file sends it a command.
//!
//! # Reading
//!
//! A read sends `getPilot` and renders each field of the reply as a
//! `name=value` line:
//!
//! ```text
//! mac=a8bb50aabbcc
//! rssi=-55
//! state=true
//! sceneId=0
//! temp=2700
//! dimming=100
//! ```
//!
//! # Writing
//!
//! A write is either one of the words `on`, `off`, `pulse`, or a list of
//! `key=value` pairs sent as `setPilot` parameters:
//!
//! ```text
//! on
//! r=255 g=0 b=0 dimming=50
//! sceneId=4 speed=100
//! ```
//!
//! Errors reported by the bulb are passed back unchanged.
//!
//! # Mounting
//!
//! With the `fuse` feature on Linux, [`fuse::WizFuse`] serves the tree
//! through FUSE and `wizfs mount` mounts it:
//!
//! ```bash
//! wizfs mount -m /n -s wizfs
//! cat /n/wiz/kitchen
//! echo 'r=255 g=0 b=0' > /n/wiz/kitchen
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use wizfs::directory::{DeviceDirectory, NdbRegistry};
//! use wizfs::fs::{FileService, FsConfig, WizFs, WIZ_DIR_QID};
//! use wizfs::protocol::UdpTransport;
//!
//! #[tokio::main]
//! async fn main() -> wizfs::Result<()> {
//!     let registry = NdbRegistry::open(NdbRegistry::DEFAULT_PATH)?;
//!     let directory = Arc::new(DeviceDirectory::load(&registry)?);
//!     let fs = WizFs::new(directory, UdpTransport::new(), FsConfig::new());
//!
//!     let bulb = fs.walk(WIZ_DIR_QID, "kitchen")?;
//!     fs.write(bulb, b"dimming=40").await?;
//!     let status = fs.read(bulb, 0, 8192).await?;
//!     print!("{}", String::from_utf8_lossy(&status));
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod command;
pub mod directory;
pub mod error;
pub mod fs;
#[cfg(all(feature = "fuse", target_os = "linux"))]
pub mod fuse;
pub mod protocol;
pub mod response;
pub mod types;

pub use bridge::{ReadOutcome, RequestBridge};
pub use command::{Command, ParsedCommand, Query, Shortcut, compile};
pub use directory::{DeviceDirectory, DeviceEntry, NdbRegistry, Registry};
pub use error::{
    BridgeError, CommandError, DirectoryError, Error, FsError, ParseError, ProtocolError, Result,
};
pub use fs::{FileService, FsConfig, Stat, WizFs};
pub use protocol::{Transport, UdpConfig, UdpTransport};
pub use response::{DeviceReply, Flattened, flatten};
pub use types::DeviceName;
