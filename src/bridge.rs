// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-request glue between bulb files and bulbs.
//!
//! A read sends the status query and flattens the reply. A write compiles
//! the payload, sends it, and reports the device error if there is one.
//! Every request is independent: no caching, no retries, no shared
//! connection.

use std::sync::Arc;

use crate::command::{Command, Query, compile};
use crate::directory::DeviceDirectory;
use crate::error::BridgeError;
use crate::protocol::Transport;
use crate::response::{DeviceReply, flatten};
use crate::types::DeviceName;

/// Result of a read.
///
/// The content stays available when an error is reported, matching a
/// protocol layer that fills the read buffer before answering.
#[derive(Debug, Default)]
pub struct ReadOutcome {
    /// Flattened `name=value` lines.
    pub content: String,
    /// Error to report for this read.
    pub error: Option<BridgeError>,
}

impl ReadOutcome {
    fn failed(error: BridgeError) -> Self {
        Self {
            content: String::new(),
            error: Some(error),
        }
    }

    /// Returns the content, or the error if one was reported.
    ///
    /// # Errors
    ///
    /// Returns the reported `BridgeError`.
    pub fn into_result(self) -> Result<String, BridgeError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.content),
        }
    }
}

/// Request handler shared by all files of the tree.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use wizfs::bridge::RequestBridge;
/// use wizfs::directory::{DeviceDirectory, NdbRegistry};
/// use wizfs::protocol::UdpTransport;
///
/// # async fn example() -> wizfs::Result<()> {
/// let directory = DeviceDirectory::load(&NdbRegistry::open("/lib/ndb/local")?)?;
/// let bridge = RequestBridge::new(Arc::new(directory), UdpTransport::new());
///
/// if let Some(entry) = bridge.directory().by_name("kitchen") {
///     bridge.write(entry.qid(), "dimming=30").await?;
///     println!("{}", bridge.read(entry.qid()).await.into_result()?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RequestBridge<T> {
    directory: Arc<DeviceDirectory>,
    transport: T,
}

impl<T: Transport> RequestBridge<T> {
    /// Creates a bridge over a loaded directory.
    #[must_use]
    pub fn new(directory: Arc<DeviceDirectory>, transport: T) -> Self {
        Self {
            directory,
            transport,
        }
    }

    /// Returns the device directory.
    #[must_use]
    pub fn directory(&self) -> &DeviceDirectory {
        &self.directory
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Reads the current state of the bulb behind a file.
    pub async fn read(&self, qid: u64) -> ReadOutcome {
        self.query(qid, Query::Pilot).await
    }

    /// Reads the system configuration of the bulb behind a file.
    pub async fn system_config(&self, qid: u64) -> ReadOutcome {
        self.query(qid, Query::SystemConfig).await
    }

    /// Compiles `input` and sends it to the bulb behind a file.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::CommandBuild` without contacting the bulb if
    /// the payload does not compile, `BridgeError::Unreachable` if the bulb
    /// does not answer, and `BridgeError::Device` with the bulb's message if
    /// it rejects the command.
    pub async fn write(&self, qid: u64, input: &str) -> Result<(), BridgeError> {
        let device = self.resolve(qid)?;
        let payload = compile(input).map_err(BridgeError::CommandBuild)?;
        let reply = self.call(device, &payload).await?;

        match reply.error_message() {
            Some(message) => {
                tracing::debug!(
                    device = %device,
                    code = ?reply.error_code(),
                    message = %message,
                    "Bulb rejected command"
                );
                Err(BridgeError::Device(message.to_string()))
            }
            None => Ok(()),
        }
    }

    async fn query(&self, qid: u64, query: Query) -> ReadOutcome {
        let device = match self.resolve(qid) {
            Ok(device) => device,
            Err(e) => return ReadOutcome::failed(e),
        };
        tracing::debug!(device = %device, method = query.method(), "Querying bulb");
        let reply = match self.call(device, &query.to_payload()).await {
            Ok(reply) => reply,
            Err(e) => return ReadOutcome::failed(e),
        };

        let flat = flatten(&reply);
        ReadOutcome {
            content: flat.text(),
            error: flat.error.map(BridgeError::Device),
        }
    }

    fn resolve(&self, qid: u64) -> Result<&DeviceName, BridgeError> {
        self.directory
            .by_qid(qid)
            .map(|entry| entry.name())
            .ok_or(BridgeError::DeviceNotFound)
    }

    async fn call(&self, device: &DeviceName, payload: &str) -> Result<DeviceReply, BridgeError> {
        let bytes = self
            .transport
            .exchange(device, payload)
            .await
            .map_err(BridgeError::Unreachable)?;
        let reply = DeviceReply::parse(&bytes).map_err(BridgeError::MalformedReply)?;
        tracing::debug!(
            device = %device,
            method = reply.method().unwrap_or_default(),
            env = reply.env().unwrap_or_default(),
            "Bulb replied"
        );
        Ok(reply)
    }
}
