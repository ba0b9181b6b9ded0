// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport for exchanging datagrams with WiZ bulbs.
//!
//! Bulbs listen for JSON requests on UDP port 38899 and answer each one with
//! a single datagram. An exchange is one send followed by one bounded wait
//! for the reply; nothing is retried.
//!
//! - [`UdpTransport`]: the network implementation
//! - [`Transport`]: the seam used by the request bridge

mod udp;

pub use udp::{UdpConfig, UdpTransport};

use std::future::Future;

use crate::error::ProtocolError;
use crate::types::DeviceName;

/// Trait for sending one request to a bulb and collecting its reply.
pub trait Transport: Send + Sync {
    /// Sends `payload` to `device` once and waits for one reply.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the device cannot be resolved or contacted,
    /// does not answer in time, or answers with an empty datagram. All of
    /// these mean the bulb is unreachable.
    fn exchange(
        &self,
        device: &DeviceName,
        payload: &str,
    ) -> impl Future<Output = Result<Vec<u8>, ProtocolError>> + Send;
}
