// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! UDP transport implementation for WiZ bulbs.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use tokio::net::{UdpSocket, lookup_host};

use crate::error::ProtocolError;
use crate::protocol::Transport;
use crate::types::DeviceName;

// ============================================================================
// UdpConfig
// ============================================================================

/// Configuration for bulb exchanges.
///
/// # Examples
///
/// ```
/// use wizfs::protocol::UdpConfig;
/// use std::time::Duration;
///
/// let config = UdpConfig::new()
///     .with_port(38900)
///     .with_timeout(Duration::from_millis(500));
///
/// assert_eq!(config.port(), 38900);
/// assert_eq!(config.buffer_size(), UdpConfig::DEFAULT_BUFFER_SIZE);
/// ```
#[derive(Debug, Clone)]
pub struct UdpConfig {
    port: u16,
    timeout: Duration,
    buffer_size: usize,
}

impl UdpConfig {
    /// Port WiZ bulbs listen on.
    pub const DEFAULT_PORT: u16 = 38899;
    /// Default bound on one whole exchange.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
    /// Default reply buffer size; longer datagrams are truncated.
    pub const DEFAULT_BUFFER_SIZE: usize = 1024;

    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            port: Self::DEFAULT_PORT,
            timeout: Self::DEFAULT_TIMEOUT,
            buffer_size: Self::DEFAULT_BUFFER_SIZE,
        }
    }

    /// Sets the device port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the exchange timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the reply buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Returns the device port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the exchange timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the reply buffer size.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Creates a `UdpTransport` from this configuration.
    #[must_use]
    pub fn into_transport(self) -> UdpTransport {
        UdpTransport { config: self }
    }
}

impl Default for UdpConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// UdpTransport
// ============================================================================

/// UDP transport for WiZ bulbs.
///
/// Every exchange uses a fresh socket, so concurrent exchanges never share
/// state, even for the same bulb.
///
/// # Examples
///
/// ```no_run
/// use wizfs::command::{Command, Query};
/// use wizfs::protocol::{Transport, UdpTransport};
/// use wizfs::types::DeviceName;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = UdpTransport::new();
/// let bulb = DeviceName::new("192.168.1.40")?;
/// let reply = transport.exchange(&bulb, &Query::Pilot.to_payload()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct UdpTransport {
    config: UdpConfig,
}

impl UdpTransport {
    /// Creates a transport with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &UdpConfig {
        &self.config
    }

    async fn exchange_once(
        &self,
        device: &DeviceName,
        payload: &str,
    ) -> Result<Vec<u8>, ProtocolError> {
        let addr = lookup_host((device.as_str(), self.config.port))
            .await
            .map_err(|e| ProtocolError::InvalidAddress(format!("{device}: {e}")))?
            .next()
            .ok_or_else(|| ProtocolError::InvalidAddress(device.to_string()))?;

        let local: SocketAddr = if addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(local).await?;
        socket.connect(addr).await?;
        socket.send(payload.as_bytes()).await?;

        let mut buf = vec![0; self.config.buffer_size];
        let n = socket.recv(&mut buf).await?;
        if n == 0 {
            return Err(ProtocolError::EmptyReply);
        }
        buf.truncate(n);
        Ok(buf)
    }
}

impl Transport for UdpTransport {
    async fn exchange(&self, device: &DeviceName, payload: &str) -> Result<Vec<u8>, ProtocolError> {
        tracing::debug!(device = %device, payload = %payload, "Sending UDP request");

        // The timeout future owns the deadline and is dropped on every path.
        let reply = tokio::time::timeout(self.config.timeout, self.exchange_once(device, payload))
            .await
            .map_err(|_| {
                ProtocolError::Timeout(
                    u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX),
                )
            })?;

        match &reply {
            Ok(bytes) => tracing::debug!(
                device = %device,
                reply = %String::from_utf8_lossy(bytes),
                "Received UDP reply"
            ),
            Err(e) => tracing::debug!(device = %device, error = %e, "UDP exchange failed"),
        }

        reply
    }
}
