// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `wizfs` crate.
//!
//! This module provides the error hierarchy used across the crate: device
//! directory loading, command compilation, UDP transport, reply parsing, and
//! the per-request errors reported back through the file tree.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred while loading the device directory.
    #[error("directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Error occurred while compiling a write payload.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Error occurred during the UDP exchange.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a device reply.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error reported for a single file request.
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// Error reported by the file tree.
    #[error(transparent)]
    Fs(#[from] FsError),

    /// The tree could not be mounted.
    #[error("cannot mount on {path}: {source}")]
    Mount {
        /// Mount point.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to the device directory.
///
/// These are fatal at startup: the server cannot run with an unknown
/// device set.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The registry source could not be opened or read.
    #[error("cannot open registry {path}: {source}")]
    Unavailable {
        /// Location of the registry.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A registry value cannot be used as a device name.
    #[error("invalid device name: {0:?}")]
    InvalidName(String),
}

/// Errors produced by the command compiler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The payload contained no tokens.
    #[error("empty command")]
    Empty,

    /// A single bare word that is not one of `on`, `off`, `pulse`.
    #[error("unrecognized command: {0}")]
    Unrecognized(String),

    /// Bare words mixed with other tokens.
    #[error("bare word {0:?} mixed with other tokens")]
    MixedPayload(String),
}

/// Errors related to the UDP exchange with a bulb.
///
/// Every variant means the bulb is unreachable for this request.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The device name did not resolve to an address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Socket setup, send, or receive failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(#[from] std::io::Error),

    /// No reply arrived before the deadline.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The bulb answered with a zero-length datagram.
    #[error("empty reply")]
    EmptyReply,
}

/// Errors related to parsing bulb replies.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors reported for one read or write request.
///
/// The display text is what a file-protocol layer sends back to the
/// client, so device messages pass through unchanged.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The file does not map to a known bulb.
    #[error("device not found")]
    DeviceNotFound,

    /// The bulb did not answer.
    #[error("bulb unreachable")]
    Unreachable(#[source] ProtocolError),

    /// The write payload could not be compiled.
    #[error("command build failed")]
    CommandBuild(#[source] CommandError),

    /// The bulb reported an error.
    #[error("{0}")]
    Device(String),

    /// The reply could not be parsed.
    #[error("malformed reply: {0}")]
    MalformedReply(#[source] ParseError),
}

/// Errors reported by the file tree to the protocol layer.
#[derive(Debug, Error)]
pub enum FsError {
    /// No file has this qid or name.
    #[error("file not found")]
    NotFound,

    /// Directories cannot be read as files.
    #[error("is a directory")]
    IsDirectory,

    /// Directories cannot be written.
    #[error("permission denied")]
    PermissionDenied,

    /// The file is not a directory.
    #[error("not a directory")]
    NotDirectory,

    /// The bulb request failed.
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
