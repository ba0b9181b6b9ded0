// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixed, pre-encoded requests.

use std::fmt;
use std::str::FromStr;

use crate::command::Command;
use crate::error::CommandError;

const PILOT: &str = r#"{"method":"getPilot","params":{}}"#;
const SYSTEM_CONFIG: &str = r#"{"method":"getSystemConfig", "params":{}}"#;
const PULSE: &str = r#"{"method":"pulse","params":{"delta":-50,"duration":500}}"#;
const POWER_ON: &str = r#"{"method": "setPilot", "id": 24, "params": {"state": true}}"#;
const POWER_OFF: &str = r#"{"method": "setPilot", "id": 24, "params": {"state": false}}"#;

/// A read-only query.
///
/// # Examples
///
/// ```
/// use wizfs::command::{Command, Query};
///
/// assert_eq!(Query::Pilot.to_payload(), r#"{"method":"getPilot","params":{}}"#);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    /// Current light state (`getPilot`).
    Pilot,
    /// Firmware and module configuration (`getSystemConfig`).
    SystemConfig,
}

impl Command for Query {
    fn method(&self) -> &'static str {
        match self {
            Self::Pilot => "getPilot",
            Self::SystemConfig => "getSystemConfig",
        }
    }

    fn to_payload(&self) -> String {
        let payload = match self {
            Self::Pilot => PILOT,
            Self::SystemConfig => SYSTEM_CONFIG,
        };
        payload.to_string()
    }
}

/// A single-word write command.
///
/// # Examples
///
/// ```
/// use wizfs::command::Shortcut;
///
/// let cmd: Shortcut = "pulse".parse().unwrap();
/// assert_eq!(cmd, Shortcut::Pulse);
/// assert!("blink".parse::<Shortcut>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shortcut {
    /// Dim briefly and restore.
    Pulse,
    /// Switch the bulb on.
    On,
    /// Switch the bulb off.
    Off,
}

impl Shortcut {
    /// Returns the word that selects this shortcut.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pulse => "pulse",
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Shortcut {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pulse" => Ok(Self::Pulse),
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            _ => Err(CommandError::Unrecognized(s.to_string())),
        }
    }
}

impl Command for Shortcut {
    fn method(&self) -> &'static str {
        match self {
            Self::Pulse => "pulse",
            Self::On | Self::Off => "setPilot",
        }
    }

    fn to_payload(&self) -> String {
        let payload = match self {
            Self::Pulse => PULSE,
            Self::On => POWER_ON,
            Self::Off => POWER_OFF,
        };
        payload.to_string()
    }
}
