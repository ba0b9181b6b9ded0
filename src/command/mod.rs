// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WiZ bulb command definitions.
//!
//! WiZ bulbs speak a JSON-RPC style protocol over UDP. Every request is a
//! single JSON object naming a `method` and carrying `params`.
//!
//! # Available Commands
//!
//! | Command Type | Purpose | Example |
//! |-------------|---------|---------|
//! | [`Query`] | Read bulb state or configuration | `getPilot` |
//! | [`Shortcut`] | Fixed single-word commands | `on`, `off`, `pulse` |
//! | [`SetPilotCommand`] | Arbitrary `setPilot` parameters | `r=255 g=0 b=0` |
//!
//! Write payloads are turned into one of these by [`compile`].
//!
//! # Examples
//!
//! ```
//! use wizfs::command::{compile, Command, Shortcut};
//!
//! assert_eq!(compile("on").unwrap(), Shortcut::On.to_payload());
//!
//! let payload = compile("dimming=40 temp=2700").unwrap();
//! assert!(payload.ends_with(r#""params":{"dimming":40,"temp":2700}}"#));
//! ```

mod compiler;
mod fixed;

pub use compiler::{Field, ParsedCommand, SetPilotCommand, compile, parse};
pub use fixed::{Query, Shortcut};

/// A request that can be sent to a WiZ bulb.
pub trait Command {
    /// Returns the JSON-RPC method name, e.g. `"getPilot"` or `"setPilot"`.
    fn method(&self) -> &'static str;

    /// Returns the encoded request as sent on the wire.
    fn to_payload(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn methods() {
        assert_eq!(Query::Pilot.method(), "getPilot");
        assert_eq!(Query::SystemConfig.method(), "getSystemConfig");
        assert_eq!(Shortcut::Pulse.method(), "pulse");
        assert_eq!(Shortcut::On.method(), "setPilot");
        assert_eq!(SetPilotCommand::new(1, Vec::new()).method(), "setPilot");
    }

    #[test]
    fn every_payload_is_json() {
        let payloads = [
            Query::Pilot.to_payload(),
            Query::SystemConfig.to_payload(),
            Shortcut::Pulse.to_payload(),
            Shortcut::On.to_payload(),
            Shortcut::Off.to_payload(),
            compile("r=1 g=2 b=3").unwrap(),
        ];
        for payload in payloads {
            let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
            assert!(value.get("method").is_some(), "{payload}");
        }
    }
}
