// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reply flattening into `name=value` text.

use serde_json::{Number, Value};

use crate::response::DeviceReply;

/// Rendered in place of a `null` value.
pub const UNKNOWN_VALUE: &str = "‽";

/// Text form of a reply.
///
/// Holds either result lines or the device error message. A reply with
/// neither is an empty success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flattened {
    /// One `name=value` line per result child, without newlines.
    pub lines: Vec<String>,
    /// The device error message, when the reply had no result.
    pub error: Option<String>,
}

impl Flattened {
    /// Returns the lines joined as file content, each ending in `\n`.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.iter().map(|line| format!("{line}\n")).collect()
    }
}

/// Flattens a reply.
///
/// Result children are rendered in wire order. Without a non-empty result
/// the `error.message` text is returned instead.
///
/// # Examples
///
/// ```
/// use wizfs::response::{flatten, DeviceReply};
///
/// let reply = DeviceReply::parse(br#"{"result":{"state":true,"rssi":-55,"mac":"AABB"}}"#).unwrap();
/// let flat = flatten(&reply);
/// assert_eq!(flat.text(), "state=true\nrssi=-55\nmac=AABB\n");
/// assert!(flat.error.is_none());
/// ```
#[must_use]
pub fn flatten(reply: &DeviceReply) -> Flattened {
    if let Some(fields) = reply.result().filter(|fields| !fields.is_empty()) {
        return Flattened {
            lines: fields
                .pairs()
                .map(|(name, value)| format!("{name}={}", render(value)))
                .collect(),
            error: None,
        };
    }

    Flattened {
        lines: Vec::new(),
        error: reply.error_message().map(str::to_string),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => UNKNOWN_VALUE.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => render_number(n),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

// Whole numbers only, no exponent.
fn render_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        format!("{:.0}", n.as_f64().unwrap_or_default())
    }
}
