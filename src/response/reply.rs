// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device reply envelope.

use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ParseError;

/// One reply datagram from a bulb.
///
/// # Examples
///
/// ```
/// use wizfs::response::DeviceReply;
///
/// let reply = DeviceReply::parse(
///     br#"{"method":"setPilot","error":{"code":-32600,"message":"Invalid Request"}}"#,
/// )
/// .unwrap();
/// assert_eq!(reply.error_message(), Some("Invalid Request"));
/// assert_eq!(reply.error_code(), Some(-32600));
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceReply {
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    env: Option<String>,
    #[serde(default)]
    result: Option<RawResult>,
    #[serde(default)]
    error: Option<Value>,
}

impl DeviceReply {
    /// Parses a reply datagram.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Json` if the bytes are not a JSON object.
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        serde_json::from_slice(bytes).map_err(Into::into)
    }

    /// Returns the method the bulb is answering.
    #[must_use]
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// Returns the firmware environment tag (`"pro"` on production bulbs).
    #[must_use]
    pub fn env(&self) -> Option<&str> {
        self.env.as_deref()
    }

    /// Returns the `result` children in wire order.
    ///
    /// A `result` that is not an object has no children.
    #[must_use]
    pub fn result(&self) -> Option<&ResultFields> {
        match self.result.as_ref()? {
            RawResult::Object(fields) => Some(fields),
            RawResult::Other => None,
        }
    }

    /// Returns the `error.message` text.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref()?.get("message")?.as_str()
    }

    /// Returns the `error.code` number.
    #[must_use]
    pub fn error_code(&self) -> Option<i64> {
        self.error.as_ref()?.get("code")?.as_i64()
    }
}

/// Children of a `result` object.
///
/// Kept as a list rather than a map: bulbs are not known to repeat a name,
/// but if one does every occurrence is kept, in wire order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultFields(Vec<(String, Value)>);

impl ResultFields {
    /// Returns the number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the object had no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(name, value)` pairs in wire order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the first value named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.pairs().find(|(n, _)| *n == name).map(|(_, value)| value)
    }
}

#[derive(Debug, Clone)]
enum RawResult {
    Object(ResultFields),
    Other,
}

impl<'de> Deserialize<'de> for RawResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawResultVisitor)
    }
}

struct RawResultVisitor;

impl<'de> Visitor<'de> for RawResultVisitor {
    type Value = RawResult;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawResult, A::Error> {
        let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry::<String, Value>()? {
            fields.push(entry);
        }
        Ok(RawResult::Object(ResultFields(fields)))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RawResult, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(RawResult::Other)
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<RawResult, E> {
        Ok(RawResult::Other)
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<RawResult, E> {
        Ok(RawResult::Other)
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<RawResult, E> {
        Ok(RawResult::Other)
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<RawResult, E> {
        Ok(RawResult::Other)
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<RawResult, E> {
        Ok(RawResult::Other)
    }

    fn visit_unit<E: de::Error>(self) -> Result<RawResult, E> {
        Ok(RawResult::Other)
    }
}
