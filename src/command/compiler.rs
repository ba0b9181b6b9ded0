// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Write payload grammar.
//!
//! A payload is a whitespace separated list of tokens. It is either a single
//! shortcut word (`on`, `off`, `pulse`) or a list of `key=value` pairs that
//! become the `params` of a `setPilot` request. Values are copied verbatim,
//! so they must already be JSON literals (`true`, `42`, `"ocean"`).

use std::fmt::Write as _;

use crate::command::{Command, Shortcut};
use crate::error::CommandError;

/// One `key=value` pair of a write payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Parameter name.
    pub key: String,
    /// Raw JSON value text.
    pub value: String,
}

impl Field {
    /// Creates a field.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Splits a token on its first `=`. Both sides must be non-empty.
    fn split(token: &str) -> Option<Self> {
        let (key, value) = token.split_once('=')?;
        if key.is_empty() || value.is_empty() {
            return None;
        }
        Some(Self::new(key, value))
    }
}

/// Result of parsing a write payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    /// A lone shortcut word.
    Shortcut(Shortcut),
    /// `key=value` pairs in the order given.
    FieldList(Vec<Field>),
    /// The payload cannot be compiled.
    Invalid(CommandError),
}

/// Parses a write payload without encoding it.
///
/// # Examples
///
/// ```
/// use wizfs::command::{parse, Field, ParsedCommand, Shortcut};
/// use wizfs::error::CommandError;
///
/// assert_eq!(parse("off"), ParsedCommand::Shortcut(Shortcut::Off));
/// assert_eq!(
///     parse("state=true"),
///     ParsedCommand::FieldList(vec![Field::new("state", "true")])
/// );
/// assert_eq!(parse("  "), ParsedCommand::Invalid(CommandError::Empty));
/// ```
#[must_use]
pub fn parse(text: &str) -> ParsedCommand {
    let mut tokens = text.split_whitespace();

    let Some(first) = tokens.next() else {
        return ParsedCommand::Invalid(CommandError::Empty);
    };

    let mut fields = match Field::split(first) {
        Some(field) => vec![field],
        None => {
            let shortcut = match first.parse::<Shortcut>() {
                Ok(shortcut) => shortcut,
                Err(e) => return ParsedCommand::Invalid(e),
            };
            if tokens.next().is_some() {
                return ParsedCommand::Invalid(CommandError::MixedPayload(first.to_string()));
            }
            return ParsedCommand::Shortcut(shortcut);
        }
    };

    for token in tokens {
        match Field::split(token) {
            Some(field) => fields.push(field),
            None => return ParsedCommand::Invalid(CommandError::MixedPayload(token.to_string())),
        }
    }

    ParsedCommand::FieldList(fields)
}

/// Compiles a write payload into the request sent to the bulb.
///
/// Pair lists get a request id taken from the current Unix time.
///
/// # Errors
///
/// Returns `CommandError` if the payload is empty, names an unknown
/// shortcut, or mixes bare words with other tokens.
pub fn compile(text: &str) -> Result<String, CommandError> {
    match parse(text) {
        ParsedCommand::Shortcut(shortcut) => Ok(encode(&shortcut)),
        ParsedCommand::FieldList(fields) => Ok(encode(&SetPilotCommand::new(
            chrono::Utc::now().timestamp(),
            fields,
        ))),
        ParsedCommand::Invalid(e) => {
            tracing::debug!(input = %text.trim_end(), error = %e, "Rejected write payload");
            Err(e)
        }
    }
}

fn encode(command: &impl Command) -> String {
    let payload = command.to_payload();
    tracing::debug!(method = command.method(), payload = %payload, "Compiled write payload");
    payload
}

/// A `setPilot` request assembled from payload fields.
///
/// Fields keep their order and repeated keys are kept as-is.
///
/// # Examples
///
/// ```
/// use wizfs::command::{Command, Field, SetPilotCommand};
///
/// let cmd = SetPilotCommand::new(
///     7,
///     vec![Field::new("sceneId", "4"), Field::new("speed", "100")],
/// );
/// assert_eq!(
///     cmd.to_payload(),
///     r#"{"method":"setPilot","id":7,"params":{"sceneId":4,"speed":100}}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetPilotCommand {
    id: i64,
    params: Vec<Field>,
}

impl SetPilotCommand {
    /// Creates a request with an explicit id.
    #[must_use]
    pub fn new(id: i64, params: Vec<Field>) -> Self {
        Self { id, params }
    }

    /// Returns the request id.
    #[must_use]
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Returns the parameters in payload order.
    #[must_use]
    pub fn params(&self) -> &[Field] {
        &self.params
    }
}

impl Command for SetPilotCommand {
    fn method(&self) -> &'static str {
        "setPilot"
    }

    fn to_payload(&self) -> String {
        let mut out = format!(r#"{{"method":"setPilot","id":{},"params":{{"#, self.id);
        for (i, field) in self.params.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(out, r#""{}":{}"#, field.key, field.value);
        }
        out.push_str("}}");
        out
    }
}
