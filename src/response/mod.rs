// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reply parsing for WiZ bulb responses.
//!
//! A bulb answers every request with one JSON object holding either a
//! `result` object or an `error` object:
//!
//! ```text
//! {"method":"getPilot","env":"pro","result":{"mac":"a8bb50aabbcc","rssi":-55,"state":true}}
//! {"method":"setPilot","env":"pro","error":{"code":-32602,"message":"Invalid params"}}
//! ```
//!
//! [`flatten`] turns the `result` into `name=value` lines for the file tree.

mod flatten;
mod reply;

pub use flatten::{Flattened, UNKNOWN_VALUE, flatten};
pub use reply::{DeviceReply, ResultFields};
