// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loopback stand-in for a WiZ bulb.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

/// A UDP responder bound on `127.0.0.1` that records every request.
pub struct MockBulb {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl MockBulb {
    /// Starts a bulb answering each request with `respond(request)`.
    /// `None` leaves the request unanswered.
    pub async fn start<F>(respond: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + 'static,
    {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&requests);
        let task = tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            loop {
                let Ok((n, peer)) = socket.recv_from(&mut buf).await else {
                    break;
                };
                let request = String::from_utf8_lossy(&buf[..n]).into_owned();
                let reply = respond(&request);
                log.lock().unwrap().push(request);
                if let Some(reply) = reply {
                    let _ = socket.send_to(reply.as_bytes(), peer).await;
                }
            }
        });

        Self {
            addr,
            requests,
            task,
        }
    }

    /// Starts a bulb that always sends the same reply.
    pub async fn replying(reply: &'static str) -> Self {
        Self::start(move |_| Some(reply.to_string())).await
    }

    /// Starts a bulb that never answers.
    pub async fn silent() -> Self {
        Self::start(|_| None).await
    }

    /// Returns the port the bulb listens on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Returns the requests received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for MockBulb {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Replies like a bulb: `getPilot` gets a state, `setPilot` succeeds unless
/// `dimming` is out of range, `pulse` succeeds.
pub fn wiz_like(request: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(request).ok()?;
    let method = value["method"].as_str()?;
    let reply = match method {
        "getPilot" => serde_json::json!({
            "method": "getPilot",
            "env": "pro",
            "result": {
                "mac": "a8bb50aabbcc",
                "rssi": -55,
                "state": true,
                "sceneId": 0,
                "temp": 2700,
                "dimming": 100
            }
        }),
        "getSystemConfig" => serde_json::json!({
            "method": "getSystemConfig",
            "env": "pro",
            "result": {
                "mac": "a8bb50aabbcc",
                "homeId": 123_456,
                "fwVersion": "1.26.0",
                "moduleName": "ESP01_SHRGB1C_31"
            }
        }),
        "setPilot" if value["params"]["dimming"].as_i64().is_some_and(|d| d > 100) => {
            serde_json::json!({
                "method": "setPilot",
                "env": "pro",
                "error": { "code": -32602, "message": "Invalid params" }
            })
        }
        "setPilot" | "pulse" => serde_json::json!({
            "method": method,
            "env": "pro",
            "result": { "success": true }
        }),
        _ => serde_json::json!({
            "method": method,
            "env": "pro",
            "error": { "code": -32601, "message": "Method not found" }
        }),
    };
    Some(reply.to_string())
}
