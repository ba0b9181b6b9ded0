// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the UDP transport against a loopback bulb.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use common::MockBulb;
use wizfs::command::{Command, Query, Shortcut};
use wizfs::error::ProtocolError;
use wizfs::protocol::{Transport, UdpConfig};
use wizfs::types::DeviceName;

fn localhost() -> DeviceName {
    DeviceName::new("127.0.0.1").unwrap()
}

#[tokio::test]
async fn exchange_sends_payload_once_and_returns_reply() {
    let bulb = MockBulb::replying(r#"{"method":"getPilot","result":{"state":true}}"#).await;
    let transport = UdpConfig::new().with_port(bulb.port()).into_transport();

    let reply = transport
        .exchange(&localhost(), &Query::Pilot.to_payload())
        .await
        .unwrap();

    assert_eq!(reply, br#"{"method":"getPilot","result":{"state":true}}"#);
    assert_eq!(bulb.requests(), [Query::Pilot.to_payload()]);
}

#[tokio::test]
async fn silent_bulb_times_out_within_bound() {
    let bulb = MockBulb::silent().await;
    let transport = UdpConfig::new()
        .with_port(bulb.port())
        .with_timeout(Duration::from_millis(200))
        .into_transport();

    let started = Instant::now();
    let result = transport
        .exchange(&localhost(), &Shortcut::On.to_payload())
        .await;
    let elapsed = started.elapsed();

    assert!(matches!(result, Err(ProtocolError::Timeout(200))));
    assert!(elapsed >= Duration::from_millis(150), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "{elapsed:?}");
    assert_eq!(bulb.requests().len(), 1);
}

#[tokio::test]
async fn closed_port_is_unreachable() {
    let port = {
        let socket = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        socket.local_addr().unwrap().port()
    };
    let transport = UdpConfig::new()
        .with_port(port)
        .with_timeout(Duration::from_millis(300))
        .into_transport();

    let started = Instant::now();
    let result = transport.exchange(&localhost(), "{}").await;

    assert!(matches!(
        result,
        Err(ProtocolError::ConnectionFailed(_) | ProtocolError::Timeout(_))
    ));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn reply_is_truncated_to_buffer() {
    let bulb = MockBulb::replying(r#"{"result":{"mac":"a8bb50aabbcc"}}"#).await;
    let transport = UdpConfig::new()
        .with_port(bulb.port())
        .with_buffer_size(8)
        .into_transport();

    let reply = transport.exchange(&localhost(), "{}").await.unwrap();
    assert_eq!(reply, br#"{"result"#);
}

#[tokio::test]
async fn empty_datagram_is_empty_reply() {
    let bulb = MockBulb::start(|_| Some(String::new())).await;
    let transport = UdpConfig::new()
        .with_port(bulb.port())
        .with_timeout(Duration::from_millis(500))
        .into_transport();

    let result = transport.exchange(&localhost(), "{}").await;
    assert!(matches!(result, Err(ProtocolError::EmptyReply)));
}

#[tokio::test]
async fn each_exchange_is_independent() {
    let bulb = MockBulb::start(|request| Some(request.to_string())).await;
    let transport = UdpConfig::new().with_port(bulb.port()).into_transport();
    let device = localhost();

    let (a, b) = tokio::join!(
        transport.exchange(&device, r#"{"a":1}"#),
        transport.exchange(&device, r#"{"b":2}"#),
    );

    assert_eq!(a.unwrap(), br#"{"a":1}"#);
    assert_eq!(b.unwrap(), br#"{"b":2}"#);
    assert_eq!(bulb.requests().len(), 2);
}

#[tokio::test]
async fn timed_out_exchange_leaves_transport_usable() {
    let seen = AtomicUsize::new(0);
    let bulb = MockBulb::start(move |_| {
        (seen.fetch_add(1, Ordering::SeqCst) > 0)
            .then(|| r#"{"method":"getPilot","result":{"state":false}}"#.to_string())
    })
    .await;
    let transport = UdpConfig::new()
        .with_port(bulb.port())
        .with_timeout(Duration::from_millis(200))
        .into_transport();
    let device = localhost();

    let first = transport
        .exchange(&device, &Query::Pilot.to_payload())
        .await;
    assert!(matches!(first, Err(ProtocolError::Timeout(200))));

    tokio::time::sleep(Duration::from_millis(250)).await;

    let second = transport
        .exchange(&device, &Query::Pilot.to_payload())
        .await
        .unwrap();
    assert_eq!(second, br#"{"method":"getPilot","result":{"state":false}}"#);
    assert_eq!(bulb.requests().len(), 2);
}
