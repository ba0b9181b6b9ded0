// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end tests: ndb file, file tree, UDP, loopback bulb.

mod common;

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use common::{MockBulb, wiz_like};
use wizfs::command::{Command, Shortcut};
use wizfs::directory::{DeviceDirectory, NdbRegistry};
use wizfs::error::{BridgeError, DirectoryError, FsError};
use wizfs::fs::{FileService, FsConfig, WIZ_DIR_QID, WizFs};
use wizfs::protocol::{UdpConfig, UdpTransport};

fn ndb_file(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

fn tree(port: u16, timeout: Duration) -> WizFs<UdpTransport> {
    let ndb = ndb_file(
        "ipnet=home ip=127.0.0.0 ipmask=255.0.0.0\n\
         sys=127.0.0.1 wiz=bulb\n\
         sys=printer ip=127.0.0.2\n",
    );
    let registry = NdbRegistry::open(ndb.path()).unwrap();
    let directory = DeviceDirectory::load(&registry).unwrap();

    let transport = UdpConfig::new()
        .with_port(port)
        .with_timeout(timeout)
        .into_transport();
    WizFs::new(
        Arc::new(directory),
        transport,
        FsConfig::new().with_owner("glenda"),
    )
}

async fn read_all(fs: &WizFs<UdpTransport>, qid: u64) -> Result<String, FsError> {
    let data = fs.read(qid, 0, 8192).await?;
    Ok(String::from_utf8(data).unwrap())
}

#[test]
fn missing_ndb_file_is_fatal() {
    let result = NdbRegistry::open("/definitely/not/here/ndb");
    assert!(matches!(result, Err(DirectoryError::Unavailable { .. })));
}

#[test]
fn tree_lists_only_bulbs() {
    let fs = tree(1, Duration::from_millis(100));
    let names: Vec<String> = fs
        .list(WIZ_DIR_QID)
        .unwrap()
        .into_iter()
        .map(|stat| stat.name)
        .collect();
    assert_eq!(names, ["127.0.0.1"]);
}

#[tokio::test]
async fn read_flattens_pilot() {
    let bulb = MockBulb::start(wiz_like).await;
    let fs = tree(bulb.port(), Duration::from_secs(1));
    let qid = fs.walk(WIZ_DIR_QID, "127.0.0.1").unwrap();

    let text = read_all(&fs, qid).await.unwrap();
    assert_eq!(
        text,
        "mac=a8bb50aabbcc\nrssi=-55\nstate=true\nsceneId=0\ntemp=2700\ndimming=100\n"
    );
}

#[tokio::test]
async fn system_config_read() {
    let bulb = MockBulb::start(wiz_like).await;
    let fs = tree(bulb.port(), Duration::from_secs(1));
    let qid = fs.walk(WIZ_DIR_QID, "127.0.0.1").unwrap();

    let text = fs.bridge().system_config(qid).await.into_result().unwrap();
    assert!(text.contains("fwVersion=1.26.0\n"));
    assert!(text.contains("homeId=123456\n"));
}

#[tokio::test]
async fn write_shortcut_and_pairs() {
    let bulb = MockBulb::start(wiz_like).await;
    let fs = tree(bulb.port(), Duration::from_secs(1));
    let qid = fs.walk(WIZ_DIR_QID, "127.0.0.1").unwrap();

    assert_eq!(fs.write(qid, b"off\n").await.unwrap(), 4);
    fs.write(qid, b"r=255 g=0 b=0").await.unwrap();

    let requests = bulb.requests();
    assert_eq!(requests[0], Shortcut::Off.to_payload());
    assert!(requests[1].starts_with(r#"{"method":"setPilot","id":"#));
    assert!(requests[1].ends_with(r#""params":{"r":255,"g":0,"b":0}}"#));
}

#[tokio::test]
async fn write_passes_device_error_through() {
    let bulb = MockBulb::start(wiz_like).await;
    let fs = tree(bulb.port(), Duration::from_secs(1));
    let qid = fs.walk(WIZ_DIR_QID, "127.0.0.1").unwrap();

    let err = fs.write(qid, b"dimming=500").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid params");
}

#[tokio::test]
async fn bad_write_never_reaches_bulb() {
    let bulb = MockBulb::start(wiz_like).await;
    let fs = tree(bulb.port(), Duration::from_secs(1));
    let qid = fs.walk(WIZ_DIR_QID, "127.0.0.1").unwrap();

    let payloads: [&[u8]; 3] = [b"blink", b"on foo=1", b"   "];
    for payload in payloads {
        let err = fs.write(qid, payload).await.unwrap_err();
        assert_eq!(err.to_string(), "command build failed");
    }
    assert!(bulb.requests().is_empty());
}

#[tokio::test]
async fn silent_bulb_is_unreachable_for_read_and_write() {
    let bulb = MockBulb::silent().await;
    let fs = tree(bulb.port(), Duration::from_millis(150));
    let qid = fs.walk(WIZ_DIR_QID, "127.0.0.1").unwrap();

    let err = read_all(&fs, qid).await.unwrap_err();
    assert!(matches!(err, FsError::Bridge(BridgeError::Unreachable(_))));
    assert_eq!(err.to_string(), "bulb unreachable");

    let err = fs.write(qid, b"pulse").await.unwrap_err();
    assert_eq!(err.to_string(), "bulb unreachable");
}

#[tokio::test]
async fn reply_without_result_or_error_reads_empty() {
    let bulb = MockBulb::replying(r#"{"method":"getPilot","env":"pro"}"#).await;
    let fs = tree(bulb.port(), Duration::from_secs(1));
    let qid = fs.walk(WIZ_DIR_QID, "127.0.0.1").unwrap();

    assert_eq!(read_all(&fs, qid).await.unwrap(), "");
}

#[tokio::test]
async fn concurrent_reads_of_one_bulb() {
    let bulb = MockBulb::start(wiz_like).await;
    let fs = Arc::new(tree(bulb.port(), Duration::from_secs(1)));
    let qid = fs.walk(WIZ_DIR_QID, "127.0.0.1").unwrap();

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let fs = Arc::clone(&fs);
            tokio::spawn(async move { read_all(&fs, qid).await })
        })
        .collect();

    for task in tasks {
        let text = task.await.unwrap().unwrap();
        assert!(text.starts_with("mac=a8bb50aabbcc\n"));
    }
    assert_eq!(bulb.requests().len(), 4);
}
