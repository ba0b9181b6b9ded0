// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command line front end for the bulb file tree.
//!
//! # Usage
//!
//! ```bash
//! wizfs ls
//! wizfs read kitchen
//! wizfs write kitchen r=255 g=0 b=0
//! wizfs -d -n ./ndb config porch
//! wizfs mount -m /n -s wizfs
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wizfs::fs::{FileService, FsConfig, WIZ_DIR_QID, WizFs};
use wizfs::{DeviceDirectory, NdbRegistry, UdpConfig};

#[derive(Parser)]
#[command(name = "wizfs", about = "Read and control WiZ bulbs through a file tree")]
struct Args {
    /// Print wire traffic and debug logs
    #[arg(short, long)]
    debug: bool,

    /// Network database listing the bulbs
    #[arg(short = 'n', long, default_value = NdbRegistry::DEFAULT_PATH)]
    ndb: PathBuf,

    /// Owner shown for every file
    #[arg(short, long)]
    user: Option<String>,

    /// Bulb UDP port
    #[arg(long, default_value_t = UdpConfig::DEFAULT_PORT)]
    port: u16,

    /// Exchange timeout in milliseconds
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List the bulb files
    Ls,
    /// Print the current state of a bulb
    Read { bulb: String },
    /// Send a command to a bulb
    Write {
        bulb: String,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
    /// Print the system configuration of a bulb
    Config { bulb: String },
    /// Mount the tree and serve it until interrupted
    #[cfg(all(feature = "fuse", target_os = "linux"))]
    Mount {
        /// Mount point; the bulbs appear under `<mtpt>/wiz`
        #[arg(short, long, default_value = "/n")]
        mtpt: PathBuf,
        /// File system name shown in the mount table
        #[arg(short, long, default_value = "wizfs")]
        service: String,
        /// Let other users reach the mount
        #[arg(long)]
        allow_other: bool,
        /// Unmount when the process dies
        #[arg(long)]
        auto_unmount: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("wizfs: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> wizfs::Result<()> {
    let registry = NdbRegistry::open(&args.ndb)?;
    let directory = Arc::new(DeviceDirectory::load(&registry)?);

    let transport = UdpConfig::new()
        .with_port(args.port)
        .with_timeout(Duration::from_millis(args.timeout_ms))
        .into_transport();

    let mut config = FsConfig::new();
    if let Some(user) = args.user {
        config = config.with_owner(user);
    }
    let fs = WizFs::new(directory, transport, config);

    match args.command {
        Cmd::Ls => {
            for stat in fs.list(WIZ_DIR_QID)? {
                println!("{:o} {} {}", stat.mode, stat.owner, stat.name);
            }
        }
        Cmd::Read { bulb } => {
            let qid = fs.walk(WIZ_DIR_QID, &bulb)?;
            let data = fs.read(qid, 0, usize::MAX).await?;
            print!("{}", String::from_utf8_lossy(&data));
        }
        Cmd::Write { bulb, words } => {
            let qid = fs.walk(WIZ_DIR_QID, &bulb)?;
            fs.write(qid, words.join(" ").as_bytes()).await?;
        }
        Cmd::Config { bulb } => {
            let qid = fs.walk(WIZ_DIR_QID, &bulb)?;
            let content = fs.bridge().system_config(qid).await.into_result()?;
            print!("{content}");
        }
        #[cfg(all(feature = "fuse", target_os = "linux"))]
        Cmd::Mount {
            mtpt,
            service,
            allow_other,
            auto_unmount,
        } => mount(fs, &mtpt, service, allow_other, auto_unmount).await?,
    }

    Ok(())
}

#[cfg(all(feature = "fuse", target_os = "linux"))]
async fn mount(
    fs: WizFs<wizfs::UdpTransport>,
    mtpt: &std::path::Path,
    service: String,
    allow_other: bool,
    auto_unmount: bool,
) -> wizfs::Result<()> {
    use fuser::MountOption;
    use wizfs::fuse::{Owner, WizFuse};

    let mut options = vec![
        MountOption::FSName(service),
        MountOption::Subtype("wizfs".to_string()),
        MountOption::DefaultPermissions,
        MountOption::NoExec,
    ];
    if allow_other {
        options.push(MountOption::AllowOther);
    }
    if auto_unmount {
        options.push(MountOption::AutoUnmount);
    }

    let fuse = WizFuse::new(Arc::new(fs), tokio::runtime::Handle::current(), Owner::current());
    let session =
        fuser::spawn_mount2(fuse, mtpt, &options).map_err(|source| wizfs::Error::Mount {
            path: mtpt.to_path_buf(),
            source,
        })?;
    tracing::info!(mtpt = %mtpt.display(), "Mounted bulb tree");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Cannot wait for interrupt");
    }
    drop(session);
    tracing::info!(mtpt = %mtpt.display(), "Unmounted bulb tree");
    Ok(())
}
