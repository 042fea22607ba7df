// Copyright (c) 2026 Fastcomcorp, LLC. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Registration client
//!
//! One-shot tool: packs a 15-digit IMSI into its BCD wire form, sends it to
//! the server and prints the reply (`created` or `rejected`) to stdout. The
//! wire offers no reliability, so the wait for the reply is bounded rather
//! than indefinite.

use std::net::{SocketAddr, UdpSocket};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

use carreg::{bcd, config::ClientConfig, logging};

const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// Command-line arguments for the registration client
#[derive(Parser)]
#[command(name = "Carreg client", about = "Sends a BCD-encoded IMSI registration")]
struct Args {
    /// Path to the configuration file (YAML)
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
    /// 15-digit IMSI to register
    #[arg(value_name = "IMSI")]
    imsi: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config =
        ClientConfig::load(&args.config).context("failed to load client configuration")?;
    logging::init(&config.log_file, config.log_level).context("failed to initialize logging")?;

    info!("Client starting, IMSI={}", args.imsi);
    debug!(
        "Loaded client config: server_ip={}, server_port={}",
        config.server_ip, config.server_port
    );

    let payload = bcd::imsi_to_bcd(&args.imsi)
        .with_context(|| format!("cannot convert IMSI {:?} to BCD", args.imsi))?;
    debug!("IMSI {:?} converted to BCD: {:02x?}", args.imsi, payload);

    let socket = UdpSocket::bind("0.0.0.0:0").context("cannot create UDP socket")?;
    socket
        .set_read_timeout(Some(REPLY_TIMEOUT))
        .context("cannot set receive timeout")?;

    let server = SocketAddr::new(config.server_ip, config.server_port);
    let sent = socket
        .send_to(&payload, server)
        .with_context(|| format!("cannot send to {}", server))?;
    info!("Sent {} bytes to {}", sent, server);

    let mut buf = [0u8; 32];
    let (n, _) = socket
        .recv_from(&mut buf)
        .with_context(|| format!("no reply from {}", server))?;

    let response = String::from_utf8_lossy(&buf[..n]);
    info!("Received response ({} bytes): {:?}", n, response);
    println!("{}", response);

    Ok(())
}
