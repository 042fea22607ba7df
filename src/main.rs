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

//! Carreg PGW Core - Main Entry Point
//!
//! Loads the configuration, installs the console/file log sinks and runs the
//! core engine until the graceful drain completes. Exits 0 on clean
//! shutdown, 1 if a startup resource cannot be acquired.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

use carreg::{
    config::{LogLevel, ServerConfig},
    core::PgwCore,
    logging,
};

/// Command-line arguments for Carreg PGW Core
#[derive(Parser)]
#[command(name = "Carreg PGW Core", about = "Memory-safe subscriber session gateway in Rust")]
struct Args {
    /// Path to the configuration file (YAML)
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config =
        ServerConfig::load(&args.config).context("failed to load Carreg configuration")?;
    logging::init(&config.log_file, config.log_level).context("failed to initialize logging")?;

    info!(
        "Server starting: UDP {}:{}  HTTP port {}  CDR file {}  debug={}",
        config.udp_ip,
        config.udp_port,
        config.http_port,
        config.cdr_file.display(),
        config.log_level == LogLevel::Debug
    );
    debug!(
        "Config: timeout={}s, graceful_rate={} sess/sec, blacklist={} entries",
        config.session_timeout_sec,
        config.graceful_shutdown_rate,
        config.blacklist.len()
    );

    let core = PgwCore::new(config).await?;
    core.run().await?;

    info!("Exit from server");
    Ok(())
}
