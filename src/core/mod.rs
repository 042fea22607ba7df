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

//! PGW Core Engine
//!
//! The `PgwCore` owns the node lifecycle:
//! - Acquires startup resources (CDR file, UDP socket, HTTP listener)
//! - Spawns the three workers: data plane, control surface, sweeper
//! - Blocks until the sweeper signals drain completion
//! - Joins all workers, flushes the CDR stream and returns
//!
//! Failing to open the CDR file or bind the UDP socket is fatal. A failed
//! HTTP bind only loses the control surface: the data plane and the sweeper
//! keep running, so the process can then only be stopped externally.

pub mod control;
pub mod sweeper;
pub mod transport;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::future::try_join_all;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::{
    cdr::CdrWriter,
    config::ServerConfig,
    core::{sweeper::Sweeper, transport::UdpPlane},
    state::{Lifecycle, SharedState},
};

/// Main engine tying the workers to the shared session table
pub struct PgwCore {
    config: ServerConfig,
    state: SharedState,
    lifecycle: Lifecycle,
    cdr: Arc<CdrWriter>,
    udp: UdpPlane,
    http: Option<TcpListener>,
}

impl PgwCore {
    /// Acquires all startup resources. CDR open and UDP bind failures are
    /// returned as errors; an HTTP bind failure is logged and tolerated.
    pub async fn new(config: ServerConfig) -> Result<Self> {
        let cdr = Arc::new(CdrWriter::open(&config.cdr_file)?);

        let udp = UdpPlane::bind(SocketAddr::new(config.udp_ip, config.udp_port)).await?;

        let http_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), config.http_port);
        let http = match TcpListener::bind(http_addr).await {
            Ok(listener) => Some(listener),
            Err(e) => {
                error!("Cannot listen for HTTP on port {}: {}", config.http_port, e);
                None
            }
        };

        let state = SharedState::new(config.blacklist.iter().cloned());

        Ok(PgwCore {
            config,
            state,
            lifecycle: Lifecycle::new(),
            cdr,
            udp,
            http,
        })
    }

    /// Address the data plane actually bound to.
    pub fn udp_addr(&self) -> SocketAddr {
        self.udp.local_addr()
    }

    /// Address of the control surface, if it managed to bind.
    pub fn http_addr(&self) -> Option<SocketAddr> {
        self.http.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Handle to the lifecycle signals, e.g. to initiate shutdown without
    /// going through the HTTP surface.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.clone()
    }

    /// Runs the node until the graceful drain completes.
    pub async fn run(self) -> Result<()> {
        let mut tasks = Vec::new();

        tasks.push(tokio::spawn(self.udp.run(
            self.state.clone(),
            Arc::clone(&self.cdr),
            self.lifecycle.clone(),
        )));

        if let Some(listener) = self.http {
            tasks.push(tokio::spawn(control::serve(
                listener,
                self.state.clone(),
                self.lifecycle.clone(),
            )));
        }

        let sweeper = Sweeper::new(
            self.state.clone(),
            Arc::clone(&self.cdr),
            self.lifecycle.clone(),
            Duration::from_secs(self.config.session_timeout_sec),
            self.config.graceful_shutdown_rate,
        );
        tasks.push(tokio::spawn(sweeper.run()));

        info!("PGW core started with {} workers", tasks.len());

        self.lifecycle.drained().await;

        for result in try_join_all(tasks).await.context("worker panicked")? {
            result?;
        }

        self.cdr.flush();
        info!("All workers stopped, exiting");
        Ok(())
    }
}
