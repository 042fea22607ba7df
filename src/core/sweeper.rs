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

//! Expiry Sweeper and Graceful Drain
//!
//! Phase A runs on a one-second cadence until shutdown: sessions older than
//! the configured timeout are evicted with a `deleted` CDR record. After
//! shutdown is initiated the sweeper switches to Phase B and drains the
//! remaining sessions at `graceful_shutdown_rate` per second, writing
//! `delete with shutdown` records, then signals drain completion to the
//! coordinator.
//!
//! The CDR append always precedes the table removal, so a session never
//! disappears without its deletion record being on its way. Identities are
//! snapshotted out of the table first; no CDR I/O happens under the table
//! lock.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time;
use tracing::{debug, info};

use crate::{
    cdr::{CdrEvent, CdrWriter},
    state::{Lifecycle, SharedState},
};

const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

pub struct Sweeper {
    state: SharedState,
    cdr: Arc<CdrWriter>,
    lifecycle: Lifecycle,
    session_timeout: Duration,
    drain_rate: usize,
}

impl Sweeper {
    pub fn new(
        state: SharedState,
        cdr: Arc<CdrWriter>,
        lifecycle: Lifecycle,
        session_timeout: Duration,
        drain_rate: usize,
    ) -> Self {
        Sweeper {
            state,
            cdr,
            lifecycle,
            session_timeout,
            drain_rate,
        }
    }

    pub async fn run(self) -> Result<()> {
        debug!("Starting cleanup sweeper");

        loop {
            if self.lifecycle.is_shutting_down() {
                break;
            }
            time::sleep(SWEEP_INTERVAL).await;

            for imsi in self.state.expired(self.session_timeout) {
                self.cdr.append(&imsi, CdrEvent::Deleted);
                self.state.remove(&imsi);
                info!("Session deleted for IMSI {}", imsi);
            }
        }

        info!(
            "Graceful shutdown with {} deleted sessions per sec",
            self.drain_rate
        );

        while !self.state.is_empty() {
            for imsi in self.state.first_n(self.drain_rate) {
                self.cdr.append(&imsi, CdrEvent::DeleteWithShutdown);
                self.state.remove(&imsi);
                info!("Gracefully deleted session for IMSI {}", imsi);
            }
            time::sleep(SWEEP_INTERVAL).await;
        }

        self.lifecycle.mark_drained();
        info!("Graceful shutdown completed");
        Ok(())
    }
}
