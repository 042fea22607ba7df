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

//! UDP Data Plane
//!
//! Receives 8-byte packed-BCD registration datagrams and answers each one
//! with the ASCII literal `created` or `rejected`. Malformed datagrams are
//! logged and dropped without a reply; every error is isolated to the
//! datagram that caused it.
//!
//! The receive call is bounded to one second so the loop re-checks the
//! shutdown flag at its head; the worker exits within that bound once
//! shutdown is initiated. Admission decision, insertion and the `create`
//! CDR append are atomic under the table lock; the reply is sent after the
//! lock is released.

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::UdpSocket;
use tokio::time;
use tracing::{debug, error, info, warn};

use crate::{
    bcd::{self, BCD_LEN},
    cdr::{CdrEvent, CdrWriter},
    state::{Admission, Lifecycle, SharedState},
};

const RECV_TIMEOUT: Duration = Duration::from_secs(1);

const REPLY_CREATED: &[u8] = b"created";
const REPLY_REJECTED: &[u8] = b"rejected";

/// Bound registration socket and its receive loop
pub struct UdpPlane {
    socket: UdpSocket,
    addr: SocketAddr,
}

impl UdpPlane {
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .with_context(|| format!("cannot bind UDP socket to {}", addr))?;
        let addr = socket.local_addr().context("cannot read bound UDP address")?;

        info!("UDP listening on {}", addr);

        Ok(UdpPlane { socket, addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn run(
        self,
        state: SharedState,
        cdr: Arc<CdrWriter>,
        lifecycle: Lifecycle,
    ) -> Result<()> {
        let mut buf = vec![0u8; 4096];

        loop {
            if lifecycle.is_shutting_down() {
                debug!("UDP receiver stopping");
                break;
            }

            let (len, peer) = match time::timeout(RECV_TIMEOUT, self.socket.recv_from(&mut buf))
                .await
            {
                // timed out: loop around and re-check the shutdown flag
                Err(_) => continue,
                Ok(Err(e)) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                    continue
                }
                Ok(Err(e)) => {
                    error!("Recvfrom error: {}", e);
                    continue;
                }
                Ok(Ok(received)) => received,
            };

            debug!("Received {} bytes from {}", len, peer);

            if len != BCD_LEN {
                warn!(
                    "Datagram from {} has {} bytes, expected {}",
                    peer, len, BCD_LEN
                );
                continue;
            }

            let imsi = match bcd::bcd_to_imsi(&buf[..len]) {
                Ok(imsi) => imsi,
                Err(e) => {
                    warn!("Cannot decode BCD from {}: {}", peer, e);
                    continue;
                }
            };

            debug!("Decoded IMSI {}", imsi);

            // the create record is appended under the table lock, so no
            // deletion record for this identity can ever precede it
            match state.admit(&imsi, || cdr.append(&imsi, CdrEvent::Create)) {
                Admission::Created => {
                    info!("Session created for IMSI {}", imsi);
                    self.reply(REPLY_CREATED, peer).await;
                }
                Admission::AlreadyActive => {
                    info!("Subscriber {} rejected: already active", imsi);
                    self.reply(REPLY_REJECTED, peer).await;
                }
                Admission::Blacklisted => {
                    info!("Subscriber {} rejected: blacklisted", imsi);
                    self.reply(REPLY_REJECTED, peer).await;
                }
            }
        }

        Ok(())
    }

    async fn reply(&self, payload: &[u8], peer: SocketAddr) {
        if let Err(e) = self.socket.send_to(payload, peer).await {
            error!("Cannot send reply to {}: {}", peer, e);
        }
    }
}
