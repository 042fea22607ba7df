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

//! HTTP Control Surface
//!
//! Two endpoints:
//! - `GET /check_subscriber?imsi=<digits>` reports whether the identity
//!   currently holds a session (`active` / `not active`), with no admission
//!   effect.
//! - `GET /stop` initiates shutdown and answers `Shutdown initiated`; the
//!   server stops accepting new connections once the response is written.

use anyhow::Result;
use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::state::{Lifecycle, SharedState};

#[derive(Clone)]
struct ControlState {
    sessions: SharedState,
    lifecycle: Lifecycle,
}

/// Serves the control surface until shutdown is initiated.
pub async fn serve(
    listener: TcpListener,
    sessions: SharedState,
    lifecycle: Lifecycle,
) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("HTTP control listening on {}", addr);
    }

    let app = Router::new()
        .route("/check_subscriber", get(check_subscriber))
        .route("/stop", get(stop))
        .with_state(ControlState {
            sessions,
            lifecycle: lifecycle.clone(),
        });

    let shutdown = async move { lifecycle.shutdown_signal().await };
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
    {
        error!("HTTP server error: {}", e);
    }

    debug!("HTTP control stopped");
    Ok(())
}

#[derive(Deserialize)]
struct CheckQuery {
    imsi: String,
}

async fn check_subscriber(
    State(ctl): State<ControlState>,
    Query(query): Query<CheckQuery>,
) -> &'static str {
    debug!("HTTP /check_subscriber imsi={}", query.imsi);

    if ctl.sessions.contains(&query.imsi) {
        "active"
    } else {
        "not active"
    }
}

async fn stop(State(ctl): State<ControlState>) -> &'static str {
    info!("HTTP /stop called");
    ctl.lifecycle.begin_shutdown();
    "Shutdown initiated"
}
