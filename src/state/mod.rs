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

//! Shared State Management
//!
//! This module provides the thread-safe session table shared by the data
//! plane, the sweeper and the HTTP control surface, plus the lifecycle
//! signals that coordinate shutdown.
//!
//! The table is guarded by a single mutex. Snapshot operations copy the
//! matching identities out under the lock so that callers perform CDR writes
//! and datagram replies with the lock released; no caller holds the lock
//! across an await point.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::watch;

/// Outcome of an admission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Identity admitted; a session was inserted
    Created,
    /// Identity already holds an active session
    AlreadyActive,
    /// Identity is on the static blacklist
    Blacklisted,
}

/// Session table shared across all workers
///
/// Maps each admitted IMSI to the monotonic instant of its admission. The
/// blacklist is immutable after startup, so a blacklisted identity can never
/// appear in the table.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<State>,
}

struct State {
    sessions: Mutex<HashMap<String, Instant>>,
    blacklist: HashSet<String>,
}

impl SharedState {
    pub fn new(blacklist: impl IntoIterator<Item = String>) -> Self {
        SharedState {
            inner: Arc::new(State {
                sessions: Mutex::new(HashMap::new()),
                blacklist: blacklist.into_iter().collect(),
            }),
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        self.inner
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_blacklisted(&self, imsi: &str) -> bool {
        self.inner.blacklist.contains(imsi)
    }

    pub fn contains(&self, imsi: &str) -> bool {
        self.sessions().contains_key(imsi)
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }

    /// Admission check and insertion, atomic under the table lock.
    ///
    /// `on_insert` runs under the lock immediately after the insertion; the
    /// data plane appends the `create` CDR record there, so a sweeper
    /// snapshot can never observe a session whose creation record is not
    /// already written. The CDR lock nests inside the table lock only here
    /// and nothing ever acquires them in the opposite order.
    ///
    /// The session is stamped with the current monotonic instant; wall-clock
    /// time never enters expiry decisions.
    pub fn admit(&self, imsi: &str, on_insert: impl FnOnce()) -> Admission {
        if self.is_blacklisted(imsi) {
            return Admission::Blacklisted;
        }
        let mut sessions = self.sessions();
        if sessions.contains_key(imsi) {
            return Admission::AlreadyActive;
        }
        sessions.insert(imsi.to_string(), Instant::now());
        on_insert();
        Admission::Created
    }

    /// Removes a session. Returns false if it was already gone.
    pub fn remove(&self, imsi: &str) -> bool {
        self.sessions().remove(imsi).is_some()
    }

    /// Copies out the identities whose sessions are older than `timeout`.
    pub fn expired(&self, timeout: Duration) -> Vec<String> {
        let now = Instant::now();
        self.sessions()
            .iter()
            .filter(|(_, created)| now.duration_since(**created) > timeout)
            .map(|(imsi, _)| imsi.clone())
            .collect()
    }

    /// Copies out up to `limit` identities, in no particular order. Used by
    /// the graceful drain to bound evictions per pacing tick.
    pub fn first_n(&self, limit: usize) -> Vec<String> {
        self.sessions().keys().take(limit).cloned().collect()
    }
}

/// Process-wide lifecycle signals
///
/// `shutdown` is raised once by the HTTP `/stop` handler and observed at the
/// loop head of every worker; `drained` is raised once by the sweeper after
/// the graceful drain empties the session table, releasing the coordinator.
/// Both are watch channels, so late subscribers still observe a raised flag.
#[derive(Clone)]
pub struct Lifecycle {
    inner: Arc<LifecycleInner>,
}

struct LifecycleInner {
    shutdown: watch::Sender<bool>,
    drained: watch::Sender<bool>,
}

impl Lifecycle {
    pub fn new() -> Self {
        let (shutdown, _) = watch::channel(false);
        let (drained, _) = watch::channel(false);
        Lifecycle {
            inner: Arc::new(LifecycleInner { shutdown, drained }),
        }
    }

    pub fn begin_shutdown(&self) {
        self.inner.shutdown.send_replace(true);
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.inner.shutdown.borrow()
    }

    /// Resolves when shutdown has been initiated.
    pub async fn shutdown_signal(&self) {
        let mut rx = self.inner.shutdown.subscribe();
        // the sender lives in self, so wait_for cannot fail here
        let _ = rx.wait_for(|raised| *raised).await;
    }

    pub fn mark_drained(&self) {
        self.inner.drained.send_replace(true);
    }

    /// Resolves when the sweeper has drained the last session.
    pub async fn drained(&self) {
        let mut rx = self.inner.drained.subscribe();
        let _ = rx.wait_for(|raised| *raised).await;
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
