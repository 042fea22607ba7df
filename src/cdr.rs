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

//! CDR (Call Detail Record) stream
//!
//! Billing records are appended to a plain text file, one line per session
//! lifecycle event:
//!
//! ```text
//! YYYY-MM-DD HH:MM:SS,<imsi>,<event>
//! ```
//!
//! Timestamps are local wall-clock time. The file is opened in append mode
//! once at startup; a failed open is fatal, a failed write is logged and the
//! session proceeds regardless.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::error;

/// Session lifecycle events recorded in the CDR stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CdrEvent {
    /// Session admitted
    Create,
    /// Session evicted after its timeout elapsed
    Deleted,
    /// Session evicted by the graceful drain
    DeleteWithShutdown,
}

impl fmt::Display for CdrEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CdrEvent::Create => f.write_str("create"),
            CdrEvent::Deleted => f.write_str("deleted"),
            CdrEvent::DeleteWithShutdown => f.write_str("delete with shutdown"),
        }
    }
}

/// Serialized appender over the CDR file handle.
///
/// Each record is written with a single `write_all` under the mutex, so
/// records from concurrent writers never interleave and become visible to
/// readers as soon as the append returns.
pub struct CdrWriter {
    file: Mutex<File>,
}

impl CdrWriter {
    /// Opens the CDR file in append mode, creating it if necessary.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("cannot open CDR file {}", path.display()))?;

        Ok(CdrWriter {
            file: Mutex::new(file),
        })
    }

    /// Appends one record for `imsi`. Write failures are logged at error
    /// level; the session state transition they describe still happens.
    pub fn append(&self, imsi: &str, event: CdrEvent) {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let line = format!(
            "{},{},{}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            imsi,
            event
        );
        if let Err(e) = file.write_all(line.as_bytes()) {
            error!("Cannot write CDR record for IMSI {}: {}", imsi, e);
        }
    }

    /// Flushes the file handle. Called once on shutdown.
    pub fn flush(&self) {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = file.flush() {
            error!("Cannot flush CDR file: {}", e);
        }
    }
}
