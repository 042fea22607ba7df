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

//! Shared harness for the end-to-end tests: starts a full node on ephemeral
//! ports with a scratch CDR file and drives it over real sockets.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio::time;

use carreg::{
    bcd,
    config::{LogLevel, ServerConfig},
    core::PgwCore,
    state::Lifecycle,
};

pub struct TestServer {
    pub udp: SocketAddr,
    pub http_port: u16,
    pub cdr_path: PathBuf,
    pub lifecycle: Lifecycle,
    pub handle: JoinHandle<anyhow::Result<()>>,
    _dir: TempDir,
}

pub async fn start(
    blacklist: &[&str],
    session_timeout_sec: u64,
    graceful_shutdown_rate: usize,
) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let cdr_path = dir.path().join("cdr.log");

    let config = ServerConfig {
        udp_ip: "127.0.0.1".parse().unwrap(),
        udp_port: 0,
        session_timeout_sec,
        cdr_file: cdr_path.clone(),
        http_port: 0,
        graceful_shutdown_rate,
        log_file: dir.path().join("server.log"),
        log_level: LogLevel::Debug,
        blacklist: blacklist.iter().map(|s| s.to_string()).collect(),
    };

    let core = PgwCore::new(config).await.unwrap();
    let udp = core.udp_addr();
    let http_port = core.http_addr().unwrap().port();
    let lifecycle = core.lifecycle();
    let handle = tokio::spawn(core.run());

    TestServer {
        udp,
        http_port,
        cdr_path,
        lifecycle,
        handle,
        _dir: dir,
    }
}

impl TestServer {
    /// Sends an encoded IMSI registration and returns the server's reply.
    pub async fn register(&self, imsi: &str) -> String {
        self.send_raw(&bcd::imsi_to_bcd(imsi).unwrap())
            .await
            .expect("no reply to a well-formed registration")
    }

    /// Sends raw bytes on the data plane; returns the reply, or None if the
    /// server stays silent.
    pub async fn send_raw(&self, payload: &[u8]) -> Option<String> {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        socket.send_to(payload, self.udp).await.unwrap();

        let mut buf = [0u8; 32];
        match time::timeout(Duration::from_secs(2), socket.recv_from(&mut buf)).await {
            Ok(Ok((n, _))) => Some(String::from_utf8_lossy(&buf[..n]).into_owned()),
            _ => None,
        }
    }

    /// Queries `/check_subscriber` and returns the response body.
    pub async fn check(&self, imsi: &str) -> String {
        let url = format!(
            "http://127.0.0.1:{}/check_subscriber?imsi={}",
            self.http_port, imsi
        );
        let response = reqwest::get(&url).await.unwrap();
        assert_eq!(response.status(), 200);
        response.text().await.unwrap()
    }

    /// Calls `/stop` and returns the response body.
    pub async fn stop(&self) -> String {
        let url = format!("http://127.0.0.1:{}/stop", self.http_port);
        let response = reqwest::get(&url).await.unwrap();
        assert_eq!(response.status(), 200);
        response.text().await.unwrap()
    }

    /// Waits for the engine run to finish and checks it exited cleanly.
    pub async fn join(&mut self) {
        (&mut self.handle).await.unwrap().unwrap();
    }

    /// Current contents of the CDR file, one record per line.
    pub fn cdr_lines(&self) -> Vec<String> {
        std::fs::read_to_string(&self.cdr_path)
            .unwrap_or_default()
            .lines()
            .map(|l| l.to_string())
            .collect()
    }
}
