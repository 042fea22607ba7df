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

//! Configuration loading for the server and the client tool.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::{fmt, fs};

use anyhow::{bail, Context};
use serde::Deserialize;

use crate::bcd::IMSI_DIGITS;

/// Console log verbosity; the file sink always logs at debug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum LogLevel {
    #[serde(rename = "INFO")]
    Info,
    #[serde(rename = "DEBUG")]
    Debug,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => f.write_str("INFO"),
            LogLevel::Debug => f.write_str("DEBUG"),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// UDP bind address for the registration data plane
    pub udp_ip: IpAddr,
    /// UDP bind port
    pub udp_port: u16,
    /// Session lifetime in seconds before timeout eviction
    pub session_timeout_sec: u64,
    /// Path of the append-only CDR file
    pub cdr_file: PathBuf,
    /// Port of the HTTP control surface
    pub http_port: u16,
    /// Sessions evicted per second during the graceful drain
    pub graceful_shutdown_rate: usize,
    /// Path of the log file sink
    pub log_file: PathBuf,
    /// Console log level
    pub log_level: LogLevel,
    /// IMSIs that are never admitted
    #[serde(default)]
    pub blacklist: Vec<String>,
}

/// Client tool configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Server address to send the registration to
    pub server_ip: IpAddr,
    /// Server UDP port
    pub server_port: u16,
    /// Path of the log file sink
    pub log_file: PathBuf,
    /// Console log level
    pub log_level: LogLevel,
}

impl ServerConfig {
    /// Load and validate the server configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("cannot open server config file {}", path.display()))?;
        let config: ServerConfig =
            serde_yaml::from_str(&contents).context("cannot parse server config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.udp_port == 0 {
            bail!("udp_port must be in 1..65535");
        }
        if self.http_port == 0 {
            bail!("http_port must be in 1..65535");
        }
        if self.session_timeout_sec == 0 {
            bail!("session_timeout_sec must be positive");
        }
        if self.graceful_shutdown_rate == 0 {
            bail!("graceful_shutdown_rate must be positive");
        }
        for imsi in &self.blacklist {
            if imsi.len() != IMSI_DIGITS || !imsi.bytes().all(|b| b.is_ascii_digit()) {
                bail!("blacklist entry {:?} is not a 15-digit IMSI", imsi);
            }
        }
        Ok(())
    }
}

impl ClientConfig {
    /// Load the client configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("cannot open client config file {}", path.display()))?;
        let config: ClientConfig =
            serde_yaml::from_str(&contents).context("cannot parse client config")?;
        if config.server_port == 0 {
            bail!("server_port must be in 1..65535");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    const SERVER_YAML: &str = r#"
udp_ip: "127.0.0.1"
udp_port: 5050
session_timeout_sec: 30
cdr_file: "cdr.log"
http_port: 8080
graceful_shutdown_rate: 5
log_file: "server.log"
log_level: "INFO"
blacklist:
  - "000000000000001"
  - "123456789123456"
"#;

    #[test]
    fn test_load_server_config_valid() {
        let file = write_config(SERVER_YAML);
        let cfg = ServerConfig::load(file.path()).unwrap();

        assert_eq!(cfg.udp_ip, "127.0.0.1".parse::<IpAddr>().unwrap());
        assert_eq!(cfg.udp_port, 5050);
        assert_eq!(cfg.session_timeout_sec, 30);
        assert_eq!(cfg.cdr_file, PathBuf::from("cdr.log"));
        assert_eq!(cfg.http_port, 8080);
        assert_eq!(cfg.graceful_shutdown_rate, 5);
        assert_eq!(cfg.log_file, PathBuf::from("server.log"));
        assert_eq!(cfg.log_level, LogLevel::Info);
        assert_eq!(
            cfg.blacklist,
            vec!["000000000000001".to_string(), "123456789123456".to_string()]
        );
    }

    #[test]
    fn test_load_server_config_no_file() {
        assert!(ServerConfig::load("not_exist_server.yaml").is_err());
    }

    #[test]
    fn test_load_server_config_rejects_bad_blacklist() {
        let file = write_config(&SERVER_YAML.replace("123456789123456", "12345"));
        let err = ServerConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("blacklist"));
    }

    #[test]
    fn test_load_server_config_rejects_zero_rate() {
        let file = write_config(
            &SERVER_YAML.replace("graceful_shutdown_rate: 5", "graceful_shutdown_rate: 0"),
        );
        assert!(ServerConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_load_client_config_valid() {
        let file = write_config(
            r#"
server_ip: "127.0.0.1"
server_port: 5050
log_file: "client.log"
log_level: "DEBUG"
"#,
        );
        let cfg = ClientConfig::load(file.path()).unwrap();

        assert_eq!(cfg.server_ip, "127.0.0.1".parse::<IpAddr>().unwrap());
        assert_eq!(cfg.server_port, 5050);
        assert_eq!(cfg.log_file, PathBuf::from("client.log"));
        assert_eq!(cfg.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_load_client_config_no_file() {
        assert!(ClientConfig::load("not_exist_client.yaml").is_err());
    }

    #[test]
    fn test_log_level_is_uppercase_only() {
        let file = write_config(&SERVER_YAML.replace("\"INFO\"", "\"info\""));
        assert!(ServerConfig::load(file.path()).is_err());
    }
}
