// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Cursus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Cursus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Runtime configuration for the browser and the management server.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::model::{IdError, SessionKey};

pub const DEFAULT_HTTP_PORT: u16 = 27436;
pub const DEFAULT_STAGING_PATH: &str = "/staging/";
pub const DEFAULT_MANAGEMENT_PATH: &str = "/management/";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Session used by requests that do not carry the session header.
pub use crate::model::ANONYMOUS_SESSION;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    staging_path: String,
    management_path: String,
    session_id: SessionKey,
    timeout: Duration,
}

impl ClientConfig {
    /// Validates `base_url` (`http` or `https`, no query) and applies the defaults.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let parsed = reqwest::Url::parse(base_url).map_err(|err| ConfigError::InvalidBaseUrl {
            value: base_url.to_owned(),
            reason: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                value: base_url.to_owned(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(ConfigError::InvalidBaseUrl {
                value: base_url.to_owned(),
                reason: "base url must not carry a query or fragment".to_owned(),
            });
        }

        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_owned(),
            staging_path: DEFAULT_STAGING_PATH.to_owned(),
            management_path: DEFAULT_MANAGEMENT_PATH.to_owned(),
            session_id: default_session_id(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    pub fn for_local_port(port: u16) -> Self {
        Self {
            base_url: format!("http://127.0.0.1:{port}"),
            staging_path: DEFAULT_STAGING_PATH.to_owned(),
            management_path: DEFAULT_MANAGEMENT_PATH.to_owned(),
            session_id: default_session_id(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_session_id(mut self, session_id: &str) -> Result<Self, ConfigError> {
        self.session_id = SessionKey::new(session_id).map_err(ConfigError::InvalidSessionId)?;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn staging_path(&self) -> &str {
        &self.staging_path
    }

    pub fn management_path(&self) -> &str {
        &self.management_path
    }

    pub fn session_id(&self) -> &SessionKey {
        &self.session_id
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Absolute URL for a server-relative `location` (path plus optional query).
    pub fn url(&self, location: &str) -> String {
        if location.starts_with("http://") || location.starts_with("https://") {
            return location.to_owned();
        }
        if location.starts_with('/') {
            format!("{}{location}", self.base_url)
        } else {
            format!("{}/{location}", self.base_url)
        }
    }

    pub fn staging_url(&self) -> String {
        self.url(&self.staging_path)
    }
}

fn default_session_id() -> SessionKey {
    SessionKey::for_process(std::process::id())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: IpAddr,
    /// `0` asks the OS for an ephemeral port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: IpAddr::V4(Ipv4Addr::LOCALHOST), port: DEFAULT_HTTP_PORT }
    }
}

impl ServerConfig {
    pub fn with_port(port: u16) -> Self {
        Self { port, ..Self::default() }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidBaseUrl { value: String, reason: String },
    InvalidSessionId(IdError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBaseUrl { value, reason } => {
                write!(f, "invalid base url '{value}': {reason}")
            }
            Self::InvalidSessionId(err) => write!(f, "invalid session id: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidSessionId(err) => Some(err),
            Self::InvalidBaseUrl { .. } => None,
        }
    }
}
