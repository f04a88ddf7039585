//! TCP connect check
//!
//! Passes when a TCP connection to `host:port` is established within the
//! check's timeout. The connect latency is reported as a precise timing.

use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::core::models::GroupFailures;
use crate::core::ports::{Validation, ValidationInfo};
use crate::error::CheckError;

/// Connect timeout used when the check has none
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connects to `host:port`
#[derive(Debug)]
pub struct TcpCheck {
    info: ValidationInfo,
    host: String,
    port: u16,
    timer_name: Option<String>,
    latency: Mutex<Option<Duration>>,
}

impl TcpCheck {
    /// Create a check
    pub fn new(info: ValidationInfo, host: impl Into<String>, port: u16) -> Self {
        Self {
            info,
            host: host.into(),
            port,
            timer_name: None,
            latency: Mutex::new(None),
        }
    }

    /// Report connect latency to the named metric timer
    #[must_use]
    pub fn with_timer_name(mut self, name: impl Into<String>) -> Self {
        self.timer_name = Some(name.into());
        self
    }

    /// `host:port`
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn connect_timeout(&self) -> Duration {
        self.info.timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT)
    }
}

impl Validation for TcpCheck {
    fn info(&self) -> &ValidationInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut ValidationInfo {
        &mut self.info
    }

    fn kind(&self) -> &'static str {
        "tcp"
    }

    fn timer_name(&self) -> Option<String> {
        self.timer_name.clone()
    }

    fn elapsed_time(&self) -> Option<Duration> {
        self.latency.lock().ok().and_then(|latency| *latency)
    }

    fn perform(&self, _group_failures: &GroupFailures) -> Result<(), CheckError> {
        let addrs = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| CheckError::fail(format!("could not resolve {}: {e}", self.address())))?;

        let mut last_error = None;
        for addr in addrs {
            let start = Instant::now();
            match TcpStream::connect_timeout(&addr, self.connect_timeout()) {
                Ok(_) => {
                    if let Ok(mut latency) = self.latency.lock() {
                        *latency = Some(start.elapsed());
                    }
                    return Ok(());
                },
                Err(e) => {
                    log::debug!("Connect to {addr} failed: {e}");
                    last_error = Some(e);
                },
            }
        }

        Err(CheckError::fail(match last_error {
            Some(e) => format!("could not connect to {}: {e}", self.address()),
            None => format!("{} resolved to no addresses", self.address()),
        }))
    }
}
