//! Connectivity probing
//!
//! A probe is a bounded-time DNS + TCP check used both for pre-flight
//! checks and post-install verification. Probes never fail with an error;
//! an unreachable target is a structured outcome and the caller decides
//! whether it is fatal.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tokio::net::{lookup_host, TcpStream};

/// Why a probe target could not be reached
#[derive(Debug, Clone, PartialEq)]
pub enum UnreachableReason {
    /// Hostname did not resolve to any address
    ResolutionFailed(String),
    /// Resolution succeeded but the TCP connect was refused or errored
    PortClosed(String),
    /// The whole attempt exceeded the caller's timeout
    TimedOut,
}

impl fmt::Display for UnreachableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnreachableReason::ResolutionFailed(host) => {
                write!(f, "cannot resolve hostname '{}'", host)
            }
            UnreachableReason::PortClosed(detail) => write!(f, "port closed ({})", detail),
            UnreachableReason::TimedOut => write!(f, "connection attempt timed out"),
        }
    }
}

/// Result of a single probe attempt
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Reachable,
    Unreachable(UnreachableReason),
}

/// Bounded-time reachability check against a host and port
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn probe(&self, hostname: &str, port: u16, timeout: Duration) -> ProbeOutcome;
}

/// Production probe: resolve the hostname, then attempt a single TCP
/// connect, all within the caller's timeout. No retries.
pub struct TcpProbe;

#[async_trait]
impl ConnectivityProbe for TcpProbe {
    async fn probe(&self, hostname: &str, port: u16, timeout: Duration) -> ProbeOutcome {
        match tokio::time::timeout(timeout, probe_once(hostname, port)).await {
            Ok(outcome) => outcome,
            Err(_) => ProbeOutcome::Unreachable(UnreachableReason::TimedOut),
        }
    }
}

async fn probe_once(hostname: &str, port: u16) -> ProbeOutcome {
    let mut addrs = match lookup_host((hostname, port)).await {
        Ok(addrs) => addrs,
        Err(e) => {
            tracing::debug!("Resolution of {} failed: {}", hostname, e);
            return ProbeOutcome::Unreachable(UnreachableReason::ResolutionFailed(
                hostname.to_string(),
            ));
        }
    };

    let Some(addr) = addrs.next() else {
        return ProbeOutcome::Unreachable(UnreachableReason::ResolutionFailed(
            hostname.to_string(),
        ));
    };

    match TcpStream::connect(addr).await {
        Ok(_) => ProbeOutcome::Reachable,
        Err(e) => ProbeOutcome::Unreachable(UnreachableReason::PortClosed(e.to_string())),
    }
}
