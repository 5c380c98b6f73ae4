//! # Target Model
//!
//! A [`Target`] is one endpoint under test. It is created once per input string,
//! resolved once, and then re-used for every round of a scan.
//!
//! Per-round fields (`status`, both outcomes, `error`) are cleared by
//! [`Target::begin_round`] so that a round never observes a previous round's verdict.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde::Serialize;

/// Tri-state liveness verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// At least one requested probe got an answer.
    Undead,
    /// Every requested probe ran and none got an answer.
    Dead,
    /// No probe could run, usually because the hostname did not resolve.
    Unknown,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Undead => "undead",
            Status::Dead => "dead",
            Status::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "undead" | "up" | "alive" => Ok(Status::Undead),
            "dead" | "down" => Ok(Status::Dead),
            "unknown" => Ok(Status::Unknown),
            _ => Err(format!("invalid status: {s} (expected undead, dead or unknown)")),
        }
    }
}

/// Result of a single probe against a single target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kinds of reachability test a run can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    Icmp,
    Tcp,
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeKind::Icmp => f.write_str("icmp"),
            ProbeKind::Tcp => f.write_str("tcp"),
        }
    }
}

/// What a probe hands back: an outcome and, on failure, why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub outcome: Outcome,
    pub diagnostic: Option<String>,
}

impl ProbeResult {
    pub fn success() -> Self {
        Self {
            outcome: Outcome::Success,
            diagnostic: None,
        }
    }

    pub fn failure(diagnostic: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Failure,
            diagnostic: Some(diagnostic.into()),
        }
    }
}

/// One network endpoint under test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    hostname: String,
    pub address: Option<IpAddr>,
    pub status: Option<Status>,
    pub icmp_outcome: Option<Outcome>,
    pub tcp_port: Option<u16>,
    pub tcp_outcome: Option<Outcome>,
    pub error: Option<String>,
    /// Diagnostic from resolution; survives round resets because the address never changes.
    #[serde(skip)]
    resolve_error: Option<String>,
}

impl Target {
    pub fn new(hostname: impl Into<String>, tcp_port: Option<u16>) -> Self {
        Self {
            hostname: hostname.into(),
            address: None,
            status: None,
            icmp_outcome: None,
            tcp_port,
            tcp_outcome: None,
            error: None,
            resolve_error: None,
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Records a successful resolution.
    pub fn resolved(&mut self, address: IpAddr) {
        self.address = Some(address);
        self.resolve_error = None;
        self.error = None;
    }

    /// Records a failed resolution. The address stays absent for the rest of the run.
    pub fn unresolved(&mut self, diagnostic: impl Into<String>) {
        let diagnostic: String = diagnostic.into();
        self.address = None;
        self.error = Some(diagnostic.clone());
        self.resolve_error = Some(diagnostic);
    }

    /// Clears every per-round field ahead of a new round.
    ///
    /// `address` and `tcp_port` are kept. A resolution diagnostic is re-surfaced as `error`
    /// since it still explains why the target cannot be probed.
    pub fn begin_round(&mut self) {
        self.status = None;
        self.icmp_outcome = None;
        self.tcp_outcome = None;
        self.error = self.resolve_error.clone();
    }

    pub fn outcome(&self, kind: ProbeKind) -> Option<Outcome> {
        match kind {
            ProbeKind::Icmp => self.icmp_outcome,
            ProbeKind::Tcp => self.tcp_outcome,
        }
    }

    /// Folds a probe result into the target. A failure diagnostic becomes the last error.
    pub fn record(&mut self, kind: ProbeKind, result: ProbeResult) {
        match kind {
            ProbeKind::Icmp => self.icmp_outcome = Some(result.outcome),
            ProbeKind::Tcp => self.tcp_outcome = Some(result.outcome),
        }
        if let Some(diagnostic) = result.diagnostic {
            self.error = Some(diagnostic);
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
