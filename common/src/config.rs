//! # Run Configuration
//!
//! The validated settings for one invocation. Anything that can stop the run before
//! the first probe is a [`ConfigError`].

use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::target::{ProbeKind, Status};

pub const DEFAULT_WORKERS_PER_CPU: usize = 32;
/// Upper bound for a per-CPU width. Each ICMP probe holds a child process and two pipes,
/// so this stays well below the usual 1024 open-file soft limit.
pub const MAX_PER_CPU_WORKERS: usize = 256;
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Fatal configuration problems. Each one maps to a process exit code.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no probe selected, pass --icmp and/or --tcp <PORT>")]
    NoProbeSelected,
    #[error("a TCP probe needs a port")]
    MissingTcpPort,
    #[error("no targets given")]
    NoTargets,
    #[error("worker count must be at least 1")]
    ZeroWorkers,
    #[error("monitor interval must be greater than zero")]
    ZeroInterval,
    #[error("cannot read host list {}: {source}", path.display())]
    HostFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Exit code the process terminates with when this error stops the run.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConfigError::NoProbeSelected => 2,
            ConfigError::HostFile { source, .. } => source.raw_os_error().unwrap_or(1),
            _ => 1,
        }
    }
}

/// How many probes may be in flight at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// A multiple of the available parallelism, capped at [`MAX_PER_CPU_WORKERS`].
    PerCpu(usize),
    /// An exact worker count, never capped.
    Fixed(usize),
}

impl Default for Width {
    fn default() -> Self {
        Width::PerCpu(DEFAULT_WORKERS_PER_CPU)
    }
}

impl Width {
    /// Resolves the width against the machine, never returning less than one.
    pub fn resolve(&self) -> usize {
        match *self {
            Width::Fixed(n) => n.max(1),
            Width::PerCpu(multiplier) => {
                let cpus: usize = std::thread::available_parallelism()
                    .map(NonZeroUsize::get)
                    .unwrap_or(1);
                cpus.saturating_mul(multiplier).clamp(1, MAX_PER_CPU_WORKERS)
            }
        }
    }
}

/// Everything the scan engine needs to know about a run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    probes: BTreeSet<ProbeKind>,
    tcp_port: Option<u16>,
    pub interval: Option<Duration>,
    pub width: Width,
    pub filter: Option<Status>,
    pub probe_timeout: Duration,
}

impl RunConfig {
    /// Validates the probe selection. TCP requires a port, and at least one probe is required.
    pub fn new(icmp: bool, tcp_port: Option<u16>) -> Result<Self, ConfigError> {
        let mut probes: BTreeSet<ProbeKind> = BTreeSet::new();
        if icmp {
            probes.insert(ProbeKind::Icmp);
        }
        if tcp_port.is_some() {
            probes.insert(ProbeKind::Tcp);
        }
        Self::with_probes(probes, tcp_port)
    }

    pub fn with_probes(
        probes: BTreeSet<ProbeKind>,
        tcp_port: Option<u16>,
    ) -> Result<Self, ConfigError> {
        if probes.is_empty() {
            return Err(ConfigError::NoProbeSelected);
        }
        if probes.contains(&ProbeKind::Tcp) && tcp_port.is_none() {
            return Err(ConfigError::MissingTcpPort);
        }

        Ok(Self {
            probes,
            tcp_port,
            interval: None,
            width: Width::default(),
            filter: None,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        })
    }

    pub fn monitor(mut self, interval: Duration) -> Result<Self, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        self.interval = Some(interval);
        Ok(self)
    }

    pub fn width(mut self, width: Width) -> Result<Self, ConfigError> {
        match width {
            Width::Fixed(0) | Width::PerCpu(0) => Err(ConfigError::ZeroWorkers),
            _ => {
                self.width = width;
                Ok(self)
            }
        }
    }

    pub fn filter(mut self, filter: Option<Status>) -> Self {
        self.filter = filter;
        self
    }

    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Requested probe kinds, in a stable order (ICMP before TCP).
    pub fn probes(&self) -> impl Iterator<Item = ProbeKind> + '_ {
        self.probes.iter().copied()
    }

    pub fn tcp_port(&self) -> Option<u16> {
        self.tcp_port
    }

    pub fn is_monitor(&self) -> bool {
        self.interval.is_some()
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
