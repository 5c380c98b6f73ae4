//! The reachability test **abstraction**.
//!
//! A [`Probe`] runs one test against one resolved address and always returns a
//! [`ProbeResult`]; failures of any kind are encoded in the result, never raised.
//! Concrete probes are chosen once from the [`RunConfig`] by [`from_config`].

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use undead_common::config::RunConfig;
use undead_common::target::{ProbeKind, ProbeResult};

pub mod icmp;
pub mod tcp;

pub use icmp::{IcmpProbe, PingCommand};
pub use tcp::TcpProbe;

#[async_trait]
pub trait Probe: Send + Sync {
    /// Which outcome slot of the target this probe fills.
    fn kind(&self) -> ProbeKind;

    /// Runs the test once against `address`.
    async fn run(&self, address: IpAddr) -> ProbeResult;
}

/// Builds the requested probes, ICMP first.
pub fn from_config(cfg: &RunConfig) -> Vec<Arc<dyn Probe>> {
    let mut probes: Vec<Arc<dyn Probe>> = Vec::new();
    for kind in cfg.probes() {
        match kind {
            ProbeKind::Icmp => {
                let icmp: IcmpProbe = IcmpProbe::new(PingCommand::for_host(), cfg.probe_timeout);
                probes.push(Arc::new(icmp));
            }
            ProbeKind::Tcp => {
                if let Some(port) = cfg.tcp_port() {
                    probes.push(Arc::new(TcpProbe::new(port, cfg.probe_timeout)));
                }
            }
        }
    }
    probes
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
