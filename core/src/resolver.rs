//! Turns the user-supplied identifier of a [`Target`] into an address.
//!
//! Literal IPv4/IPv6 addresses are detected with strict [`IpAddr`] parsing and never
//! touch DNS. Everything else goes through the system resolver exactly once. Failures
//! are recorded on the target and never returned as errors.

use std::io;
use std::net::{IpAddr, Ipv6Addr, SocketAddr};

use async_trait::async_trait;
use tracing::debug;
use undead_common::target::Target;

/// A name lookup backend.
#[async_trait]
pub trait Resolve: Send + Sync {
    async fn lookup(&self, hostname: &str) -> io::Result<IpAddr>;
}

/// Looks names up through the host system resolver (`getaddrinfo` on the blocking pool).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

#[async_trait]
impl Resolve for SystemResolver {
    async fn lookup(&self, hostname: &str) -> io::Result<IpAddr> {
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((hostname, 0)).await?.collect();
        pick_address(&addrs).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "name resolved to no addresses")
        })
    }
}

/// Prefers the first IPv4 address, falling back to the first address of any family.
fn pick_address(addrs: &[SocketAddr]) -> Option<IpAddr> {
    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .map(SocketAddr::ip)
}

/// Parses `s` as an address literal. Bracketed IPv6 (`[::1]`) is accepted too.
pub fn parse_literal(s: &str) -> Option<IpAddr> {
    let s: &str = s.trim();
    if let Ok(addr) = s.parse::<IpAddr>() {
        return Some(addr);
    }

    s.strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .and_then(|inner| inner.parse::<Ipv6Addr>().ok())
        .map(IpAddr::V6)
}

/// Resolves one target in place and hands it back.
pub async fn resolve(mut target: Target, resolver: &dyn Resolve) -> Target {
    if let Some(addr) = parse_literal(target.hostname()) {
        target.resolved(addr);
        return target;
    }

    match resolver.lookup(target.hostname()).await {
        Ok(addr) => {
            debug!("{} resolved to {addr}", target.hostname());
            target.resolved(addr);
        }
        Err(e) => {
            debug!("{} did not resolve: {e}", target.hostname());
            target.unresolved(e.to_string());
        }
    }
    target
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
