use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;
use undead_common::target::{ProbeKind, ProbeResult};

use super::Probe;

/// Full TCP handshake against a fixed port. The stream is dropped as soon as it connects.
#[derive(Debug, Clone, Copy)]
pub struct TcpProbe {
    port: u16,
    connect_timeout: Duration,
}

impl TcpProbe {
    pub fn new(port: u16, connect_timeout: Duration) -> Self {
        Self {
            port,
            connect_timeout,
        }
    }
}

#[async_trait]
impl Probe for TcpProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Tcp
    }

    async fn run(&self, address: IpAddr) -> ProbeResult {
        let socket_addr: SocketAddr = SocketAddr::new(address, self.port);

        match timeout(self.connect_timeout, TcpStream::connect(socket_addr)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                debug!("tcp {socket_addr} connected");
                ProbeResult::success()
            }
            Ok(Err(e)) => {
                debug!("tcp {socket_addr} failed: {e}");
                ProbeResult::failure(e.to_string())
            }
            Err(_elapsed) => {
                debug!("tcp {socket_addr} timed out");
                ProbeResult::failure(format!(
                    "connection timed out after {}ms",
                    self.connect_timeout.as_millis()
                ))
            }
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
