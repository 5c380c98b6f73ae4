#![cfg(test)]
use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::net::TcpListener;
use undead_common::target::{ProbeKind, ProbeResult, Status, Target};
use undead_core::probe::Probe;
use undead_core::sink::{Publication, ResultSink, RoundReport};

/// Binds an ephemeral loopback port and keeps it open while the listener lives.
pub async fn open_port() -> (TcpListener, u16) {
    let listener: TcpListener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port: u16 = listener.local_addr().unwrap().port();
    (listener, port)
}

/// A loopback port that refuses connections.
pub async fn closed_port() -> u16 {
    let (listener, port) = open_port().await;
    drop(listener);
    port
}

/// Stands in for the platform `ping`: answers for a fixed set of addresses.
pub struct ScriptedIcmp {
    answers: HashSet<IpAddr>,
    pub calls: AtomicUsize,
}

impl ScriptedIcmp {
    pub fn new(answers: &[IpAddr]) -> Arc<Self> {
        Arc::new(Self {
            answers: answers.iter().copied().collect(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Probe for ScriptedIcmp {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Icmp
    }

    async fn run(&self, address: IpAddr) -> ProbeResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.answers.contains(&address) {
            ProbeResult::success()
        } else {
            ProbeResult::failure("Request timed out")
        }
    }
}

/// One published round as the sink saw it.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub round: u64,
    pub targets: Vec<Target>,
    pub matching: usize,
}

impl Snapshot {
    pub fn statuses(&self) -> Vec<Option<Status>> {
        self.targets.iter().map(|t| t.status).collect()
    }
}

/// Records every round and lets a test hook run after each publish.
#[derive(Default)]
pub struct CollectingSink {
    pub rounds: Vec<Snapshot>,
    pub sleeping: Vec<String>,
    pub after_publish: Option<Box<dyn FnMut(u64) + Send>>,
}

impl ResultSink for CollectingSink {
    fn publish(&mut self, report: &RoundReport<'_>) -> anyhow::Result<Publication> {
        self.rounds.push(Snapshot {
            round: report.round,
            targets: report.targets.to_vec(),
            matching: report.matching,
        });
        if let Some(hook) = self.after_publish.as_mut() {
            hook(report.round);
        }
        Ok(Publication::default())
    }

    fn sleeping(&mut self, status_line: &str) {
        self.sleeping.push(status_line.to_string());
    }
}
