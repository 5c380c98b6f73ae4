//! # Scanner
//!
//! One round of the pipeline: reset every target, run each configured probe over all of
//! them through the [`dispatch`](crate::dispatch) fan-out, then classify.
//!
//! Targets are moved into the task probing them and handed back when it finishes, so a
//! target is only ever written by one task at a time and never needs a lock.

use std::sync::Arc;

use tracing::{debug, warn};
use undead_common::config::RunConfig;
use undead_common::target::{ProbeKind, Target};

use crate::classify;
use crate::dispatch::{self, Completion};
use crate::probe::{self, Probe};
use crate::resolver::{self, Resolve, SystemResolver};

pub struct Scanner {
    resolver: Arc<dyn Resolve>,
    probes: Vec<Arc<dyn Probe>>,
    width: usize,
}

impl Scanner {
    pub fn new(resolver: Arc<dyn Resolve>, probes: Vec<Arc<dyn Probe>>, width: usize) -> Self {
        Self {
            resolver,
            probes,
            width: width.max(1),
        }
    }

    /// The production wiring: system resolver and the probes the config asks for.
    pub fn from_config(cfg: &RunConfig) -> Self {
        Self::new(Arc::new(SystemResolver), probe::from_config(cfg), cfg.width.resolve())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Probe kinds this scanner runs, in execution order.
    pub fn requested(&self) -> Vec<ProbeKind> {
        self.probes.iter().map(|probe| probe.kind()).collect()
    }

    /// Resolves every target concurrently. Runs once per scan.
    pub async fn resolve_all(&self, targets: Vec<Target>) -> Vec<Target> {
        let completions: Vec<Completion<Target>> = dispatch::dispatch(targets, self.width, |target| {
            let resolver: Arc<dyn Resolve> = Arc::clone(&self.resolver);
            async move { resolver::resolve(target, resolver.as_ref()).await }
        })
        .await;

        completions
            .into_iter()
            .map(|completion| match completion {
                Completion::Done(target) => target,
                Completion::Crashed { mut item, reason } => {
                    item.unresolved(format!("resolver crashed: {reason}"));
                    item
                }
            })
            .collect()
    }

    /// Runs one complete round and returns the targets with a fresh status each.
    pub async fn run_round(&self, mut targets: Vec<Target>) -> Vec<Target> {
        for target in targets.iter_mut() {
            target.begin_round();
        }

        for probe in &self.probes {
            targets = self.run_probe(Arc::clone(probe), targets).await;
        }

        let requested: Vec<ProbeKind> = self.requested();
        for target in targets.iter_mut() {
            classify::apply(target, &requested);
        }
        targets
    }

    async fn run_probe(&self, probe: Arc<dyn Probe>, targets: Vec<Target>) -> Vec<Target> {
        let kind: ProbeKind = probe.kind();
        debug!("running {kind} probe over {} targets", targets.len());

        let completions: Vec<Completion<Target>> = dispatch::dispatch(targets, self.width, |target| {
            let probe: Arc<dyn Probe> = Arc::clone(&probe);
            async move { probe_one(probe, target).await }
        })
        .await;

        completions
            .into_iter()
            .map(|completion| match completion {
                Completion::Done(target) => target,
                Completion::Crashed { mut item, reason } => {
                    warn!("{kind} probe for {} crashed: {reason}", item.hostname());
                    item.error = Some(format!("{kind} probe crashed: {reason}"));
                    item
                }
            })
            .collect()
    }
}

async fn probe_one(probe: Arc<dyn Probe>, mut target: Target) -> Target {
    // Unresolved targets are never probed.
    let Some(address) = target.address else {
        return target;
    };

    let result = probe.run(address).await;
    target.record(probe.kind(), result);
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

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::io;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use undead_common::target::{Outcome, ProbeResult, Status};

    /// Resolves `*.invalid` to nothing and every other name to 10.0.0.<len>.
    struct FakeResolver;

    #[async_trait]
    impl Resolve for FakeResolver {
        async fn lookup(&self, hostname: &str) -> io::Result<IpAddr> {
            if hostname.ends_with(".invalid") {
                return Err(io::Error::new(io::ErrorKind::NotFound, "name not known"));
            }
            Ok(IpAddr::V4(Ipv4Addr::new(10, 0, 0, hostname.len() as u8)))
        }
    }

    /// Answers for a fixed set of addresses, panics for `panic_on`, counts calls.
    struct FakeProbe {
        kind: ProbeKind,
        answers: HashSet<IpAddr>,
        panic_on: Option<IpAddr>,
        calls: AtomicUsize,
    }

    impl FakeProbe {
        fn new(kind: ProbeKind, answers: &[IpAddr]) -> Self {
            Self {
                kind,
                answers: answers.iter().copied().collect(),
                panic_on: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Probe for FakeProbe {
        fn kind(&self) -> ProbeKind {
            self.kind
        }

        async fn run(&self, address: IpAddr) -> ProbeResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.panic_on == Some(address) {
                panic!("probe blew up on {address}");
            }
            if self.answers.contains(&address) {
                ProbeResult::success()
            } else {
                ProbeResult::failure("no answer")
            }
        }
    }

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(192, 168, 1, last))
    }

    fn scanner(probes: Vec<Arc<FakeProbe>>) -> Scanner {
        let probes: Vec<Arc<dyn Probe>> = probes.into_iter().map(|p| p as Arc<dyn Probe>).collect();
        Scanner::new(Arc::new(FakeResolver), probes, 4)
    }

    #[tokio::test]
    async fn literal_icmp_success_is_undead() {
        let icmp: Arc<FakeProbe> = Arc::new(FakeProbe::new(ProbeKind::Icmp, &[ip(1)]));
        let scanner: Scanner = scanner(vec![icmp]);

        let targets: Vec<Target> = scanner.resolve_all(vec![Target::new("192.168.1.1", None)]).await;
        let targets: Vec<Target> = scanner.run_round(targets).await;

        assert_eq!(targets[0].status, Some(Status::Undead));
        assert_eq!(targets[0].icmp_outcome, Some(Outcome::Success));
        assert_eq!(targets[0].tcp_outcome, None);
    }

    #[tokio::test]
    async fn unresolved_target_is_unknown_and_never_probed() {
        let icmp: Arc<FakeProbe> = Arc::new(FakeProbe::new(ProbeKind::Icmp, &[]));
        let tcp: Arc<FakeProbe> = Arc::new(FakeProbe::new(ProbeKind::Tcp, &[]));
        let scanner: Scanner = scanner(vec![Arc::clone(&icmp), Arc::clone(&tcp)]);

        let targets: Vec<Target> = scanner
            .resolve_all(vec![Target::new("badhost.invalid", Some(80))])
            .await;

        for _ in 0..2 {
            let round: Vec<Target> = scanner.run_round(targets.clone()).await;
            let target: &Target = &round[0];
            assert!(target.address.is_none());
            assert_eq!(target.status, Some(Status::Unknown));
            assert_eq!(target.icmp_outcome, None);
            assert_eq!(target.tcp_outcome, None);
            assert_eq!(target.error.as_deref(), Some("name not known"));
        }
        assert_eq!(icmp.calls.load(Ordering::SeqCst), 0);
        assert_eq!(tcp.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn tcp_success_with_icmp_blocked_is_undead() {
        let icmp: Arc<FakeProbe> = Arc::new(FakeProbe::new(ProbeKind::Icmp, &[]));
        let tcp: Arc<FakeProbe> = Arc::new(FakeProbe::new(ProbeKind::Tcp, &[ip(7)]));
        let scanner: Scanner = scanner(vec![icmp, tcp]);

        let targets: Vec<Target> = scanner.resolve_all(vec![Target::new("192.168.1.7", Some(80))]).await;
        let target: Target = scanner.run_round(targets).await.remove(0);

        assert_eq!(target.icmp_outcome, Some(Outcome::Failure));
        assert_eq!(target.tcp_outcome, Some(Outcome::Success));
        assert_eq!(target.status, Some(Status::Undead));
    }

    #[tokio::test]
    async fn unreachable_by_both_is_dead() {
        let icmp: Arc<FakeProbe> = Arc::new(FakeProbe::new(ProbeKind::Icmp, &[]));
        let tcp: Arc<FakeProbe> = Arc::new(FakeProbe::new(ProbeKind::Tcp, &[]));
        let scanner: Scanner = scanner(vec![icmp, tcp]);

        let targets: Vec<Target> = scanner.resolve_all(vec![Target::new("192.168.1.9", Some(80))]).await;
        let target: Target = scanner.run_round(targets).await.remove(0);

        assert_eq!(target.icmp_outcome, Some(Outcome::Failure));
        assert_eq!(target.tcp_outcome, Some(Outcome::Failure));
        assert_eq!(target.status, Some(Status::Dead));
        assert_eq!(target.error.as_deref(), Some("no answer"));
    }

    #[tokio::test]
    async fn crashed_probe_is_never_reported_successful() {
        let mut icmp: FakeProbe = FakeProbe::new(ProbeKind::Icmp, &[ip(1), ip(2)]);
        icmp.panic_on = Some(ip(2));
        let scanner: Scanner = scanner(vec![Arc::new(icmp)]);

        let targets: Vec<Target> = scanner
            .resolve_all(vec![
                Target::new("192.168.1.1", None),
                Target::new("192.168.1.2", None),
                Target::new("192.168.1.3", None),
            ])
            .await;
        let targets: Vec<Target> = scanner.run_round(targets).await;

        assert_eq!(targets.len(), 3);
        assert_eq!(targets[0].status, Some(Status::Undead));
        assert_eq!(targets[1].icmp_outcome, None);
        assert_eq!(targets[1].status, Some(Status::Unknown));
        assert!(targets[1].error.as_deref().unwrap().contains("crashed"));
        assert_eq!(targets[2].status, Some(Status::Dead));
    }

    #[tokio::test]
    async fn round_resets_previous_verdict() {
        let icmp: Arc<FakeProbe> = Arc::new(FakeProbe::new(ProbeKind::Icmp, &[]));
        let scanner: Scanner = scanner(vec![icmp]);

        let mut targets: Vec<Target> = scanner.resolve_all(vec![Target::new("192.168.1.5", None)]).await;
        targets[0].icmp_outcome = Some(Outcome::Success);
        targets[0].status = Some(Status::Undead);

        let targets: Vec<Target> = scanner.run_round(targets).await;
        assert_eq!(targets[0].status, Some(Status::Dead));
    }

    #[tokio::test]
    async fn order_and_hostnames_are_preserved() {
        let icmp: Arc<FakeProbe> = Arc::new(FakeProbe::new(ProbeKind::Icmp, &[]));
        let scanner: Scanner = scanner(vec![icmp]);
        let names: Vec<&str> = vec!["b.example", "a.invalid", "192.168.1.3", "b.example"];

        let targets: Vec<Target> = scanner
            .resolve_all(names.iter().map(|n| Target::new(*n, None)).collect())
            .await;
        let targets: Vec<Target> = scanner.run_round(targets).await;

        let got: Vec<&str> = targets.iter().map(Target::hostname).collect();
        assert_eq!(got, names);
        assert!(targets.iter().all(|t| t.status.is_some()));
    }
}
