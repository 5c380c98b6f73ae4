#![cfg(test)]
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use undead_common::target::{Outcome, Status, Target};
use undead_core::probe::{Probe, TcpProbe};
use undead_core::resolver::SystemResolver;
use undead_core::scanner::Scanner;

use crate::utils::{ScriptedIcmp, closed_port, open_port};

const LOOPBACK: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

fn scanner(probes: Vec<Arc<dyn Probe>>) -> Scanner {
    Scanner::new(Arc::new(SystemResolver), probes, 8)
}

async fn scan_once(scanner: &Scanner, hosts: &[&str], port: Option<u16>) -> Vec<Target> {
    let targets: Vec<Target> = hosts.iter().map(|h| Target::new(*h, port)).collect();
    let resolved: Vec<Target> = scanner.resolve_all(targets).await;
    scanner.run_round(resolved).await
}

#[tokio::test]
async fn open_loopback_port_is_undead() {
    let (_listener, port) = open_port().await;
    let probe: Arc<dyn Probe> = Arc::new(TcpProbe::new(port, Duration::from_secs(1)));

    let results: Vec<Target> = scan_once(&scanner(vec![probe]), &["127.0.0.1"], Some(port)).await;

    assert_eq!(results[0].address, Some(LOOPBACK));
    assert_eq!(results[0].tcp_outcome, Some(Outcome::Success));
    assert_eq!(results[0].status, Some(Status::Undead));
    assert!(results[0].error.is_none());
}

#[tokio::test]
async fn refused_loopback_port_is_dead_with_diagnostic() {
    let port: u16 = closed_port().await;
    let probe: Arc<dyn Probe> = Arc::new(TcpProbe::new(port, Duration::from_secs(1)));

    let results: Vec<Target> = scan_once(&scanner(vec![probe]), &["127.0.0.1"], Some(port)).await;

    assert_eq!(results[0].tcp_outcome, Some(Outcome::Failure));
    assert_eq!(results[0].status, Some(Status::Dead));
    assert!(results[0].error.is_some());
}

#[tokio::test]
async fn unresolvable_host_is_unknown_and_never_probed() {
    let icmp: Arc<ScriptedIcmp> = ScriptedIcmp::new(&[LOOPBACK]);
    let probes: Vec<Arc<dyn Probe>> = vec![icmp.clone()];

    let results: Vec<Target> =
        scan_once(&scanner(probes), &["badhost.invalid", "127.0.0.1"], None).await;

    assert_eq!(results[0].hostname(), "badhost.invalid");
    assert_eq!(results[0].address, None);
    assert_eq!(results[0].status, Some(Status::Unknown));
    assert!(results[0].error.is_some());
    assert_eq!(results[1].status, Some(Status::Undead));
    assert_eq!(icmp.calls(), 1);
}

#[tokio::test]
async fn tcp_success_outweighs_icmp_silence() {
    let (_listener, port) = open_port().await;
    let icmp: Arc<ScriptedIcmp> = ScriptedIcmp::new(&[]);
    let tcp: Arc<dyn Probe> = Arc::new(TcpProbe::new(port, Duration::from_secs(1)));

    let results: Vec<Target> =
        scan_once(&scanner(vec![icmp, tcp]), &["127.0.0.1"], Some(port)).await;

    assert_eq!(results[0].icmp_outcome, Some(Outcome::Failure));
    assert_eq!(results[0].tcp_outcome, Some(Outcome::Success));
    assert_eq!(results[0].status, Some(Status::Undead));
}

#[tokio::test]
async fn results_keep_input_order_across_many_targets() {
    let (_listener, port) = open_port().await;
    let closed: u16 = closed_port().await;
    let hosts: Vec<String> = (0..40)
        .map(|i| if i % 3 == 0 { "localhost.invalid".to_string() } else { "127.0.0.1".to_string() })
        .collect();
    let refs: Vec<&str> = hosts.iter().map(String::as_str).collect();

    let open: Arc<dyn Probe> = Arc::new(TcpProbe::new(port, Duration::from_secs(1)));
    let results: Vec<Target> = scan_once(&scanner(vec![open]), &refs, Some(port)).await;
    for (i, target) in results.iter().enumerate() {
        let expected: Status = if i % 3 == 0 { Status::Unknown } else { Status::Undead };
        assert_eq!(target.status, Some(expected), "target {i}");
    }

    let shut: Arc<dyn Probe> = Arc::new(TcpProbe::new(closed, Duration::from_secs(1)));
    let results: Vec<Target> = scan_once(&scanner(vec![shut]), &refs, Some(closed)).await;
    assert!(results.iter().all(|t| t.status != Some(Status::Undead)));
}
