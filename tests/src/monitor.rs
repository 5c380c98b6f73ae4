#![cfg(test)]
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use undead_common::config::RunConfig;
use undead_common::target::{Status, Target};
use undead_core::monitor::{Monitor, MonitorState};
use undead_core::probe::{Probe, TcpProbe};
use undead_core::resolver::SystemResolver;
use undead_core::scanner::Scanner;

use crate::utils::{CollectingSink, ScriptedIcmp, open_port};

fn tcp_scanner(port: u16) -> Scanner {
    let probe: Arc<dyn Probe> = Arc::new(TcpProbe::new(port, Duration::from_secs(1)));
    Scanner::new(Arc::new(SystemResolver), vec![probe], 4)
}

#[tokio::test]
async fn single_shot_publishes_one_round() {
    let (_listener, port) = open_port().await;
    let cfg: RunConfig = RunConfig::new(false, Some(port)).unwrap();
    let mut sink: CollectingSink = CollectingSink::default();

    let mut monitor: Monitor = Monitor::new(tcp_scanner(port), &cfg, CancellationToken::new());
    let targets: Vec<Target> = vec![Target::new("127.0.0.1", Some(port))];
    let last: Vec<Target> = monitor.run(targets, &mut sink).await.unwrap();

    assert_eq!(monitor.state(), MonitorState::Done);
    assert_eq!(sink.rounds.len(), 1);
    assert!(sink.sleeping.is_empty());
    assert_eq!(last[0].status, Some(Status::Undead));
}

#[tokio::test]
async fn host_going_down_between_rounds_turns_dead() {
    let (listener, port) = open_port().await;
    let cfg: RunConfig = RunConfig::new(false, Some(port))
        .unwrap()
        .monitor(Duration::from_millis(20))
        .unwrap();
    let cancel: CancellationToken = CancellationToken::new();

    let mut held: Option<TcpListener> = Some(listener);
    let stopper: CancellationToken = cancel.clone();
    let mut sink: CollectingSink = CollectingSink {
        after_publish: Some(Box::new(move |round: u64| match round {
            1 => drop(held.take()),
            _ => stopper.cancel(),
        })),
        ..CollectingSink::default()
    };

    let mut monitor: Monitor = Monitor::new(tcp_scanner(port), &cfg, cancel);
    let targets: Vec<Target> = vec![Target::new("127.0.0.1", Some(port))];
    monitor.run(targets, &mut sink).await.unwrap();

    assert_eq!(monitor.state(), MonitorState::Stopped);
    assert_eq!(monitor.rounds_completed(), 2);
    assert_eq!(sink.rounds[0].statuses(), vec![Some(Status::Undead)]);
    assert_eq!(sink.rounds[1].statuses(), vec![Some(Status::Dead)]);
    assert_eq!(sink.sleeping.len(), 1);
}

#[tokio::test]
async fn unresolved_targets_stay_unknown_every_round() {
    let loopback: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
    let icmp: Arc<ScriptedIcmp> = ScriptedIcmp::new(&[loopback]);
    let scanner: Scanner = Scanner::new(Arc::new(SystemResolver), vec![icmp.clone()], 4);
    let cfg: RunConfig = RunConfig::new(true, None)
        .unwrap()
        .monitor(Duration::from_millis(10))
        .unwrap()
        .filter(Some(Status::Unknown));
    let cancel: CancellationToken = CancellationToken::new();

    let stopper: CancellationToken = cancel.clone();
    let mut sink: CollectingSink = CollectingSink {
        after_publish: Some(Box::new(move |round: u64| {
            if round == 3 {
                stopper.cancel();
            }
        })),
        ..CollectingSink::default()
    };

    let mut monitor: Monitor = Monitor::new(scanner, &cfg, cancel);
    let targets: Vec<Target> = vec![
        Target::new("nowhere.invalid", None),
        Target::new("127.0.0.1", None),
    ];
    monitor.run(targets, &mut sink).await.unwrap();

    assert_eq!(sink.rounds.len(), 3);
    for snapshot in &sink.rounds {
        assert_eq!(snapshot.statuses(), vec![Some(Status::Unknown), Some(Status::Undead)]);
        assert_eq!(snapshot.matching, 1);
    }
    assert_eq!(icmp.calls(), 3);
    let rounds: Vec<u64> = sink.rounds.iter().map(|s| s.round).collect();
    assert_eq!(rounds, vec![1, 2, 3]);
}
