//! # Monitor Loop
//!
//! Drives rounds until done. Single-shot runs go `Idle → Scanning → Done`. Monitor runs
//! cycle `Scanning → Waiting → Scanning` until the [`CancellationToken`] fires, then
//! end in `Stopped`.
//!
//! Cancellation is only observed between rounds and while waiting. A round that has
//! started always runs to completion and is published before the loop stops, so a sink
//! never sees a mix of two rounds.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span};
use undead_common::config::RunConfig;
use undead_common::target::{ProbeKind, Status, Target};

use crate::scanner::Scanner;
use crate::sink::{Publication, ResultSink, RoundReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Scanning { round: u64 },
    Waiting { round: u64 },
    /// Cancelled in monitor mode, or a sink failed.
    Stopped,
    /// Single-shot run finished.
    Done,
}

pub struct Monitor {
    scanner: Scanner,
    interval: Option<Duration>,
    filter: Option<Status>,
    cancel: CancellationToken,
    state: MonitorState,
    rounds: u64,
}

impl Monitor {
    pub fn new(scanner: Scanner, cfg: &RunConfig, cancel: CancellationToken) -> Self {
        Self {
            scanner,
            interval: cfg.interval,
            filter: cfg.filter,
            cancel,
            state: MonitorState::Idle,
            rounds: 0,
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Rounds that completed and were published.
    pub fn rounds_completed(&self) -> u64 {
        self.rounds
    }

    /// Resolves the targets once, then runs rounds until done or cancelled.
    ///
    /// Returns the last published round's targets. A sink error stops the loop and is
    /// returned as is.
    pub async fn run<S>(&mut self, targets: Vec<Target>, sink: &mut S) -> anyhow::Result<Vec<Target>>
    where
        S: ResultSink + ?Sized,
    {
        let requested: Vec<ProbeKind> = self.scanner.requested();
        let mut round: u64 = 1;
        self.state = MonitorState::Scanning { round };

        info!(
            "Probing {} targets with {} workers",
            targets.len(),
            self.scanner.width()
        );
        let mut targets: Vec<Target> = self.scanner.resolve_all(targets).await;

        loop {
            // A single-shot run always completes its one round.
            if self.interval.is_some() && self.cancel.is_cancelled() {
                debug!("cancelled before round {round}");
                self.state = MonitorState::Stopped;
                return Ok(targets);
            }

            let started: Instant = Instant::now();
            let span = info_span!("round", round, indicatif.pb_show = true);
            targets = self.scanner.run_round(targets).instrument(span).await;

            let report: RoundReport<'_> = RoundReport::new(
                round,
                &targets,
                &requested,
                self.filter,
                started.elapsed(),
            );
            let publication: Publication = match sink.publish(&report) {
                Ok(publication) => publication,
                Err(e) => {
                    self.state = MonitorState::Stopped;
                    return Err(e);
                }
            };
            self.rounds = round;

            let Some(interval) = self.interval else {
                self.state = MonitorState::Done;
                return Ok(targets);
            };

            if self.cancel.is_cancelled() {
                self.state = MonitorState::Stopped;
                return Ok(targets);
            }

            self.state = MonitorState::Waiting { round };
            sink.sleeping(&sleeping_line(interval, publication.rendered_width));

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!("cancelled while waiting after round {round}");
                    self.state = MonitorState::Stopped;
                    return Ok(targets);
                }
                _ = tokio::time::sleep(interval) => {}
            }

            round += 1;
            self.state = MonitorState::Scanning { round };
        }
    }
}

/// "sleeping N seconds", centered in `width` columns when a width is known.
pub fn sleeping_line(interval: Duration, width: Option<usize>) -> String {
    let secs: u64 = interval.as_secs();
    let unit: &str = if secs == 1 { "second" } else { "seconds" };
    let text: String = format!("sleeping {secs} {unit}");
    match width {
        Some(width) => format!("{text:^width$}"),
        None => text,
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
