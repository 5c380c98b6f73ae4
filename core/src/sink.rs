//! The boundary to whatever renders or persists a round.
//!
//! The core hands a sink a read-only [`RoundReport`] after every completed round. The
//! only thing a sink gives back is a [`Publication`] carrying the width it rendered at,
//! which the monitor uses to align its "sleeping" status line.

use std::time::Duration;

use undead_common::target::{ProbeKind, Status, Target};

/// A finished round, as handed to a [`ResultSink`].
#[derive(Debug, Clone, Copy)]
pub struct RoundReport<'a> {
    /// 1-based round number.
    pub round: u64,
    /// Every target, in input order.
    pub targets: &'a [Target],
    /// Probe kinds that ran this round.
    pub requested: &'a [ProbeKind],
    pub filter: Option<Status>,
    /// How many targets pass `filter` (all of them when there is no filter).
    pub matching: usize,
    pub elapsed: Duration,
}

impl<'a> RoundReport<'a> {
    pub fn new(
        round: u64,
        targets: &'a [Target],
        requested: &'a [ProbeKind],
        filter: Option<Status>,
        elapsed: Duration,
    ) -> Self {
        Self {
            round,
            targets,
            requested,
            filter,
            matching: count_matching(targets, filter),
            elapsed,
        }
    }

    /// Targets passing the display filter with their 0-based input position.
    pub fn visible(&self) -> impl Iterator<Item = (usize, &'a Target)> + 'a {
        let filter: Option<Status> = self.filter;
        self.targets
            .iter()
            .enumerate()
            .filter(move |(_, t)| passes(t, filter))
    }

    pub fn count(&self, status: Status) -> usize {
        self.targets
            .iter()
            .filter(|t| t.status == Some(status))
            .count()
    }
}

fn passes(target: &Target, filter: Option<Status>) -> bool {
    match filter {
        Some(status) => target.status == Some(status),
        None => true,
    }
}

pub fn count_matching(targets: &[Target], filter: Option<Status>) -> usize {
    targets.iter().filter(|t| passes(t, filter)).count()
}

/// Feedback from a sink after publishing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Publication {
    /// Width in columns of what was rendered, if the sink draws to a terminal.
    pub rendered_width: Option<usize>,
}

pub trait ResultSink {
    /// Consumes one completed round. An error here stops the run.
    fn publish(&mut self, report: &RoundReport<'_>) -> anyhow::Result<Publication>;

    /// Shows the status line while the monitor waits for the next round.
    fn sleeping(&mut self, _status_line: &str) {}
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
