use std::net::IpAddr;

use colored::*;
use unicode_width::UnicodeWidthStr;

use undead_common::target::{Outcome, ProbeKind, Status, Target};
use undead_core::sink::RoundReport;

use crate::terminal::colors;

const GAP: &str = "  ";
const ABSENT: &str = "-";

/// A rendered table and its width in terminal columns (without color codes).
#[derive(Debug, Clone)]
pub struct Table {
    pub lines: Vec<String>,
    pub width: usize,
}

/// One cell: the plain text used for alignment, and how to paint it.
struct Cell {
    text: String,
    color: Option<Color>,
    dimmed: bool,
}

impl Cell {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
            dimmed: false,
        }
    }

    fn colored(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color: Some(color),
            dimmed: false,
        }
    }

    fn absent() -> Self {
        Self {
            text: ABSENT.to_string(),
            color: None,
            dimmed: true,
        }
    }

    fn paint(&self, width: usize) -> String {
        let pad: usize = width.saturating_sub(UnicodeWidthStr::width(self.text.as_str()));
        let padded: String = format!("{}{}", self.text, " ".repeat(pad));
        let mut painted: ColoredString = match self.color {
            Some(color) => padded.color(color),
            None => padded.normal(),
        };
        if self.dimmed {
            painted = painted.dimmed();
        }
        painted.to_string()
    }
}

pub fn status_color(status: Status) -> Color {
    match status {
        Status::Undead => colors::UNDEAD,
        Status::Dead => colors::DEAD,
        Status::Unknown => colors::UNKNOWN,
    }
}

fn status_cell(status: Option<Status>) -> Cell {
    match status {
        Some(status) => Cell::colored(status.as_str().to_uppercase(), status_color(status)),
        None => Cell::absent(),
    }
}

fn outcome_cell(outcome: Option<Outcome>) -> Cell {
    match outcome {
        Some(Outcome::Success) => Cell::colored("ok", colors::UNDEAD),
        Some(Outcome::Failure) => Cell::colored("fail", colors::DEAD),
        None => Cell::absent(),
    }
}

fn address_cell(address: Option<IpAddr>) -> Cell {
    match address {
        Some(IpAddr::V4(v4)) => Cell::colored(v4.to_string(), colors::IPV4_ADDR),
        Some(IpAddr::V6(v6)) => Cell::colored(v6.to_string(), colors::IPV6_ADDR),
        None => Cell::absent(),
    }
}

fn header(requested: &[ProbeKind], port: Option<u16>) -> Vec<Cell> {
    let mut cells: Vec<Cell> = vec![
        Cell::colored("#", colors::SEPARATOR),
        Cell::colored("HOST", colors::PRIMARY),
        Cell::colored("ADDRESS", colors::PRIMARY),
        Cell::colored("STATUS", colors::PRIMARY),
    ];
    if requested.contains(&ProbeKind::Icmp) {
        cells.push(Cell::colored("ICMP", colors::PRIMARY));
    }
    if requested.contains(&ProbeKind::Tcp) {
        let title: String = match port {
            Some(port) => format!("TCP/{port}"),
            None => "TCP".to_string(),
        };
        cells.push(Cell::colored(title, colors::PRIMARY));
    }
    cells.push(Cell::colored("ERROR", colors::PRIMARY));
    cells
}

fn row(idx: usize, target: &Target, requested: &[ProbeKind]) -> Vec<Cell> {
    let mut cells: Vec<Cell> = vec![
        Cell::colored(idx.to_string(), colors::ACCENT),
        Cell::plain(target.hostname()),
        address_cell(target.address),
        status_cell(target.status),
    ];
    if requested.contains(&ProbeKind::Icmp) {
        cells.push(outcome_cell(target.icmp_outcome));
    }
    if requested.contains(&ProbeKind::Tcp) {
        cells.push(outcome_cell(target.tcp_outcome));
    }
    cells.push(match &target.error {
        Some(error) => Cell::colored(error.clone(), colors::TEXT_DEFAULT),
        None => Cell::absent(),
    });
    cells
}

/// Renders the targets that pass the report's filter, numbered by input position.
pub fn results_table(report: &RoundReport<'_>) -> Table {
    let port: Option<u16> = report.targets.iter().find_map(|t| t.tcp_port);
    let mut rows: Vec<Vec<Cell>> = vec![header(report.requested, port)];

    for (idx, target) in report.visible() {
        rows.push(row(idx + 1, target, report.requested));
    }

    let columns: usize = rows[0].len();
    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            rows.iter()
                .map(|cells| UnicodeWidthStr::width(cells[col].text.as_str()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let width: usize = widths.iter().sum::<usize>() + GAP.len() * columns.saturating_sub(1);
    let lines: Vec<String> = rows
        .iter()
        .map(|cells| {
            cells
                .iter()
                .enumerate()
                .map(|(col, cell)| {
                    // No trailing padding on the last column.
                    let pad_to: usize = if col + 1 == columns { 0 } else { widths[col] };
                    cell.paint(pad_to)
                })
                .collect::<Vec<String>>()
                .join(GAP)
        })
        .collect();

    Table { lines, width }
}

/// "Round 2: 3 undead, 1 dead, 0 unknown in 1.04s", plus the filter count when filtering.
pub fn summary(report: &RoundReport<'_>) -> String {
    let undead: ColoredString = format!("{} undead", report.count(Status::Undead)).color(colors::UNDEAD).bold();
    let dead: ColoredString = format!("{} dead", report.count(Status::Dead)).color(colors::DEAD).bold();
    let unknown: ColoredString = format!("{} unknown", report.count(Status::Unknown)).color(colors::UNKNOWN).bold();
    let elapsed: ColoredString = format!("{:.2}s", report.elapsed.as_secs_f64()).bold().yellow();

    let mut line: String = format!("Round {}: {undead}, {dead}, {unknown} in {elapsed}", report.round);
    if let Some(filter) = report.filter {
        line.push_str(&format!(" ({} {filter} shown)", report.matching));
    }
    line
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
