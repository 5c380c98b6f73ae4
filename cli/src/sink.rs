use chrono::Local;
use tracing::{info, warn};

use undead_core::sink::{Publication, ResultSink, RoundReport};

use crate::report::ReportWriter;
use crate::terminal::{format, print};
use crate::uprint;

/// Draws each round to the terminal and, when asked, persists it as report files.
pub struct TerminalSink {
    reports: ReportWriter,
    clear: bool,
}

impl TerminalSink {
    pub fn new(reports: ReportWriter, clear: bool) -> Self {
        Self { reports, clear }
    }
}

impl ResultSink for TerminalSink {
    fn publish(&mut self, report: &RoundReport<'_>) -> anyhow::Result<Publication> {
        if self.clear && report.round > 1 {
            if let Err(e) = print::clear_screen() {
                warn!("Could not clear the terminal: {e}");
            }
        }

        let table: format::Table = format::results_table(report);
        print::header(&format!("round {}", report.round), table.width);
        print::table(&table);
        print::fat_separator(table.width);
        print::print_status(format::summary(report));

        if self.reports.is_enabled() {
            for path in self.reports.write(report, &Local::now())? {
                info!("Report written to {}", path.display());
            }
        }
        uprint!();

        Ok(Publication {
            rendered_width: Some(table.width.max(print::TOTAL_WIDTH)),
        })
    }

    fn sleeping(&mut self, status_line: &str) {
        print::sleeping(status_line);
    }
}
