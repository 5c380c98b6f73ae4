//! CSV and JSON report files, one pair per completed round.
//!
//! Files are named `undead_report_<timestamp>.<ext>` and always contain every target,
//! whatever the display filter says.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local};
use serde::Serialize;

use undead_common::target::{Outcome, ProbeKind, Status, Target};
use undead_core::sink::RoundReport;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
}

impl Format {
    fn extension(&self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Json => "json",
        }
    }
}

/// One output row. TCP columns are only present when TCP was requested.
#[derive(Debug, Serialize)]
struct Row<'a> {
    hostname: &'a str,
    address: Option<String>,
    status: Option<Status>,
    icmp: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tcp_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tcp: Option<Option<Outcome>>,
    error: Option<&'a str>,
}

impl<'a> Row<'a> {
    fn new(target: &'a Target, with_tcp: bool) -> Self {
        Self {
            hostname: target.hostname(),
            address: target.address.map(|addr| addr.to_string()),
            status: target.status,
            icmp: target.icmp_outcome,
            tcp_port: if with_tcp { target.tcp_port } else { None },
            tcp: with_tcp.then_some(target.tcp_outcome),
            error: target.error.as_deref(),
        }
    }

    fn csv_record(&self, with_tcp: bool) -> Vec<String> {
        let mut record: Vec<String> = vec![
            self.hostname.to_string(),
            self.address.clone().unwrap_or_default(),
            self.status.map(|s| s.to_string()).unwrap_or_default(),
            self.icmp.map(|o| o.to_string()).unwrap_or_default(),
        ];
        if with_tcp {
            record.push(self.tcp_port.map(|p| p.to_string()).unwrap_or_default());
            record.push(self.tcp.flatten().map(|o| o.to_string()).unwrap_or_default());
        }
        record.push(self.error.unwrap_or_default().to_string());
        record
    }
}

fn csv_header(with_tcp: bool) -> Vec<&'static str> {
    let mut header: Vec<&'static str> = vec!["hostname", "address", "status", "icmp"];
    if with_tcp {
        header.extend(["tcp_port", "tcp"]);
    }
    header.push("error");
    header
}

/// Writes the requested report formats into a directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
    formats: Vec<Format>,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>, formats: Vec<Format>) -> Self {
        Self {
            dir: dir.into(),
            formats,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.formats.is_empty()
    }

    pub fn file_name(format: Format, at: &DateTime<Local>) -> String {
        format!(
            "undead_report_{}.{}",
            at.format(TIMESTAMP_FORMAT),
            format.extension()
        )
    }

    /// Writes every configured format for `report`, returning the paths written.
    pub fn write(&self, report: &RoundReport<'_>, at: &DateTime<Local>) -> anyhow::Result<Vec<PathBuf>> {
        let with_tcp: bool = report.requested.contains(&ProbeKind::Tcp);
        let rows: Vec<Row<'_>> = report.targets.iter().map(|t| Row::new(t, with_tcp)).collect();

        let mut written: Vec<PathBuf> = Vec::with_capacity(self.formats.len());
        for format in &self.formats {
            let path: PathBuf = self.dir.join(Self::file_name(*format, at));
            let result: anyhow::Result<()> = match format {
                Format::Csv => write_csv(&path, &rows, with_tcp),
                Format::Json => write_json(&path, &rows),
            };
            result.with_context(|| format!("cannot write report {}", path.display()))?;
            written.push(path);
        }
        Ok(written)
    }
}

fn write_csv(path: &Path, rows: &[Row<'_>], with_tcp: bool) -> anyhow::Result<()> {
    let mut writer: csv::Writer<File> = csv::Writer::from_path(path)?;
    writer.write_record(csv_header(with_tcp))?;
    for row in rows {
        writer.write_record(row.csv_record(with_tcp))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json(path: &Path, rows: &[Row<'_>]) -> anyhow::Result<()> {
    let mut writer: BufWriter<File> = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, rows)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
