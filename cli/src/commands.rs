pub mod scan;

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use undead_common::config::{ConfigError, DEFAULT_WORKERS_PER_CPU, RunConfig, Width};
use undead_common::target::Status;

use crate::report::Format;

#[derive(Parser, Debug)]
#[command(name = "undead")]
#[command(version, about = "Tells you which of your hosts are still undead.")]
pub struct CommandLine {
    /// Hostnames or IP addresses to probe
    #[arg(value_name = "HOST")]
    pub hosts: Vec<String>,

    /// Read more hosts from FILE, one per line ('#' starts a comment)
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Probe with a single ICMP echo request
    #[arg(short, long)]
    pub icmp: bool,

    /// Probe with a TCP connect to PORT
    #[arg(short, long, value_name = "PORT")]
    pub tcp: Option<u16>,

    /// Repeat the scan every SECONDS until interrupted
    #[arg(short, long, value_name = "SECONDS")]
    pub monitor: Option<u64>,

    /// Exact number of concurrent probes (overrides --workers-per-cpu)
    #[arg(short, long, value_name = "N")]
    pub workers: Option<usize>,

    /// Concurrent probes per available CPU (at most 256 in total)
    #[arg(long, value_name = "N", default_value_t = DEFAULT_WORKERS_PER_CPU)]
    pub workers_per_cpu: usize,

    /// Per-probe timeout in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    pub timeout_ms: u64,

    /// Only display targets with this status (undead, dead, unknown)
    #[arg(short, long, value_name = "STATUS")]
    pub only: Option<Status>,

    /// Write each round to undead_report_<timestamp>.csv
    #[arg(long)]
    pub csv: bool,

    /// Write each round to undead_report_<timestamp>.json
    #[arg(long)]
    pub json: bool,

    /// Directory for report files
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Keep previous rounds on screen in monitor mode
    #[arg(long)]
    pub no_clear: bool,

    /// More logging (-vv for trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Less logging (-qq for errors only)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validates the probe and scheduling flags.
    pub fn run_config(&self) -> Result<RunConfig, ConfigError> {
        let width: Width = match self.workers {
            Some(n) => Width::Fixed(n),
            None => Width::PerCpu(self.workers_per_cpu),
        };

        let mut cfg: RunConfig = RunConfig::new(self.icmp, self.tcp)?
            .width(width)?
            .filter(self.only)
            .probe_timeout(Duration::from_millis(self.timeout_ms.max(1)));

        if let Some(secs) = self.monitor {
            cfg = cfg.monitor(Duration::from_secs(secs))?;
        }
        Ok(cfg)
    }

    pub fn report_formats(&self) -> Vec<Format> {
        let mut formats: Vec<Format> = Vec::new();
        if self.csv {
            formats.push(Format::Csv);
        }
        if self.json {
            formats.push(Format::Json);
        }
        formats
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
