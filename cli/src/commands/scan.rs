use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use undead_common::config::RunConfig;
use undead_common::target::Target;
use undead_core::monitor::{Monitor, MonitorState};
use undead_core::scanner::Scanner;

use crate::commands::CommandLine;
use crate::hosts;
use crate::report::ReportWriter;
use crate::sink::TerminalSink;

/// Runs the scan described by the command line until done or interrupted.
pub async fn scan(cmd: CommandLine) -> anyhow::Result<()> {
    let cfg: RunConfig = cmd.run_config()?;
    let hostnames: Vec<String> = hosts::collect_hosts(&cmd.hosts, cmd.file.as_deref())?;

    let targets: Vec<Target> = hostnames
        .into_iter()
        .map(|hostname| Target::new(hostname, cfg.tcp_port()))
        .collect();

    let cancel: CancellationToken = CancellationToken::new();
    spawn_interrupt_listener(cancel.clone(), cfg.is_monitor());

    let reports: ReportWriter = ReportWriter::new(cmd.output_dir.clone(), cmd.report_formats());
    let mut sink: TerminalSink = TerminalSink::new(reports, cfg.is_monitor() && !cmd.no_clear);

    let start_time: Instant = Instant::now();
    let mut monitor: Monitor = Monitor::new(Scanner::from_config(&cfg), &cfg, cancel);
    monitor.run(targets, &mut sink).await?;

    if monitor.state() == MonitorState::Stopped {
        info!(
            "Stopped after {} rounds in {:.2}s",
            monitor.rounds_completed(),
            start_time.elapsed().as_secs_f64()
        );
    }
    Ok(())
}

/// Turns Ctrl-C into a cancellation. The current round still finishes.
fn spawn_interrupt_listener(cancel: CancellationToken, monitoring: bool) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                if monitoring {
                    warn!("Interrupted, stopping after the current round");
                }
                cancel.cancel();
            }
            Err(e) => warn!("Cannot listen for Ctrl-C: {e}"),
        }
    });
}
