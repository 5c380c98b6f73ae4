//! ICMP echo through the platform `ping` utility.
//!
//! Every platform spells "one echo request, wait at most N" differently, and Windows
//! `ping` exits with 0 even when an intermediate router answers "Destination host
//! unreachable". [`PingCommand`] captures those differences and is picked once, when the
//! probe is built, from [`std::env::consts::OS`].

use std::net::IpAddr;
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;
use undead_common::target::{ProbeKind, ProbeResult};

use super::Probe;

/// Extra time the child gets on top of its own deadline before it is killed.
const PROCESS_GRACE: Duration = Duration::from_secs(2);

/// How the platform expects the reply timeout to be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutFlag {
    /// Whole seconds, rounded up.
    Seconds(&'static str),
    Millis(&'static str),
}

/// Extra evidence required beyond a zero exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyCheck {
    /// The exit status is trusted.
    ExitStatus,
    /// Stdout must contain this marker.
    Contains(&'static str),
    /// Stdout must not contain this marker (case-insensitive).
    Lacks(&'static str),
}

/// Platform specific invocation of `ping` for a single echo request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingCommand {
    program: &'static str,
    program_v6: &'static str,
    count_flag: &'static str,
    timeout_flag: TimeoutFlag,
    check_v4: ReplyCheck,
    check_v6: ReplyCheck,
}

impl PingCommand {
    /// The invocation for the platform this binary runs on.
    pub fn for_host() -> Self {
        Self::for_os(std::env::consts::OS)
    }

    /// The invocation for a given `std::env::consts::OS` value. Unknown systems get the
    /// Linux form.
    pub fn for_os(os: &str) -> Self {
        match os {
            // Windows exits 0 on "Destination host unreachable"; a v4 reply always
            // carries "TTL=", v6 replies do not, so v6 falls back to ruling the error out.
            "windows" => Self {
                program: "ping",
                program_v6: "ping",
                count_flag: "-n",
                timeout_flag: TimeoutFlag::Millis("-w"),
                check_v4: ReplyCheck::Contains("TTL="),
                check_v6: ReplyCheck::Lacks("unreachable"),
            },
            "macos" | "ios" => Self {
                program: "ping",
                program_v6: "ping6",
                count_flag: "-c",
                timeout_flag: TimeoutFlag::Millis("-W"),
                check_v4: ReplyCheck::ExitStatus,
                check_v6: ReplyCheck::ExitStatus,
            },
            "freebsd" | "dragonfly" => Self {
                program: "ping",
                program_v6: "ping6",
                count_flag: "-c",
                timeout_flag: TimeoutFlag::Seconds("-t"),
                check_v4: ReplyCheck::ExitStatus,
                check_v6: ReplyCheck::ExitStatus,
            },
            "openbsd" | "netbsd" => Self {
                program: "ping",
                program_v6: "ping6",
                count_flag: "-c",
                timeout_flag: TimeoutFlag::Seconds("-w"),
                check_v4: ReplyCheck::ExitStatus,
                check_v6: ReplyCheck::ExitStatus,
            },
            _ => Self {
                program: "ping",
                program_v6: "ping",
                count_flag: "-c",
                timeout_flag: TimeoutFlag::Seconds("-W"),
                check_v4: ReplyCheck::ExitStatus,
                check_v6: ReplyCheck::ExitStatus,
            },
        }
    }

    pub fn program(&self, address: IpAddr) -> &'static str {
        match address {
            IpAddr::V4(_) => self.program,
            IpAddr::V6(_) => self.program_v6,
        }
    }

    pub fn args(&self, address: IpAddr, reply_timeout: Duration) -> Vec<String> {
        let (flag, value): (&str, u128) = match self.timeout_flag {
            TimeoutFlag::Seconds(flag) => {
                let secs: u64 = reply_timeout.as_secs() + u64::from(reply_timeout.subsec_nanos() > 0);
                (flag, u128::from(secs.max(1)))
            }
            TimeoutFlag::Millis(flag) => (flag, reply_timeout.as_millis().max(1)),
        };

        vec![
            self.count_flag.to_string(),
            "1".to_string(),
            flag.to_string(),
            value.to_string(),
            address.to_string(),
        ]
    }

    /// Decides whether a finished `ping` saw a reply.
    pub fn is_reply(&self, address: IpAddr, exit_ok: bool, stdout: &str) -> bool {
        if !exit_ok {
            return false;
        }

        let check: ReplyCheck = match address {
            IpAddr::V4(_) => self.check_v4,
            IpAddr::V6(_) => self.check_v6,
        };

        match check {
            ReplyCheck::ExitStatus => true,
            ReplyCheck::Contains(marker) => stdout.contains(marker),
            ReplyCheck::Lacks(marker) => !stdout.to_ascii_lowercase().contains(marker),
        }
    }
}

/// One ICMP echo request per run, delegated to the platform `ping`.
#[derive(Debug, Clone, Copy)]
pub struct IcmpProbe {
    command: PingCommand,
    reply_timeout: Duration,
}

impl IcmpProbe {
    pub fn new(command: PingCommand, reply_timeout: Duration) -> Self {
        Self {
            command,
            reply_timeout,
        }
    }

    fn interpret(&self, address: IpAddr, output: &Output) -> ProbeResult {
        let stdout: String = String::from_utf8_lossy(&output.stdout).into_owned();
        if self.command.is_reply(address, output.status.success(), &stdout) {
            return ProbeResult::success();
        }

        let stderr: String = String::from_utf8_lossy(&output.stderr).into_owned();
        let detail: Option<&str> = last_line(&stderr).or_else(|| failure_line(&stdout));
        match (detail, output.status.code()) {
            (Some(line), _) => ProbeResult::failure(line.to_string()),
            (None, Some(code)) => ProbeResult::failure(format!("no echo reply (exit code {code})")),
            (None, None) => ProbeResult::failure("no echo reply"),
        }
    }
}

fn last_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).rfind(|line| !line.is_empty())
}

/// Picks the line of `ping` output that explains a failure, if it printed one.
fn failure_line(stdout: &str) -> Option<&str> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| {
            let lower: String = line.to_ascii_lowercase();
            lower.contains("unreachable") || lower.contains("timed out") || lower.contains("exceeded")
        })
}

#[async_trait]
impl Probe for IcmpProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Icmp
    }

    async fn run(&self, address: IpAddr) -> ProbeResult {
        let program: &str = self.command.program(address);
        let args: Vec<String> = self.command.args(address, self.reply_timeout);

        let child = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let deadline: Duration = self.reply_timeout + PROCESS_GRACE;
        let result: ProbeResult = match timeout(deadline, child).await {
            Ok(Ok(output)) => self.interpret(address, &output),
            Ok(Err(e)) => ProbeResult::failure(format!("failed to run {program}: {e}")),
            Err(_elapsed) => ProbeResult::failure(format!(
                "{program} did not finish within {}ms",
                deadline.as_millis()
            )),
        };

        debug!("icmp {address}: {:?}", result.outcome);
        result
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
