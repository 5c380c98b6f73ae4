use std::fs;
use std::path::Path;

use undead_common::config::ConfigError;

/// Parses a host list: one entry per line, blank lines and `#` comments skipped.
pub fn parse_host_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn read_host_file(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content: String = fs::read_to_string(path).map_err(|source| ConfigError::HostFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_host_list(&content))
}

/// Positional hosts first, then the file's, in order. Duplicates are kept.
pub fn collect_hosts(positional: &[String], file: Option<&Path>) -> Result<Vec<String>, ConfigError> {
    let mut hosts: Vec<String> = positional
        .iter()
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .collect();

    if let Some(path) = file {
        hosts.extend(read_host_file(path)?);
    }

    if hosts.is_empty() {
        return Err(ConfigError::NoTargets);
    }
    Ok(hosts)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
