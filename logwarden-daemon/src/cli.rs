//! CLI argument definitions for logwarden-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Logwarden log tailing and keyword alerting daemon.
///
/// Tails the log files listed in the monitor config, matches extracted
/// lines against alert keywords, and hot-reloads the monitor config
/// without restarting.
#[derive(Parser, Debug)]
#[command(name = "logwarden-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to logwarden.toml configuration file.
    #[arg(short, long, default_value = "/etc/logwarden/logwarden.toml")]
    pub config: PathBuf,

    /// Override monitor YAML path (takes precedence over config file).
    #[arg(short, long)]
    pub monitor: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration files and exit without starting the daemon.
    ///
    /// Checks both logwarden.toml and the monitor YAML (including target
    /// file existence).
    #[arg(long)]
    pub validate: bool,

    /// Override PID file path (takes precedence over config file).
    #[arg(long)]
    pub pid_file: Option<String>,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn defaults() {
        let cli = DaemonCli::try_parse_from(["logwarden-daemon"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/logwarden/logwarden.toml"));
        assert!(cli.monitor.is_none());
        assert!(!cli.validate);
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn overrides_parse() {
        let cli = DaemonCli::try_parse_from([
            "logwarden-daemon",
            "--config",
            "/opt/lw/logwarden.toml",
            "--monitor",
            "/opt/lw/monitor.yaml",
            "--log-level",
            "debug",
            "--validate",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/opt/lw/logwarden.toml"));
        assert_eq!(cli.monitor, Some(PathBuf::from("/opt/lw/monitor.yaml")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(cli.validate);
    }

    #[test]
    fn unknown_flag_rejected() {
        assert!(DaemonCli::try_parse_from(["logwarden-daemon", "--nope"]).is_err());
    }
}
