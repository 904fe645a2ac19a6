//! Command-line interface definitions.
//!
//! Global options locate the config file and the data directory; the
//! subcommand picks what to do with them. Options can also come from the
//! environment.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the news spider.
///
/// # Examples
///
/// ```sh
/// # Harvest forever, once a day
/// boomerang_spider run
///
/// # Single cycle into a custom directory
/// boomerang_spider --data-dir /tmp/boomerang once
///
/// # Show the published dataset as a ticker
/// boomerang_spider ticker --delay-ms 2000
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, env = "SPIDER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the dataset files (overrides the config file)
    #[arg(short, long, env = "SPIDER_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Harvest every source, then repeat after the interval until interrupted
    Run {
        /// Hours between the end of one cycle and the start of the next
        #[arg(long)]
        interval_hours: Option<u64>,
    },
    /// Harvest every source once and exit
    Once,
    /// Print the published dataset as a rotating ticker
    Ticker {
        /// Milliseconds each headline stays on screen
        #[arg(long, default_value_t = 3000)]
        delay_ms: u64,

        /// Stop after this many headlines
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_run_defaults() {
        let cli = Cli::parse_from(["boomerang_spider", "run"]);
        assert_eq!(cli.command, Command::Run { interval_hours: None });
        assert_eq!(cli.data_dir, None);
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "boomerang_spider",
            "once",
            "--data-dir",
            "/tmp/boomerang",
            "-c",
            "/etc/spider.yaml",
        ]);
        assert_eq!(cli.command, Command::Once);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/boomerang")));
        assert_eq!(cli.config, Some(PathBuf::from("/etc/spider.yaml")));
    }

    #[test]
    fn test_cli_ticker_options() {
        let cli = Cli::parse_from(["boomerang_spider", "ticker", "--delay-ms", "500", "--limit", "3"]);
        assert_eq!(
            cli.command,
            Command::Ticker {
                delay_ms: 500,
                limit: Some(3)
            }
        );
    }

    #[test]
    fn test_cli_run_interval_override() {
        let cli = Cli::parse_from(["boomerang_spider", "run", "--interval-hours", "6"]);
        assert_eq!(cli.command, Command::Run { interval_hours: Some(6) });
    }
}
