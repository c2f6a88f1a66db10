use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser, Clone)]
#[command(name = "variac")]
#[command(about = "Drive a time/voltage profile into a servo-controlled variac")]
pub struct Cli {
    /// Configuration file (defaults to ./variac.toml when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Profile CSV with `time_ms` and `voltage` columns.
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Log file; the terminal itself belongs to the UI.
    #[arg(long, default_value = "variac.log")]
    pub log_file: PathBuf,

    /// Run the profile to completion without the terminal UI.
    #[arg(long)]
    pub headless: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["variac"]);
        assert!(cli.config.is_none());
        assert!(cli.profile.is_none());
        assert_eq!(cli.log_file, PathBuf::from("variac.log"));
        assert!(!cli.headless);
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::parse_from([
            "variac",
            "--config",
            "bench.toml",
            "--profile",
            "ramp.csv",
            "--log-file",
            "/tmp/variac.log",
            "--headless",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("bench.toml")));
        assert_eq!(cli.profile, Some(PathBuf::from("ramp.csv")));
        assert_eq!(cli.log_file, PathBuf::from("/tmp/variac.log"));
        assert!(cli.headless);
    }
}
