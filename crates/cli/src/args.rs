//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::logging::{LogFormat, LogLevel};

const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(author, version, about = "Checks an Ethereum node's JSON-RPC surface", long_about = None)]
pub struct Args {
    /// Configuration file [default: ./config.toml]
    #[clap(long, short)]
    pub config: Option<PathBuf>,

    /// Print the value of every passing method, not only its status
    #[clap(long, short)]
    pub verbose: bool,

    /// Also write the ordered results as pretty JSON to this file
    #[clap(long)]
    pub json: Option<PathBuf>,

    /// Log level [default: info]
    #[clap(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Log format [default: plaintext]
    #[clap(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

impl Args {
    pub fn new() -> Self {
        Self::parse()
    }

    pub fn get_config_file_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_config_in_working_directory() {
        let args = Args::try_parse_from(["ethprobe"]).unwrap();
        assert_eq!(args.get_config_file_path(), PathBuf::from("config.toml"));
        assert!(!args.verbose);
        assert_eq!(args.json, None);
    }

    #[test]
    fn parses_every_flag() {
        let args = Args::try_parse_from([
            "ethprobe",
            "--config",
            "/etc/ethprobe.toml",
            "-v",
            "--json",
            "out.json",
            "--log-level",
            "debug",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.get_config_file_path(), PathBuf::from("/etc/ethprobe.toml"));
        assert!(args.verbose);
        assert_eq!(args.json, Some(PathBuf::from("out.json")));
        assert_eq!(args.log_level, Some(LogLevel::Debug));
        assert_eq!(args.log_format, Some(LogFormat::Json));
    }

    #[test]
    fn rejects_unknown_log_level() {
        assert!(Args::try_parse_from(["ethprobe", "--log-level", "loud"]).is_err());
    }
}
