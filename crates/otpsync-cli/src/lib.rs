//! otpsync command-line interface.
//!
//! Each session subcommand replays one platform event against the configured
//! store and writes the resulting watch messages to stdout as JSON lines.

pub mod commands;

use clap::{Parser, Subcommand};
use otpsync_core::config::Config;
use otpsync_core::{env, paths};
use std::path::PathBuf;

/// otpsync - keep watch OTP secrets in sync with the phone
#[derive(Parser)]
#[command(name = "otpsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = "OTPSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the secret store, overriding the config file
    #[arg(long)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Watch app started: send secret count, theme and timezone
    Ready {
        /// Timezone offset in minutes west of UTC (defaults to the local zone)
        #[arg(long, allow_hyphen_values = true)]
        timezone: Option<i32>,
    },

    /// Add a secret, or relabel it if already stored
    Add {
        /// Label shown on the watch
        #[arg(long)]
        label: String,

        /// Base32 secret
        #[arg(long)]
        secret: String,
    },

    /// Apply a configuration page response
    Configure {
        /// JSON response returned by the page
        response: String,
    },

    /// Handle a message from the watch
    Device {
        /// JSON message payload
        message: String,
    },

    /// List stored secrets (labels only)
    List,

    /// Delete the first secret containing a fragment
    Delete {
        /// Secret fragment
        fragment: String,
    },

    /// Print the configuration page URL
    Url,

    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Show version information
    Version,
}

impl Cli {
    /// Config file in effect.
    pub fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Ok(paths::config_file()?),
        }
    }

    /// Load the config file, using defaults when it does not exist.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let path = self.config_path()?;
        let config = Config::load_or_default(&path)?;
        Ok(config)
    }

    /// Default log filter when `RUST_LOG` is unset.
    pub fn log_filter(&self, configured: &str) -> String {
        let level = match self.verbose {
            0 if env::get_bool(env::vars::OTPSYNC_DEBUG) => "debug",
            0 => configured,
            1 => "debug",
            _ => "trace",
        };
        format!("otpsync={}", level)
    }
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let store = cli.store.clone();
    let store = store.as_deref();

    match cli.command {
        Commands::Ready { timezone } => commands::session::ready(&config, store, timezone).await,
        Commands::Add { label, secret } => {
            commands::session::add(&config, store, &label, &secret).await
        }
        Commands::Configure { response } => {
            commands::session::configure(&config, store, &response).await
        }
        Commands::Device { message } => commands::session::device(&config, store, &message).await,
        Commands::Delete { fragment } => {
            commands::session::delete(&config, store, &fragment).await
        }
        Commands::List => commands::store::list(&config, store),
        Commands::Url => commands::store::url(&config, store),
        Commands::Config(args) => {
            let path = match cli.config {
                Some(path) => path,
                None => paths::config_file()?,
            };
            commands::config::run(args, &path, &config).await
        }
        Commands::Version => {
            println!("otpsync {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_version() {
        let cli = Cli::try_parse_from(["otpsync", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_parse_ready_negative_timezone() {
        let cli = Cli::try_parse_from(["otpsync", "ready", "--timezone", "-120"]).unwrap();
        match cli.command {
            Commands::Ready { timezone } => assert_eq!(timezone, Some(-120)),
            _ => panic!("Expected Ready command"),
        }
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "otpsync",
            "--store",
            "/tmp/store.json",
            "add",
            "--label",
            "Work",
            "--secret",
            "JBSWY3DP",
        ])
        .unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/store.json")));
        match cli.command {
            Commands::Add { label, secret } => {
                assert_eq!(label, "Work");
                assert_eq!(secret, "JBSWY3DP");
            }
            _ => panic!("Expected Add command"),
        }
    }

    #[test]
    fn test_parse_add_requires_secret() {
        assert!(Cli::try_parse_from(["otpsync", "add", "--label", "Work"]).is_err());
    }

    #[test]
    fn test_parse_device() {
        let cli = Cli::try_parse_from(["otpsync", "device", r#"{"request_key":1}"#]).unwrap();
        match cli.command {
            Commands::Device { message } => assert_eq!(message, r#"{"request_key":1}"#),
            _ => panic!("Expected Device command"),
        }
    }

    #[test]
    fn test_parse_config_show() {
        let cli = Cli::try_parse_from(["otpsync", "config", "show"]).unwrap();
        match cli.command {
            Commands::Config(args) => {
                assert!(matches!(args.command, commands::config::ConfigCommand::Show));
            }
            _ => panic!("Expected Config command"),
        }
    }

    #[test]
    fn test_log_filter() {
        let mut cli = Cli::try_parse_from(["otpsync", "list"]).unwrap();
        assert_eq!(cli.log_filter("warn"), "otpsync=warn");

        cli.verbose = 1;
        assert_eq!(cli.log_filter("warn"), "otpsync=debug");

        cli.verbose = 3;
        assert_eq!(cli.log_filter("warn"), "otpsync=trace");
    }

    #[test]
    fn test_explicit_config_path() {
        let cli =
            Cli::try_parse_from(["otpsync", "--config", "/etc/otpsync.json5", "list"]).unwrap();
        assert_eq!(cli.config_path().unwrap(), PathBuf::from("/etc/otpsync.json5"));
    }
}
