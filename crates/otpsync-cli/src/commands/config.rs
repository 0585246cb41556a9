//! Configuration management commands.

use clap::Args;
use otpsync_core::config::Config;
use std::path::Path;

/// Config command arguments.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    /// Show configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration file path
    Path,

    /// Validate configuration
    Validate,
}

/// Run the config command against the file at `path`, already loaded as
/// `config`.
pub async fn run(args: ConfigArgs, path: &Path, config: &Config) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            println!("{}", config.to_json5()?);
        }

        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists: {:?}. Use --force to overwrite.",
                    path
                );
            }

            Config::default().save(path)?;
            println!("Created config file: {:?}", path);
        }

        ConfigCommand::Path => {
            println!("{}", path.display());
        }

        ConfigCommand::Validate => match config.validate() {
            Ok(()) => println!("Configuration is valid"),
            Err(e) => anyhow::bail!("Configuration error: {}", e),
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_refuses_overwrite() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("otpsync.json5");

        let init = |force| ConfigArgs {
            command: ConfigCommand::Init { force },
        };

        run(init(false), &path, &Config::default()).await.unwrap();
        assert!(path.exists());

        assert!(run(init(false), &path, &Config::default()).await.is_err());
        run(init(true), &path, &Config::default()).await.unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.delivery.max_retries, 5);
    }

    #[tokio::test]
    async fn test_validate_reports_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("otpsync.json5");

        let mut config = Config::default();
        config.delivery.queue_size = 0;

        let args = ConfigArgs {
            command: ConfigCommand::Validate,
        };
        assert!(run(args, &path, &config).await.is_err());
    }
}
