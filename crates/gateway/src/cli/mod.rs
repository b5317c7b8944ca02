pub mod chat;
pub mod config;
pub mod run;

use clap::{Parser, Subcommand};

use mh_domain::config::Config;

/// mh-gateway: a supportive mental-health assistant server and CLI.
#[derive(Debug, Parser)]
#[command(name = "mh-gateway", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP server (default when no subcommand is given).
    Serve,
    /// Send a single message and print the reply.
    Run {
        /// The message to send.
        message: String,
        /// User id whose session the turn belongs to.
        #[arg(long, default_value = "cli")]
        user: String,
        /// Print the whole turn as JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Interactive chat in the terminal.
    Chat {
        #[arg(long, default_value = "cli")]
        user: String,
    },
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any issues.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `MH_CONFIG` (default
/// `config.toml`). A missing file yields the defaults. Returns the config
/// and the path that was used.
pub fn load_config() -> anyhow::Result<(Config, String)> {
    let config_path = std::env::var("MH_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let config = load_from(&config_path)?;
    Ok((config, config_path))
}

pub fn load_from(path: &str) -> anyhow::Result<Config> {
    if !std::path::Path::new(path).exists() {
        return Ok(Config::default());
    }
    let raw =
        std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("reading {path}: {e}"))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {path}: {e}"))
}
