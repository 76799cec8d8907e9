use std::path::{Path, PathBuf};

mod compile;
mod parse;
mod terminal;

use anyhow::Context;
use clap::ArgAction;
use compile::Compile;
use parse::Parse;
use reqtree::{Config, ModuleCode};

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG: &str = "reqtree.toml";

/// Parse a module code from a string, normalizing to uppercase.
fn parse_module_code(s: &str) -> Result<ModuleCode, String> {
    s.to_uppercase().parse().map_err(|e| format!("{e}"))
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a TOML config file (defaults to ./reqtree.toml if present)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = load_config(self.config.as_deref())?;
        self.command.run(config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match path {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG).is_file() => Path::new(DEFAULT_CONFIG),
        None => {
            tracing::debug!("no config file, using defaults");
            return Ok(Config::default());
        }
    };

    tracing::debug!(path = %path.display(), "loading config");
    Config::load(path).with_context(|| format!("failed to load config from {}", path.display()))
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Compile a JSON dataset of module records
    ///
    /// Each record gains its parsed prerequisite and preclusion trees, a
    /// presentation tree and the list of modules it locks.
    Compile(Compile),

    /// Parse a single requisite string and show each stage
    Parse(Parse),
}

impl Command {
    fn run(self, config: Config) -> anyhow::Result<()> {
        match self {
            Self::Compile(command) => command.run(config)?,
            Self::Parse(command) => command.run(&config)?,
        }
        Ok(())
    }
}
