//! CLI runner - executes commands against a source

use crate::catalog::ConfiguredCatalog;
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::engine::SyncEngine;
use crate::error::{Error, Result};
use crate::logger::SyncLogger;
use crate::protocol::Message;
use crate::source::Source;
use crate::state::ConnectorState;
use crate::types::{JsonValue, LogLevel};
use clap::Parser;
use futures::StreamExt;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Run a connector from the process arguments
///
/// Installs a `tracing` subscriber on stderr, then executes the parsed
/// command, writing protocol messages to stdout one per line.
pub async fn launch<S: Source>(source: S) -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    // a subscriber may already be installed by the embedding program
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.into()))
        .with_writer(std::io::stderr)
        .try_init();

    Runner::new(cli, source).run().await
}

/// CLI runner
pub struct Runner<S> {
    cli: Cli,
    source: S,
}

impl<S: Source> Runner<S> {
    /// Create a new runner
    pub fn new(cli: Cli, source: S) -> Self {
        Self { cli, source }
    }

    /// Run the CLI command, writing messages to stdout
    pub async fn run(&self) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.run_to(&mut out).await
    }

    /// Run the CLI command, writing messages to `out`
    pub async fn run_to<W: Write>(&self, out: &mut W) -> Result<()> {
        match &self.cli.command {
            Commands::Spec => self.output_message(out, &Message::spec(self.source.spec())),
            Commands::Check { config } => self.check(out, config).await,
            Commands::Discover { config } => self.discover(out, config),
            Commands::Read {
                config,
                catalog,
                state,
            } => self.read(out, config, catalog, state.as_deref()).await,
        }
    }

    /// Check connection
    async fn check<W: Write>(&self, out: &mut W, config_path: &Path) -> Result<()> {
        let config = load_config(config_path)?;
        let logger = SyncLogger::new(self.source.name());

        self.output_message(
            out,
            &Message::log(
                LogLevel::Info,
                format!("Checking connection to {}", self.source.name()),
            ),
        )?;
        let status = self.source.check(&logger, &config).await;
        self.output_message(out, &Message::connection_status(status))
    }

    /// Discover streams
    fn discover<W: Write>(&self, out: &mut W, config_path: &Path) -> Result<()> {
        let config = load_config(config_path)?;
        let catalog = self.source.discover(&config)?;
        self.output_message(out, &Message::catalog(catalog))
    }

    /// Read streams of the configured catalog
    async fn read<W: Write>(
        &self,
        out: &mut W,
        config_path: &Path,
        catalog_path: &Path,
        state_path: Option<&Path>,
    ) -> Result<()> {
        let config = load_config(config_path)?;
        let catalog = load_catalog(catalog_path)?;
        let state = match state_path {
            Some(path) => ConnectorState::from_file(path)?,
            None => ConnectorState::new(),
        };

        let registry = self.source.streams(&config)?;
        let logger = SyncLogger::new(self.source.name());
        logger.info(format!(
            "Starting read of {} streams: {}",
            catalog.streams.len(),
            catalog.stream_names().join(", ")
        ));

        let mut messages = SyncEngine::new(&registry, logger.clone()).read(&catalog, &state)?;
        while let Some(message) = messages.next().await {
            match message {
                Ok(message) => self.output_message(out, &message)?,
                Err(e) => {
                    self.output_message(
                        out,
                        &Message::log(LogLevel::Error, format!("Read failed: {e}")),
                    )?;
                    return Err(e);
                }
            }
        }

        logger.info(format!("Finished reading source {}", self.source.name()));
        Ok(())
    }

    /// Output a message
    fn output_message<W: Write>(&self, out: &mut W, msg: &Message) -> Result<()> {
        let line = match self.cli.format {
            OutputFormat::Json => msg.to_json_line()?,
            OutputFormat::Pretty => serde_json::to_string_pretty(msg)?,
        };
        writeln!(out, "{line}")?;
        Ok(())
    }
}

/// Load a connector configuration
///
/// Files ending in `.yaml` or `.yml` are parsed as YAML, anything else as
/// JSON.
pub fn load_config(path: &Path) -> Result<JsonValue> {
    let content = read_file(path)?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let config: JsonValue = if is_yaml {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)
            .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?
    };

    if !config.is_object() {
        return Err(Error::config(format!(
            "Config in {} must be an object",
            path.display()
        )));
    }
    Ok(config)
}

/// Load a configured catalog from a JSON file
pub fn load_catalog(path: &Path) -> Result<ConfiguredCatalog> {
    let content = read_file(path)?;
    serde_json::from_str(&content)
        .map_err(|e| Error::config(format!("Invalid configured catalog: {e}")))
}

fn read_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(fs::read_to_string(path)?)
}
