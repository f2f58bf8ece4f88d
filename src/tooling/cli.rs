//! CLI Tooling
//!
//! Command-line interface over a vault: loads configuration, opens the file
//! store and runs one command against a freshly initialized engine.

use crate::config::{ConfigLoader, NotetreeConfig};
use crate::engine::Engine;
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::schema::match_path;
use crate::store::{FileStore, NodeStore};
use crate::tooling::format::{
    format_match, format_note, format_note_list, format_note_tree, note_rows, MatchOutput,
    OutputFormat,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::info;

/// Notetree CLI - hierarchical notes and schemas
#[derive(Parser)]
#[command(name = "notetree")]
#[command(about = "Hierarchical note and schema store over a directory of files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault directory
    #[arg(long, default_value = ".")]
    pub vault: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Apply command-line log flags on top of the configured logging
    pub fn logging_config(&self, mut config: LoggingConfig) -> LoggingConfig {
        if self.verbose {
            config.level = "debug".to_string();
        }
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.file = Some(file.clone());
        }
        config
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the note tree
    Tree,
    /// List notes with their schema assignment
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show a single note
    Get {
        /// Note id
        id: String,
    },
    /// Show which schema governs a hierarchical path
    Match {
        /// Dot-delimited note path
        path: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Delete a note file (children are kept)
    Delete {
        /// Note id
        id: String,
    },
}

/// CLI context: configuration, store and runtime for one invocation
pub struct CliContext {
    config: NotetreeConfig,
    store: Arc<FileStore>,
    runtime: Runtime,
}

impl CliContext {
    /// Create a new CLI context for `vault`
    pub fn new(vault: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&vault)?,
        };
        let store = Arc::new(FileStore::from_config(&config, &vault));
        let runtime = Runtime::new()
            .map_err(|e| ApiError::ConfigError(format!("Failed to start runtime: {}", e)))?;
        Ok(Self {
            config,
            store,
            runtime,
        })
    }

    pub fn config(&self) -> &NotetreeConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<FileStore> {
        &self.store
    }

    /// Execute a command and return its output
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        self.runtime.block_on(self.execute_async(command))
    }

    async fn execute_async(&self, command: &Commands) -> Result<String, ApiError> {
        let store: Arc<dyn NodeStore> = self.store.clone();
        let mut engine = Engine::new(store);
        engine.init().await?;

        match command {
            Commands::Tree => Ok(format_note_tree(engine.notes())),
            Commands::List { format } => {
                let format = OutputFormat::parse(format)?;
                let rows = note_rows(engine.notes(), engine.assignments());
                format_note_list(&rows, format)
            }
            Commands::Get { id } => {
                let record = self.store.get(id).await?;
                Ok(format_note(&record))
            }
            Commands::Match { path, format } => {
                let format = OutputFormat::parse(format)?;
                let found = match_path(path, engine.modules());
                format_match(&MatchOutput::new(path, found.as_ref()), format)
            }
            Commands::Delete { id } => {
                engine.delete_note(id).await?;
                info!(id = %id, "Note deleted");
                Ok(format!("Deleted {}", id))
            }
        }
    }
}
