//! CLI application.

use lorekeep_core::Result;
use lorekeep_store::KnowledgeStore;
use tracing_subscriber::EnvFilter;

use crate::cli::{CliArgs, Command};
use crate::config::LorekeepConfig;
use crate::handlers;

/// The Lorekeep command-line application.
pub struct LorekeepCli {
    config: LorekeepConfig,
    version: String,
}

impl LorekeepCli {
    /// Create from CLI args, loading config from file/env.
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let config = LorekeepConfig::load(args.config.as_deref())?;
        Ok(Self::new(config))
    }

    /// Create with an already loaded config.
    pub fn new(config: LorekeepConfig) -> Self {
        Self {
            config,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Override the version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// The loaded configuration.
    pub fn config(&self) -> &LorekeepConfig {
        &self.config
    }

    /// Initialise tracing-based logging.
    ///
    /// Uses `RUST_LOG` if set, otherwise defaults based on verbosity flags.
    /// Library `log` records are bridged into the subscriber.
    pub fn init_logging(&self, verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // Ignore error if a subscriber is already set (e.g. in tests).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Run the CLI with the given arguments.
    pub async fn run(&self, args: CliArgs) -> Result<()> {
        self.init_logging(args.verbose, args.quiet);

        let Some(command) = args.command else {
            println!("lorekeep {} (use --help for usage)", self.version);
            return Ok(());
        };

        match command {
            Command::Version => {
                println!("lorekeep {}", self.version);
                Ok(())
            }
            Command::Tools => {
                println!("{}", handlers::describe_tools(&self.config)?);
                Ok(())
            }
            Command::Config(config_cmd) => {
                handlers::handle_config_command(args.config.as_deref(), config_cmd.command)
            }
            knowledge => {
                let output = self.execute(&knowledge).await?;
                println!("{output}");
                Ok(())
            }
        }
    }

    /// Run a knowledge command against the configured store.
    pub async fn execute(&self, command: &Command) -> Result<String> {
        let Some((tool, tool_args)) = handlers::tool_call(command)? else {
            return Ok(String::new());
        };
        let store = KnowledgeStore::open(self.config.store.clone()).await?;
        tracing::debug!(tool, project = %self.config.project_name, "dispatching");
        handlers::run_tool(store, tool, tool_args).await
    }
}

// ============================================================================
// Tests
// ============================================================================
