//! CLI argument parsing and command definitions.

use clap::{Parser, Subcommand};

// ============================================================================
// CLI argument types
// ============================================================================

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "lorekeep", author, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, env = "LOREKEEP_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a knowledge domain (replaces an existing one).
    Create {
        /// Domain name.
        name: String,
    },

    /// Delete a knowledge domain.
    Delete {
        /// Domain name.
        name: String,
    },

    /// List all knowledge domains.
    List,

    /// Add knowledge to a domain.
    Add {
        /// Target domain.
        domain: String,

        /// Knowledge text.
        text: String,

        /// Where the knowledge came from.
        #[arg(short, long)]
        source: Option<String>,

        /// Metadata as a JSON document.
        #[arg(short, long)]
        metadata: Option<String>,
    },

    /// Search one domain or all of them.
    Search {
        /// Search query.
        query: String,

        /// Restrict to one domain.
        #[arg(short, long)]
        domain: Option<String>,

        /// Results per domain.
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Print the tool definitions as JSON.
    Tools,

    /// Configuration operations.
    Config(ConfigCommand),

    /// Print version information.
    Version,
}

/// Config-specific subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Print the effective configuration as JSON.
    Show,

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to XDG config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },
}

// ============================================================================
// Tests
// ============================================================================
