//! Command-line interface for Lorekeep knowledge stores.
//!
//! # Key Abstractions
//!
//! - `CliArgs` / `Command`: clap argument model
//! - `LorekeepConfig`: confyg-loaded configuration (file, env, defaults)
//! - `LorekeepCli`: logging setup and command dispatch

pub mod app;
pub mod cli;
pub mod config;
pub mod handlers;

pub use app::LorekeepCli;
pub use cli::{CliArgs, Command, ConfigAction};
pub use config::LorekeepConfig;
