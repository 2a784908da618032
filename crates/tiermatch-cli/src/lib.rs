//! Tiermatch CLI library.
//!
//! Configuration, the application session around the store and sheet client,
//! command execution and output formatting for the `tiermatch` binary.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod repl;
pub mod saver;

pub use app::App;
pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
