//! # CLI Console
//!
//! A line-oriented front end for the explorer. It reads one command per
//! line and prints what happened.
//!
//! It is NOT a shell and NOT intended for POSIX compatibility.

pub mod commands;
pub mod interactive;

pub use commands::CommandHandler;
pub use interactive::{parse_line, Command, ParseError};

use services_settings::{load_settings_file, ExplorerSettings, PersistenceError, SettingsError};
use services_workspace_manager::{Workspace, WorkspaceError};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Startup errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Could not read settings: {0}")]
    Settings(#[from] PersistenceError),

    #[error("Bad override: {0}")]
    Override(#[from] SettingsError),

    #[error("Could not open workspace: {0}")]
    Workspace(#[from] WorkspaceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Layers a settings file (if any) and overrides over the defaults
pub async fn resolve_settings(
    config: Option<&Path>,
    overrides: &[String],
) -> Result<ExplorerSettings, CliError> {
    let mut settings = match config {
        Some(path) => load_settings_file(path).await?,
        None => ExplorerSettings::default(),
    };
    settings.apply_overrides(overrides.iter().map(String::as_str))?;
    Ok(settings)
}

/// Builds the command handler
///
/// Wires settings into a workspace and, when an email is given, logs that
/// user in before the first command.
pub async fn bootstrap(
    settings: ExplorerSettings,
    login: Option<&str>,
) -> Result<CommandHandler, CliError> {
    let mut workspace = Workspace::from_settings(&settings).await?;
    info!(
        backend = settings.backend.kind(),
        strategy = %settings.folder_strategy,
        "workspace ready"
    );
    if let Some(email) = login {
        workspace.login(email)?;
    }
    Ok(CommandHandler::new(workspace, settings))
}
