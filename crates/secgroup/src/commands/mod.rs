//! Command handlers.

pub mod config_cmd;
pub mod render;

use clap::CommandFactory;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

/// Route a parsed command to its handler.
pub fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Render(args) => render::handle(&args, global),
        Command::Config(args) => config_cmd::handle(&args, global),
        Command::Completions(args) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "secgroup", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Load configuration from `--config` or the canonical path.
pub fn load_config(global: &GlobalOpts) -> Result<secgroup_config::Config, CliError> {
    let config = match &global.config {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            secgroup_config::load_config_from(path)?
        }
        None => {
            tracing::debug!(path = %secgroup_config::config_path().display(), "loading config");
            secgroup_config::load_config()?
        }
    };
    Ok(config)
}
