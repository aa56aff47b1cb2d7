//! `config`: inspect the effective configuration.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::load_config;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            let path = global
                .config
                .clone()
                .unwrap_or_else(secgroup_config::config_path);
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }
        ConfigCommand::Show => {
            let config = load_config(global)?;
            let out = match global.output {
                OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&config)
                    .map_err(secgroup_config::ConfigError::from)?,
                _ => output::render_single(
                    &global.output,
                    &config,
                    |_| String::new(),
                    |_| String::new(),
                ),
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
