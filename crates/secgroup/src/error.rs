//! CLI error types with miette diagnostics.
//!
//! Maps core and config errors into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use secgroup_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const INVALID_SPEC: i32 = 3;
    pub const CONFIG: i32 = 4;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Input ────────────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(secgroup::validation))]
    Validation { field: String, reason: String },

    #[error("Could not parse {path}")]
    #[diagnostic(
        code(secgroup::parse),
        help("Spec files are JSON, YAML or TOML with camelCase keys (groupName, ipProtocol, ipRanges, ...).")
    )]
    Parse {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid security group spec: {message}")]
    #[diagnostic(
        code(secgroup::invalid_spec),
        help("Each ingress rule needs exactly one target: one ipRanges, ipv6Ranges or userIdGroupPairs entry.")
    )]
    InvalidSpec { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(secgroup::config),
        help("Check the config file (see: secgroup config path) and SECGROUP_* environment variables.")
    )]
    Config(#[from] ConfigError),

    // ── IO / internal ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(secgroup::io))]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    #[diagnostic(code(secgroup::internal))]
    Core(secgroup_core::Error),
}

impl From<secgroup_core::Error> for CliError {
    fn from(err: secgroup_core::Error) -> Self {
        match err {
            secgroup_core::Error::Validation { message } => Self::InvalidSpec { message },
            other => Self::Core(other),
        }
    }
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } => exit_code::USAGE,
            Self::Parse { .. } | Self::InvalidSpec { .. } => exit_code::INVALID_SPEC,
            Self::Config(_) => exit_code::CONFIG,
            Self::Io(_) | Self::Core(_) => exit_code::GENERAL,
        }
    }
}
