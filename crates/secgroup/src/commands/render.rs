//! `render`: validate a spec file and show what a controller would send.

use std::path::Path;

use serde::Serialize;
use tabled::Tabled;

use secgroup_core::{
    NetworkPermission, SecurityGroupSpec, StackId, Tags, TrackingProvider, translate_all,
};

use crate::cli::{GlobalOpts, RenderArgs};
use crate::error::CliError;
use crate::output;

use super::load_config;

// ── Rendered view ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderedSecurityGroup {
    group_name: String,
    description: String,
    tags: Tags,
    ingress: Vec<NetworkPermission>,
}

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct PermissionRow {
    #[tabled(rename = "Protocol")]
    protocol: String,
    #[tabled(rename = "Ports")]
    ports: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&NetworkPermission> for PermissionRow {
    fn from(p: &NetworkPermission) -> Self {
        Self {
            protocol: p.protocol().to_owned(),
            ports: port_range(p),
            kind: p.target().kind().to_string(),
            source: p.target().value().to_owned(),
            description: p
                .labels()
                .get(secgroup_core::model::permission::LABEL_KEY_RAW_DESCRIPTION)
                .cloned()
                .unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct TagRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn port_range(p: &NetworkPermission) -> String {
    match (p.from_port(), p.to_port()) {
        (Some(from), Some(to)) if from == to => from.to_string(),
        (Some(from), Some(to)) => format!("{from}-{to}"),
        (Some(port), None) | (None, Some(port)) => port.to_string(),
        (None, None) => "all".into(),
    }
}

fn detail(group: &RenderedSecurityGroup) -> String {
    let permissions: Vec<PermissionRow> = group.ingress.iter().map(PermissionRow::from).collect();
    let tags: Vec<TagRow> = group
        .tags
        .iter()
        .map(|(key, value)| TagRow {
            key: key.clone(),
            value: value.clone(),
        })
        .collect();
    format!(
        "{} ({})\n\nIngress:\n{}\n\nTags:\n{}",
        group.group_name,
        group.description,
        output::render_table(&permissions),
        output::render_table(&tags)
    )
}

fn plain(group: &RenderedSecurityGroup) -> String {
    group
        .ingress
        .iter()
        .map(|p| {
            format!(
                "{} {} {} {}",
                p.protocol(),
                port_range(p),
                p.target().kind(),
                p.target().value()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Spec loading ────────────────────────────────────────────────────

fn parse_error(path: &Path, source: impl std::error::Error + Send + Sync + 'static) -> CliError {
    CliError::Parse {
        path: path.display().to_string(),
        source: Box::new(source),
    }
}

/// Load a spec, picking the format from the file extension.
pub fn load_spec(path: &Path) -> Result<SecurityGroupSpec, CliError> {
    let contents = std::fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("json") => serde_json::from_str(&contents).map_err(|e| parse_error(path, e)),
        Some("yaml" | "yml") => serde_yaml::from_str(&contents).map_err(|e| parse_error(path, e)),
        Some("toml") => toml::from_str(&contents).map_err(|e| parse_error(path, e)),
        _ => Err(CliError::Validation {
            field: "file".into(),
            reason: format!(
                "unsupported extension for {} (expected .json, .yaml, .yml or .toml)",
                path.display()
            ),
        }),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: &RenderArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let stack: StackId = args.stack.parse().map_err(|_| CliError::Validation {
        field: "stack".into(),
        reason: format!("expected namespace/name, got '{}'", args.stack),
    })?;
    let config = load_config(global)?;
    let tracking = config.tracking_provider();

    let spec = load_spec(&args.file)?;
    tracing::debug!(
        group_name = %spec.group_name,
        rules = spec.ingress.len(),
        "loaded spec"
    );
    let ingress = translate_all(&spec.ingress)?;
    let tags = tracking.resource_tags(&stack, &args.resource, &spec.tags);

    let rendered = RenderedSecurityGroup {
        group_name: spec.group_name,
        description: spec.description,
        tags,
        ingress,
    };
    let out = output::render_single(&global.output, &rendered, detail, plain);
    output::print_output(&out, global.quiet);
    Ok(())
}
