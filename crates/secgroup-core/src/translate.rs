// ── Ingress rule translation ──
//
// Pure conversion from desired `IpPermission`s to normalized
// `NetworkPermission`s. A rule-set translates atomically: one bad rule
// fails the whole set.

use crate::error::Error;
use crate::model::{IngressTarget, IpPermission, NetworkPermission, labels_for_raw_description};

/// Translate a single rule.
pub fn translate(permission: &IpPermission) -> Result<NetworkPermission, Error> {
    let (target, description) = IngressTarget::from_permission(permission)?;
    Ok(NetworkPermission::new(
        permission.ip_protocol.clone(),
        permission.from_port,
        permission.to_port,
        target,
        labels_for_raw_description(description),
    ))
}

/// Translate every rule in order. Returns no permissions if any rule is
/// invalid; the error names the offending rule's index.
pub fn translate_all(permissions: &[IpPermission]) -> Result<Vec<NetworkPermission>, Error> {
    permissions
        .iter()
        .enumerate()
        .map(|(index, permission)| {
            translate(permission).map_err(|err| match err {
                Error::Validation { message } => Error::Validation {
                    message: format!("ingress[{index}]: {message}"),
                },
                other => other,
            })
        })
        .collect()
}
