// ── Normalized network permissions ──
//
// `NetworkPermission` is what the ingress reconciler consumes. It is built
// from an `IpPermission` and carries exactly one target, enforced by the
// `IngressTarget` variant rather than by list-length bookkeeping.

use std::collections::BTreeMap;

use serde::Serialize;
use strum::{Display, EnumString};

use super::security_group::IpPermission;
use crate::error::Error;

/// Label key under which a rule's free-text description is preserved.
pub const LABEL_KEY_RAW_DESCRIPTION: &str = "raw/description";

/// Derive permission labels from a rule's raw description.
///
/// A missing description yields an empty value, so every permission
/// carries the label and an absent description compares equal to `""`.
pub fn labels_for_raw_description(description: Option<&str>) -> BTreeMap<String, String> {
    BTreeMap::from([(
        LABEL_KEY_RAW_DESCRIPTION.to_owned(),
        description.unwrap_or_default().to_owned(),
    )])
}

// ── IngressTarget ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum IngressTargetKind {
    Cidr,
    #[strum(serialize = "cidr-v6")]
    CidrV6,
    PeerGroup,
}

/// The single source an ingress permission admits traffic from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum IngressTarget {
    Cidr(String),
    #[serde(rename = "cidr-v6")]
    CidrV6(String),
    PeerGroup(String),
}

impl IngressTarget {
    /// Pick the one target of a rule, along with that target's description.
    ///
    /// Fails unless exactly one of the rule's target lists is populated and
    /// that list holds exactly one entry.
    pub fn from_permission(permission: &IpPermission) -> Result<(Self, Option<&str>), Error> {
        match (
            permission.ip_ranges.as_slice(),
            permission.ipv6_ranges.as_slice(),
            permission.user_id_group_pairs.as_slice(),
        ) {
            ([range], [], []) => Ok((
                Self::Cidr(range.cidr_ip.clone()),
                range.description.as_deref(),
            )),
            ([], [range], []) => Ok((
                Self::CidrV6(range.cidr_ipv6.clone()),
                range.description.as_deref(),
            )),
            ([], [], [pair]) => Ok((
                Self::PeerGroup(pair.group_id.clone()),
                pair.description.as_deref(),
            )),
            ([], [], []) => Err(Error::validation("invalid ipPermission: no target specified")),
            (v4, v6, groups) => {
                let populated: Vec<(IngressTargetKind, usize)> = [
                    (IngressTargetKind::Cidr, v4.len()),
                    (IngressTargetKind::CidrV6, v6.len()),
                    (IngressTargetKind::PeerGroup, groups.len()),
                ]
                .into_iter()
                .filter(|(_, len)| *len > 0)
                .collect();
                match populated.as_slice() {
                    [(kind, len)] => Err(Error::validation(format!(
                        "invalid ipPermission: expected exactly one {kind} target, got {len}"
                    ))),
                    kinds => {
                        let names: Vec<String> =
                            kinds.iter().map(|(kind, _)| kind.to_string()).collect();
                        Err(Error::validation(format!(
                            "invalid ipPermission: multiple target kinds specified ({})",
                            names.join(", ")
                        )))
                    }
                }
            }
        }
    }

    pub fn kind(&self) -> IngressTargetKind {
        match self {
            Self::Cidr(_) => IngressTargetKind::Cidr,
            Self::CidrV6(_) => IngressTargetKind::CidrV6,
            Self::PeerGroup(_) => IngressTargetKind::PeerGroup,
        }
    }

    /// The CIDR block or peer group id.
    pub fn value(&self) -> &str {
        match self {
            Self::Cidr(v) | Self::CidrV6(v) | Self::PeerGroup(v) => v,
        }
    }
}

// ── NetworkPermission ───────────────────────────────────────────────

/// Normalized ingress permission. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkPermission {
    protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    from_port: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to_port: Option<i32>,
    target: IngressTarget,
    labels: BTreeMap<String, String>,
}

impl NetworkPermission {
    pub(crate) fn new(
        protocol: String,
        from_port: Option<i32>,
        to_port: Option<i32>,
        target: IngressTarget,
        labels: BTreeMap<String, String>,
    ) -> Self {
        Self {
            protocol,
            from_port,
            to_port,
            target,
            labels,
        }
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn from_port(&self) -> Option<i32> {
        self.from_port
    }

    pub fn to_port(&self) -> Option<i32> {
        self.to_port
    }

    pub fn target(&self) -> &IngressTarget {
        &self.target
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn labels_keep_description() {
        let labels = labels_for_raw_description(Some("allow https"));
        assert_eq!(
            labels.get(LABEL_KEY_RAW_DESCRIPTION).map(String::as_str),
            Some("allow https")
        );
    }

    #[test]
    fn labels_default_to_empty_description() {
        let labels = labels_for_raw_description(None);
        assert_eq!(labels.get(LABEL_KEY_RAW_DESCRIPTION).map(String::as_str), Some(""));
        assert_eq!(labels.len(), 1);
    }

    #[test]
    fn target_kind_display_and_parse() {
        assert_eq!(IngressTargetKind::CidrV6.to_string(), "cidr-v6");
        assert_eq!(IngressTargetKind::PeerGroup.to_string(), "peer-group");
        let kind: IngressTargetKind = "cidr".parse().unwrap();
        assert_eq!(kind, IngressTargetKind::Cidr);
    }

    #[test]
    fn target_serializes_tagged() {
        let json = serde_json::to_value(IngressTarget::PeerGroup("sg-123".into())).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "peer-group", "value": "sg-123"}));
    }
}
