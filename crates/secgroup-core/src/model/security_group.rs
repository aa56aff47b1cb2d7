// ── Security group resource types ──

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Tags;
use crate::error::Error;

// ── Desired state ───────────────────────────────────────────────────

/// Desired state of a security group, as declared by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityGroupSpec {
    pub group_name: String,
    pub description: String,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub ingress: Vec<IpPermission>,
}

/// One desired ingress rule in its list-based source form.
///
/// The three target lists mirror the provider's own permission shape.
/// Only a rule with exactly one populated list holding exactly one entry
/// can be translated; see [`crate::translate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpPermission {
    pub ip_protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_port: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_port: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ip_ranges: Vec<IpRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ipv6_ranges: Vec<Ipv6Range>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_id_group_pairs: Vec<UserIdGroupPair>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpRange {
    pub cidr_ip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ipv6Range {
    pub cidr_ipv6: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Reference to a peer security group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdGroupPair {
    pub group_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ── Tracking identity ───────────────────────────────────────────────

/// Identity of the stack that owns a resource, rendered as `namespace/name`
/// (or just `name` when the namespace is empty).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackId {
    pub namespace: String,
    pub name: String,
}

impl StackId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for StackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}/{}", self.namespace, self.name)
        }
    }
}

impl FromStr for StackId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, name) = s.split_once('/').unwrap_or(("", s));
        if name.is_empty() || name.contains('/') {
            return Err(Error::validation(format!("invalid stack id '{s}'")));
        }
        Ok(Self::new(namespace, name))
    }
}

/// A desired security group together with the tracking metadata the
/// controller attaches to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityGroup {
    /// Owning stack.
    pub stack: StackId,
    /// Resource id, unique within the stack.
    pub id: String,
    pub spec: SecurityGroupSpec,
}

impl SecurityGroup {
    pub fn new(stack: StackId, id: impl Into<String>, spec: SecurityGroupSpec) -> Self {
        Self {
            stack,
            id: id.into(),
            spec,
        }
    }
}

// ── Remote state ────────────────────────────────────────────────────

/// An existing remote security group, as found by a prior listing step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroupInfo {
    pub security_group_id: String,
    #[serde(default)]
    pub tags: Tags,
}

/// Result of a successful create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroupStatus {
    pub group_id: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn stack_id_display_with_namespace() {
        assert_eq!(StackId::new("prod", "web").to_string(), "prod/web");
    }

    #[test]
    fn stack_id_display_without_namespace() {
        assert_eq!(StackId::new("", "web").to_string(), "web");
    }

    #[test]
    fn stack_id_from_str() {
        let id: StackId = "prod/web".parse().unwrap();
        assert_eq!(id, StackId::new("prod", "web"));

        let bare: StackId = "web".parse().unwrap();
        assert_eq!(bare, StackId::new("", "web"));
    }

    #[test]
    fn stack_id_rejects_malformed() {
        assert!("prod/".parse::<StackId>().is_err());
        assert!("a/b/c".parse::<StackId>().is_err());
        assert!("".parse::<StackId>().is_err());
    }

    #[test]
    fn spec_deserializes_camel_case() {
        let json = r#"{
            "groupName": "web-sg",
            "description": "web tier",
            "tags": {"team": "edge"},
            "ingress": [{
                "ipProtocol": "tcp",
                "fromPort": 443,
                "toPort": 443,
                "ipRanges": [{"cidrIp": "0.0.0.0/0", "description": "https"}]
            }]
        }"#;
        let spec: SecurityGroupSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.group_name, "web-sg");
        assert_eq!(spec.tags.get("team").map(String::as_str), Some("edge"));
        assert_eq!(spec.ingress.len(), 1);
        assert_eq!(spec.ingress[0].from_port, Some(443));
        assert_eq!(spec.ingress[0].ip_ranges[0].cidr_ip, "0.0.0.0/0");
        assert!(spec.ingress[0].ipv6_ranges.is_empty());
    }
}
