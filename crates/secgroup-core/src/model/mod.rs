// ── Domain model ──
//
// Desired-state input types (what the caller wants), the normalized
// permission descriptors handed to the ingress reconciler, and the small
// records that describe an existing remote group.

pub mod permission;
pub mod security_group;

use std::collections::BTreeMap;

pub use permission::{
    IngressTarget, IngressTargetKind, NetworkPermission, labels_for_raw_description,
};
pub use security_group::{
    IpPermission, IpRange, Ipv6Range, SecurityGroup, SecurityGroupInfo, SecurityGroupSpec,
    SecurityGroupStatus, StackId, UserIdGroupPair,
};

/// Key/value resource tags. Ordered so that requests and rendered output
/// are deterministic.
pub type Tags = BTreeMap<String, String>;
