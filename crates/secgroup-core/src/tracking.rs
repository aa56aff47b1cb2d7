// ── Tracking tags ──
//
// Every managed resource carries controller-owned tags identifying the
// cluster, the owning stack, and the resource within that stack. These
// are merged over the user's tags; on a key collision the tracking value
// wins so ownership can't be spoofed from a spec.

use crate::model::{StackId, Tags};

pub const DEFAULT_TAG_PREFIX: &str = "secgroup.io";
pub const DEFAULT_CLUSTER_NAME: &str = "default";

/// Keys written by earlier controller generations. Reconciliation leaves them alone.
pub const DEFAULT_LEGACY_TAG_KEYS: &[&str] = &[
    "kubernetes.io/cluster-name",
    "kubernetes.io/namespace",
    "kubernetes.io/ingress-name",
];

/// Source of the controller-managed tag set.
pub trait TrackingProvider: Send + Sync {
    /// Tags identifying the owning stack.
    fn stack_tags(&self, stack: &StackId) -> Tags;

    /// Key of the tag that names the resource within its stack.
    fn resource_id_tag_key(&self) -> String;

    /// Keys the tag reconciler must ignore.
    fn legacy_tag_keys(&self) -> Vec<String>;

    /// Full tag set for a resource: user tags overlaid with tracking tags.
    fn resource_tags(&self, stack: &StackId, resource_id: &str, user_tags: &Tags) -> Tags {
        let mut tags = user_tags.clone();
        tags.extend(self.stack_tags(stack));
        tags.insert(self.resource_id_tag_key(), resource_id.to_owned());
        tags
    }
}

/// Prefix-based tracking provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultTrackingProvider {
    tag_prefix: String,
    cluster_tag_key: String,
    cluster_name: String,
    legacy_tag_keys: Vec<String>,
}

impl DefaultTrackingProvider {
    /// Provider for `cluster_name` using `tag_prefix` for the stack and
    /// resource keys and `{tag_prefix}/cluster` for the cluster key.
    pub fn new(tag_prefix: impl Into<String>, cluster_name: impl Into<String>) -> Self {
        let tag_prefix = tag_prefix.into();
        Self {
            cluster_tag_key: format!("{tag_prefix}/cluster"),
            tag_prefix,
            cluster_name: cluster_name.into(),
            legacy_tag_keys: DEFAULT_LEGACY_TAG_KEYS
                .iter()
                .map(|k| (*k).to_owned())
                .collect(),
        }
    }

    pub fn with_cluster_tag_key(mut self, key: impl Into<String>) -> Self {
        self.cluster_tag_key = key.into();
        self
    }

    pub fn with_legacy_tag_keys(mut self, keys: Vec<String>) -> Self {
        self.legacy_tag_keys = keys;
        self
    }

    pub fn tag_prefix(&self) -> &str {
        &self.tag_prefix
    }

    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    fn stack_tag_key(&self) -> String {
        format!("{}/stack", self.tag_prefix)
    }
}

impl Default for DefaultTrackingProvider {
    fn default() -> Self {
        Self::new(DEFAULT_TAG_PREFIX, DEFAULT_CLUSTER_NAME)
    }
}

impl TrackingProvider for DefaultTrackingProvider {
    fn stack_tags(&self, stack: &StackId) -> Tags {
        Tags::from([
            (self.cluster_tag_key.clone(), self.cluster_name.clone()),
            (self.stack_tag_key(), stack.to_string()),
        ])
    }

    fn resource_id_tag_key(&self) -> String {
        format!("{}/resource", self.tag_prefix)
    }

    fn legacy_tag_keys(&self) -> Vec<String> {
        self.legacy_tag_keys.clone()
    }
}
