// ── Collaborator capabilities ──
//
// The manager talks to the outside world only through these traits. A
// concrete EC2 transport, the ingress diff engine, and the tag diff engine
// all live elsewhere and are injected at construction.

use std::fmt;

use async_trait::async_trait;

use crate::model::{NetworkPermission, SecurityGroupInfo, Tags};

/// Provider code for a delete refused because the group is still referenced.
pub const CODE_DEPENDENCY_VIOLATION: &str = "DependencyViolation";

/// Provider code for a create refused because the name is already taken in the VPC.
pub const CODE_DUPLICATE_GROUP: &str = "InvalidGroup.Duplicate";

// ── Error ───────────────────────────────────────────────────────────

/// Failure reported by the provider API or by a reconciler.
///
/// `code` is the provider's machine-readable error code when there is one;
/// classification helpers key off it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    code: Option<String>,
    message: String,
}

impl ProviderError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// An error without a provider code (e.g. a local collaborator failure).
    pub fn other(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn dependency_violation(message: impl Into<String>) -> Self {
        Self::new(CODE_DEPENDENCY_VIOLATION, message)
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` if another resource still references the group.
    /// This clears on its own once the dependent detaches.
    pub fn is_dependency_violation(&self) -> bool {
        self.code() == Some(CODE_DEPENDENCY_VIOLATION)
    }

    /// Returns `true` if a group with the same name already exists.
    pub fn is_duplicate(&self) -> bool {
        self.code() == Some(CODE_DUPLICATE_GROUP)
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{code}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ProviderError {}

// ── Provider API ────────────────────────────────────────────────────

/// Parameters of a create call. Ingress rules are not part of it; they are
/// established afterwards by the [`IngressReconciler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSecurityGroupRequest {
    pub vpc_id: String,
    pub group_name: String,
    pub description: String,
    /// Tags attached at creation time.
    pub tags: Tags,
}

#[async_trait]
pub trait Ec2Api: Send + Sync {
    /// Create a group, returning its id.
    async fn create_security_group(
        &self,
        request: CreateSecurityGroupRequest,
    ) -> Result<String, ProviderError>;

    async fn delete_security_group(&self, group_id: &str) -> Result<(), ProviderError>;

    /// Look up a group by name within a VPC.
    async fn find_security_group(
        &self,
        vpc_id: &str,
        group_name: &str,
    ) -> Result<Option<SecurityGroupInfo>, ProviderError>;
}

// ── Reconcilers ─────────────────────────────────────────────────────

/// Converges a group's ingress rules to the given permissions.
#[async_trait]
pub trait IngressReconciler: Send + Sync {
    async fn reconcile_ingress(
        &self,
        group_id: &str,
        permissions: &[NetworkPermission],
    ) -> Result<(), ProviderError>;
}

/// Knobs for [`TagReconciler::reconcile_tags`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileTagsOptions {
    /// Tags currently on the resource. `None` lets the reconciler fetch them.
    pub current_tags: Option<Tags>,
    /// Keys the reconciler must neither add nor remove.
    pub ignored_tag_keys: Vec<String>,
}

impl ReconcileTagsOptions {
    pub fn with_current_tags(mut self, tags: Tags) -> Self {
        self.current_tags = Some(tags);
        self
    }

    pub fn with_ignored_tag_keys(mut self, keys: impl IntoIterator<Item = String>) -> Self {
        self.ignored_tag_keys.extend(keys);
        self
    }
}

/// Converges a resource's tags to the full desired set.
#[async_trait]
pub trait TagReconciler: Send + Sync {
    async fn reconcile_tags(
        &self,
        resource_id: &str,
        desired: &Tags,
        options: ReconcileTagsOptions,
    ) -> Result<(), ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_dependency_violation() {
        let err = ProviderError::dependency_violation("resource sg-1 has a dependent object");
        assert!(err.is_dependency_violation());
        assert!(!err.is_duplicate());
        assert_eq!(
            err.to_string(),
            "DependencyViolation: resource sg-1 has a dependent object"
        );
    }

    #[test]
    fn classifies_duplicate() {
        let err = ProviderError::new(CODE_DUPLICATE_GROUP, "already exists");
        assert!(err.is_duplicate());
        assert!(!err.is_dependency_violation());
    }

    #[test]
    fn uncoded_error_displays_message_only() {
        let err = ProviderError::other("connection reset");
        assert_eq!(err.code(), None);
        assert_eq!(err.to_string(), "connection reset");
    }

    #[test]
    fn options_builder_accumulates() {
        let opts = ReconcileTagsOptions::default()
            .with_current_tags(Tags::from([("a".into(), "1".into())]))
            .with_ignored_tag_keys(vec!["legacy/a".to_owned()])
            .with_ignored_tag_keys(vec!["legacy/b".to_owned()]);
        assert_eq!(opts.current_tags.map(|t| t.len()), Some(1));
        assert_eq!(opts.ignored_tag_keys, vec!["legacy/a", "legacy/b"]);
    }
}
