//! Lifecycle management for cloud security groups on behalf of a
//! declarative controller.
//!
//! - **[`SecurityGroupManager`]**: create / update / delete orchestration.
//!   Create and update translate the desired ingress rules, attach merged
//!   tracking tags, and hand the normalized permissions to an
//!   [`IngressReconciler`]. Delete retries under a [`RetryPolicy`] while the
//!   provider reports the group as still referenced.
//!
//! - **[`translate_all`]**: pure conversion from list-based [`IpPermission`]s
//!   into [`NetworkPermission`]s with exactly one [`IngressTarget`].
//!
//! - **[`TrackingProvider`]**: the controller-owned tag set merged over user
//!   tags, plus the legacy keys tag reconciliation must leave alone.
//!
//! - **Capabilities** ([`provider`]): [`Ec2Api`], [`IngressReconciler`] and
//!   [`TagReconciler`] are injected as trait objects; this crate ships no
//!   transport of its own.

pub mod config;
pub mod error;
pub mod manager;
pub mod model;
pub mod provider;
pub mod retry;
pub mod tracking;
pub mod translate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::ManagerConfig;
pub use error::Error;
pub use manager::{DeleteState, SecurityGroupManager};
pub use model::{
    IngressTarget, IngressTargetKind, IpPermission, IpRange, Ipv6Range, NetworkPermission,
    SecurityGroup, SecurityGroupInfo, SecurityGroupSpec, SecurityGroupStatus, StackId, Tags,
    UserIdGroupPair,
};
pub use provider::{
    CreateSecurityGroupRequest, Ec2Api, IngressReconciler, ProviderError, ReconcileTagsOptions,
    TagReconciler,
};
pub use retry::{RetryError, RetryPolicy, RetryState};
pub use tracking::{DefaultTrackingProvider, TrackingProvider};
pub use translate::{translate, translate_all};
