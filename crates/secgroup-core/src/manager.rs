// ── Security group manager ──
//
// Create / update / delete orchestration for one remote security group.
// Holds only immutable configuration and collaborator handles; every call
// works from the arguments it is given. Callers serialize operations on
// the same group id.

use std::future::Future;
use std::sync::Arc;

use strum::Display;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ManagerConfig;
use crate::error::Error;
use crate::model::{SecurityGroup, SecurityGroupInfo, SecurityGroupStatus, Tags};
use crate::provider::{
    CreateSecurityGroupRequest, Ec2Api, IngressReconciler, ProviderError, ReconcileTagsOptions,
    TagReconciler,
};
use crate::retry::{RetryError, RetryPolicy, RetryState};
use crate::tracking::TrackingProvider;
use crate::translate::translate_all;

// ── DeleteState ──────────────────────────────────────────────────

/// Observable states of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DeleteState {
    /// A delete call is in flight.
    Requesting,
    /// The group is still referenced; waiting to retry.
    Blocked,
    Deleted,
    Failed,
    TimedOut,
    Cancelled,
}

impl From<RetryState> for DeleteState {
    fn from(state: RetryState) -> Self {
        match state {
            RetryState::Attempting { .. } => Self::Requesting,
            RetryState::Waiting { .. } => Self::Blocked,
            RetryState::Succeeded => Self::Deleted,
            RetryState::Failed => Self::Failed,
            RetryState::TimedOut => Self::TimedOut,
            RetryState::Cancelled => Self::Cancelled,
        }
    }
}

// ── SecurityGroupManager ─────────────────────────────────────────

/// Converges remote security groups to a desired spec.
///
/// Cheaply cloneable; collaborators are shared behind `Arc`.
#[derive(Clone)]
pub struct SecurityGroupManager {
    ec2: Arc<dyn Ec2Api>,
    tracking: Arc<dyn TrackingProvider>,
    tag_reconciler: Arc<dyn TagReconciler>,
    ingress_reconciler: Arc<dyn IngressReconciler>,
    config: ManagerConfig,
}

impl SecurityGroupManager {
    pub fn new(
        ec2: Arc<dyn Ec2Api>,
        tracking: Arc<dyn TrackingProvider>,
        tag_reconciler: Arc<dyn TagReconciler>,
        ingress_reconciler: Arc<dyn IngressReconciler>,
        config: ManagerConfig,
    ) -> Self {
        Self {
            ec2,
            tracking,
            tag_reconciler,
            ingress_reconciler,
            config,
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Create the group and establish its ingress rules.
    ///
    /// Rules are validated before any remote call. If the provider reports
    /// that a group with this name already exists in the VPC, that group is
    /// adopted: its tags are reconciled and creation continues with its id,
    /// so a retried create after a partial failure converges instead of
    /// failing forever. A group whose ingress reconciliation fails is left
    /// in place.
    pub async fn create(
        &self,
        resource: &SecurityGroup,
        cancel: &CancellationToken,
    ) -> Result<SecurityGroupStatus, Error> {
        let tags = self.desired_tags(resource);
        let permissions = translate_all(&resource.spec.ingress)?;

        let request = CreateSecurityGroupRequest {
            vpc_id: self.config.vpc_id.clone(),
            group_name: resource.spec.group_name.clone(),
            description: resource.spec.description.clone(),
            tags,
        };
        info!(resource_id = %resource.id, "creating security group");
        let group_id = match with_cancel(cancel, "create", self.ec2.create_security_group(request))
            .await
        {
            Ok(group_id) => {
                info!(
                    resource_id = %resource.id,
                    security_group_id = %group_id,
                    "created security group"
                );
                group_id
            }
            Err(Error::Provider(err)) if err.is_duplicate() => {
                self.adopt_existing(resource, cancel, err).await?
            }
            Err(err) => return Err(err),
        };

        with_cancel(
            cancel,
            "create",
            self.ingress_reconciler
                .reconcile_ingress(&group_id, &permissions),
        )
        .await?;

        Ok(SecurityGroupStatus { group_id })
    }

    /// Converge tags and ingress rules of an existing group. Never creates.
    pub async fn update(
        &self,
        resource: &SecurityGroup,
        existing: &SecurityGroupInfo,
        cancel: &CancellationToken,
    ) -> Result<SecurityGroupStatus, Error> {
        let permissions = translate_all(&resource.spec.ingress)?;
        let group_id = existing.security_group_id.as_str();

        self.reconcile_tags(resource, group_id, &existing.tags, cancel, "update")
            .await?;
        with_cancel(
            cancel,
            "update",
            self.ingress_reconciler
                .reconcile_ingress(group_id, &permissions),
        )
        .await?;

        Ok(SecurityGroupStatus {
            group_id: group_id.to_owned(),
        })
    }

    /// Delete the group, retrying while the provider reports it as still
    /// referenced.
    pub async fn delete(
        &self,
        existing: &SecurityGroupInfo,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        self.delete_with_observer(existing, cancel, |_| {}).await
    }

    /// Like [`delete`](Self::delete), reporting every state transition to
    /// `observer`.
    pub async fn delete_with_observer(
        &self,
        existing: &SecurityGroupInfo,
        cancel: &CancellationToken,
        mut observer: impl FnMut(DeleteState),
    ) -> Result<(), Error> {
        let group_id = existing.security_group_id.as_str();
        let policy = RetryPolicy::new(
            self.config.delete_poll_interval,
            self.config.delete_timeout,
            ProviderError::is_dependency_violation,
        );

        info!(security_group_id = %group_id, "deleting security group");
        let result = policy
            .run(
                cancel,
                || self.ec2.delete_security_group(group_id),
                |state| {
                    debug!(security_group_id = %group_id, ?state, "delete state transition");
                    observer(DeleteState::from(state));
                },
            )
            .await;

        match result {
            Ok(()) => {
                info!(security_group_id = %group_id, "deleted security group");
                Ok(())
            }
            Err(RetryError::Fatal(err)) => Err(err.into()),
            Err(RetryError::TimedOut { attempts }) => Err(Error::Timeout {
                group_id: group_id.to_owned(),
                timeout_secs: policy.timeout().as_secs(),
                attempts,
            }),
            Err(RetryError::Cancelled { .. }) => Err(Error::Cancelled {
                operation: "delete",
            }),
        }
    }

    // ── Internals ────────────────────────────────────────────────

    fn desired_tags(&self, resource: &SecurityGroup) -> Tags {
        self.tracking
            .resource_tags(&resource.stack, &resource.id, &resource.spec.tags)
    }

    async fn reconcile_tags(
        &self,
        resource: &SecurityGroup,
        group_id: &str,
        current_tags: &Tags,
        cancel: &CancellationToken,
        operation: &'static str,
    ) -> Result<(), Error> {
        let desired = self.desired_tags(resource);
        let options = ReconcileTagsOptions::default()
            .with_current_tags(current_tags.clone())
            .with_ignored_tag_keys(self.tracking.legacy_tag_keys());
        with_cancel(
            cancel,
            operation,
            self.tag_reconciler
                .reconcile_tags(group_id, &desired, options),
        )
        .await
    }

    /// Resolve a duplicate-name create to the group that already holds the name.
    async fn adopt_existing(
        &self,
        resource: &SecurityGroup,
        cancel: &CancellationToken,
        duplicate: ProviderError,
    ) -> Result<String, Error> {
        let found = with_cancel(
            cancel,
            "create",
            self.ec2
                .find_security_group(&self.config.vpc_id, &resource.spec.group_name),
        )
        .await?;
        let Some(existing) = found else {
            return Err(duplicate.into());
        };

        warn!(
            resource_id = %resource.id,
            security_group_id = %existing.security_group_id,
            "security group already exists, adopting it"
        );
        self.reconcile_tags(
            resource,
            &existing.security_group_id,
            &existing.tags,
            cancel,
            "create",
        )
        .await?;
        Ok(existing.security_group_id)
    }
}

/// Await a collaborator call unless the caller cancels first.
async fn with_cancel<T>(
    cancel: &CancellationToken,
    operation: &'static str,
    call: impl Future<Output = Result<T, ProviderError>>,
) -> Result<T, Error> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(Error::Cancelled { operation }),
        result = call => result.map_err(Error::from),
    }
}
