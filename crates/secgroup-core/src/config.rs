// ── Runtime manager configuration ──
//
// Immutable settings handed to `SecurityGroupManager` at construction.
// Never touches disk; `secgroup-config` builds one from files and env.

use std::time::Duration;

pub const DEFAULT_DELETE_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_DELETE_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// VPC that owns every group this manager creates.
    pub vpc_id: String,
    /// Wait between delete attempts refused with a dependency violation.
    /// Raised to [`MIN_RETRY_INTERVAL`](crate::retry::MIN_RETRY_INTERVAL)
    /// when the delete runs.
    pub delete_poll_interval: Duration,
    /// Overall bound on a delete, measured from its first attempt.
    /// Capped at [`MAX_RETRY_TIMEOUT`](crate::retry::MAX_RETRY_TIMEOUT)
    /// when the delete runs.
    pub delete_timeout: Duration,
}

impl ManagerConfig {
    pub fn new(vpc_id: impl Into<String>) -> Self {
        Self {
            vpc_id: vpc_id.into(),
            delete_poll_interval: DEFAULT_DELETE_POLL_INTERVAL,
            delete_timeout: DEFAULT_DELETE_TIMEOUT,
        }
    }

    pub fn with_delete_poll_interval(mut self, interval: Duration) -> Self {
        self.delete_poll_interval = interval;
        self
    }

    pub fn with_delete_timeout(mut self, timeout: Duration) -> Self {
        self.delete_timeout = timeout;
        self
    }
}
