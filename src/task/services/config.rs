//! Tunable behaviour of the task lifecycle service.

use crate::task::domain::{CyclePolicy, DEFAULT_PAGE_SIZE, PageRequest, TaskDomainError};
use serde::Deserialize;

/// Configuration for the task lifecycle service.
///
/// Deserializes with every field optional, so a host can embed it in its
/// own configuration file.
///
/// # Examples
///
/// ```
/// use taskward::task::domain::CyclePolicy;
/// use taskward::task::services::TaskEngineConfig;
///
/// let config = TaskEngineConfig::default();
/// assert_eq!(config.cycle_policy, CyclePolicy::Allow);
/// assert_eq!(config.default_page_size, 15);
///
/// let strict = TaskEngineConfig::strict();
/// assert_eq!(strict.cycle_policy, CyclePolicy::Reject);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TaskEngineConfig {
    /// Treatment of dependency cycles longer than a self-edge.
    pub cycle_policy: CyclePolicy,
    /// Page size used when the caller does not choose one.
    pub default_page_size: u32,
    /// Upper bound applied to requested page sizes.
    pub max_page_size: u32,
}

impl Default for TaskEngineConfig {
    fn default() -> Self {
        Self {
            cycle_policy: CyclePolicy::Allow,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: 100,
        }
    }
}

impl TaskEngineConfig {
    /// Creates a configuration that refuses every dependency cycle.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            cycle_policy: CyclePolicy::Reject,
            ..Self::default()
        }
    }

    /// Builds a page request, falling back to the default page size and
    /// capping at the maximum.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidPageNumber`] when `page` is zero
    /// and [`TaskDomainError::InvalidPageSize`] when `per_page` is
    /// `Some(0)`.
    pub fn page_request(
        &self,
        page: u32,
        per_page: Option<u32>,
    ) -> Result<PageRequest, TaskDomainError> {
        let size = per_page.unwrap_or(self.default_page_size);
        Ok(PageRequest::new(page, size)?.clamp_per_page(self.max_page_size))
    }
}
