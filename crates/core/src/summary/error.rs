//! Summary loading error types.

use tabsplit_shared::AppError;
use tabsplit_shared::types::GroupId;
use thiserror::Error;

/// Errors raised by a [`GroupDataSource`](super::GroupDataSource).
#[derive(Debug, Error)]
pub enum SourceError {
    /// The group does not exist in the source.
    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),

    /// The source could not be reached or returned an error.
    #[error("Data source unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised while loading a group summary or report.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Fetching the group's roster, expenses or payments failed.
    #[error("Failed to load summary for group {group}")]
    Load {
        /// Group being loaded.
        group: GroupId,
        /// Underlying source failure.
        #[source]
        source: SourceError,
    },
}

impl SummaryError {
    pub(crate) fn load(group: &GroupId, source: SourceError) -> Self {
        Self::Load {
            group: group.clone(),
            source,
        }
    }
}

impl From<SummaryError> for AppError {
    fn from(err: SummaryError) -> Self {
        match err {
            SummaryError::Load {
                source: SourceError::GroupNotFound(group),
                ..
            } => Self::NotFound(format!("group {group}")),
            SummaryError::Load {
                group,
                source: SourceError::Unavailable(reason),
            } => Self::DataSource(format!("group {group}: {reason}")),
        }
    }
}
