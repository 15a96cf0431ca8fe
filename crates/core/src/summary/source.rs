//! Data source seam for group rosters, expenses and payments.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tabsplit_shared::types::GroupId;
use tokio::sync::RwLock;

use super::error::SourceError;
use crate::balance::{Expense, Member, Payment};

/// Supplies pre-scoped group data to the summary service.
///
/// Implementations own their clients (database pool, HTTP client, ...) and
/// are handed to the service explicitly.
#[async_trait]
pub trait GroupDataSource: Send + Sync {
    /// Returns the group's display name.
    async fn group_name(&self, group: &GroupId) -> Result<String, SourceError>;

    /// Returns the group's current roster.
    async fn members(&self, group: &GroupId) -> Result<Vec<Member>, SourceError>;

    /// Returns every expense recorded in the group.
    async fn expenses(&self, group: &GroupId) -> Result<Vec<Expense>, SourceError>;

    /// Returns every payment recorded in the group.
    async fn payments(&self, group: &GroupId) -> Result<Vec<Payment>, SourceError>;
}

/// All records of one group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSnapshot {
    /// Group display name.
    pub name: String,
    /// Roster.
    #[serde(default)]
    pub members: Vec<Member>,
    /// Expenses.
    #[serde(default)]
    pub expenses: Vec<Expense>,
    /// Payments.
    #[serde(default)]
    pub payments: Vec<Payment>,
}

#[derive(Deserialize)]
struct SnapshotFile {
    groups: HashMap<GroupId, GroupSnapshot>,
}

/// A [`GroupDataSource`] backed by in-memory snapshots.
///
/// Used by the CLI (loaded from a JSON file) and in tests.
#[derive(Debug, Default)]
pub struct InMemorySource {
    groups: RwLock<HashMap<GroupId, GroupSnapshot>>,
}

impl InMemorySource {
    /// Creates a source holding the given groups.
    #[must_use]
    pub fn new(groups: HashMap<GroupId, GroupSnapshot>) -> Self {
        Self {
            groups: RwLock::new(groups),
        }
    }

    /// Parses a snapshot document of the form `{ "groups": { "<id>": { ... } } }`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: SnapshotFile = serde_json::from_str(json)?;
        Ok(Self::new(file.groups))
    }

    /// Inserts or replaces a group.
    pub async fn upsert_group(&self, group: GroupId, snapshot: GroupSnapshot) {
        self.groups.write().await.insert(group, snapshot);
    }

    /// Ids of all groups, sorted.
    pub async fn group_ids(&self) -> Vec<GroupId> {
        let mut ids: Vec<GroupId> = self.groups.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    async fn with_group<T: Send>(
        &self,
        group: &GroupId,
        f: impl FnOnce(&GroupSnapshot) -> T + Send,
    ) -> Result<T, SourceError> {
        self.groups
            .read()
            .await
            .get(group)
            .map(f)
            .ok_or_else(|| SourceError::GroupNotFound(group.clone()))
    }
}

#[async_trait]
impl GroupDataSource for InMemorySource {
    async fn group_name(&self, group: &GroupId) -> Result<String, SourceError> {
        self.with_group(group, |g| g.name.clone()).await
    }

    async fn members(&self, group: &GroupId) -> Result<Vec<Member>, SourceError> {
        self.with_group(group, |g| g.members.clone()).await
    }

    async fn expenses(&self, group: &GroupId) -> Result<Vec<Expense>, SourceError> {
        self.with_group(group, |g| g.expenses.clone()).await
    }

    async fn payments(&self, group: &GroupId) -> Result<Vec<Payment>, SourceError> {
        self.with_group(group, |g| g.payments.clone()).await
    }
}
