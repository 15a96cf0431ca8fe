//! Group summary service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tabsplit_shared::AppConfig;
use tabsplit_shared::types::GroupId;
use tracing::{debug, error, info};

use super::cache::SummaryCache;
use super::error::SummaryError;
use super::source::GroupDataSource;
use crate::balance::{BalanceEngine, Summary};
use crate::reports::{
    CategoryShare, DEFAULT_TOP_CATEGORIES, DailyTotal, GroupReport, GroupReportInput,
    ReportPeriod, ReportService,
};

/// Loads group data from a [`GroupDataSource`] and summarizes it.
pub struct GroupSummaryService<S: GroupDataSource> {
    source: Arc<S>,
    engine: BalanceEngine,
    cache: Option<SummaryCache>,
    top_categories: usize,
}

impl<S: GroupDataSource> GroupSummaryService<S> {
    /// Creates a service without caching.
    #[must_use]
    pub fn new(source: Arc<S>, engine: BalanceEngine) -> Self {
        Self {
            source,
            engine,
            cache: None,
            top_categories: DEFAULT_TOP_CATEGORIES,
        }
    }

    /// Enables caching of computed summaries.
    #[must_use]
    pub fn with_cache(mut self, cache: SummaryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sets how many categories the breakdown lists before merging the rest.
    #[must_use]
    pub const fn with_top_categories(mut self, top_categories: usize) -> Self {
        self.top_categories = top_categories;
        self
    }

    /// Creates a service configured from application settings.
    #[must_use]
    pub fn from_config(source: Arc<S>, config: &AppConfig) -> Self {
        let service = Self::new(source, BalanceEngine::from_config(&config.engine))
            .with_top_categories(config.reports.top_categories);

        if config.cache.enabled {
            service.with_cache(SummaryCache::from_config(&config.cache))
        } else {
            service
        }
    }

    /// Returns the balance engine in use.
    #[must_use]
    pub const fn engine(&self) -> &BalanceEngine {
        &self.engine
    }

    /// Returns the group's summary, or the load error.
    ///
    /// Serves from the cache when possible. Failed loads are never cached.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::Load`] if any of the roster, expense or payment
    /// fetches fail.
    pub async fn try_summary(&self, group: &GroupId) -> Result<Arc<Summary>, SummaryError> {
        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get(group)) {
            debug!(group_id = %group, "Summary cache hit");
            return Ok(cached);
        }
        debug!(group_id = %group, "Summary cache miss");

        let (members, expenses, payments) = tokio::try_join!(
            self.source.members(group),
            self.source.expenses(group),
            self.source.payments(group),
        )
        .map_err(|e| SummaryError::load(group, e))?;

        let summary = Arc::new(self.engine.compute_summary(&members, &expenses, &payments));

        if let Some(cache) = &self.cache {
            cache.insert(group.clone(), Arc::clone(&summary));
        }

        Ok(summary)
    }

    /// Returns the group's summary, falling back to [`Summary::zero`] when
    /// the data cannot be loaded.
    pub async fn summary(&self, group: &GroupId) -> Summary {
        match self.try_summary(group).await {
            Ok(summary) => Summary::clone(&summary),
            Err(e) => {
                error!(
                    group_id = %group,
                    error = ?e,
                    "Failed to load summary, using zero summary"
                );
                Summary::zero()
            }
        }
    }

    /// Drops the cached summary of a group.
    ///
    /// Call after any change to the group's expenses, payments or roster.
    pub fn invalidate(&self, group: &GroupId) {
        if let Some(cache) = &self.cache {
            cache.invalidate(group);
            debug!(group_id = %group, "Summary cache invalidated");
        }
    }

    /// Builds the group expense report for a period ending at `now`.
    ///
    /// Totals, balances and rows all come from one fetch, so they always
    /// agree. The freshly computed summary replaces the cached one.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::Load`] if any fetch fails.
    pub async fn report(
        &self,
        group: &GroupId,
        period: ReportPeriod,
        generated_by: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<GroupReport, SummaryError> {
        let (group_name, members, expenses, payments) = tokio::try_join!(
            self.source.group_name(group),
            self.source.members(group),
            self.source.expenses(group),
            self.source.payments(group),
        )
        .map_err(|e| SummaryError::load(group, e))?;

        let summary = Arc::new(self.engine.compute_summary(&members, &expenses, &payments));
        if let Some(cache) = &self.cache {
            cache.insert(group.clone(), Arc::clone(&summary));
        }

        let report = ReportService::group_report(GroupReportInput {
            group_name: &group_name,
            generated_by,
            period,
            now,
            members: &members,
            expenses: &expenses,
            payments: &payments,
            summary: summary.as_ref(),
        });

        info!(
            group_id = %group,
            period = %period,
            expenses = report.expenses.len(),
            payments = report.payments.len(),
            "Group report generated"
        );

        Ok(report)
    }

    /// Daily expense totals for a period ending at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::Load`] if the expense fetch fails.
    pub async fn expense_trend(
        &self,
        group: &GroupId,
        period: ReportPeriod,
        now: DateTime<Utc>,
    ) -> Result<Vec<DailyTotal>, SummaryError> {
        let expenses = self
            .source
            .expenses(group)
            .await
            .map_err(|e| SummaryError::load(group, e))?;

        Ok(ReportService::expense_trend(&expenses, period.start(now)))
    }

    /// Spending per category over all of the group's expenses.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::Load`] if the expense fetch fails.
    pub async fn category_breakdown(
        &self,
        group: &GroupId,
    ) -> Result<Vec<CategoryShare>, SummaryError> {
        let expenses = self
            .source
            .expenses(group)
            .await
            .map_err(|e| SummaryError::load(group, e))?;

        Ok(ReportService::category_breakdown(&expenses, self.top_categories))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::{Expense, Member, Payment};
    use crate::summary::error::SourceError;
    use crate::summary::source::{GroupSnapshot, InMemorySource};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap()
    }

    fn lunch() -> GroupSnapshot {
        GroupSnapshot {
            name: "Lunch crew".into(),
            members: vec![Member::new("alice", "Alice"), Member::new("bob", "Bob")],
            expenses: vec![
                Expense::new("e1", dec!(100000), at(10)).with_label("Hotpot"),
                Expense::new("e2", dec!(30000), at(14)).with_label("Coffee"),
            ],
            payments: vec![Payment::new("p1", "alice", dec!(50000), at(11))],
        }
    }

    fn source_with_lunch() -> Arc<InMemorySource> {
        let mut groups = HashMap::new();
        groups.insert(GroupId::new("lunch"), lunch());
        Arc::new(InMemorySource::new(groups))
    }

    /// Counts roster fetches and fails on demand.
    #[derive(Default)]
    struct CountingSource {
        inner: InMemorySource,
        member_calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl GroupDataSource for CountingSource {
        async fn group_name(&self, group: &GroupId) -> Result<String, SourceError> {
            self.inner.group_name(group).await
        }

        async fn members(&self, group: &GroupId) -> Result<Vec<Member>, SourceError> {
            self.member_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SourceError::Unavailable("connection refused".into()));
            }
            self.inner.members(group).await
        }

        async fn expenses(&self, group: &GroupId) -> Result<Vec<Expense>, SourceError> {
            self.inner.expenses(group).await
        }

        async fn payments(&self, group: &GroupId) -> Result<Vec<Payment>, SourceError> {
            self.inner.payments(group).await
        }
    }

    async fn counting_source(fail: bool) -> Arc<CountingSource> {
        let source = CountingSource {
            fail,
            ..CountingSource::default()
        };
        source.inner.upsert_group(GroupId::new("lunch"), lunch()).await;
        Arc::new(source)
    }

    #[tokio::test]
    async fn test_summary_computes_balances() {
        let service = GroupSummaryService::new(source_with_lunch(), BalanceEngine::default());

        let summary = service.summary(&GroupId::new("lunch")).await;

        assert_eq!(summary.total_expenses, dec!(130000));
        assert_eq!(summary.total_payments, dec!(50000));
        assert_eq!(summary.remaining_amount, dec!(80000));
        assert_eq!(summary.member_count, 2);
        let alice = summary.balance(&"alice".into()).unwrap();
        assert_eq!(alice.owed, dec!(65000));
        assert_eq!(alice.net, dec!(-15000));
    }

    #[tokio::test]
    async fn test_summary_cached_between_calls() {
        let source = counting_source(false).await;
        let service = GroupSummaryService::new(Arc::clone(&source), BalanceEngine::default())
            .with_cache(SummaryCache::new());
        let group = GroupId::new("lunch");

        let first = service.try_summary(&group).await.unwrap();
        let second = service.try_summary(&group).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.member_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_without_cache_always_recomputes() {
        let source = counting_source(false).await;
        let service = GroupSummaryService::new(Arc::clone(&source), BalanceEngine::default());
        let group = GroupId::new("lunch");

        service.summary(&group).await;
        service.summary(&group).await;

        assert_eq!(source.member_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_picks_up_new_data() {
        let source = counting_source(false).await;
        let service = GroupSummaryService::new(Arc::clone(&source), BalanceEngine::default())
            .with_cache(SummaryCache::new());
        let group = GroupId::new("lunch");

        assert_eq!(service.summary(&group).await.total_payments, dec!(50000));

        let mut updated = lunch();
        updated
            .payments
            .push(Payment::new("p2", "bob", dec!(65000), at(15)));
        source.inner.upsert_group(group.clone(), updated).await;

        // Still served from cache until invalidated.
        assert_eq!(service.summary(&group).await.total_payments, dec!(50000));

        service.invalidate(&group);
        assert_eq!(service.summary(&group).await.total_payments, dec!(115000));
        assert_eq!(source.member_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_load_falls_back_to_zero() {
        let source = counting_source(true).await;
        let service = GroupSummaryService::new(Arc::clone(&source), BalanceEngine::default())
            .with_cache(SummaryCache::new());
        let group = GroupId::new("lunch");

        assert_eq!(service.summary(&group).await, Summary::zero());

        // Failures are not cached.
        service.summary(&group).await;
        assert_eq!(source.member_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_try_summary_reports_missing_group() {
        let service = GroupSummaryService::new(source_with_lunch(), BalanceEngine::default());

        let err = service.try_summary(&GroupId::new("nope")).await.unwrap_err();

        assert!(matches!(
            err,
            SummaryError::Load {
                source: SourceError::GroupNotFound(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_from_config_respects_cache_toggle() {
        let source = counting_source(false).await;
        let mut config = AppConfig::default();
        config.cache.enabled = false;
        let service = GroupSummaryService::from_config(Arc::clone(&source), &config);
        let group = GroupId::new("lunch");

        service.summary(&group).await;
        service.summary(&group).await;

        assert_eq!(source.member_calls.load(Ordering::SeqCst), 2);
        assert_eq!(service.engine().share_scale(), config.engine.share_scale);
    }

    #[tokio::test]
    async fn test_report() {
        let service = GroupSummaryService::new(source_with_lunch(), BalanceEngine::default());

        let report = service
            .report(&GroupId::new("lunch"), ReportPeriod::Week, Some("Alice"), at(15))
            .await
            .unwrap();

        assert_eq!(report.group, "Lunch crew");
        assert_eq!(report.summary.total_expenses, dec!(130000));
        assert_eq!(report.members.len(), 2);
        assert_eq!(report.expenses.len(), 2);
        assert_eq!(report.expenses[0].item, "Coffee");
        assert_eq!(report.payments[0].member, "Alice");
    }

    #[tokio::test]
    async fn test_expense_trend_and_categories() {
        let service = GroupSummaryService::new(source_with_lunch(), BalanceEngine::default())
            .with_top_categories(1);
        let group = GroupId::new("lunch");

        let trend = service
            .expense_trend(&group, ReportPeriod::Week, at(15))
            .await
            .unwrap();
        assert_eq!(trend.len(), 2);
        let trend_total: Decimal = trend.iter().map(|d| d.amount).sum();
        assert_eq!(trend_total, dec!(130000));

        let categories = service.category_breakdown(&group).await.unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Hotpot");
        assert_eq!(categories[1].name, crate::reports::OTHER_CATEGORY);
        assert_eq!(categories[1].value, dec!(30000));
    }

    #[tokio::test]
    async fn test_report_fetches_once_and_matches_rows() {
        let source = counting_source(false).await;
        let service = GroupSummaryService::new(Arc::clone(&source), BalanceEngine::default())
            .with_cache(SummaryCache::new());
        let group = GroupId::new("lunch");

        // Prime the cache, then change the data behind it.
        service.summary(&group).await;
        let mut updated = lunch();
        updated
            .expenses
            .push(Expense::new("e3", dec!(20000), at(14)).with_label("Tea"));
        source.inner.upsert_group(group.clone(), updated).await;

        let report = service
            .report(&group, ReportPeriod::Week, None, at(15))
            .await
            .unwrap();

        assert_eq!(source.member_calls.load(Ordering::SeqCst), 2);
        assert_eq!(report.expenses.len(), 3);
        assert_eq!(report.summary.total_expenses, dec!(150000));

        // The report refreshed the cached summary.
        assert_eq!(service.summary(&group).await.total_expenses, dec!(150000));
        assert_eq!(source.member_calls.load(Ordering::SeqCst), 2);
    }
}
