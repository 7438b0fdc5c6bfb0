//! Facade shared by the HTTP handlers and the CLI commands.

use crate::core::access::resolve_list_target;
use crate::core::aggregator::Aggregator;
use crate::core::clock::Clock;
use crate::core::live::{FormattedSummary, format_summary};
use crate::core::overrides::OverrideService;
use crate::errors::{AppError, AppResult};
use crate::models::actor::Actor;
use crate::models::day_summary::{DailySummary, RecomputedSummary};
use crate::store::{AttendanceStore, AuditSink, SummaryQuery, UserDirectory};
use crate::utils::date::{parse_date, parse_date_or, resolve_range};
use crate::utils::time::ReferenceZone;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Raw list parameters as they arrive from a query string or the CLI.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub user_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

/// Unparseable or non-positive values fall back to the defaults; `limit` is
/// capped at [`MAX_PAGE_LIMIT`].
pub fn paging(page: Option<&str>, limit: Option<&str>) -> (i64, i64) {
    fn positive(v: Option<&str>) -> Option<i64> {
        v.and_then(|s| s.trim().parse::<i64>().ok()).filter(|n| *n > 0)
    }
    let page = positive(page).unwrap_or(1);
    let limit = positive(limit)
        .unwrap_or(DEFAULT_PAGE_LIMIT)
        .min(MAX_PAGE_LIMIT);
    (page, limit)
}

pub struct AttendanceService {
    pub aggregator: Aggregator,
    pub overrides: OverrideService,
    directory: Arc<dyn UserDirectory>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    list_default_days: i64,
}

impl AttendanceService {
    pub fn new<S: AttendanceStore + 'static>(
        store: Arc<S>,
        zone: ReferenceZone,
        clock: Arc<dyn Clock>,
        list_default_days: i64,
    ) -> Self {
        Self {
            aggregator: Aggregator::new(store.clone(), store.clone(), zone, clock.clone()),
            overrides: OverrideService::new(store.clone()),
            directory: store.clone(),
            audit: store,
            clock,
            list_default_days,
        }
    }

    pub fn directory(&self) -> &dyn UserDirectory {
        self.directory.as_ref()
    }

    pub fn audit(&self) -> &dyn AuditSink {
        self.audit.as_ref()
    }

    pub fn format(&self, recomputed: &RecomputedSummary) -> FormattedSummary {
        format_summary(recomputed, self.clock.now())
    }

    /// Recompute and format one day; `date` is `YYYY-MM-DD` or today when absent.
    pub fn daily_summary(&self, user_id: &str, date: Option<&str>) -> AppResult<FormattedSummary> {
        let date = parse_date_or(date, self.aggregator.today())?;
        let recomputed = self.aggregator.recompute(user_id, date)?;
        Ok(self.format(&recomputed))
    }

    /// Stored summaries visible to `actor`, newest first.
    pub fn list(&self, actor: &Actor, params: &ListParams) -> AppResult<Page<DailySummary>> {
        let user_id = resolve_list_target(actor, params.user_id.as_deref(), self.directory())?;
        self.list_user(&user_id, params)
    }

    /// Same as [`list`](Self::list) without the visibility check, for local tooling.
    pub fn list_user(&self, user_id: &str, params: &ListParams) -> AppResult<Page<DailySummary>> {
        let from = optional_date(params.from.as_deref())?;
        let to = optional_date(params.to.as_deref())?;
        let (from, to) = resolve_range(from, to, self.aggregator.today(), self.list_default_days)?;
        let (page, limit) = paging(params.page.as_deref(), params.limit.as_deref());

        let (data, total) = self.aggregator.list(&SummaryQuery {
            user_id: user_id.to_string(),
            from,
            to,
            offset: (page - 1) * limit,
            limit,
        })?;

        Ok(Page {
            data,
            total,
            page,
            limit,
            total_pages: (total + limit - 1) / limit,
        })
    }
}

fn optional_date(s: Option<&str>) -> AppResult<Option<NaiveDate>> {
    match s.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_date(v)
            .map(Some)
            .ok_or_else(|| AppError::InvalidDate(v.to_string())),
    }
}
