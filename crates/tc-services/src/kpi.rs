//! KPI statistics orchestration
//!
//! Fetches one row set wide enough for the requested period and the trailing
//! trend, then delegates every number to the pure aggregation in `tc-kpi`.

use chrono::{DateTime, Utc};
use tc_core::error::{TcError, ValidationErrors};
use tc_core::result::TcResult;
use tc_core::traits::Id;
use tc_kpi::{aggregate_kpi, trend_window, KpiPeriodAggregate};

use crate::stores::KpiSource;

/// Service computing the KPI aggregate for a period
pub struct KpiStatisticsService<'a> {
    source: &'a dyn KpiSource,
}

impl<'a> KpiStatisticsService<'a> {
    pub fn new(source: &'a dyn KpiSource) -> Self {
        Self { source }
    }

    pub async fn call(
        &self,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        department_filter: Option<Id>,
        now: DateTime<Utc>,
    ) -> TcResult<KpiPeriodAggregate> {
        if period_end <= period_start {
            return Err(TcError::Validation(ValidationErrors::single(
                "periodEnd",
                "must be after periodStart",
            )));
        }

        let (trend_start, trend_end) = trend_window(now);
        let fetch_start = period_start.min(trend_start);
        let fetch_end = period_end.max(trend_end);
        let data = self.source.kpi_rows(fetch_start, fetch_end).await?;

        tracing::debug!(
            tasks = data.tasks.len(),
            evaluations = data.evaluations.len(),
            "kpi aggregation"
        );
        Ok(aggregate_kpi(
            &data,
            period_start,
            period_end,
            department_filter,
            now,
        ))
    }
}
