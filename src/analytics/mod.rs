mod graph;
mod stats;
mod trends;

use chrono::{DateTime, Duration, NaiveTime, Utc};

pub use graph::{build_graph, GraphOptions, GraphWindow, DEFAULT_WINDOW_DAYS};
pub use stats::dashboard_stats;
pub use trends::{aggregate, TrendRange, VeracityFilter};

use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::models::{DashboardMetadata, DashboardReport, NetworkGraph, TrendReport};

/// Read-side services over the repository. Every call reads a fresh
/// snapshot and hands it to the pure builders.
#[derive(Clone)]
pub struct Analytics {
    repository: Repository,
    options: GraphOptions,
}

impl Analytics {
    pub fn new(repository: Repository, options: GraphOptions) -> Self {
        Self { repository, options }
    }

    pub async fn network_graph(&self, window_days: i64, now: DateTime<Utc>) -> Result<NetworkGraph> {
        let window = GraphWindow::ending_at(now, window_days)?;
        let articles = self
            .repository
            .false_article_keywords(window.start, window.end)
            .await?;
        tracing::debug!("Building graph from {} false articles", articles.len());
        Ok(build_graph(&articles, window, self.options))
    }

    pub async fn trends(
        &self,
        range: TrendRange,
        filter: VeracityFilter,
        now: DateTime<Utc>,
    ) -> Result<TrendReport> {
        let rows = self
            .repository
            .trend_rows(now - range.span(), now, filter.veracity())
            .await?;
        Ok(aggregate(&rows, range, filter, now))
    }

    /// Compares the UTC day containing `now` with the day before.
    pub async fn dashboard(&self, now: DateTime<Utc>) -> Result<DashboardReport> {
        let today = now.date_naive();
        let yesterday = today
            .pred_opt()
            .ok_or_else(|| AppError::Aggregation(format!("no day before {}", today)))?;

        let today_start = today.and_time(NaiveTime::MIN).and_utc();
        let yesterday_start = yesterday.and_time(NaiveTime::MIN).and_utc();

        let today_counts = self
            .repository
            .day_counts(today_start, today_start + Duration::days(1))
            .await?;
        let yesterday_counts = self.repository.day_counts(yesterday_start, today_start).await?;

        Ok(DashboardReport {
            stats: dashboard_stats(&today_counts, &yesterday_counts),
            metadata: DashboardMetadata {
                date: today,
                comparison_date: yesterday,
            },
        })
    }
}
