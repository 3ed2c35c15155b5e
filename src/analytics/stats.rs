use crate::models::{DashboardStats, DayCounts, Movement, StatMetric};

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Percentage change from `old` to `new`. Growth from zero counts as 100%.
pub fn percentage_change(old: u64, new: u64) -> f64 {
    if old == 0 {
        return if new > 0 { 100.0 } else { 0.0 };
    }
    round1((new as f64 - old as f64) / old as f64 * 100.0)
}

fn truth_rate(counts: &DayCounts) -> f64 {
    if counts.articles == 0 {
        return 0.0;
    }
    counts.true_articles as f64 / counts.articles as f64 * 100.0
}

fn count_metric(old: u64, new: u64) -> StatMetric {
    let change = percentage_change(old, new);
    StatMetric {
        value: new as f64,
        change,
        trend: Movement::of(change),
    }
}

pub fn dashboard_stats(today: &DayCounts, yesterday: &DayCounts) -> DashboardStats {
    let rate_today = truth_rate(today);
    let rate_change = rate_today - truth_rate(yesterday);

    DashboardStats {
        news_analyzed: count_metric(yesterday.articles, today.articles),
        truth_rate: StatMetric {
            value: round1(rate_today),
            change: round1(rate_change),
            trend: Movement::of(rate_change),
        },
        active_topics: count_metric(yesterday.topics, today.topics),
        sources_found: count_metric(yesterday.sources, today.sources),
    }
}
