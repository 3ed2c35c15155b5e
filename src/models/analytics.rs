use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::{KeywordRef, Veracity};

// Rows read from the store

/// A false-classified article in the graph window with its keywords.
/// Articles without a topic still count towards keyword co-occurrence.
#[derive(Debug, Clone)]
pub struct FalseArticle {
    pub article_id: i64,
    pub topic: Option<(i64, String)>,
    pub keywords: Vec<KeywordRef>,
}

/// One (article, keyword) pair with the article's latest verdict.
#[derive(Debug, Clone)]
pub struct TrendRow {
    pub article_id: i64,
    pub keyword: KeywordRef,
    pub timestamp: DateTime<Utc>,
    pub result: Veracity,
}

/// Per-day counters backing the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayCounts {
    pub articles: u64,
    pub true_articles: u64,
    pub topics: u64,
    pub sources: u64,
}

// Network graph

#[derive(Debug, Clone, Serialize)]
pub struct NetworkGraph {
    pub edges: Vec<(String, String)>,
    pub metadata: GraphMetadata,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TopicFalseCount {
    pub topic: String,
    pub fake_news_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphMetadata {
    pub period: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    pub total_connections: usize,
    pub total_nodes: usize,
    pub levels: u8,
    pub top_topics: Vec<TopicFalseCount>,
    pub keywords_per_topic: BTreeMap<String, usize>,
    pub level_4_keywords_count: usize,
}

// Trends

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrendSeries {
    pub keyword: String,
    pub values: Vec<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendMetadata {
    pub range: String,
    pub filter: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_rows: usize,
    pub keyword_totals: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub categories: Vec<String>,
    pub series: Vec<TrendSeries>,
    pub metadata: TrendMetadata,
}

// Dashboard

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Movement {
    Up,
    Down,
    Stable,
}

impl Movement {
    pub fn of(change: f64) -> Self {
        if change > 0.0 {
            Movement::Up
        } else if change < 0.0 {
            Movement::Down
        } else {
            Movement::Stable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatMetric {
    pub value: f64,
    pub change: f64,
    pub trend: Movement,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub news_analyzed: StatMetric,
    pub truth_rate: StatMetric,
    pub active_topics: StatMetric,
    pub sources_found: StatMetric,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetadata {
    pub date: NaiveDate,
    pub comparison_date: NaiveDate,
}
