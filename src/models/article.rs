use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub source_id: Option<i64>,
    pub topic_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub body: String,
    pub url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub source_id: Option<i64>,
    pub topic_id: Option<i64>,
}

/// Raw input handed to the pipeline by the URL extractor, the scrapers or a
/// direct text submission.
#[derive(Debug, Clone)]
pub struct Submission {
    pub title: String,
    pub body: String,
    pub url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Submission {
    pub fn from_text(body: impl Into<String>) -> Self {
        Self {
            title: "Not available".to_string(),
            body: body.into(),
            url: None,
            published_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub reliability: f64,
    pub true_count: i64,
    pub false_count: i64,
    pub verified: bool,
}
