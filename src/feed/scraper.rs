use std::time::Duration;

use chrono::{DateTime, Utc};
use feed_rs::parser;
use futures::stream::{self, StreamExt};
use reqwest::Client;

use crate::error::Result;
use crate::models::Submission;
use crate::services::{extract_text, ContentFetcher};

/// Google News health section, Spanish (Latin America) edition.
pub const DEFAULT_FEED_URL: &str = "https://news.google.com/rss/topics/CAAqJggKIiBDQkFTRWdvSUwyMHZNR3QwTlRFU0JtVnpMVFF4T1NnQVAB?hl=es-419&gl=MX&ceid=MX%3Aes-419";

const MAX_CONCURRENT_PAGES: usize = 5;

/// Google News search feed for a free-text query.
pub fn google_news_search_url(query: &str) -> String {
    format!(
        "https://news.google.com/rss/search?q={}&hl=es-419&gl=MX&ceid=MX%3Aes-419",
        urlencoding::encode(query)
    )
}

#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
    /// Inline HTML content or summary carried by the feed itself.
    pub inline_html: Option<String>,
}

pub struct FeedScraper {
    client: Client,
    content: ContentFetcher,
}

impl FeedScraper {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("newsveracity/1.0")
            .build()?;

        Ok(Self {
            client,
            content: ContentFetcher::new()?,
        })
    }

    pub async fn fetch_entries(&self, feed_url: &str) -> Result<Vec<FeedEntry>> {
        let response = self.client.get(feed_url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Failed to fetch feed: HTTP {}", response.status()).into());
        }

        let bytes = response.bytes().await?;
        parse_entries(&bytes)
    }

    /// Turns the first `limit` entries of a feed into submissions. Entries
    /// whose page cannot be fetched or is too short are logged and skipped.
    pub async fn scrape(&self, feed_url: &str, limit: usize) -> Result<Vec<Submission>> {
        let entries = self.fetch_entries(feed_url).await?;
        tracing::info!("Feed {} has {} entries, taking {}", feed_url, entries.len(), limit);

        let submissions: Vec<Submission> = stream::iter(entries.into_iter().take(limit))
            .map(|entry| async move { self.resolve(entry).await })
            .buffer_unordered(MAX_CONCURRENT_PAGES)
            .filter_map(|s| async { s })
            .collect()
            .await;

        Ok(submissions)
    }

    async fn resolve(&self, entry: FeedEntry) -> Option<Submission> {
        let page = match self.content.fetch_article(&entry.link).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", entry.link, e);
                None
            }
        };

        let (url, body) = match page {
            Some(page) => (page.url, page.text),
            // Fall back to whatever the feed carried inline.
            None => match entry.inline_html.as_deref().and_then(extract_text) {
                Some(text) => (entry.link.clone(), text),
                None => {
                    tracing::warn!("Content too short for {}", entry.link);
                    return None;
                }
            },
        };

        Some(Submission {
            title: entry.title,
            body,
            url: Some(url),
            published_at: entry.published_at,
        })
    }
}

pub fn parse_entries(bytes: &[u8]) -> Result<Vec<FeedEntry>> {
    let feed = parser::parse(bytes)?;

    let entries = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let link = entry.links.first().map(|l| l.href.clone())?;
            let inline_html = entry
                .content
                .as_ref()
                .and_then(|c| c.body.clone())
                .or_else(|| entry.summary.as_ref().map(|s| s.content.clone()));

            Some(FeedEntry {
                title: entry
                    .title
                    .map(|t| t.content)
                    .unwrap_or_else(|| "Untitled".to_string()),
                link,
                published_at: entry.published.or(entry.updated),
                inline_html,
            })
        })
        .collect();

    Ok(entries)
}
