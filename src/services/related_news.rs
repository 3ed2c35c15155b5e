//! Related coverage lookup through the Google Custom Search JSON API.
//!
//! Each hit that is not a social or video site is fetched and run through the
//! loaded veracity model. Search failures never fail the caller.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::ai::ModelHandle;
use crate::error::Result;
use crate::models::Verdict;

use super::ContentFetcher;

const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
const QUERY_KEYWORDS: usize = 3;
/// The API returns at most 10 results per request.
const MAX_RESULTS_PER_REQUEST: usize = 10;
const EXTRA_RESULTS: usize = 5;

const EXCLUDED_DOMAINS: &[&str] = &[
    "youtube.com",
    "youtu.be",
    "facebook.com",
    "instagram.com",
    "twitter.com",
    "x.com",
    "tiktok.com",
    "linkedin.com",
    "reddit.com",
    "pinterest.com",
    "wikipedia.org",
];

#[derive(Debug, Clone, Serialize)]
pub struct RelatedNews {
    pub title: String,
    pub snippet: String,
    pub url: String,
    /// `None` when the page could not be fetched or classified.
    pub verdict: Option<Verdict>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

#[derive(Clone)]
pub struct RelatedNewsSearch {
    client: Client,
    fetcher: ContentFetcher,
    endpoint: String,
    api_key: String,
    engine_id: String,
    limit: usize,
}

impl RelatedNewsSearch {
    /// `None` unless both credentials are set and `limit` is positive.
    pub fn from_credentials(
        api_key: Option<&str>,
        engine_id: Option<&str>,
        limit: usize,
    ) -> Result<Option<Self>> {
        let (Some(api_key), Some(engine_id)) = (non_blank(api_key), non_blank(engine_id)) else {
            tracing::debug!("Search API credentials not configured, related news disabled");
            return Ok(None);
        };
        if limit == 0 {
            return Ok(None);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Some(Self {
            client,
            fetcher: ContentFetcher::new()?,
            endpoint: SEARCH_ENDPOINT.to_string(),
            api_key: api_key.to_string(),
            engine_id: engine_id.to_string(),
            limit,
        }))
    }

    /// Up to `limit` related articles for the given keywords, each with the
    /// model's verdict when its page could be read. Empty on any search error.
    pub async fn search(&self, keywords: &[String], model: &ModelHandle) -> Vec<RelatedNews> {
        let Some(query) = search_query(keywords) else {
            return Vec::new();
        };

        let items = match self.fetch_items(&query).await {
            Ok(items) => items,
            Err(e) => {
                tracing::error!("Related news search for '{}' failed: {}", query, e);
                return Vec::new();
            }
        };

        let hits: Vec<SearchItem> = items
            .into_iter()
            .filter(|item| {
                let excluded = is_excluded(&item.link);
                if excluded {
                    tracing::debug!("Skipping excluded domain: {}", item.link);
                }
                !excluded
            })
            .take(self.limit)
            .collect();

        stream::iter(hits)
            .map(|item| async move {
                let verdict = self.classify_page(&item.link, model).await;
                RelatedNews {
                    title: item.title,
                    snippet: item.snippet,
                    url: item.link,
                    verdict,
                }
            })
            .buffered(5)
            .collect()
            .await
    }

    async fn fetch_items(&self, query: &str) -> Result<Vec<SearchItem>> {
        let num = (self.limit + EXTRA_RESULTS).min(MAX_RESULTS_PER_REQUEST).to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("num", num.as_str()),
                ("lr", "lang_es"),
                ("gl", "mx"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Search API error: HTTP {}", response.status()).into());
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.items)
    }

    async fn classify_page(&self, url: &str, model: &ModelHandle) -> Option<Verdict> {
        let page = match self.fetcher.fetch_article(url).await {
            Ok(Some(page)) => page,
            Ok(None) => return None,
            Err(e) => {
                tracing::debug!("Could not fetch related news {}: {}", url, e);
                return None;
            }
        };
        match model.classify(&page.text).await {
            Ok(verdict) => Some(verdict),
            Err(e) => {
                tracing::debug!("Could not classify related news {}: {}", url, e);
                None
            }
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// The first three keywords plus "noticias"; `None` without keywords.
pub fn search_query(keywords: &[String]) -> Option<String> {
    if keywords.is_empty() {
        return None;
    }
    let terms = keywords
        .iter()
        .take(QUERY_KEYWORDS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    Some(format!("{} noticias", terms))
}

/// Whether `link` points at a social network, video site or encyclopedia
/// (subdomains included). Unparseable links are excluded too.
pub fn is_excluded(link: &str) -> bool {
    let Some(host) = Url::parse(link).ok().and_then(|u| u.host_str().map(str::to_lowercase)) else {
        return true;
    };
    EXCLUDED_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
}
