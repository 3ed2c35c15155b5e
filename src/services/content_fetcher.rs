use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use url::Url;

use crate::error::Result;

const USER_AGENT_STRING: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Bodies shorter than this are not worth classifying.
pub const MIN_BODY_CHARS: usize = 100;

#[derive(Clone)]
pub struct ContentFetcher {
    client: Client,
}

impl ContentFetcher {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_STRING));

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()?;
        Ok(Self { client })
    }

    /// Fetches the page and returns its readable text, following redirects.
    /// `None` when the page is unreachable or too short.
    pub async fn fetch_article(&self, article_url: &str) -> Result<Option<FetchedPage>> {
        if Url::parse(article_url).is_err() {
            tracing::debug!("Skipping invalid URL {}", article_url);
            return Ok(None);
        }

        let response = self.client.get(article_url).send().await?;

        if !response.status().is_success() {
            tracing::debug!("Failed to fetch {}: {}", article_url, response.status());
            return Ok(None);
        }

        let final_url = response.url().to_string();
        let html = response.text().await?;

        Ok(extract_text(&html).map(|text| FetchedPage {
            url: final_url,
            text,
        }))
    }
}

#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects, so aggregator links resolve to the publisher.
    pub url: String,
    pub text: String,
}

/// Readable text of an HTML document, or `None` under [`MIN_BODY_CHARS`].
pub fn extract_text(html: &str) -> Option<String> {
    let text = match html2text::from_read(html.as_bytes(), 100) {
        Ok(t) => t,
        Err(e) => {
            tracing::debug!("Failed to convert HTML to text: {}", e);
            return None;
        }
    };

    let cleaned: String = text
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    let length = cleaned.chars().count();
    if length >= MIN_BODY_CHARS {
        Some(cleaned)
    } else {
        tracing::debug!("Extracted content too short ({} chars)", length);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_keeps_long_bodies() {
        let paragraph = "Health officials said the vaccine trial finished without serious incidents. ".repeat(3);
        let html = format!("<html><body><h1>Trial</h1><p>{}</p></body></html>", paragraph);
        let text = extract_text(&html).unwrap();
        assert!(text.contains("vaccine trial"));
        assert!(!text.contains("<p>"));
    }

    #[test]
    fn test_extract_text_skips_short_bodies() {
        assert!(extract_text("<html><body><p>Too short.</p></body></html>").is_none());
        assert!(extract_text("").is_none());
    }
}
