mod content_fetcher;
mod related_news;

pub use content_fetcher::{extract_text, ContentFetcher};
pub use related_news::{RelatedNews, RelatedNewsSearch};
