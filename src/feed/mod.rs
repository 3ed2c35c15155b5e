mod scraper;

pub use scraper::{google_news_search_url, FeedScraper, DEFAULT_FEED_URL};
