use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;

use crate::ai::{ModelHandle, RemoteClassifier};
use crate::analysis::{KeywordExtractor, TopicClassifier};
use crate::analytics::{Analytics, GraphOptions};
use crate::config::Config;
use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::feed::FeedScraper;
use crate::models::{NewArticle, Submission, TopicAssignment, Verdict, UNCLASSIFIED};
use crate::services::{RelatedNews, RelatedNewsSearch};
use crate::text::Analyzer;

/// Outcome of pushing one submission through the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub article_id: i64,
    /// The URL was already stored; nothing new was written except a missing
    /// classification.
    pub duplicate: bool,
    pub topic: String,
    pub topic_id: Option<i64>,
    pub keywords: Vec<String>,
    pub verdict: Verdict,
    /// Coverage of the same story elsewhere; only filled by [`App::classify`].
    pub related: Vec<RelatedNews>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ScrapeSummary {
    pub fetched: usize,
    pub ingested: usize,
    pub duplicates: usize,
    pub failed: usize,
}

pub struct App {
    pub repository: Repository,
    pub analytics: Analytics,
    pub model: ModelHandle,
    topic_classifier: TopicClassifier,
    keyword_extractor: KeywordExtractor,
    keywords_per_article: usize,
    related_news: Option<RelatedNewsSearch>,
}

impl App {
    pub async fn new(config: &Config) -> Result<Self> {
        let repository = Repository::new(&config.db_path).await?;

        for seed in &config.topics {
            repository.upsert_topic(seed.clone()).await?;
        }
        repository
            .ensure_model(&config.model_name, &config.model_version)
            .await?;

        let model = ModelHandle::new();
        let classifier = RemoteClassifier::new(config.classifier_url.clone())?;
        model.load(&config.model_name, Arc::new(classifier)).await;

        let options = GraphOptions {
            synthetic_relations: config.synthetic_relations,
        };
        let mut app = Self::with_parts(repository, model, options, config.keywords_per_article);
        app.related_news = RelatedNewsSearch::from_credentials(
            config.search_api_key.as_deref(),
            config.search_engine_id.as_deref(),
            config.related_news_limit,
        )?;
        Ok(app)
    }

    pub fn with_parts(
        repository: Repository,
        model: ModelHandle,
        options: GraphOptions,
        keywords_per_article: usize,
    ) -> Self {
        let analyzer = Analyzer::new();
        Self {
            analytics: Analytics::new(repository.clone(), options),
            repository,
            model,
            topic_classifier: TopicClassifier::new(analyzer.clone()),
            keyword_extractor: KeywordExtractor::new(analyzer),
            keywords_per_article,
            related_news: None,
        }
    }

    /// [`App::ingest`] plus a related-news lookup on the article's keywords.
    /// The lookup is skipped without search credentials.
    pub async fn classify(&self, submission: Submission) -> Result<IngestReport> {
        let mut report = self.ingest(submission).await?;
        if let Some(search) = &self.related_news {
            report.related = search.search(&report.keywords, &self.model).await;
            tracing::info!("Found {} related articles", report.related.len());
        }
        Ok(report)
    }

    /// Topic, keywords and veracity for one submission, persisted together
    /// with its source. A URL seen before returns the stored result.
    pub async fn ingest(&self, submission: Submission) -> Result<IngestReport> {
        if let Some(url) = &submission.url {
            if let Some(existing) = self.repository.find_article_by_url(url).await? {
                tracing::info!("Article {} already stored as {}", url, existing.id);
                return self.stored_report(existing.id, existing.topic_id, &existing.body).await;
            }
        }

        let model = self
            .repository
            .active_model()
            .await?
            .ok_or_else(|| AppError::Classifier("no active model registered".to_string()))?;

        let source_id = match &submission.url {
            Some(url) => self.repository.get_or_create_source(url).await?,
            None => None,
        };

        let topics = self.repository.active_topics().await?;
        let topic = self.topic_classifier.classify(&submission.body, &topics);

        let now = Utc::now();
        let article_id = self
            .repository
            .insert_article(
                NewArticle {
                    title: submission.title.clone(),
                    body: submission.body.clone(),
                    url: submission.url.clone(),
                    published_at: submission.published_at,
                    source_id,
                    topic_id: topic.topic_id,
                },
                now,
            )
            .await?;

        let keywords = self
            .keyword_extractor
            .extract(&submission.body, self.keywords_per_article);
        self.repository
            .save_article_keywords(article_id, keywords.clone())
            .await?;

        let verdict = self.model.classify(&submission.body).await?;
        self.repository
            .record_classification(article_id, Some(model.id), &verdict, now)
            .await?;

        tracing::info!(
            "Processed '{}': topic {} ({:.3}), {} ({}%)",
            submission.title,
            topic.name,
            topic.similarity,
            verdict.label,
            verdict.confidence
        );

        let TopicAssignment { name, topic_id, .. } = topic;
        Ok(IngestReport {
            article_id,
            duplicate: false,
            topic: name,
            topic_id,
            keywords,
            verdict,
            related: Vec::new(),
        })
    }

    async fn stored_report(&self, article_id: i64, topic_id: Option<i64>, body: &str) -> Result<IngestReport> {
        let verdict = match self.repository.latest_classification(article_id).await? {
            Some(c) => Verdict {
                label: c.result,
                confidence: c.confidence,
                explanation: c.explanation,
            },
            None => {
                let model = self
                    .repository
                    .active_model()
                    .await?
                    .ok_or_else(|| AppError::Classifier("no active model registered".to_string()))?;
                let verdict = self.model.classify(body).await?;
                self.repository
                    .record_classification(article_id, Some(model.id), &verdict, Utc::now())
                    .await?;
                verdict
            }
        };

        let topic = match topic_id {
            Some(id) => self.repository.get_topic(id).await?.map(|t| t.name),
            None => None,
        };

        Ok(IngestReport {
            article_id,
            duplicate: true,
            topic: topic.unwrap_or_else(|| UNCLASSIFIED.to_string()),
            topic_id,
            keywords: self.repository.article_keywords(article_id).await?,
            verdict,
            related: Vec::new(),
        })
    }

    /// Scrapes one feed and ingests every usable entry. Failures are logged
    /// per entry.
    pub async fn scrape_feed(&self, scraper: &FeedScraper, feed_url: &str, limit: usize) -> Result<ScrapeSummary> {
        let submissions = scraper.scrape(feed_url, limit).await?;
        let mut summary = ScrapeSummary {
            fetched: submissions.len(),
            ..Default::default()
        };

        for submission in submissions {
            let title = submission.title.clone();
            match self.ingest(submission).await {
                Ok(report) if report.duplicate => summary.duplicates += 1,
                Ok(_) => summary.ingested += 1,
                Err(e) => {
                    tracing::error!("Failed to process '{}': {}", title, e);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    pub async fn scrape_all(&self, scraper: &FeedScraper, feeds: &[String], limit: usize) -> ScrapeSummary {
        let mut total = ScrapeSummary::default();
        for feed_url in feeds {
            match self.scrape_feed(scraper, feed_url, limit).await {
                Ok(summary) => {
                    total.fetched += summary.fetched;
                    total.ingested += summary.ingested;
                    total.duplicates += summary.duplicates;
                    total.failed += summary.failed;
                }
                Err(e) => tracing::error!("Failed to scrape {}: {}", feed_url, e),
            }
        }
        total
    }

    /// Scrapes every feed now and then every `interval_hours`. Runs until the
    /// task is cancelled.
    pub async fn run_scheduler(&self, scraper: &FeedScraper, feeds: &[String], limit: usize, interval_hours: u32) {
        let period = Duration::from_secs(u64::from(interval_hours.max(1)) * 3600);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            // The first tick completes immediately.
            interval.tick().await;
            tracing::info!("Starting scheduled scrape of {} feeds", feeds.len());
            let summary = self.scrape_all(scraper, feeds, limit).await;
            tracing::info!(
                "Scrape finished: {} fetched, {} new, {} duplicates, {} failed",
                summary.fetched,
                summary.ingested,
                summary.duplicates,
                summary.failed
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::stub;
    use crate::models::{TopicSeed, Veracity};
    use tempfile::TempDir;

    async fn app(with_model: bool) -> (TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.db");
        let repository = Repository::new(path.to_str().unwrap()).await.unwrap();
        repository
            .upsert_topic(TopicSeed {
                name: "Health".to_string(),
                description: None,
                keywords: vec!["vaccine".to_string(), "hospital".to_string(), "disease".to_string()],
            })
            .await
            .unwrap();
        repository
            .upsert_topic(TopicSeed {
                name: "Politics".to_string(),
                description: None,
                keywords: vec!["election".to_string(), "government".to_string()],
            })
            .await
            .unwrap();
        if with_model {
            repository.ensure_model("stub", "1").await.unwrap();
        }

        let model = ModelHandle::new();
        model.load("stub", stub(Veracity::True)).await;
        let app = App::with_parts(repository, model, GraphOptions::default(), 5);
        (dir, app)
    }

    fn submission(url: Option<&str>, body: &str) -> Submission {
        Submission {
            title: "Headline".to_string(),
            body: body.to_string(),
            url: url.map(str::to_string),
            published_at: None,
        }
    }

    #[tokio::test]
    async fn test_ingest_persists_everything() {
        let (_dir, app) = app(true).await;
        let report = app
            .ingest(submission(
                Some("https://www.example.com/a"),
                "The vaccine hoax spread from a hospital rumor about a vaccine.",
            ))
            .await
            .unwrap();

        assert!(!report.duplicate);
        assert_eq!(report.topic, "Health");
        assert_eq!(report.verdict.label, Veracity::False);
        assert_eq!(report.keywords[0], "vaccine");

        let stored = app
            .repository
            .latest_classification(report.article_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.result, Veracity::False);
        assert!(stored.model_id.is_some());

        let article = app
            .repository
            .find_article_by_url("https://www.example.com/a")
            .await
            .unwrap()
            .unwrap();
        let source = app
            .repository
            .get_source(article.source_id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(source.false_count, 1);
        assert_eq!(source.reliability, 0.0);
    }

    #[tokio::test]
    async fn test_duplicate_url_returns_stored_result() {
        let (_dir, app) = app(true).await;
        let url = Some("https://example.com/story");
        let first = app
            .ingest(submission(url, "Government announces election date."))
            .await
            .unwrap();
        let second = app
            .ingest(submission(url, "Completely different text about vaccines."))
            .await
            .unwrap();

        assert!(second.duplicate);
        assert_eq!(second.article_id, first.article_id);
        assert_eq!(second.topic, "Politics");
        assert_eq!(second.keywords, first.keywords);
        assert_eq!(second.verdict, first.verdict);
    }

    #[tokio::test]
    async fn test_unmatched_text_is_unclassified() {
        let (_dir, app) = app(true).await;
        let report = app
            .ingest(submission(None, "Quarterly football scores surprised fans."))
            .await
            .unwrap();
        assert_eq!(report.topic, UNCLASSIFIED);
        assert_eq!(report.topic_id, None);
    }

    #[tokio::test]
    async fn test_classify_without_search_credentials_has_no_related_news() {
        let (_dir, app) = app(true).await;
        let report = app
            .classify(submission(None, "The vaccine hoax spread from a hospital rumor."))
            .await
            .unwrap();
        assert_eq!(report.topic, "Health");
        assert!(report.related.is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["related"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_ingest_without_active_model_fails() {
        let (_dir, app) = app(false).await;
        let result = app.ingest(submission(None, "Government election news.")).await;
        assert!(matches!(result, Err(AppError::Classifier(_))));
    }

    #[tokio::test]
    async fn test_ingest_without_loaded_classifier_fails() {
        let (_dir, app) = app(true).await;
        app.model.unload().await;
        let result = app.ingest(submission(None, "Government election news.")).await;
        assert!(result.is_err());
    }
}
