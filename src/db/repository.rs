use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection as SqlConnection, OptionalExtension, Row};
use tokio_rusqlite::Connection;
use url::Url;

use crate::error::Result;
use crate::models::{
    Article, Classification, DayCounts, FalseArticle, Keyword, KeywordRef, Model, NewArticle,
    Source, Topic, TopicSeed, TrendRow, Veracity, Verdict,
};

use super::schema::SCHEMA;

#[derive(Clone)]
pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            // The daemon and one-shot commands may share the file.
            conn.busy_timeout(std::time::Duration::from_secs(5))?;
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    // Source operations

    /// Source row for the `scheme://host` of `article_url`; `None` when the
    /// URL has no host.
    pub async fn get_or_create_source(&self, article_url: &str) -> Result<Option<i64>> {
        let Some((name, base_url)) = source_identity(article_url) else {
            return Ok(None);
        };

        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO sources (name, url) VALUES (?1, ?2) ON CONFLICT(url) DO NOTHING",
                    params![name, base_url],
                )?;
                let id: i64 = conn.query_row(
                    "SELECT id FROM sources WHERE url = ?1",
                    params![base_url],
                    |row| row.get(0),
                )?;
                Ok(id)
            })
            .await?;
        Ok(Some(id))
    }

    pub async fn get_source(&self, id: i64) -> Result<Option<Source>> {
        let source = self
            .conn
            .call(move |conn| {
                let source = conn
                    .query_row(
                        "SELECT id, name, url, reliability, true_count, false_count, verified FROM sources WHERE id = ?1",
                        params![id],
                        source_from_row,
                    )
                    .optional()?;
                Ok(source)
            })
            .await?;
        Ok(source)
    }

    // Topic operations

    pub async fn upsert_topic(&self, seed: TopicSeed) -> Result<i64> {
        let profile = serde_json::to_string(&seed.keywords)?;
        let id = self
            .conn
            .call(move |conn| {
                let id: i64 = conn.query_row(
                    r#"INSERT INTO topics (name, description, keyword_profile, active)
                       VALUES (?1, ?2, ?3, 1)
                       ON CONFLICT(name) DO UPDATE SET
                           description = excluded.description,
                           keyword_profile = excluded.keyword_profile
                       RETURNING id"#,
                    params![seed.name, seed.description, profile],
                    |row| row.get(0),
                )?;
                Ok(id)
            })
            .await?;
        Ok(id)
    }

    pub async fn set_topic_active(&self, name: &str, active: bool) -> Result<bool> {
        let name = name.to_string();
        let changed = self
            .conn
            .call(move |conn| {
                let changed = conn.execute(
                    "UPDATE topics SET active = ?1 WHERE name = ?2",
                    params![active, name],
                )?;
                Ok(changed > 0)
            })
            .await?;
        Ok(changed)
    }

    pub async fn active_topics(&self) -> Result<Vec<Topic>> {
        self.topics_where("WHERE active = 1").await
    }

    pub async fn all_topics(&self) -> Result<Vec<Topic>> {
        self.topics_where("").await
    }

    async fn topics_where(&self, clause: &'static str) -> Result<Vec<Topic>> {
        let topics = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT id, name, keyword_profile, active FROM topics {} ORDER BY id",
                    clause
                ))?;
                let topics = stmt
                    .query_map([], topic_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(topics)
            })
            .await?;
        Ok(topics)
    }

    pub async fn get_topic(&self, id: i64) -> Result<Option<Topic>> {
        let topic = self
            .conn
            .call(move |conn| {
                let topic = conn
                    .query_row(
                        "SELECT id, name, keyword_profile, active FROM topics WHERE id = ?1",
                        params![id],
                        topic_from_row,
                    )
                    .optional()?;
                Ok(topic)
            })
            .await?;
        Ok(topic)
    }

    // Article operations

    pub async fn insert_article(&self, article: NewArticle, created_at: DateTime<Utc>) -> Result<i64> {
        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO articles (title, body, url, published_at, source_id, topic_id, created_at)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
                    params![
                        article.title,
                        article.body,
                        article.url,
                        article.published_at.map(format_timestamp),
                        article.source_id,
                        article.topic_id,
                        format_timestamp(created_at),
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        Ok(id)
    }

    pub async fn find_article_by_url(&self, url: &str) -> Result<Option<Article>> {
        let url = url.to_string();
        let article = self
            .conn
            .call(move |conn| {
                let article = conn
                    .query_row(
                        r#"SELECT id, title, body, url, published_at, source_id, topic_id, created_at
                           FROM articles WHERE url = ?1 ORDER BY id LIMIT 1"#,
                        params![url],
                        article_from_row,
                    )
                    .optional()?;
                Ok(article)
            })
            .await?;
        Ok(article)
    }

    // Keyword operations

    /// Creates the keyword or bumps its relevance by one, atomically.
    pub async fn create_or_reuse_keyword(&self, word: &str) -> Result<i64> {
        let word = word.to_string();
        let id = self
            .conn
            .call(move |conn| Ok(upsert_keyword(conn, &word)?))
            .await?;
        Ok(id)
    }

    /// Idempotent; returns whether a new association was created.
    pub async fn link_article_keyword(&self, article_id: i64, keyword_id: i64) -> Result<bool> {
        let created = self
            .conn
            .call(move |conn| Ok(link_keyword(conn, article_id, keyword_id)?))
            .await?;
        Ok(created)
    }

    /// Upserts and links every word in one transaction; nothing is kept if
    /// any write fails.
    pub async fn save_article_keywords(&self, article_id: i64, words: Vec<String>) -> Result<Vec<i64>> {
        let ids = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let mut ids = Vec::with_capacity(words.len());
                for word in &words {
                    let keyword_id = upsert_keyword(&tx, word)?;
                    link_keyword(&tx, article_id, keyword_id)?;
                    ids.push(keyword_id);
                }
                tx.commit()?;
                Ok(ids)
            })
            .await?;
        Ok(ids)
    }

    pub async fn get_keyword(&self, word: &str) -> Result<Option<Keyword>> {
        let word = word.to_string();
        let keyword = self
            .conn
            .call(move |conn| {
                let keyword = conn
                    .query_row(
                        "SELECT id, word, relevance FROM keywords WHERE word = ?1",
                        params![word],
                        |row| {
                            Ok(Keyword {
                                id: row.get(0)?,
                                word: row.get(1)?,
                                relevance: row.get(2)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(keyword)
            })
            .await?;
        Ok(keyword)
    }

    pub async fn article_keywords(&self, article_id: i64) -> Result<Vec<String>> {
        let words = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT k.word FROM article_keywords ak
                       JOIN keywords k ON k.id = ak.keyword_id
                       WHERE ak.article_id = ?1 ORDER BY ak.id"#,
                )?;
                let words = stmt
                    .query_map(params![article_id], |row| row.get(0))?
                    .collect::<std::result::Result<Vec<String>, _>>()?;
                Ok(words)
            })
            .await?;
        Ok(words)
    }

    // Model and classification operations

    /// Registers the model version and makes it the only active one.
    pub async fn ensure_model(&self, name: &str, version: &str) -> Result<i64> {
        let (name, version) = (name.to_string(), version.to_string());
        let now = format_timestamp(Utc::now());
        let id = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    "UPDATE models SET active = 0 WHERE NOT (name = ?1 AND version = ?2)",
                    params![name, version],
                )?;
                let id: i64 = tx.query_row(
                    r#"INSERT INTO models (name, version, active, trained_at)
                       VALUES (?1, ?2, 1, ?3)
                       ON CONFLICT(name, version) DO UPDATE SET active = 1
                       RETURNING id"#,
                    params![name, version, now],
                    |row| row.get(0),
                )?;
                tx.commit()?;
                Ok(id)
            })
            .await?;
        Ok(id)
    }

    pub async fn active_model(&self) -> Result<Option<Model>> {
        let model = self
            .conn
            .call(|conn| {
                let model = conn
                    .query_row(
                        r#"SELECT id, name, version, active FROM models
                           WHERE active = 1
                           ORDER BY trained_at DESC, id DESC LIMIT 1"#,
                        [],
                        |row| {
                            Ok(Model {
                                id: row.get(0)?,
                                name: row.get(1)?,
                                version: row.get(2)?,
                                active: row.get::<_, i64>(3)? != 0,
                            })
                        },
                    )
                    .optional()?;
                Ok(model)
            })
            .await?;
        Ok(model)
    }

    /// Stores the verdict and folds it into the article source's counters.
    pub async fn record_classification(
        &self,
        article_id: i64,
        model_id: Option<i64>,
        verdict: &Verdict,
        classified_at: DateTime<Utc>,
    ) -> Result<i64> {
        let verdict = verdict.clone();
        let at = format_timestamp(classified_at);
        let id = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    r#"INSERT INTO classifications (article_id, model_id, result, confidence, explanation, classified_at)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
                    params![
                        article_id,
                        model_id,
                        verdict.label.as_str(),
                        verdict.confidence,
                        verdict.explanation,
                        at,
                    ],
                )?;
                let id = tx.last_insert_rowid();

                let is_true = i64::from(verdict.label == Veracity::True);
                let is_false = i64::from(verdict.label == Veracity::False);
                tx.execute(
                    r#"UPDATE sources SET
                           true_count = true_count + ?1,
                           false_count = false_count + ?2,
                           reliability = CASE
                               WHEN true_count + ?1 + false_count + ?2 > 0
                               THEN CAST(true_count + ?1 AS REAL) / (true_count + ?1 + false_count + ?2)
                               ELSE reliability
                           END,
                           updated_at = ?3
                       WHERE id = (SELECT source_id FROM articles WHERE id = ?4)"#,
                    params![is_true, is_false, at, article_id],
                )?;

                tx.commit()?;
                Ok(id)
            })
            .await?;
        Ok(id)
    }

    pub async fn latest_classification(&self, article_id: i64) -> Result<Option<Classification>> {
        let classification = self
            .conn
            .call(move |conn| {
                let classification = conn
                    .query_row(
                        r#"SELECT id, article_id, model_id, result, confidence, explanation, classified_at
                           FROM latest_classifications WHERE article_id = ?1"#,
                        params![article_id],
                        classification_from_row,
                    )
                    .optional()?;
                Ok(classification)
            })
            .await?;
        Ok(classification)
    }

    // Analytics reads

    /// False-classified articles created in `[start, end]` with their keywords.
    pub async fn false_article_keywords(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<FalseArticle>> {
        let (start, end) = (format_timestamp(start), format_timestamp(end));
        let articles = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT a.id, t.id, t.name, k.id, k.word
                       FROM articles a
                       JOIN latest_classifications lc ON lc.article_id = a.id
                       LEFT JOIN topics t ON t.id = a.topic_id
                       LEFT JOIN article_keywords ak ON ak.article_id = a.id
                       LEFT JOIN keywords k ON k.id = ak.keyword_id
                       WHERE a.created_at >= ?1 AND a.created_at <= ?2
                         AND lc.result = 'false'
                       ORDER BY a.id, k.id"#,
                )?;
                let mut rows = stmt.query(params![start, end])?;

                let mut articles: Vec<FalseArticle> = Vec::new();
                while let Some(row) = rows.next()? {
                    let article_id: i64 = row.get(0)?;
                    let topic_id: Option<i64> = row.get(1)?;
                    let topic_name: Option<String> = row.get(2)?;
                    let keyword_id: Option<i64> = row.get(3)?;
                    let word: Option<String> = row.get(4)?;

                    if articles.last().map(|a| a.article_id) != Some(article_id) {
                        articles.push(FalseArticle {
                            article_id,
                            topic: topic_id.zip(topic_name),
                            keywords: Vec::new(),
                        });
                    }
                    if let (Some(id), Some(word), Some(current)) = (keyword_id, word, articles.last_mut()) {
                        current.keywords.push(KeywordRef::new(id, word));
                    }
                }
                Ok(articles)
            })
            .await?;
        Ok(articles)
    }

    /// (article, keyword, latest verdict) rows for articles created in
    /// `[start, end]`, oldest first.
    pub async fn trend_rows(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        result: Option<Veracity>,
    ) -> Result<Vec<TrendRow>> {
        let (start, end) = (format_timestamp(start), format_timestamp(end));
        let result = result.map(|r| r.as_str().to_string());
        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT a.id, k.id, k.word, a.created_at, lc.result
                       FROM article_keywords ak
                       JOIN articles a ON a.id = ak.article_id
                       JOIN keywords k ON k.id = ak.keyword_id
                       JOIN latest_classifications lc ON lc.article_id = a.id
                       WHERE a.created_at >= ?1 AND a.created_at <= ?2
                         AND (?3 IS NULL OR lc.result = ?3)
                       ORDER BY a.created_at, a.id, k.id"#,
                )?;
                let rows = stmt
                    .query_map(params![start, end, result], |row| {
                        Ok(TrendRow {
                            article_id: row.get(0)?,
                            keyword: KeywordRef::new(row.get(1)?, row.get::<_, String>(2)?),
                            timestamp: timestamp_at(row, 3)?,
                            result: veracity_at(row, 4)?,
                        })
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;
        Ok(rows)
    }

    /// Dashboard counters for articles created in `[start, end)`.
    pub async fn day_counts(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<DayCounts> {
        let (start, end) = (format_timestamp(start), format_timestamp(end));
        let counts = self
            .conn
            .call(move |conn| {
                let counts = conn.query_row(
                    r#"SELECT
                           COUNT(*),
                           COUNT(CASE WHEN lc.result = 'true' THEN 1 END),
                           COUNT(DISTINCT a.topic_id),
                           COUNT(DISTINCT a.source_id)
                       FROM articles a
                       LEFT JOIN latest_classifications lc ON lc.article_id = a.id
                       WHERE a.created_at >= ?1 AND a.created_at < ?2"#,
                    params![start, end],
                    |row| {
                        Ok(DayCounts {
                            articles: row.get::<_, i64>(0)? as u64,
                            true_articles: row.get::<_, i64>(1)? as u64,
                            topics: row.get::<_, i64>(2)? as u64,
                            sources: row.get::<_, i64>(3)? as u64,
                        })
                    },
                )?;
                Ok(counts)
            })
            .await?;
        Ok(counts)
    }
}

fn upsert_keyword(conn: &SqlConnection, word: &str) -> rusqlite::Result<i64> {
    conn.query_row(
        r#"INSERT INTO keywords (word, relevance) VALUES (?1, 1.0)
           ON CONFLICT(word) DO UPDATE SET relevance = relevance + 1.0
           RETURNING id"#,
        params![word],
        |row| row.get(0),
    )
}

fn link_keyword(conn: &SqlConnection, article_id: i64, keyword_id: i64) -> rusqlite::Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO article_keywords (article_id, keyword_id) VALUES (?1, ?2)",
        params![article_id, keyword_id],
    )?;
    Ok(inserted > 0)
}

/// `(name, scheme://host)` for a URL, with a leading `www.` dropped from the name.
fn source_identity(article_url: &str) -> Option<(String, String)> {
    let parsed = Url::parse(article_url).ok()?;
    let host = parsed.host_str()?;
    let base_url = match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    };
    let name = host.strip_prefix("www.").unwrap_or(host).to_string();
    Some((name, base_url))
}

/// Fixed-width RFC 3339 so stored timestamps compare correctly as text.
fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC3339 first (e.g., "2026-01-11T12:34:56.000000Z")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Try SQLite datetime format (e.g., "2026-01-11 12:34:56")
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

fn conversion_error(index: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        index,
        rusqlite::types::Type::Text,
        message.into(),
    )
}

fn timestamp_at(row: &Row, index: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(index)?;
    parse_datetime(&raw).ok_or_else(|| conversion_error(index, format!("bad timestamp '{}'", raw)))
}

fn optional_timestamp_at(row: &Row, index: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    Ok(row
        .get::<_, Option<String>>(index)?
        .and_then(|s| parse_datetime(&s)))
}

fn veracity_at(row: &Row, index: usize) -> rusqlite::Result<Veracity> {
    let raw: String = row.get(index)?;
    raw.parse().map_err(|e: String| conversion_error(index, e))
}

fn article_from_row(row: &Row) -> rusqlite::Result<Article> {
    Ok(Article {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        url: row.get(3)?,
        published_at: optional_timestamp_at(row, 4)?,
        source_id: row.get(5)?,
        topic_id: row.get(6)?,
        created_at: timestamp_at(row, 7)?,
    })
}

fn topic_from_row(row: &Row) -> rusqlite::Result<Topic> {
    let raw_profile: String = row.get(2)?;
    let keyword_profile: Vec<String> = serde_json::from_str(&raw_profile)
        .map_err(|e| conversion_error(2, format!("bad keyword profile: {}", e)))?;
    Ok(Topic {
        id: row.get(0)?,
        name: row.get(1)?,
        keyword_profile,
        active: row.get::<_, i64>(3)? != 0,
    })
}

fn source_from_row(row: &Row) -> rusqlite::Result<Source> {
    Ok(Source {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        reliability: row.get(3)?,
        true_count: row.get(4)?,
        false_count: row.get(5)?,
        verified: row.get::<_, i64>(6)? != 0,
    })
}

fn classification_from_row(row: &Row) -> rusqlite::Result<Classification> {
    Ok(Classification {
        id: row.get(0)?,
        article_id: row.get(1)?,
        model_id: row.get(2)?,
        result: veracity_at(row, 3)?,
        confidence: row.get(4)?,
        explanation: row.get(5)?,
        classified_at: timestamp_at(row, 6)?,
    })
}
