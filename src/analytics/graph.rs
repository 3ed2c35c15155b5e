//! Topic → keyword → related-keyword graph over false-classified articles.
//!
//! Level 1 is a fixed root node, level 2 the topics with the most false
//! articles in the window, level 3 the top keywords of each topic and level 4
//! the keywords that co-occur most with each level-3 keyword.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};

use crate::error::{AppError, Result};
use crate::models::{FalseArticle, GraphMetadata, KeywordRef, NetworkGraph, TopicFalseCount};

pub const ROOT_NODE: &str = "Fake News Network";
pub const NO_DATA_NODE: &str = "No Data Available";
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

const MAX_TOPICS: usize = 5;
const MAX_KEYWORDS_PER_TOPIC: usize = 5;
const MAX_RELATED_PER_KEYWORD: usize = 2;

/// Hand-picked relations used when the corpus yields no level-4 edges.
/// These are not derived from data. Seeds are lemmas, like stored keywords.
const SYNTHETIC_RELATIONS: &[(&str, [&str; 2])] = &[
    ("salud", ["bienestar", "medicina"]),
    ("alimento", ["comida", "nutrientes"]),
    ("día", ["tiempo", "momento"]),
    ("cáncer", ["tumor", "oncología"]),
    ("ejercicio", ["actividad", "deporte"]),
    ("huevo", ["proteína", "desayuno"]),
];

#[derive(Debug, Clone, Copy)]
pub struct GraphWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub days: i64,
}

impl GraphWindow {
    /// The `days` long window ending at `end`. Fails for non-positive
    /// lengths and for windows reaching past the representable range.
    pub fn ending_at(end: DateTime<Utc>, days: i64) -> Result<Self> {
        if days <= 0 {
            return Err(AppError::Aggregation(format!(
                "graph window must be positive, got {} days",
                days
            )));
        }
        let start = Duration::try_days(days)
            .and_then(|span| end.checked_sub_signed(span))
            .ok_or_else(|| AppError::Aggregation(format!("graph window of {} days is out of range", days)))?;

        Ok(Self { start, end, days })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GraphOptions {
    pub synthetic_relations: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            synthetic_relations: true,
        }
    }
}

/// Builds the graph from the false articles of one window. `articles` must
/// contain each article once.
pub fn build_graph(articles: &[FalseArticle], window: GraphWindow, options: GraphOptions) -> NetworkGraph {
    let top_topics = rank_topics(articles);

    if top_topics.is_empty() {
        tracing::warn!("No false-classified topics in the last {} days", window.days);
        return no_data_graph(window);
    }

    let mut edges: Vec<(String, String)> = top_topics
        .iter()
        .map(|(_, name, _)| (ROOT_NODE.to_string(), name.clone()))
        .collect();

    // Level 2 -> 3
    let mut keywords_per_topic = BTreeMap::new();
    let mut level_3: Vec<String> = Vec::new();
    let mut level_3_set: HashSet<String> = HashSet::new();

    for (topic_id, topic_name, _) in &top_topics {
        let topic_articles = articles
            .iter()
            .filter(|a| a.topic.as_ref().is_some_and(|(id, _)| id == topic_id));
        let keywords = rank_keywords(topic_articles, |_| true, MAX_KEYWORDS_PER_TOPIC);

        for keyword in &keywords {
            edges.push((topic_name.clone(), keyword.word.clone()));
            if level_3_set.insert(keyword.word.clone()) {
                level_3.push(keyword.word.clone());
            }
        }
        keywords_per_topic.insert(topic_name.clone(), keywords.len());
    }

    tracing::debug!("Level 3 keywords: {:?}", level_3);

    // Level 3 -> 4
    let mut level_4: HashSet<String> = HashSet::new();
    let mut relation_edges = Vec::new();

    for keyword in &level_3 {
        let with_keyword = articles
            .iter()
            .filter(|a| a.keywords.iter().any(|k| &k.word == keyword));
        let related = rank_keywords(
            with_keyword,
            |k| &k.word != keyword && !level_3_set.contains(&k.word),
            MAX_RELATED_PER_KEYWORD,
        );

        tracing::debug!(
            "Keyword '{}' related to {:?}",
            keyword,
            related.iter().map(|k| &k.word).collect::<Vec<_>>()
        );
        for other in related {
            relation_edges.push((keyword.clone(), other.word.clone()));
            level_4.insert(other.word);
        }
    }

    if relation_edges.is_empty() && options.synthetic_relations {
        tracing::warn!("No level 4 keywords found, applying synthetic relations");
        for keyword in &level_3 {
            if let Some((_, related)) = SYNTHETIC_RELATIONS.iter().find(|(seed, _)| *seed == keyword.as_str()) {
                for other in related {
                    relation_edges.push((keyword.clone(), other.to_string()));
                    level_4.insert(other.to_string());
                }
            }
        }
    }
    edges.extend(relation_edges);

    let total_nodes = count_nodes(&edges);
    let levels = if level_4.is_empty() { 3 } else { 4 };

    tracing::info!(
        "Network graph built: {} connections, {} nodes, {} levels",
        edges.len(),
        total_nodes,
        levels
    );

    NetworkGraph {
        metadata: GraphMetadata {
            period: period_label(window.days),
            start_date: Some(window.start),
            end_date: Some(window.end),
            total_connections: edges.len(),
            total_nodes,
            levels,
            top_topics: top_topics
                .into_iter()
                .map(|(_, topic, count)| TopicFalseCount {
                    topic,
                    fake_news_count: count,
                })
                .collect(),
            keywords_per_topic,
            level_4_keywords_count: level_4.len(),
        },
        edges,
    }
}

fn no_data_graph(window: GraphWindow) -> NetworkGraph {
    NetworkGraph {
        edges: vec![(ROOT_NODE.to_string(), NO_DATA_NODE.to_string())],
        metadata: GraphMetadata {
            period: period_label(window.days),
            start_date: Some(window.start),
            end_date: Some(window.end),
            total_connections: 1,
            total_nodes: 2,
            levels: 2,
            top_topics: Vec::new(),
            keywords_per_topic: BTreeMap::new(),
            level_4_keywords_count: 0,
        },
    }
}

/// `(topic id, name, false article count)`, most articles first, ties by id.
fn rank_topics(articles: &[FalseArticle]) -> Vec<(i64, String, u64)> {
    let mut counts: HashMap<i64, (String, u64)> = HashMap::new();
    for (id, name) in articles.iter().filter_map(|a| a.topic.as_ref()) {
        counts.entry(*id).or_insert_with(|| (name.clone(), 0)).1 += 1;
    }

    let mut ranked: Vec<(i64, String, u64)> = counts
        .into_iter()
        .map(|(id, (name, count))| (id, name, count))
        .collect();
    ranked.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));
    ranked.truncate(MAX_TOPICS);
    ranked
}

/// Keywords ranked by the number of given articles containing them, ties by
/// keyword id.
fn rank_keywords<'a>(
    articles: impl Iterator<Item = &'a FalseArticle>,
    keep: impl Fn(&KeywordRef) -> bool,
    limit: usize,
) -> Vec<KeywordRef> {
    let mut counts: HashMap<&KeywordRef, u64> = HashMap::new();
    for article in articles {
        let mut seen = HashSet::new();
        for keyword in article.keywords.iter().filter(|k| keep(*k)) {
            if seen.insert(keyword.id) {
                *counts.entry(keyword).or_insert(0) += 1;
            }
        }
    }

    let mut ranked: Vec<(&KeywordRef, u64)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.id.cmp(&b.0.id)));
    ranked
        .into_iter()
        .take(limit)
        .map(|(keyword, _)| keyword.clone())
        .collect()
}

fn count_nodes(edges: &[(String, String)]) -> usize {
    edges
        .iter()
        .flat_map(|(from, to)| [from.as_str(), to.as_str()])
        .collect::<HashSet<_>>()
        .len()
}

fn period_label(days: i64) -> String {
    format!("{} days", days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn window() -> GraphWindow {
        GraphWindow::ending_at(Utc.with_ymd_and_hms(2026, 3, 31, 12, 0, 0).unwrap(), 30).unwrap()
    }

    fn kw(id: i64, word: &str) -> KeywordRef {
        KeywordRef::new(id, word)
    }

    fn article(id: i64, topic_id: i64, topic: &str, keywords: Vec<KeywordRef>) -> FalseArticle {
        FalseArticle {
            article_id: id,
            topic: Some((topic_id, topic.to_string())),
            keywords,
        }
    }

    fn has_edge(graph: &NetworkGraph, from: &str, to: &str) -> bool {
        graph.edges.iter().any(|(a, b)| a == from && b == to)
    }

    #[test]
    fn test_window_bounds() {
        let end = Utc.with_ymd_and_hms(2026, 3, 31, 12, 0, 0).unwrap();
        let window = GraphWindow::ending_at(end, 30).unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());

        assert!(matches!(GraphWindow::ending_at(end, 0), Err(AppError::Aggregation(_))));
        assert!(matches!(GraphWindow::ending_at(end, -5), Err(AppError::Aggregation(_))));
        assert!(matches!(
            GraphWindow::ending_at(end, 200_000_000),
            Err(AppError::Aggregation(_))
        ));
        assert!(matches!(GraphWindow::ending_at(end, i64::MAX), Err(AppError::Aggregation(_))));
    }

    #[test]
    fn test_no_data_sentinel() {
        let graph = build_graph(&[], window(), GraphOptions::default());
        assert_eq!(graph.edges, vec![(ROOT_NODE.to_string(), NO_DATA_NODE.to_string())]);
        assert_eq!(graph.metadata.levels, 2);
        assert_eq!(graph.metadata.total_connections, 1);
    }

    #[test]
    fn test_health_scenario() {
        // 12 false Health articles: vaccine in 8, immunity in 5 of those,
        // four other keywords in 6 each so immunity stays out of level 3.
        let mut articles = Vec::new();
        for id in 1..=12 {
            let mut keywords = Vec::new();
            if id <= 8 {
                keywords.push(kw(1, "vaccine"));
            }
            if id <= 5 {
                keywords.push(kw(2, "immunity"));
            }
            if (3..=8).contains(&id) {
                for (kid, word) in [(3, "mask"), (4, "virus"), (5, "dose"), (6, "trial")] {
                    keywords.push(kw(kid, word));
                }
            }
            articles.push(article(id, 1, "Health", keywords));
        }

        let graph = build_graph(&articles, window(), GraphOptions::default());

        assert!(has_edge(&graph, ROOT_NODE, "Health"));
        assert!(has_edge(&graph, "Health", "vaccine"));
        assert!(has_edge(&graph, "vaccine", "immunity"));
        assert!(graph.metadata.level_4_keywords_count >= 1);
        assert_eq!(graph.metadata.levels, 4);
        assert_eq!(
            graph.metadata.top_topics,
            vec![TopicFalseCount {
                topic: "Health".to_string(),
                fake_news_count: 12
            }]
        );
        assert_eq!(graph.metadata.keywords_per_topic["Health"], 5);
        assert!(!has_edge(&graph, "Health", "immunity"));
    }

    #[test]
    fn test_top_five_topics_ties_by_id() {
        let mut articles = Vec::new();
        let mut next_id = 0;
        // Topic 7 has 3 articles, topics 1..=6 have 1 each.
        for topic_id in 1..=7 {
            let count = if topic_id == 7 { 3 } else { 1 };
            for _ in 0..count {
                next_id += 1;
                articles.push(article(next_id, topic_id, &format!("T{}", topic_id), vec![]));
            }
        }

        let graph = build_graph(&articles, window(), GraphOptions::default());
        let topics: Vec<&str> = graph
            .metadata
            .top_topics
            .iter()
            .map(|t| t.topic.as_str())
            .collect();
        assert_eq!(topics, vec!["T7", "T1", "T2", "T3", "T4"]);
        assert_eq!(graph.metadata.levels, 3);
    }

    #[test]
    fn test_related_keywords_exclude_level_three() {
        let articles = vec![
            article(1, 1, "Health", vec![kw(1, "vaccine"), kw(2, "virus"), kw(3, "immunity")]),
            article(2, 2, "Politics", vec![kw(2, "virus"), kw(4, "ballot")]),
        ];
        let options = GraphOptions {
            synthetic_relations: false,
        };
        let graph = build_graph(&articles, window(), options);

        // Every keyword lands in level 3, leaving nothing to relate.
        assert!(!has_edge(&graph, "vaccine", "virus"));
        assert_eq!(graph.metadata.levels, 3);
        assert_eq!(graph.metadata.level_4_keywords_count, 0);
    }

    #[test]
    fn test_related_keywords_limited_to_two() {
        let mut keywords = vec![kw(1, "k1"), kw(2, "k2"), kw(3, "k3"), kw(4, "k4"), kw(5, "k5")];
        keywords.extend([kw(10, "r1"), kw(11, "r2"), kw(12, "r3")]);
        let mut articles = vec![article(1, 1, "Health", keywords)];
        // Boost k1..k5 so the r* keywords never make level 3.
        for id in 2..=3 {
            articles.push(article(
                id,
                1,
                "Health",
                vec![kw(1, "k1"), kw(2, "k2"), kw(3, "k3"), kw(4, "k4"), kw(5, "k5")],
            ));
        }

        let graph = build_graph(&articles, window(), GraphOptions::default());
        let related: Vec<&str> = graph
            .edges
            .iter()
            .filter(|(from, _)| from == "k1")
            .map(|(_, to)| to.as_str())
            .collect();
        assert_eq!(related, vec!["r1", "r2"]);
    }

    #[test]
    fn test_articles_without_topic_feed_related_keywords() {
        let articles = vec![
            article(1, 1, "Health", vec![kw(1, "vaccine")]),
            FalseArticle {
                article_id: 2,
                topic: None,
                keywords: vec![kw(1, "vaccine"), kw(9, "autism")],
            },
        ];
        let graph = build_graph(&articles, window(), GraphOptions::default());
        assert_eq!(graph.metadata.top_topics.len(), 1);
        assert!(has_edge(&graph, "vaccine", "autism"));
    }

    #[test]
    fn test_no_topics_but_untopiced_articles_is_no_data() {
        let articles = vec![FalseArticle {
            article_id: 1,
            topic: None,
            keywords: vec![kw(1, "salud")],
        }];
        let graph = build_graph(&articles, window(), GraphOptions::default());
        assert_eq!(graph.metadata.levels, 2);
    }

    #[test]
    fn test_synthetic_fallback() {
        let articles = vec![article(1, 1, "Salud", vec![kw(1, "salud"), kw(2, "huevo")])];

        let graph = build_graph(&articles, window(), GraphOptions::default());
        assert!(has_edge(&graph, "salud", "bienestar"));
        assert!(has_edge(&graph, "huevo", "desayuno"));
        assert_eq!(graph.metadata.level_4_keywords_count, 4);
        assert_eq!(graph.metadata.levels, 4);

        let disabled = build_graph(
            &articles,
            window(),
            GraphOptions {
                synthetic_relations: false,
            },
        );
        assert_eq!(disabled.metadata.levels, 3);
    }

    #[test]
    fn test_synthetic_seeds_match_stored_lemmas() {
        let analyzer = crate::text::Analyzer::new();
        for (seed, _) in SYNTHETIC_RELATIONS {
            assert_eq!(analyzer.tokens(seed), vec![seed.to_string()]);
        }
        assert_eq!(analyzer.tokens("Alimentos"), vec!["alimento".to_string()]);

        let articles = vec![article(1, 1, "Alimentación", vec![kw(1, "alimento")])];
        let graph = build_graph(&articles, window(), GraphOptions::default());
        assert!(has_edge(&graph, "alimento", "comida"));
        assert!(has_edge(&graph, "alimento", "nutrientes"));
        assert_eq!(graph.metadata.levels, 4);
    }

    #[test]
    fn test_fallback_without_seed_keywords_stays_at_three_levels() {
        let articles = vec![article(1, 1, "Tech", vec![kw(1, "robot")])];
        let graph = build_graph(&articles, window(), GraphOptions::default());
        assert_eq!(graph.metadata.levels, 3);
        assert_eq!(graph.metadata.total_nodes, 3);
        assert_eq!(graph.metadata.total_connections, 2);
    }
}
