use crate::models::{Topic, TopicAssignment};
use crate::text::{cosine, Analyzer, TfIdf, TfIdfError};

/// Minimum cosine similarity for a topic to win over "Unclassified".
/// Any real lexical overlap clears it.
pub const MIN_SIMILARITY: f64 = 0.01;

/// Assigns the best-matching topic by comparing the text against each
/// topic's keyword profile in TF-IDF space.
pub struct TopicClassifier {
    analyzer: Analyzer,
}

impl TopicClassifier {
    pub fn new(analyzer: Analyzer) -> Self {
        Self { analyzer }
    }

    /// Best-effort: failures degrade to the unclassified sentinel.
    pub fn classify(&self, text: &str, topics: &[Topic]) -> TopicAssignment {
        match self.try_classify(text, topics) {
            Ok(assignment) => assignment,
            Err(e) => {
                tracing::warn!("Topic classification failed, leaving unclassified: {}", e);
                TopicAssignment::unclassified()
            }
        }
    }

    fn try_classify(&self, text: &str, topics: &[Topic]) -> Result<TopicAssignment, TfIdfError> {
        let active: Vec<&Topic> = topics.iter().filter(|t| t.active).collect();
        if active.is_empty() {
            tracing::debug!("No active topics to classify against");
            return Ok(TopicAssignment::unclassified());
        }

        // One pseudo-document per topic, the query last.
        let mut corpus: Vec<Vec<String>> = active
            .iter()
            .map(|t| self.analyzer.tokens(&t.keyword_profile.join(" ")))
            .collect();
        corpus.push(self.analyzer.tokens(text));

        let (_, vectors) = TfIdf::fit_transform(&corpus)?;
        let (query, topic_vectors) = vectors
            .split_last()
            .ok_or(TfIdfError::EmptyVocabulary)?;

        let mut best: Option<(usize, f64)> = None;
        for (index, vector) in topic_vectors.iter().enumerate() {
            let similarity = cosine(query, vector);
            if best.map_or(true, |(_, score)| similarity > score) {
                best = Some((index, similarity));
            }
        }

        match best {
            Some((index, similarity)) if similarity >= MIN_SIMILARITY => {
                let topic = active[index];
                tracing::debug!("Assigned topic '{}' ({:.3})", topic.name, similarity);
                Ok(TopicAssignment {
                    name: topic.name.clone(),
                    topic_id: Some(topic.id),
                    similarity,
                })
            }
            _ => Ok(TopicAssignment::unclassified()),
        }
    }
}

impl Default for TopicClassifier {
    fn default() -> Self {
        Self::new(Analyzer::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNCLASSIFIED;

    fn topic(id: i64, name: &str, keywords: &[&str]) -> Topic {
        Topic {
            id,
            name: name.to_string(),
            keyword_profile: keywords.iter().map(|k| k.to_string()).collect(),
            active: true,
        }
    }

    fn topics() -> Vec<Topic> {
        vec![
            topic(1, "Health", &["vaccine", "hospital", "virus", "salud", "medicina"]),
            topic(2, "Politics", &["election", "government", "vote", "congress"]),
            topic(3, "Economy", &["inflation", "market", "price", "bank"]),
        ]
    }

    #[test]
    fn test_picks_the_overlapping_topic() {
        let classifier = TopicClassifier::default();
        let result = classifier.classify("New vaccines arrive at the hospital this week", &topics());
        assert_eq!(result.name, "Health");
        assert_eq!(result.topic_id, Some(1));
        assert!(result.similarity >= MIN_SIMILARITY);
    }

    #[test]
    fn test_no_overlap_is_unclassified() {
        let classifier = TopicClassifier::default();
        let result = classifier.classify("A recipe for chocolate cake", &topics());
        assert_eq!(result.name, UNCLASSIFIED);
        assert!(result.topic_id.is_none());
    }

    #[test]
    fn test_empty_topics_is_unclassified() {
        let classifier = TopicClassifier::default();
        assert!(classifier.classify("vaccine", &[]).is_unclassified());
    }

    #[test]
    fn test_inactive_topics_are_skipped() {
        let classifier = TopicClassifier::default();
        let mut list = topics();
        list[0].active = false;
        let result = classifier.classify("vaccine hospital virus", &list);
        assert!(result.is_unclassified());
    }

    #[test]
    fn test_ties_go_to_first_topic() {
        let classifier = TopicClassifier::default();
        let list = vec![
            topic(7, "First", &["storm"]),
            topic(8, "Second", &["storm"]),
        ];
        let result = classifier.classify("storm warning", &list);
        assert_eq!(result.topic_id, Some(7));
    }

    #[test]
    fn test_empty_vocabulary_degrades_to_unclassified() {
        let classifier = TopicClassifier::default();
        let list = vec![topic(1, "Stop", &["the", "and"])];
        assert!(classifier.classify("of the", &list).is_unclassified());
    }

    #[test]
    fn test_result_is_always_from_input_or_sentinel() {
        let classifier = TopicClassifier::default();
        let list = topics();
        for text in ["market price", "vote", "nothing here", "", "vaccine election"] {
            let result = classifier.classify(text, &list);
            let known = list.iter().any(|t| Some(t.id) == result.topic_id && t.name == result.name);
            assert!(known || result.name == UNCLASSIFIED);
        }
    }
}
