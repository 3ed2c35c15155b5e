use std::collections::HashMap;

use crate::text::{Analyzer, TfIdf, TfIdfError};

pub const DEFAULT_KEYWORD_COUNT: usize = 5;

/// Reduces text to its most distinctive normalized terms.
pub struct KeywordExtractor {
    analyzer: Analyzer,
}

impl KeywordExtractor {
    pub fn new(analyzer: Analyzer) -> Self {
        Self { analyzer }
    }

    /// Up to `count` distinct lemmas, most relevant first. Never fails; an
    /// unusable text yields an empty list.
    pub fn extract(&self, text: &str, count: usize) -> Vec<String> {
        let tokens = self.analyzer.tokens(text);
        if tokens.is_empty() || count == 0 {
            return Vec::new();
        }

        match rank_by_tfidf(&tokens) {
            Ok(ranked) => ranked.into_iter().take(count).collect(),
            Err(e) => {
                tracing::warn!("TF-IDF keyword scoring failed, using frequency: {}", e);
                rank_by_frequency(&tokens).into_iter().take(count).collect()
            }
        }
    }
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(Analyzer::new())
    }
}

/// Scores the token stream as a one-document corpus. Terms come out of the
/// sorted vocabulary, so equal scores keep alphabetical order.
fn rank_by_tfidf(tokens: &[String]) -> Result<Vec<String>, TfIdfError> {
    let corpus = [tokens.to_vec()];
    let model = TfIdf::fit(&corpus)?;
    let vector = model.transform(tokens);

    let mut scored: Vec<(&str, f64)> = vector
        .entries()
        .iter()
        .filter_map(|(index, weight)| model.term(*index).map(|term| (term, *weight)))
        .collect();

    if let Some((term, _)) = scored.iter().find(|(_, w)| !w.is_finite()) {
        return Err(TfIdfError::NonFiniteWeight(term.to_string()));
    }

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok(scored.into_iter().map(|(term, _)| term.to_string()).collect())
}

/// Plain frequency ranking, ties broken by first occurrence.
fn rank_by_frequency(tokens: &[String]) -> Vec<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, token) in tokens.iter().enumerate() {
        counts.entry(token.as_str()).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(term, (count, first))| (term, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.into_iter().map(|(term, _, _)| term.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_most_frequent_terms_first() {
        let extractor = KeywordExtractor::default();
        let text = "Vaccine trials show the vaccine works. Vaccine makers expect approval \
                    after trials end. Approval may come soon.";
        let keywords = extractor.extract(text, 3);
        assert_eq!(keywords, vec!["vaccine", "approval", "trial"]);
    }

    #[test]
    fn test_respects_count() {
        let extractor = KeywordExtractor::default();
        let keywords = extractor.extract("alpha beta gamma delta epsilon zeta eta theta", 5);
        assert_eq!(keywords.len(), 5);
        assert_eq!(keywords, vec!["alpha", "beta", "delta", "epsilon", "eta"]);
    }

    #[test]
    fn test_empty_when_only_stop_words() {
        let extractor = KeywordExtractor::default();
        assert!(extractor.extract("the and of y la de", 5).is_empty());
        assert!(extractor.extract("", 5).is_empty());
        assert!(extractor.extract("vaccine", 0).is_empty());
    }

    #[test]
    fn test_keywords_are_distinct_alphabetic_lemmas() {
        let analyzer = Analyzer::new();
        let extractor = KeywordExtractor::new(analyzer.clone());
        let text = "Los médicos dicen que las vacunas 2024 son seguras; doctors say vaccines are safe!";
        let keywords = extractor.extract(text, 10);

        let mut deduped = keywords.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), keywords.len());

        let stream = analyzer.tokens(text);
        for keyword in &keywords {
            assert!(keyword.chars().all(char::is_alphabetic));
            assert!(!analyzer.is_stop_word(keyword));
            assert!(stream.contains(keyword));
        }
    }

    #[test]
    fn test_frequency_fallback_orders_by_first_occurrence() {
        let tokens: Vec<String> = ["beta", "alpha", "beta", "gamma", "alpha", "delta"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(rank_by_frequency(&tokens), vec!["beta", "alpha", "gamma", "delta"]);
    }
}
