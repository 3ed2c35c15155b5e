//! Stateless TF-IDF vectorization over explicit token documents.
//!
//! Weighting: raw term count times smoothed inverse document frequency,
//! `ln((1 + n) / (1 + df)) + 1`, with each document vector L2-normalized.
//! The vocabulary is sorted, so term indices are deterministic for a given
//! corpus.

use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TfIdfError {
    #[error("empty vocabulary; documents contain no terms")]
    EmptyVocabulary,

    #[error("non-finite weight for term '{0}'")]
    NonFiniteWeight(String),
}

/// Sparse vector as `(term index, weight)` pairs sorted by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_w) = self.entries[i];
            let (b_idx, b_w) = other.entries[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Cosine similarity; zero when either vector is empty.
pub fn cosine(a: &SparseVector, b: &SparseVector) -> f64 {
    let denom = a.norm() * b.norm();
    if denom == 0.0 {
        return 0.0;
    }
    a.dot(b) / denom
}

/// A vocabulary and idf table fit on one corpus.
#[derive(Debug, Clone)]
pub struct TfIdf {
    vocabulary: BTreeMap<String, usize>,
    terms: Vec<String>,
    idf: Vec<f64>,
}

impl TfIdf {
    pub fn fit<S: AsRef<str>>(documents: &[Vec<S>]) -> Result<Self, TfIdfError> {
        let mut doc_freq: BTreeMap<String, usize> = BTreeMap::new();
        for doc in documents {
            let mut seen: Vec<&str> = doc.iter().map(|t| t.as_ref()).collect();
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *doc_freq.entry(term.to_string()).or_insert(0) += 1;
            }
        }

        if doc_freq.is_empty() {
            return Err(TfIdfError::EmptyVocabulary);
        }

        let n = documents.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut terms = Vec::with_capacity(doc_freq.len());
        let mut idf = Vec::with_capacity(doc_freq.len());

        for (index, (term, df)) in doc_freq.into_iter().enumerate() {
            let weight = ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0;
            if !weight.is_finite() {
                return Err(TfIdfError::NonFiniteWeight(term));
            }
            vocabulary.insert(term.clone(), index);
            terms.push(term);
            idf.push(weight);
        }

        Ok(Self {
            vocabulary,
            terms,
            idf,
        })
    }

    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    /// Normalized TF-IDF vector; terms outside the vocabulary are ignored.
    pub fn transform<S: AsRef<str>>(&self, document: &[S]) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in document {
            if let Some(&index) = self.vocabulary.get(token.as_ref()) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();

        let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in entries.iter_mut() {
                *w /= norm;
            }
        }

        SparseVector { entries }
    }

    pub fn fit_transform<S: AsRef<str>>(
        documents: &[Vec<S>],
    ) -> Result<(Self, Vec<SparseVector>), TfIdfError> {
        let model = Self::fit(documents)?;
        let vectors = documents.iter().map(|d| model.transform(d)).collect();
        Ok((model, vectors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_empty_corpus_is_an_error() {
        let docs: Vec<Vec<String>> = vec![vec![], vec![]];
        assert_eq!(TfIdf::fit(&docs).unwrap_err(), TfIdfError::EmptyVocabulary);
    }

    #[test]
    fn test_vocabulary_is_sorted() {
        let model = TfIdf::fit(&[doc("zeta alpha mid")]).unwrap();
        assert_eq!(model.term(0), Some("alpha"));
        assert_eq!(model.term(1), Some("mid"));
        assert_eq!(model.term(2), Some("zeta"));
    }

    #[test]
    fn test_vectors_are_unit_length() {
        let (_, vectors) = TfIdf::fit_transform(&[doc("a b b c"), doc("c d")]).unwrap();
        for v in vectors {
            assert!((v.norm() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_rare_terms_weigh_more() {
        let docs = [doc("shared rare"), doc("shared other")];
        let (model, vectors) = TfIdf::fit_transform(&docs).unwrap();
        let weights: BTreeMap<&str, f64> = vectors[0]
            .entries()
            .iter()
            .map(|(i, w)| (model.term(*i).unwrap(), *w))
            .collect();
        assert!(weights["rare"] > weights["shared"]);
    }

    #[test]
    fn test_cosine_bounds() {
        let docs = [doc("vaccine immunity"), doc("vaccine immunity"), doc("election vote")];
        let (_, vectors) = TfIdf::fit_transform(&docs).unwrap();
        assert!((cosine(&vectors[0], &vectors[1]) - 1.0).abs() < 1e-9);
        assert_eq!(cosine(&vectors[0], &vectors[2]), 0.0);
        assert_eq!(cosine(&vectors[0], &SparseVector::default()), 0.0);
    }

    #[test]
    fn test_unknown_terms_are_ignored() {
        let model = TfIdf::fit(&[doc("known")]).unwrap();
        assert!(model.transform(&doc("unknown words")).is_empty());
    }
}
