mod analyzer;
mod lemma;
mod stopwords;
mod tfidf;

pub use analyzer::Analyzer;
pub use tfidf::{cosine, TfIdf, TfIdfError};
