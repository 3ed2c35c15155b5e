use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Keyword {
    pub id: i64,
    pub word: String,
    pub relevance: f64,
}

/// Keyword reference attached to an analytics row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeywordRef {
    pub id: i64,
    pub word: String,
}

impl KeywordRef {
    pub fn new(id: i64, word: impl Into<String>) -> Self {
        Self {
            id,
            word: word.into(),
        }
    }
}
