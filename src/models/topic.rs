use serde::{Deserialize, Serialize};

pub const UNCLASSIFIED: &str = "Unclassified";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub name: String,
    pub keyword_profile: Vec<String>,
    pub active: bool,
}

/// Topic seed as it appears in the config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopicSeed {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicAssignment {
    pub name: String,
    pub topic_id: Option<i64>,
    pub similarity: f64,
}

impl TopicAssignment {
    pub fn unclassified() -> Self {
        Self {
            name: UNCLASSIFIED.to_string(),
            topic_id: None,
            similarity: 0.0,
        }
    }

    pub fn is_unclassified(&self) -> bool {
        self.topic_id.is_none()
    }
}
