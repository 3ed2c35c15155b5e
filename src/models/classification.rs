use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Veracity {
    True,
    False,
    Uncertain,
}

impl Veracity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Veracity::True => "true",
            Veracity::False => "false",
            Veracity::Uncertain => "uncertain",
        }
    }

    pub fn explanation(&self) -> &'static str {
        match self {
            Veracity::True => "The article appears reliable.",
            Veracity::False => "The article shows disinformation patterns.",
            Veracity::Uncertain => "The classifier could not decide.",
        }
    }
}

impl fmt::Display for Veracity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Veracity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "true" | "verdadera" | "real" => Ok(Veracity::True),
            "false" | "falsa" | "fake" => Ok(Veracity::False),
            "uncertain" | "dudosa" => Ok(Veracity::Uncertain),
            other => Err(format!("unknown veracity label '{}'", other)),
        }
    }
}

/// Output of the external veracity classifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub label: Veracity,
    /// Percentage in `0..=100`.
    pub confidence: f64,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub id: i64,
    pub article_id: i64,
    pub model_id: Option<i64>,
    pub result: Veracity,
    pub confidence: f64,
    pub explanation: String,
    pub classified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Model {
    pub id: i64,
    pub name: String,
    pub version: String,
    pub active: bool,
}
