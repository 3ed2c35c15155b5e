mod keywords;
mod topic;

pub use keywords::{KeywordExtractor, DEFAULT_KEYWORD_COUNT};
pub use topic::TopicClassifier;
