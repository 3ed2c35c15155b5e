mod analytics;
mod article;
mod classification;
mod keyword;
mod response;
mod topic;

pub use analytics::*;
pub use article::{Article, NewArticle, Source, Submission};
pub use classification::{Classification, Model, Veracity, Verdict};
pub use keyword::{Keyword, KeywordRef};
pub use response::{ApiResponse, DashboardReport};
pub use topic::{Topic, TopicAssignment, TopicSeed, UNCLASSIFIED};
