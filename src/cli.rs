use clap::{Parser, Subcommand};

use crate::analytics::DEFAULT_WINDOW_DAYS;

#[derive(Parser, Debug)]
#[clap(
    name = "newsveracity",
    version = env!("CARGO_PKG_VERSION"),
    about = "Classify news articles and explore disinformation trends"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify one article given as text or as a URL
    Classify {
        /// Article body
        #[clap(long, conflicts_with = "url", required_unless_present = "url")]
        text: Option<String>,
        /// Article page to fetch and extract
        #[clap(long)]
        url: Option<String>,
        /// Title stored with a text submission
        #[clap(long)]
        title: Option<String>,
        /// Use this inference endpoint instead of the configured one
        #[clap(long)]
        classifier_url: Option<String>,
    },
    /// Scrape feeds once and classify their articles
    Scrape {
        /// Feed URL (repeatable); defaults to the configured feeds
        #[clap(long = "feed")]
        feeds: Vec<String>,
        /// Google News search query to scrape instead of a feed
        #[clap(long)]
        query: Option<String>,
        /// Maximum entries per feed
        #[clap(long)]
        limit: Option<usize>,
    },
    /// Scrape the configured feeds now and on a fixed interval
    Daemon,
    /// Topic → keyword network of false news
    Graph {
        /// Window length in days
        #[clap(long, default_value_t = DEFAULT_WINDOW_DAYS)]
        days: i64,
    },
    /// Keyword frequency series over time
    Trends {
        /// One of 1d, 7d, 30d, 90d
        #[clap(long, default_value = "7d")]
        range: String,
        /// One of all, false, true
        #[clap(long, default_value = "all")]
        filter: String,
    },
    /// Today's dashboard counters compared with yesterday
    Stats,
    /// Manage topic profiles
    Topics {
        #[clap(subcommand)]
        command: TopicsCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum TopicsCommand {
    /// List all topics
    List,
    /// Create or update a topic profile
    Add {
        #[clap(long)]
        name: String,
        /// Comma-separated seed keywords
        #[clap(long, value_delimiter = ',', required = true)]
        keywords: Vec<String>,
        #[clap(long)]
        description: Option<String>,
    },
    /// Stop assigning articles to a topic
    Disable {
        #[clap(long)]
        name: String,
    },
    /// Resume assigning articles to a topic
    Enable {
        #[clap(long)]
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trends_defaults() {
        let cli = Cli::parse_from(["newsveracity", "trends"]);
        match cli.command {
            Command::Trends { range, filter } => {
                assert_eq!(range, "7d");
                assert_eq!(filter, "all");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_topic_keywords_split_on_commas() {
        let cli = Cli::parse_from([
            "newsveracity",
            "topics",
            "add",
            "--name",
            "Deportes",
            "--keywords",
            "fútbol,partido",
        ]);
        match cli.command {
            Command::Topics {
                command: TopicsCommand::Add { keywords, .. },
            } => assert_eq!(keywords, vec!["fútbol", "partido"]),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_classify_requires_input() {
        assert!(Cli::try_parse_from(["newsveracity", "classify"]).is_err());
        assert!(Cli::try_parse_from(["newsveracity", "classify", "--text", "a", "--url", "b"]).is_err());
    }
}
