use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use serde::Serialize;

mod ai;
mod analysis;
mod analytics;
mod app;
mod cli;
mod config;
mod db;
mod error;
mod feed;
mod models;
mod services;
mod text;

use ai::RemoteClassifier;
use analytics::{TrendRange, VeracityFilter};
use app::App;
use cli::{Cli, Command, TopicsCommand};
use config::Config;
use error::{AppError, Result};
use feed::{google_news_search_url, FeedScraper};
use models::{ApiResponse, Submission, TopicSeed};
use services::ContentFetcher;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("{}", e);
        print_json(&ApiResponse::error(e.to_string()))?;
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let app = App::new(&config).await?;

    match cli.command {
        Command::Classify {
            text,
            url,
            title,
            classifier_url,
        } => {
            if let Some(endpoint) = classifier_url {
                let classifier = RemoteClassifier::new(endpoint)?;
                app.model.reload(&config.model_name, Arc::new(classifier)).await;
            }

            let submission = match (text, url) {
                (Some(text), _) => {
                    let mut submission = Submission::from_text(text);
                    if let Some(title) = title {
                        submission.title = title;
                    }
                    submission
                }
                (None, Some(url)) => {
                    let page = ContentFetcher::new()?
                        .fetch_article(&url)
                        .await?
                        .ok_or_else(|| anyhow::anyhow!("Could not extract article content from {}", url))?;
                    Submission {
                        title: title.unwrap_or_else(|| page.url.clone()),
                        body: page.text,
                        url: Some(page.url),
                        published_at: None,
                    }
                }
                (None, None) => return Err(AppError::Config("either --text or --url is required".to_string())),
            };

            let report = app.classify(submission).await?;
            print_json(&ApiResponse::Success {
                data: report,
                metadata: serde_json::json!({
                    "model": app.model.loaded_model().await,
                    "processed_at": Utc::now(),
                }),
            })?;
        }
        Command::Scrape { feeds, query, limit } => {
            let feeds = match query {
                Some(query) => vec![google_news_search_url(&query)],
                None if feeds.is_empty() => config.feeds.clone(),
                None => feeds,
            };
            let scraper = FeedScraper::new()?;
            let summary = app
                .scrape_all(&scraper, &feeds, limit.unwrap_or(config.scrape_limit))
                .await;
            print_json(&ApiResponse::Success {
                data: summary,
                metadata: serde_json::json!({ "feeds": feeds }),
            })?;
        }
        Command::Daemon => {
            let scraper = FeedScraper::new()?;
            tokio::select! {
                _ = app.run_scheduler(
                    &scraper,
                    &config.feeds,
                    config.scrape_limit,
                    config.scrape_interval_hours,
                ) => {}
                signal = tokio::signal::ctrl_c() => {
                    signal?;
                    tracing::info!("Shutting down");
                    app.model.unload().await;
                }
            }
        }
        Command::Graph { days } => {
            let graph = app.analytics.network_graph(days, Utc::now()).await?;
            print_json(&ApiResponse::from(graph))?;
        }
        Command::Trends { range, filter } => {
            let range = TrendRange::parse(&range);
            let filter: VeracityFilter = filter.parse().unwrap_or(VeracityFilter::All);
            let report = app.analytics.trends(range, filter, Utc::now()).await?;
            print_json(&ApiResponse::from(report))?;
        }
        Command::Stats => {
            let report = app.analytics.dashboard(Utc::now()).await?;
            print_json(&ApiResponse::from(report))?;
        }
        Command::Topics { command } => run_topics(&app, command).await?,
    }

    Ok(())
}

async fn run_topics(app: &App, command: TopicsCommand) -> Result<()> {
    match command {
        TopicsCommand::List => {}
        TopicsCommand::Add {
            name,
            keywords,
            description,
        } => {
            let keywords: Vec<String> = keywords
                .into_iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
            app.repository
                .upsert_topic(TopicSeed {
                    name,
                    description,
                    keywords,
                })
                .await?;
        }
        TopicsCommand::Disable { name } => set_active(app, &name, false).await?,
        TopicsCommand::Enable { name } => set_active(app, &name, true).await?,
    }

    let topics = app.repository.all_topics().await?;
    let active = topics.iter().filter(|t| t.active).count();
    print_json(&ApiResponse::Success {
        data: topics,
        metadata: serde_json::json!({ "active": active }),
    })
}

async fn set_active(app: &App, name: &str, active: bool) -> Result<()> {
    if !app.repository.set_topic_active(name, active).await? {
        return Err(AppError::Config(format!("unknown topic '{}'", name)));
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
