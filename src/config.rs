use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::analysis::DEFAULT_KEYWORD_COUNT;
use crate::error::{AppError, Result};
use crate::feed::DEFAULT_FEED_URL;
use crate::models::TopicSeed;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Inference endpoint answering `{label, confidence}` for a `{text}` body.
    #[serde(default = "default_classifier_url")]
    pub classifier_url: String,

    #[serde(default = "default_model_name")]
    pub model_name: String,

    #[serde(default = "default_model_version")]
    pub model_version: String,

    #[serde(default = "default_feeds")]
    pub feeds: Vec<String>,

    #[serde(default = "default_scrape_interval")]
    pub scrape_interval_hours: u32,

    #[serde(default = "default_scrape_limit")]
    pub scrape_limit: usize,

    #[serde(default = "default_keywords_per_article")]
    pub keywords_per_article: usize,

    /// Fill level 4 of the network graph from a fixed relation table when
    /// the data yields no related keywords.
    #[serde(default = "default_true")]
    pub synthetic_relations: bool,

    /// Google Custom Search credentials. Related news is looked up for
    /// classified articles only when both are set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_engine_id: Option<String>,

    /// Related articles per classification; 0 disables the lookup.
    #[serde(default = "default_related_news_limit")]
    pub related_news_limit: usize,

    #[serde(default = "default_topics")]
    pub topics: Vec<TopicSeed>,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("newsveracity");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("news.db").to_string_lossy().to_string()
}

fn default_classifier_url() -> String {
    "http://localhost:5000/classify".to_string()
}

fn default_model_name() -> String {
    "beto-fake-news".to_string()
}

fn default_model_version() -> String {
    "1.0".to_string()
}

fn default_feeds() -> Vec<String> {
    vec![DEFAULT_FEED_URL.to_string()]
}

fn default_scrape_interval() -> u32 {
    12
}

fn default_scrape_limit() -> usize {
    10
}

fn default_keywords_per_article() -> usize {
    DEFAULT_KEYWORD_COUNT
}

fn default_related_news_limit() -> usize {
    5
}

fn default_true() -> bool {
    true
}

fn seed(name: &str, description: &str, keywords: &[&str]) -> TopicSeed {
    TopicSeed {
        name: name.to_string(),
        description: Some(description.to_string()),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

fn default_topics() -> Vec<TopicSeed> {
    vec![
        seed(
            "Salud",
            "Medicina, enfermedades y bienestar",
            &["salud", "vacuna", "hospital", "enfermedad", "médico", "virus", "tratamiento", "cáncer"],
        ),
        seed(
            "Política",
            "Gobierno, elecciones y partidos",
            &["gobierno", "elección", "presidente", "congreso", "partido", "ley", "voto"],
        ),
        seed(
            "Economía",
            "Mercados, empleo y finanzas",
            &["economía", "mercado", "inflación", "empleo", "banco", "precio", "dólar"],
        ),
        seed(
            "Tecnología",
            "Ciencia aplicada e internet",
            &["tecnología", "internet", "inteligencia", "aplicación", "digital", "datos", "red"],
        ),
        seed(
            "Alimentación",
            "Nutrición y dietas",
            &["alimento", "dieta", "nutrición", "comida", "huevo", "azúcar", "proteína"],
        ),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            classifier_url: default_classifier_url(),
            model_name: default_model_name(),
            model_version: default_model_version(),
            feeds: default_feeds(),
            scrape_interval_hours: default_scrape_interval(),
            scrape_limit: default_scrape_limit(),
            keywords_per_article: default_keywords_per_article(),
            synthetic_relations: true,
            search_api_key: None,
            search_engine_id: None,
            related_news_limit: default_related_news_limit(),
            topics: default_topics(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config = Self::from_toml(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.scrape_interval_hours == 0 {
            return Err(AppError::Config("scrape_interval_hours must be at least 1".to_string()));
        }
        if self.keywords_per_article == 0 {
            return Err(AppError::Config("keywords_per_article must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("newsveracity")
            .join("config.toml")
    }
}
