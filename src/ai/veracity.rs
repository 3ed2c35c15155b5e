use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{AppError, Result};
use crate::models::{Veracity, Verdict};

const MAX_INPUT_CHARS: usize = 10_000;

#[async_trait]
pub trait VeracityClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Verdict>;
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    label: String,
    confidence: f64,
}

/// Calls an inference service that answers `{label, confidence}` for a
/// `{text}` body.
pub struct RemoteClassifier {
    client: Client,
    endpoint: String,
}

impl RemoteClassifier {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl VeracityClassifier for RemoteClassifier {
    async fn classify(&self, text: &str) -> Result<Verdict> {
        let request = ClassifyRequest {
            text: truncate_chars(text, MAX_INPUT_CHARS),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(AppError::Classifier(format!("HTTP {}: {}", status, error_text)));
        }

        let body: ClassifyResponse = response.json().await?;
        verdict_from(&body.label, body.confidence)
    }
}

/// Builds a verdict from a raw label. Confidences given as a probability are
/// scaled to a percentage.
pub fn verdict_from(label: &str, confidence: f64) -> Result<Verdict> {
    let label: Veracity = label.parse().map_err(AppError::Classifier)?;
    if !confidence.is_finite() {
        return Err(AppError::Classifier(format!("confidence {} is not finite", confidence)));
    }
    let percent = if confidence <= 1.0 { confidence * 100.0 } else { confidence };

    Ok(Verdict {
        label,
        confidence: (percent.clamp(0.0, 100.0) * 100.0).round() / 100.0,
        explanation: label.explanation().to_string(),
    })
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

struct LoadedModel {
    name: String,
    classifier: Arc<dyn VeracityClassifier>,
}

/// Shared slot holding the classifier used by the pipeline. Clones share the
/// same slot.
#[derive(Clone, Default)]
pub struct ModelHandle {
    inner: Arc<RwLock<Option<LoadedModel>>>,
}

impl ModelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `classifier` unless a model is already loaded. Returns whether
    /// it was installed.
    pub async fn load(&self, name: &str, classifier: Arc<dyn VeracityClassifier>) -> bool {
        let mut slot = self.inner.write().await;
        if let Some(current) = slot.as_ref() {
            tracing::debug!("Model {} already loaded, skipping {}", current.name, name);
            return false;
        }
        tracing::info!("Loaded veracity model {}", name);
        *slot = Some(LoadedModel {
            name: name.to_string(),
            classifier,
        });
        true
    }

    /// Replaces whatever is loaded and returns the previous model's name.
    pub async fn reload(&self, name: &str, classifier: Arc<dyn VeracityClassifier>) -> Option<String> {
        let mut slot = self.inner.write().await;
        let previous = slot.replace(LoadedModel {
            name: name.to_string(),
            classifier,
        });
        tracing::info!("Reloaded veracity model {}", name);
        previous.map(|m| m.name)
    }

    pub async fn unload(&self) -> Option<String> {
        let previous = self.inner.write().await.take();
        if let Some(model) = &previous {
            tracing::info!("Unloaded veracity model {}", model.name);
        }
        previous.map(|m| m.name)
    }

    pub async fn loaded_model(&self) -> Option<String> {
        self.inner.read().await.as_ref().map(|m| m.name.clone())
    }

    pub async fn classify(&self, text: &str) -> Result<Verdict> {
        // Release the lock before the (possibly slow) call.
        let classifier = {
            let slot = self.inner.read().await;
            match slot.as_ref() {
                Some(model) => Arc::clone(&model.classifier),
                None => return Err(AppError::Classifier("no veracity model loaded".to_string())),
            }
        };
        classifier.classify(text).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Answers with a fixed label, or `false` when the text mentions "hoax".
    pub struct KeywordStub {
        pub default: Veracity,
    }

    #[async_trait]
    impl VeracityClassifier for KeywordStub {
        async fn classify(&self, text: &str) -> Result<Verdict> {
            let label = if text.to_lowercase().contains("hoax") {
                Veracity::False
            } else {
                self.default
            };
            verdict_from(label.as_str(), 0.9)
        }
    }

    pub fn stub(default: Veracity) -> Arc<dyn VeracityClassifier> {
        Arc::new(KeywordStub { default })
    }
}
