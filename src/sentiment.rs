//! Client for the external sentiment classifier used during ingestion.

use futures::future::{BoxFuture, FutureExt};
use reqwest::{header, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::TARGET_CLASSIFIER;

pub const CLASSIFIER_TIMEOUT: Duration = Duration::from_secs(36);

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("sentiment auth failed: HTTP {0}")]
    Auth(StatusCode),

    #[error("sentiment HTTP {0}")]
    Status(StatusCode),

    #[error("sentiment request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl ClassifierError {
    pub fn is_auth(&self) -> bool {
        matches!(self, ClassifierError::Auth(_))
    }
}

/// Class name to score, as returned by the classifier. Includes a signed
/// `compound` entry alongside the per-class scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentimentScores(pub BTreeMap<String, f64>);

impl SentimentScores {
    pub fn compound(&self) -> Option<f64> {
        self.0.get("compound").copied()
    }

    /// Highest-scoring class other than `compound`, with `very_` folded into
    /// the base class name. Ties keep the alphabetically first class.
    pub fn dominant(&self) -> Option<(String, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (class, score) in &self.0 {
            if class == "compound" {
                continue;
            }
            if best.map_or(true, |(_, top)| *score > top) {
                best = Some((class, *score));
            }
        }
        best.map(|(class, score)| {
            let class = class.strip_prefix("very_").unwrap_or(class);
            (class.to_string(), score)
        })
    }
}

impl<const N: usize> From<[(&str, f64); N]> for SentimentScores {
    fn from(pairs: [(&str, f64); N]) -> Self {
        SentimentScores(pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect())
    }
}

/// Anything that can score a piece of text.
pub trait SentimentAnalyzer: Send + Sync {
    fn analyze<'a>(
        &'a self,
        lang: &'a str,
        text: &'a str,
    ) -> BoxFuture<'a, Result<SentimentScores, ClassifierError>>;
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    lang: &'a str,
    text: &'a str,
}

/// HTTP classifier authenticated with a bearer token.
#[derive(Clone)]
pub struct SentimentClient {
    url: String,
    token: String,
    http: reqwest::Client,
}

impl SentimentClient {
    pub fn new(url: &str, token: &str, timeout: Duration) -> Result<Self, ClassifierError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(SentimentClient {
            url: url.to_string(),
            token: token.to_string(),
            http,
        })
    }

    async fn post(&self, lang: &str, text: &str) -> Result<SentimentScores, ClassifierError> {
        debug!(target: TARGET_CLASSIFIER, "Classifying {} chars ({})", text.len(), lang);

        let response = self
            .http
            .post(&self.url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .json(&AnalyzeRequest { lang, text })
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                warn!(target: TARGET_CLASSIFIER, "Classifier rejected credentials: {}", status);
                return Err(ClassifierError::Auth(status));
            }
            return Err(ClassifierError::Status(status));
        }

        Ok(response.json::<SentimentScores>().await?)
    }
}

impl SentimentAnalyzer for SentimentClient {
    fn analyze<'a>(
        &'a self,
        lang: &'a str,
        text: &'a str,
    ) -> BoxFuture<'a, Result<SentimentScores, ClassifierError>> {
        self.post(lang, text).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominant_skips_compound() {
        let scores = SentimentScores::from([
            ("compound", 0.95),
            ("negative", 0.1),
            ("neutral", 0.3),
            ("positive", 0.6),
        ]);
        assert_eq!(scores.dominant(), Some(("positive".to_string(), 0.6)));
        assert_eq!(scores.compound(), Some(0.95));
    }

    #[test]
    fn test_very_prefix_is_folded() {
        let scores = SentimentScores::from([
            ("compound", -0.8),
            ("very_negative", 0.7),
            ("negative", 0.2),
            ("neutral", 0.1),
        ]);
        assert_eq!(scores.dominant(), Some(("negative".to_string(), 0.7)));
    }

    #[test]
    fn test_empty_scores() {
        assert_eq!(SentimentScores::default().dominant(), None);
        assert_eq!(SentimentScores::from([("compound", 0.1)]).dominant(), None);
    }

    #[test]
    fn test_scores_deserialize_from_flat_map() {
        let scores: SentimentScores =
            serde_json::from_str(r#"{"positive": 0.2, "negative": 0.7, "compound": -0.5}"#)
                .unwrap();
        assert_eq!(scores.dominant(), Some(("negative".to_string(), 0.7)));
    }

    #[test]
    fn test_auth_errors_are_distinct() {
        assert!(ClassifierError::Auth(StatusCode::FORBIDDEN).is_auth());
        assert!(!ClassifierError::Status(StatusCode::BAD_GATEWAY).is_auth());
        assert_eq!(
            ClassifierError::Auth(StatusCode::UNAUTHORIZED).to_string(),
            "sentiment auth failed: HTTP 401 Unauthorized"
        );
    }
}
