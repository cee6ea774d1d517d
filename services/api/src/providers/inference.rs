//! Image classification through a hosted inference endpoint
//!
//! The endpoint receives the raw image and answers with one score per class
//! (`{"scores": [..]}`); the service maps the best score to a class label.

use anyhow::Result;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Deserialize;
use std::{path::Path, time::Duration};
use tracing::{debug, info};

use super::{ProviderError, ensure_success};

/// Inference provider configuration
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Endpoint receiving the image bytes
    pub url: String,
    /// Class labels in score order
    pub labels: Vec<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl InferenceConfig {
    /// Create a new InferenceConfig from environment variables
    ///
    /// Returns `Ok(None)` when `INFERENCE_URL` is unset, which disables the
    /// prediction endpoint.
    ///
    /// # Environment Variables
    /// - `INFERENCE_URL`: Classification endpoint
    /// - `CLASS_LABELS`: Comma-separated labels in score order
    /// - `TRAIN_DATA_DIR`: Dataset directory whose sorted subdirectories name the classes
    /// - `INFERENCE_TIMEOUT_SECONDS`: Request timeout (default: 30)
    pub fn from_env() -> Result<Option<Self>> {
        let Ok(url) = std::env::var("INFERENCE_URL") else {
            return Ok(None);
        };

        let labels = match std::env::var("CLASS_LABELS") {
            Ok(labels) => parse_labels(&labels),
            Err(_) => match std::env::var("TRAIN_DATA_DIR") {
                Ok(dir) => labels_from_dir(Path::new(&dir))?,
                Err(_) => anyhow::bail!("CLASS_LABELS or TRAIN_DATA_DIR must be set"),
            },
        };

        if labels.is_empty() {
            anyhow::bail!("No class labels configured for the inference endpoint");
        }

        let timeout_seconds = std::env::var("INFERENCE_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        Ok(Some(InferenceConfig {
            url,
            labels,
            timeout_seconds,
        }))
    }
}

fn parse_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

/// Class labels of an image-folder dataset: its subdirectory names, sorted
pub fn labels_from_dir(dir: &Path) -> Result<Vec<String>> {
    let mut labels = Vec::new();

    for entry in std::fs::read_dir(dir)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", dir.display(), e))?
    {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            labels.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    labels.sort();
    Ok(labels)
}

/// Image container formats accepted for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Webp,
}

impl ImageFormat {
    /// Detect the format from the file signature
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(ImageFormat::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(ImageFormat::Jpeg),
            [b'G', b'I', b'F', b'8', ..] => Some(ImageFormat::Gif),
            [b'B', b'M', ..] => Some(ImageFormat::Bmp),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => {
                Some(ImageFormat::Webp)
            }
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Webp => "image/webp",
        }
    }
}

/// Decode a base64 image, accepting an optional `data:<mime>;base64,` prefix
pub fn decode_base64_image(data: &str) -> Result<Vec<u8>, String> {
    let encoded = match data.split_once(',') {
        Some((header, encoded)) if header.starts_with("data:") => encoded,
        _ => data,
    };

    let cleaned: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Err("Image data is empty".to_string());
    }

    STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| format!("Invalid base64 image data: {}", e))
}

/// Classification result
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub confidence: f32,
}

/// Pick the highest-scoring label; confidence is its softmax probability
pub fn best_label(scores: &[f32], labels: &[String]) -> Result<Prediction, ProviderError> {
    if scores.len() != labels.len() {
        return Err(ProviderError::InvalidResponse(format!(
            "expected {} scores, got {}",
            labels.len(),
            scores.len()
        )));
    }

    if scores.iter().any(|s| !s.is_finite()) {
        return Err(ProviderError::InvalidResponse(
            "scores must be finite".to_string(),
        ));
    }

    let (best, max) = scores
        .iter()
        .copied()
        .enumerate()
        .fold(None, |acc: Option<(usize, f32)>, (i, s)| match acc {
            Some((_, m)) if m >= s => acc,
            _ => Some((i, s)),
        })
        .ok_or(ProviderError::EmptyResponse)?;

    let total: f32 = scores.iter().map(|s| (s - max).exp()).sum();

    Ok(Prediction {
        label: labels[best].clone(),
        confidence: 1.0 / total,
    })
}

/// Image classification provider
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    /// Classify an already validated image
    async fn classify(&self, image: &[u8], format: ImageFormat)
    -> Result<Prediction, ProviderError>;
}

#[derive(Deserialize)]
struct ScoresResponse {
    scores: Vec<f32>,
}

/// HTTP client for the inference endpoint
#[derive(Clone)]
pub struct HttpClassifier {
    http: reqwest::Client,
    config: InferenceConfig,
}

impl HttpClassifier {
    /// Build a client with the configured request timeout
    pub fn new(config: InferenceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        info!(
            "Inference client initialized with {} classes",
            config.labels.len()
        );
        Ok(Self { http, config })
    }
}

#[async_trait]
impl ImageClassifier for HttpClassifier {
    async fn classify(
        &self,
        image: &[u8],
        format: ImageFormat,
    ) -> Result<Prediction, ProviderError> {
        debug!(bytes = image.len(), format = ?format, "Requesting image classification");

        let response = self
            .http
            .post(&self.config.url)
            .header(reqwest::header::CONTENT_TYPE, format.mime_type())
            .body(image.to_vec())
            .send()
            .await?;

        let scores: ScoresResponse = ensure_success(response).await?.json().await?;
        best_label(&scores.scores, &self.config.labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        vec!["cat".to_string(), "dog".to_string()]
    }

    #[test]
    fn best_label_picks_argmax_with_softmax_confidence() {
        let prediction = best_label(&[0.0, 2.0], &labels()).unwrap();

        assert_eq!(prediction.label, "dog");
        let expected = 1.0 / (1.0 + (-2.0f32).exp());
        assert!((prediction.confidence - expected).abs() < 1e-6);
    }

    #[test]
    fn best_label_rejects_mismatched_or_invalid_scores() {
        assert!(matches!(
            best_label(&[1.0], &labels()),
            Err(ProviderError::InvalidResponse(_))
        ));
        assert!(matches!(
            best_label(&[f32::NAN, 1.0], &labels()),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[test]
    fn sniffs_common_formats() {
        assert_eq!(
            ImageFormat::sniff(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0]),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::sniff(b"RIFF\x00\x00\x00\x00WEBPVP8 "),
            Some(ImageFormat::Webp)
        );
        assert_eq!(ImageFormat::sniff(b"hello world"), None);
        assert_eq!(ImageFormat::sniff(&[]), None);
    }

    #[test]
    fn decodes_plain_and_data_url_base64() {
        let encoded = STANDARD.encode([0xFF, 0xD8, 0xFF, 0xE0]);

        assert_eq!(
            decode_base64_image(&encoded).unwrap(),
            vec![0xFF, 0xD8, 0xFF, 0xE0]
        );
        assert_eq!(
            decode_base64_image(&format!("data:image/jpeg;base64,{}", encoded)).unwrap(),
            vec![0xFF, 0xD8, 0xFF, 0xE0]
        );
        assert!(decode_base64_image("***").is_err());
        assert!(decode_base64_image("").is_err());
    }

    #[test]
    fn labels_come_from_sorted_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("dog")).unwrap();
        std::fs::create_dir(dir.path().join("cat")).unwrap();
        std::fs::write(dir.path().join("README.txt"), "ignored").unwrap();

        assert_eq!(labels_from_dir(dir.path()).unwrap(), labels());
    }

    #[test]
    fn parses_comma_separated_labels() {
        assert_eq!(parse_labels(" cat, dog ,,"), labels());
    }
}
