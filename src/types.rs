//! Domain values produced and consumed by the workflow.
//!
//! Field names serialize in camelCase so that exported JSON matches the
//! shape the backend is asked to produce (`newsSegments`, `imageUrl`, ...).

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A single headline returned by the fetch step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub source: String,
    pub timestamp: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl NewsArticle {
    pub fn new(
        title: impl Into<String>,
        source: impl Into<String>,
        timestamp: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            source: source.into(),
            timestamp: timestamp.into(),
            url: url.into(),
            summary: None,
        }
    }

    /// Copy of this article carrying `summary`.
    pub fn with_summary(&self, summary: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            ..self.clone()
        }
    }
}

/// One narrated block of the script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptSegment {
    pub title: String,
    pub script: String,
    pub transition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ScriptSegment {
    pub fn new(
        title: impl Into<String>,
        script: impl Into<String>,
        transition: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            script: script.into(),
            transition: transition.into(),
            image_url: None,
        }
    }
}

/// The compiled script. Treated as an immutable value: updates build a new
/// `ScriptOutput` instead of editing one that readers may hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptOutput {
    pub intro: String,
    #[serde(default)]
    pub news_segments: Vec<ScriptSegment>,
    pub outro: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// Output size requested from the image model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageResolution {
    #[default]
    #[serde(rename = "1K")]
    OneK,
    #[serde(rename = "2K")]
    TwoK,
    #[serde(rename = "4K")]
    FourK,
}

impl ImageResolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneK => "1K",
            Self::TwoK => "2K",
            Self::FourK => "4K",
        }
    }
}

impl std::fmt::Display for ImageResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageResolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "1K" => Ok(Self::OneK),
            "2K" => Ok(Self::TwoK),
            "4K" => Ok(Self::FourK),
            _ => Err(format!("Invalid resolution '{}'. Valid values: 1K, 2K, 4K", s)),
        }
    }
}
