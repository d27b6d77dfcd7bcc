//! Content backend abstraction.
//!
//! The orchestrator only talks to [`ContentBackend`]. The real implementation
//! is [`GeminiBackend`]; tests substitute their own.

pub mod gemini;

use async_trait::async_trait;

use crate::errors::BackendError;
use crate::types::{ImageResolution, NewsArticle, ScriptOutput};

pub use gemini::GeminiBackend;

/// The four remote operations a workflow run is built from.
#[async_trait]
pub trait ContentBackend: Send + Sync {
    /// Most significant recent headlines for `topic`, in ranking order.
    async fn fetch_articles(&self, topic: &str) -> Result<Vec<NewsArticle>, BackendError>;

    /// One summary per article, in the same order.
    async fn summarize_articles(
        &self,
        articles: &[NewsArticle],
    ) -> Result<Vec<String>, BackendError>;

    /// Narrative script for `topic` built from the summarized articles.
    /// Image fields are left unset.
    async fn generate_script(
        &self,
        topic: &str,
        articles: &[NewsArticle],
    ) -> Result<ScriptOutput, BackendError>;

    /// Image reference for `prompt`, or `None` when generation failed.
    ///
    /// Returns [`BackendError::CredentialInvalidated`] when the backend no
    /// longer recognises the selected credential.
    async fn generate_image(
        &self,
        prompt: &str,
        resolution: ImageResolution,
    ) -> Result<Option<String>, BackendError>;
}
