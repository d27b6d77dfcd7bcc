use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;

use super::ContentBackend;
use crate::config::BackendSection;
use crate::credentials::CredentialStore;
use crate::errors::{ApiErrorKind, BackendError};
use crate::types::{ImageResolution, NewsArticle, ScriptOutput};

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: String,
    image_size: String,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Message the API uses when the project or key behind the credential is gone.
/// An unknown model is also a 404 `NOT_FOUND`, but with a different message.
const ENTITY_NOT_FOUND_MESSAGE: &str = "Requested entity was not found";

impl ApiErrorBody {
    fn kind(&self, status: StatusCode) -> ApiErrorKind {
        let not_found = status == StatusCode::NOT_FOUND
            && (self.status.is_empty() || self.status == "NOT_FOUND");
        if not_found && self.message.starts_with(ENTITY_NOT_FOUND_MESSAGE) {
            ApiErrorKind::EntityNotFound
        } else {
            ApiErrorKind::Other
        }
    }
}

impl GenerateRequest {
    fn prompt(text: String) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![RequestPart { text }],
            }],
            tools: Vec::new(),
            generation_config: None,
        }
    }

    fn json_response(mut self, schema: Value) -> Self {
        let config = self.generation_config.get_or_insert_with(Default::default);
        config.response_mime_type = Some("application/json".to_string());
        config.response_schema = Some(schema);
        self
    }

    fn with_search(mut self) -> Self {
        self.tools.push(json!({ "googleSearch": {} }));
        self
    }

    fn with_image(mut self, aspect_ratio: &str, resolution: ImageResolution) -> Self {
        let config = self.generation_config.get_or_insert_with(Default::default);
        config.image_config = Some(ImageConfig {
            aspect_ratio: aspect_ratio.to_string(),
            image_size: resolution.as_str().to_string(),
        });
        self
    }
}

impl GenerateResponse {
    fn parts(&self) -> impl Iterator<Item = &ResponsePart> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .into_iter()
            .flat_map(|c| c.parts.iter())
    }

    /// All text parts of the first candidate, concatenated.
    fn text(&self) -> String {
        self.parts()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }

    /// The first inline image as a `data:` URL.
    fn inline_image(&self) -> Option<String> {
        self.parts()
            .find_map(|p| p.inline_data.as_ref())
            .map(|d| format!("data:{};base64,{}", d.mime_type, d.data))
    }
}

// ── Prompts ──────────────────────────────────────────────────────────

fn news_prompt(topic: &str) -> String {
    format!(
        "Find the 5-7 most significant news headlines from the last 24 hours regarding: \"{}\".\n\
         Provide news headlines, sources, and timestamps. Format as valid JSON array of objects \
         with keys: title, source, timestamp, url.",
        topic
    )
}

fn summary_prompt(articles: &[NewsArticle]) -> String {
    let listing = articles
        .iter()
        .enumerate()
        .map(|(i, a)| format!("{}. {}", i + 1, a.title))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Summarize these {} news items into 2 concise, factual sentences each:\n{}\n\
         Return a JSON array of strings.",
        articles.len(),
        listing
    )
}

fn script_prompt(topic: &str, articles: &[NewsArticle]) -> String {
    let news = articles
        .iter()
        .enumerate()
        .map(|(i, a)| {
            format!(
                "[{}] {}: {}",
                i + 1,
                a.title,
                a.summary.as_deref().unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Create a professional YouTube news script for \"{}\".\nNews: {}\n\n\
         Format: JSON object {{ intro, newsSegments: [{{title, script, transition}}], outro }}.",
        topic, news
    )
}

fn image_prompt(prompt: &str) -> String {
    format!(
        "High-contrast cinematic news aesthetic for: {}. Professional, photorealistic, \
         futuristic lighting, 8k.",
        prompt
    )
}

fn articles_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "source": { "type": "STRING" },
                "timestamp": { "type": "STRING" },
                "url": { "type": "STRING" }
            },
            "required": ["title", "source", "timestamp", "url"]
        }
    })
}

fn summaries_schema() -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

fn script_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "intro": { "type": "STRING" },
            "newsSegments": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "script": { "type": "STRING" },
                        "transition": { "type": "STRING" }
                    },
                    "required": ["title", "script", "transition"]
                }
            },
            "outro": { "type": "STRING" }
        },
        "required": ["intro", "newsSegments", "outro"]
    })
}

// ── Parsing helpers ──────────────────────────────────────────────────

/// Strip a surrounding Markdown code fence (```json ... ```), if any.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, BackendError> {
    let body = strip_code_fences(text);
    if body.is_empty() {
        return Err(BackendError::EmptyResponse);
    }
    Ok(serde_json::from_str(body)?)
}

/// Turn a non-success HTTP response into a [`BackendError::Api`].
fn api_error(status: StatusCode, body: &str) -> BackendError {
    let (kind, message) = match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => {
            let kind = envelope.error.kind(status);
            let message = if envelope.error.status.is_empty() {
                envelope.error.message
            } else {
                format!("{} ({})", envelope.error.message, envelope.error.status)
            };
            (kind, message)
        }
        // Unstructured bodies are never treated as credential failures
        Err(_) => (ApiErrorKind::Other, body.trim().to_string()),
    };
    BackendError::Api {
        status: status.as_u16(),
        kind,
        message,
    }
}

/// Whether the backend reported that the entity behind the credential is gone.
fn is_entity_not_found(err: &BackendError) -> bool {
    matches!(
        err,
        BackendError::Api {
            kind: ApiErrorKind::EntityNotFound,
            ..
        }
    )
}

// ── Backend ──────────────────────────────────────────────────────────

/// Gemini `generateContent` client.
pub struct GeminiBackend {
    client: Client,
    settings: BackendSection,
    credentials: CredentialStore,
}

impl GeminiBackend {
    pub fn new(settings: BackendSection, credentials: CredentialStore) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            settings,
            credentials,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.api_base.trim_end_matches('/'),
            model
        )
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, BackendError> {
        let key = self
            .credentials
            .get()
            .ok_or(BackendError::MissingCredential)?;

        tracing::debug!(model, "calling generateContent");
        let res = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", key)
            .json(request)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }
        Ok(res.json().await?)
    }
}

#[async_trait]
impl ContentBackend for GeminiBackend {
    async fn fetch_articles(&self, topic: &str) -> Result<Vec<NewsArticle>, BackendError> {
        let request = GenerateRequest::prompt(news_prompt(topic))
            .with_search()
            .json_response(articles_schema());
        let response = self.generate(&self.settings.news_model, &request).await?;

        match parse_json(&response.text()) {
            Ok(articles) => Ok(articles),
            Err(e) => {
                tracing::warn!("Failed to parse news: {}", e);
                Ok(Vec::new())
            }
        }
    }

    async fn summarize_articles(
        &self,
        articles: &[NewsArticle],
    ) -> Result<Vec<String>, BackendError> {
        let request =
            GenerateRequest::prompt(summary_prompt(articles)).json_response(summaries_schema());
        let response = self.generate(&self.settings.news_model, &request).await?;

        match parse_json(&response.text()) {
            Ok(summaries) => Ok(summaries),
            Err(e) => {
                tracing::warn!("Failed to parse summaries: {}", e);
                Ok(Vec::new())
            }
        }
    }

    async fn generate_script(
        &self,
        topic: &str,
        articles: &[NewsArticle],
    ) -> Result<ScriptOutput, BackendError> {
        let request =
            GenerateRequest::prompt(script_prompt(topic, articles)).json_response(script_schema());
        let response = self.generate(&self.settings.script_model, &request).await?;
        parse_json(&response.text())
    }

    async fn generate_image(
        &self,
        prompt: &str,
        resolution: ImageResolution,
    ) -> Result<Option<String>, BackendError> {
        let request = GenerateRequest::prompt(image_prompt(prompt))
            .with_image(&self.settings.aspect_ratio, resolution);

        match self.generate(&self.settings.image_model, &request).await {
            Ok(response) => Ok(response.inline_image()),
            Err(e) if is_entity_not_found(&e) => Err(BackendError::CredentialInvalidated),
            Err(e) => {
                tracing::warn!("Image generation failed: {}", e);
                Ok(None)
            }
        }
    }
}
