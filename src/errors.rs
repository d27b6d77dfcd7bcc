//! Typed error hierarchy for NovaScript.
//!
//! Three top-level enums cover the three subsystems:
//! - `WorkflowError`: orchestrator run failures
//! - `BackendError`: content backend (model API) failures
//! - `CredentialError`: credential selection failures

use thiserror::Error;

use crate::workflow::WorkflowStage;

/// Errors from the content backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend reports that the entity behind the selected credential
    /// does not exist. The credential has to be selected again.
    #[error("Selected credential is no longer valid")]
    CredentialInvalidated,

    #[error("No API credential selected")]
    MissingCredential,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {message}")]
    Api {
        status: u16,
        /// What the structured error body says went wrong
        kind: ApiErrorKind,
        message: String,
    },

    #[error("Failed to parse model output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model returned no content")]
    EmptyResponse,
}

/// Classification of a structured API error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The entity behind the selected credential no longer exists.
    EntityNotFound,
    Other,
}

/// Errors from the credential capability.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("No API credential available and stdin is not a terminal (set GEMINI_API_KEY)")]
    NonInteractive,

    #[error("Credential prompt failed: {0}")]
    Prompt(String),

    #[error("Credential selection cancelled")]
    Cancelled,
}

/// Errors from a workflow run.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Topic is empty")]
    EmptyTopic,

    #[error("A workflow is already running (stage: {stage})")]
    AlreadyRunning { stage: WorkflowStage },

    #[error("No signal detected")]
    NoSignal,

    #[error("Credential invalidated by the backend")]
    CredentialInvalidated,

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("Stage {stage} failed: {source}")]
    Step {
        stage: WorkflowStage,
        #[source]
        source: BackendError,
    },

    #[error("Invalid stage transition {from} -> {to}")]
    InvalidTransition {
        from: WorkflowStage,
        to: WorkflowStage,
    },
}

impl WorkflowError {
    /// Wrap a backend failure raised while `stage` was active.
    ///
    /// A credential invalidation keeps its identity regardless of the step
    /// that produced it.
    pub fn from_step(stage: WorkflowStage, source: BackendError) -> Self {
        match source {
            BackendError::CredentialInvalidated => WorkflowError::CredentialInvalidated,
            source => WorkflowError::Step { stage, source },
        }
    }

    pub fn is_credential_invalidation(&self) -> bool {
        matches!(self, WorkflowError::CredentialInvalidated)
    }
}
