//! API credential selection.
//!
//! The key lives in a [`CredentialStore`] shared between the provider that
//! selects it and the backend that reads it on every call, so a reselected
//! key takes effect immediately.

use async_trait::async_trait;
use indicatif::MultiProgress;
use std::io::IsTerminal;
use std::sync::{Arc, RwLock};

use crate::errors::CredentialError;

/// Shared slot holding the currently selected API key.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    key: Arc<RwLock<Option<String>>>,
}

impl CredentialStore {
    pub fn new(initial: Option<String>) -> Self {
        let initial = initial.filter(|k| !k.trim().is_empty());
        Self {
            key: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn get(&self) -> Option<String> {
        match self.key.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set(&self, key: String) {
        match self.key.write() {
            Ok(mut guard) => *guard = Some(key),
            Err(poisoned) => *poisoned.into_inner() = Some(key),
        }
    }

    pub fn clear(&self) {
        match self.key.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }
}

/// Credential capability consumed by the orchestrator.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn has_credential(&self) -> bool;

    /// Select a credential, blocking until one is chosen.
    async fn select_credential(&self) -> Result<(), CredentialError>;

    /// Discard the current credential and select a new one.
    async fn force_reselect(&self) -> Result<(), CredentialError>;
}

/// Asks for the key on the terminal with a hidden prompt.
pub struct PromptCredentialProvider {
    store: CredentialStore,
    /// Progress display hidden while the prompt is up
    display: Option<MultiProgress>,
}

impl PromptCredentialProvider {
    pub fn new(store: CredentialStore) -> Self {
        Self {
            store,
            display: None,
        }
    }

    /// Suspend `display` whenever the prompt is shown, so progress redraws
    /// do not overwrite it.
    pub fn with_display(mut self, display: MultiProgress) -> Self {
        self.display = Some(display);
        self
    }

    async fn prompt(&self) -> Result<(), CredentialError> {
        if !std::io::stdin().is_terminal() {
            return Err(CredentialError::NonInteractive);
        }

        let display = self.display.clone();
        let key = tokio::task::spawn_blocking(move || {
            with_display_suspended(display.as_ref(), || {
                dialoguer::Password::new()
                    .with_prompt("Gemini API key")
                    .interact()
            })
        })
        .await
        .map_err(|e| CredentialError::Prompt(e.to_string()))?
        .map_err(|e| CredentialError::Prompt(e.to_string()))?;

        let key = key.trim().to_string();
        if key.is_empty() {
            return Err(CredentialError::Cancelled);
        }
        self.store.set(key);
        tracing::info!("API credential selected");
        Ok(())
    }
}

/// Run `f` with the progress bars cleared and their redraws held off.
fn with_display_suspended<R>(display: Option<&MultiProgress>, f: impl FnOnce() -> R) -> R {
    match display {
        Some(display) => display.suspend(f),
        None => f(),
    }
}

#[async_trait]
impl CredentialProvider for PromptCredentialProvider {
    async fn has_credential(&self) -> bool {
        self.store.is_set()
    }

    async fn select_credential(&self) -> Result<(), CredentialError> {
        self.prompt().await
    }

    async fn force_reselect(&self) -> Result<(), CredentialError> {
        self.store.clear();
        tracing::warn!("API credential cleared, selecting a new one");
        self.prompt().await
    }
}
