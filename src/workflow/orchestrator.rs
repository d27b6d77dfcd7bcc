//! Workflow orchestrator: runs fetch → summarize → script → images for one
//! topic, publishing a snapshot after every state change.

use futures::future::{join, join_all};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;

use super::accumulator::{ResultAccumulator, attach_images, merge_summaries};
use super::activity_log::ActivityLog;
use super::stage::{StageTracker, WorkflowStage};
use crate::backend::ContentBackend;
use crate::credentials::CredentialProvider;
use crate::errors::{BackendError, WorkflowError};
use crate::types::{ImageResolution, NewsArticle, ScriptOutput};

/// Number of leading script segments that get an illustration.
pub const IMAGE_SEGMENT_LIMIT: usize = 2;

const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

/// Immutable copy of the orchestrator state handed to renderers.
#[derive(Debug, Clone)]
pub struct WorkflowSnapshot {
    pub stage: WorkflowStage,
    pub topic: Option<String>,
    pub articles: Arc<Vec<NewsArticle>>,
    pub script: Option<Arc<ScriptOutput>>,
    pub log: Vec<String>,
    /// Lines ever appended to the activity log
    pub log_total: u64,
}

#[derive(Debug)]
struct WorkflowState {
    stages: StageTracker,
    results: ResultAccumulator,
    log: ActivityLog,
    topic: Option<String>,
}

impl WorkflowState {
    fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            stage: self.stages.current(),
            topic: self.topic.clone(),
            articles: self.results.articles(),
            script: self.results.script(),
            log: self.log.lines(),
            log_total: self.log.total_appended(),
        }
    }

    fn log(&mut self, message: impl AsRef<str>) {
        self.log.append(format!("> {}", message.as_ref()));
    }
}

/// Clears the running flag when a run ends, however it ends.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Single writer of workflow state.
pub struct WorkflowOrchestrator {
    backend: Arc<dyn ContentBackend>,
    credentials: Arc<dyn CredentialProvider>,
    resolution: ImageResolution,
    running: AtomicBool,
    state: Mutex<WorkflowState>,
    updates: broadcast::Sender<WorkflowSnapshot>,
}

impl WorkflowOrchestrator {
    pub fn new(backend: Arc<dyn ContentBackend>, credentials: Arc<dyn CredentialProvider>) -> Self {
        let (updates, _rx) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Self {
            backend,
            credentials,
            resolution: ImageResolution::default(),
            running: AtomicBool::new(false),
            state: Mutex::new(WorkflowState {
                stages: StageTracker::new(),
                results: ResultAccumulator::new(),
                log: ActivityLog::with_boot_lines(),
                topic: None,
            }),
            updates,
        }
    }

    pub fn with_resolution(mut self, resolution: ImageResolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn resolution(&self) -> ImageResolution {
        self.resolution
    }

    /// Receive a snapshot after every subsequent state change.
    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowSnapshot> {
        self.updates.subscribe()
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        self.lock().snapshot()
    }

    pub fn stage(&self) -> WorkflowStage {
        self.lock().stages.current()
    }

    /// Note a presentation event (export, copy) in the activity log.
    pub fn record_event(&self, message: &str) {
        self.update(|state| state.log(message));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, WorkflowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `change` under the lock, then publish the resulting snapshot.
    fn update<R>(&self, change: impl FnOnce(&mut WorkflowState) -> R) -> R {
        let (result, snapshot) = {
            let mut state = self.lock();
            let result = change(&mut state);
            (result, state.snapshot())
        };
        // No subscribers is fine
        let _ = self.updates.send(snapshot);
        result
    }

    fn enter(&self, stage: WorkflowStage, message: &str) -> Result<(), WorkflowError> {
        tracing::info!(stage = %stage, "{}", message);
        self.update(|state| {
            state.stages.transition(stage)?;
            state.log(message);
            Ok(())
        })
    }

    /// Run the whole workflow for `topic`.
    ///
    /// A blank topic is rejected without touching any state, as is a call
    /// made while another run is in flight. Every other failure goes through
    /// the failure handler (stage back to idle, halt line logged) before it
    /// is returned.
    pub async fn run_workflow(&self, topic: &str) -> Result<Arc<ScriptOutput>, WorkflowError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(WorkflowError::EmptyTopic);
        }

        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(WorkflowError::AlreadyRunning {
                stage: self.stage(),
            });
        }
        let _guard = RunGuard(&self.running);

        if !self.credentials.has_credential().await {
            self.credentials.select_credential().await?;
        }

        match self.execute(topic).await {
            Ok(script) => Ok(script),
            Err(err) => {
                self.handle_failure(&err).await;
                Err(err)
            }
        }
    }

    async fn execute(&self, topic: &str) -> Result<Arc<ScriptOutput>, WorkflowError> {
        use WorkflowStage::*;

        let scan = format!("INITIALIZING SCAN: {}", topic.to_uppercase());
        tracing::info!(stage = %Fetching, topic, "starting workflow");
        self.update(|state| {
            state.stages.transition(Fetching)?;
            state.results.reset();
            state.topic = Some(topic.to_string());
            state.log(&scan);
            Ok::<_, WorkflowError>(())
        })?;

        let articles = self
            .backend
            .fetch_articles(topic)
            .await
            .map_err(|e| WorkflowError::from_step(Fetching, e))?;
        if articles.is_empty() {
            return Err(WorkflowError::NoSignal);
        }
        let articles = self.update(|state| {
            state.log(format!("DATA POOL LOADED: {} UNITS.", articles.len()));
            state.results.replace_articles(articles);
            state.results.articles()
        });

        self.enter(Summarizing, "SYNTHESIZING NEURAL SUMMARY...")?;
        let summaries = self
            .backend
            .summarize_articles(&articles)
            .await
            .map_err(|e| WorkflowError::from_step(Summarizing, e))?;
        if summaries.len() != articles.len() {
            tracing::debug!(
                articles = articles.len(),
                summaries = summaries.len(),
                "summary count mismatch"
            );
        }
        let summarized = merge_summaries(&articles, &summaries);
        let summarized = self.update(|state| {
            state.results.replace_articles(summarized);
            state.results.articles()
        });

        self.enter(GeneratingScript, "COMPILING SCRIPT NARRATIVE...")?;
        let script = self
            .backend
            .generate_script(topic, &summarized)
            .await
            .map_err(|e| WorkflowError::from_step(GeneratingScript, e))?;
        let script = Arc::new(script);
        let compiled = (*script).clone();
        self.update(|state| state.results.replace_script(compiled));

        let vectoring = format!("VECTORING VISUAL ASSETS ({})...", self.resolution);
        self.enter(GeneratingImages, &vectoring)?;
        let illustrated = self.illustrate(topic, &script).await?;
        let finished = self.update(|state| {
            state.results.replace_script(illustrated);
            state.results.script()
        });

        self.enter(Completed, "SYNTHESIS COMPLETE. SIGNAL STABLE.")?;
        Ok(finished.unwrap_or(script))
    }

    /// Generate the thumbnail and the leading segment images concurrently,
    /// waiting for every call to settle before merging.
    async fn illustrate(
        &self,
        topic: &str,
        script: &ScriptOutput,
    ) -> Result<ScriptOutput, WorkflowError> {
        let resolution = self.resolution;
        let thumbnail = self.backend.generate_image(topic, resolution);

        let segment_calls: Vec<_> = script
            .news_segments
            .iter()
            .take(IMAGE_SEGMENT_LIMIT)
            .enumerate()
            .map(|(i, segment)| {
                self.update(|state| state.log(format!("RENDERING SEG_NODE_{}...", i + 1)));
                self.backend.generate_image(&segment.title, resolution)
            })
            .collect();

        let (thumbnail, segments) = join(thumbnail, join_all(segment_calls)).await;

        let thumbnail = settle_image(thumbnail)?;
        let segment_images = segments
            .into_iter()
            .map(settle_image)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(attach_images(script, thumbnail, segment_images))
    }

    async fn handle_failure(&self, err: &WorkflowError) {
        tracing::error!(error = %err, "workflow halted");

        if err.is_credential_invalidation()
            && let Err(e) = self.credentials.force_reselect().await
        {
            tracing::warn!("Credential reselection failed: {}", e);
        }

        let abandoned = self.update(|state| {
            let abandoned = state.stages.halt();
            state.log("PROTOCOL HALTED: ERROR.");
            abandoned
        });
        tracing::debug!(stage = %abandoned, "stage reset to idle");
    }
}

/// A failed image leaves its slot empty unless the credential went bad.
fn settle_image(
    result: Result<Option<String>, BackendError>,
) -> Result<Option<String>, WorkflowError> {
    match result {
        Ok(url) => Ok(url),
        Err(BackendError::CredentialInvalidated) => Err(WorkflowError::CredentialInvalidated),
        Err(e) => {
            tracing::warn!("Image call failed, continuing without it: {}", e);
            Ok(None)
        }
    }
}
