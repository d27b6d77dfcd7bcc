//! Workflow state machine and the orchestrator that drives it.

mod accumulator;
mod activity_log;
mod orchestrator;
mod stage;

pub use accumulator::{MISSING_SUMMARY, ResultAccumulator, attach_images, merge_summaries};
pub use activity_log::{ACTIVITY_LOG_CAPACITY, ActivityLog, BOOT_LINES};
pub use orchestrator::{IMAGE_SEGMENT_LIMIT, WorkflowOrchestrator, WorkflowSnapshot};
pub use stage::{StageTracker, WorkflowStage, can_transition};
