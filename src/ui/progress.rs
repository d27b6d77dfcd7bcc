use crate::types::ImageResolution;
use crate::ui::icons::{CHECK, CLOCK, CROSS, SIGNAL, SPARKLE};
use crate::workflow::{WorkflowSnapshot, WorkflowStage};
use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// Terminal UI for a workflow run, rendered via `indicatif` progress bars.
///
/// Two bars are stacked vertically:
/// - Stage bar: how many of the five pipeline stages are done
/// - Status spinner: the current stage label and elapsed time
///
/// Activity log lines are printed above the bars as they arrive.
pub struct WorkflowUI {
    multi: MultiProgress,
    stage_bar: ProgressBar,
    status_bar: ProgressBar,
    verbose: bool,
    /// Activity log lines already printed
    seen_log: u64,
    started: Instant,
}

impl WorkflowUI {
    /// Create the UI. `seen_log` is the log total at the moment the UI starts
    /// listening, so boot lines are not echoed twice.
    pub fn new(verbose: bool, seen_log: u64) -> Self {
        Self::with_display(MultiProgress::new(), verbose, seen_log)
    }

    /// Like [`WorkflowUI::new`], drawing into an existing display so other
    /// components (the credential prompt) can suspend it.
    pub fn with_display(multi: MultiProgress, verbose: bool, seen_log: u64) -> Self {

        let stage_style = ProgressStyle::default_bar()
            .template("{prefix:.bold.dim} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("progress bar template is a valid static string")
            .progress_chars("█▓▒░");

        let stage_bar = multi.add(ProgressBar::new(WorkflowStage::PIPELINE.len() as u64));
        stage_bar.set_style(stage_style);
        stage_bar.set_prefix("Stages");

        let status_style = ProgressStyle::default_spinner()
            .template("{prefix:.bold.dim} {spinner} {msg}")
            .expect("progress bar template is a valid static string");

        let status_bar = multi.add(ProgressBar::new_spinner());
        status_bar.set_style(status_style);
        status_bar.set_prefix("Signal");

        Self {
            multi,
            stage_bar,
            status_bar,
            verbose,
            seen_log,
            started: Instant::now(),
        }
    }

    /// Print a line via `MultiProgress`, falling back to `eprintln!` if the rich UI fails.
    fn print_line(&self, msg: impl AsRef<str>) {
        if self.multi.println(msg.as_ref()).is_err() {
            eprintln!("{}", msg.as_ref());
        }
    }

    pub fn print_separator(&self) {
        self.print_line(format!("{}", style("═".repeat(70)).cyan()));
    }

    /// Header shown before the run starts.
    pub fn print_header(&self, topic: &str, resolution: ImageResolution, boot_lines: &[String]) {
        self.print_line("");
        self.print_separator();
        self.print_line(format!(
            "{} {}  {}",
            style("▶").green().bold(),
            style("NOVASCRIPT").bold(),
            style(format!("Sector Vector: {}", topic.to_uppercase())).yellow()
        ));
        self.print_separator();
        self.print_line(format!("{}  {}", style("Resolution:").dim(), resolution));
        for line in boot_lines {
            self.print_line(format!("  {}", style(line).dim()));
        }
        self.print_line("");
    }

    /// Bring the display up to date with `snapshot`.
    pub fn render(&mut self, snapshot: &WorkflowSnapshot) {
        for line in new_log_lines(snapshot, self.seen_log) {
            self.print_line(format!("  {}", style(line).cyan()));
        }
        self.seen_log = self.seen_log.max(snapshot.log_total);

        self.stage_bar.set_position(completed_stages(snapshot.stage));
        self.stage_bar
            .set_message(format!("{}", style(snapshot.stage.label()).yellow()));

        if snapshot.stage.is_active() {
            // Ticks are held off while a credential prompt suspends the display
            self.status_bar.enable_steady_tick(Duration::from_millis(100));
            self.status_bar.set_message(format!(
                "{}{} {}",
                SIGNAL,
                snapshot.stage.label(),
                style(format!("({})", format_elapsed(self.started.elapsed()))).dim()
            ));
        }

        if self.verbose && !snapshot.articles.is_empty() && snapshot.stage == WorkflowStage::Summarizing
        {
            self.print_line(format!(
                "    {} {}",
                style("→").dim(),
                style(format!("{} articles in pool", snapshot.articles.len())).dim()
            ));
        }
    }

    /// Stop the bars after a successful run.
    pub fn finish(&self) {
        let elapsed = format_elapsed(self.started.elapsed());
        self.stage_bar.finish();
        self.status_bar
            .finish_with_message(format!("{} Link established", CHECK));
        self.print_line(format!(
            "\n{} Synthesis complete {}{}\n",
            SPARKLE,
            CLOCK,
            style(elapsed).dim()
        ));
    }

    /// Stop the bars after a failed run without advancing the stage bar.
    pub fn fail(&self, reason: &str) {
        self.stage_bar.abandon();
        self.status_bar
            .abandon_with_message(format!("{} Protocol halted", CROSS));
        self.print_line(format!("\n{} {}\n", CROSS, style(reason).red().bold()));
    }
}

/// Lines appended since `seen_total`, oldest first. Lines already evicted
/// from the bounded log are skipped.
pub fn new_log_lines(snapshot: &WorkflowSnapshot, seen_total: u64) -> &[String] {
    let fresh = snapshot.log_total.saturating_sub(seen_total);
    let fresh = usize::try_from(fresh)
        .unwrap_or(usize::MAX)
        .min(snapshot.log.len());
    &snapshot.log[snapshot.log.len() - fresh..]
}

/// Number of pipeline stages finished when the run is at `stage`.
pub fn completed_stages(stage: WorkflowStage) -> u64 {
    match stage {
        WorkflowStage::Idle => 0,
        WorkflowStage::Completed => WorkflowStage::PIPELINE.len() as u64,
        active => active.position().unwrap_or(0) as u64,
    }
}

/// Formats as `Xs`, or `Xm Ys` from one minute up.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn snapshot(log: &[&str], total: u64) -> WorkflowSnapshot {
        WorkflowSnapshot {
            stage: WorkflowStage::Fetching,
            topic: Some("t".into()),
            articles: Arc::new(Vec::new()),
            script: None,
            log: log.iter().map(|s| s.to_string()).collect(),
            log_total: total,
        }
    }

    #[test]
    fn test_new_log_lines_returns_only_unseen() {
        let snap = snapshot(&["a", "b", "c"], 3);
        assert_eq!(new_log_lines(&snap, 1), ["b", "c"]);
        assert!(new_log_lines(&snap, 3).is_empty());
    }

    #[test]
    fn test_new_log_lines_skips_evicted_lines() {
        let snap = snapshot(&["g", "h", "i", "j"], 10);
        assert_eq!(new_log_lines(&snap, 2), ["g", "h", "i", "j"]);
    }

    #[test]
    fn test_new_log_lines_tolerates_stale_counter() {
        let snap = snapshot(&["a"], 1);
        assert!(new_log_lines(&snap, 5).is_empty());
    }

    #[test]
    fn test_completed_stages() {
        assert_eq!(completed_stages(WorkflowStage::Idle), 0);
        assert_eq!(completed_stages(WorkflowStage::Fetching), 0);
        assert_eq!(completed_stages(WorkflowStage::GeneratingImages), 3);
        assert_eq!(completed_stages(WorkflowStage::Completed), 5);
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_secs(42)), "42s");
        assert_eq!(format_elapsed(Duration::from_secs(125)), "2m 5s");
    }

    #[test]
    fn test_render_draws_into_shared_display() {
        use indicatif::ProgressDrawTarget;

        let display = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        let mut ui = WorkflowUI::with_display(display.clone(), false, 0);
        ui.render(&snapshot(&["a"], 1));
        let held = display.suspend(|| ui.seen_log);
        assert_eq!(held, 1);
        ui.fail("halted");
        assert!(ui.status_bar.is_finished());
    }

    #[test]
    fn test_render_tracks_seen_lines() {
        let mut ui = WorkflowUI::new(false, 2);
        ui.render(&snapshot(&["x", "y", "z"], 3));
        assert_eq!(ui.seen_log, 3);
        ui.finish();
    }
}
