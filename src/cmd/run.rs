//! Workflow execution: `novascript run <TOPIC>`.

use anyhow::{Context, Result};
use console::style;
use indicatif::MultiProgress;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::oneshot;

use novascript::backend::GeminiBackend;
use novascript::config::NovaConfig;
use novascript::credentials::{CredentialStore, PromptCredentialProvider};
use novascript::errors::WorkflowError;
use novascript::types::{ImageResolution, ScriptOutput};
use novascript::ui::cards::{article_cards, describe_image};
use novascript::ui::icons::DOCUMENT;
use novascript::ui::teleprompter::{teleprompter_text, terminal_width, typewrite, wrap_text};
use novascript::ui::{WorkflowUI, document};
use novascript::workflow::{WorkflowOrchestrator, WorkflowSnapshot};

use super::super::Cli;

pub struct RunOptions {
    pub resolution: Option<ImageResolution>,
    pub output: Option<PathBuf>,
    pub typewriter: bool,
    pub teleprompter: bool,
}

pub async fn cmd_run(cli: &Cli, topic: &str, options: RunOptions) -> Result<()> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(WorkflowError::EmptyTopic).context("Nothing to scan");
    }

    let config = NovaConfig::load(cli.config.as_deref(), cli.verbose)?;
    for warning in config.toml.validate() {
        tracing::warn!("novascript.toml: {}", warning);
    }

    let store = CredentialStore::new(config.api_key.clone());
    let backend = GeminiBackend::new(config.backend().clone(), store.clone())
        .context("Failed to create Gemini client")?;
    // Shared so the key prompt can pause the progress bars
    let display = MultiProgress::new();
    let credentials = PromptCredentialProvider::new(store).with_display(display.clone());
    let resolution = config.resolution(options.resolution);

    let orchestrator = WorkflowOrchestrator::new(Arc::new(backend), Arc::new(credentials))
        .with_resolution(resolution);

    let initial = orchestrator.snapshot();
    let mut ui = WorkflowUI::with_display(display, cli.verbose, initial.log_total);
    ui.print_header(topic, resolution, &initial.log);

    let mut updates = orchestrator.subscribe();
    let (done_tx, mut done_rx) = oneshot::channel::<()>();
    let render = tokio::spawn(async move {
        loop {
            tokio::select! {
                update = updates.recv() => match update {
                    Ok(snapshot) => ui.render(&snapshot),
                    // Snapshots are complete states, so skipping some is harmless
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "progress display fell behind");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = &mut done_rx => {
                    while let Ok(snapshot) = updates.try_recv() {
                        ui.render(&snapshot);
                    }
                    break;
                }
            }
        }
        ui
    });

    let outcome = orchestrator.run_workflow(topic).await;
    let _ = done_tx.send(());
    let ui = render.await.context("Progress display task failed")?;

    let script = match outcome {
        Ok(script) => {
            ui.finish();
            script
        }
        Err(e) => {
            ui.fail(&e.to_string());
            return Err(e).context("Workflow halted");
        }
    };

    let snapshot = orchestrator.snapshot();
    let width = terminal_width();
    print_results(&snapshot, &script, width);

    if options.teleprompter {
        let text = wrap_text(&teleprompter_text(&script), width);
        println!("{}\n", style("TELEPROMPTER").bold().underlined());
        if options.typewriter {
            typewrite(&text, &config.toml.teleprompter, &mut std::io::stdout())
                .await
                .context("Failed to write teleprompter output")?;
            println!();
        } else {
            println!("{}", text);
        }
    }

    if let Some(path) = &options.output {
        let format = document::export(path, topic, &script)?;
        orchestrator.record_event(format.event());
        println!("{}Exported to {}", DOCUMENT, style(path.display()).green());
        tracing::info!(path = %path.display(), "script exported");
    }

    Ok(())
}

fn print_results(snapshot: &WorkflowSnapshot, script: &ScriptOutput, width: usize) {
    println!("{}", article_cards(&snapshot.articles, width));

    println!("{}", style("SYNTHESIZED_NARRATIVE_CHANNEL").bold().underlined());
    if let Some(url) = &script.thumbnail_url {
        println!("  {}", describe_image(url));
    }
    for (i, segment) in script.news_segments.iter().enumerate() {
        let image = segment
            .image_url
            .as_deref()
            .map(describe_image)
            .unwrap_or_else(|| style("no visual").dim().to_string());
        println!(
            "  {} {}  {}",
            style(format!("Segment_{}", i + 1)).cyan().bold(),
            segment.title,
            image
        );
    }
    println!();
}
