//! Export of a finished script as a Markdown report or raw JSON.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::Path;

use crate::types::ScriptOutput;

/// Output format picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Json,
}

impl ExportFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Markdown,
        }
    }

    /// Activity log event recorded after a successful export.
    pub fn event(&self) -> &'static str {
        match self {
            Self::Markdown => "EXPORTED.",
            Self::Json => "CACHED.",
        }
    }
}

/// Markdown synthesis report for `script`.
pub fn markdown_report(topic: &str, script: &ScriptOutput, generated_at: DateTime<Local>) -> String {
    let mut doc = String::new();
    doc.push_str("# NOVASCRIPT\n\n");
    doc.push_str(&format!("**Neural Synthesis Report // Sector Vector: {}**\n\n", topic));
    doc.push_str(&format!(
        "Timestamp: {}\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));

    if let Some(url) = &script.thumbnail_url {
        doc.push_str(&format!("![{}]({})\n\n", topic, url));
    }

    doc.push_str(&format!("{}\n\n", script.intro));

    for (i, segment) in script.news_segments.iter().enumerate() {
        doc.push_str(&format!("## Segment_{}: {}\n\n", i + 1, segment.title));
        if let Some(url) = &segment.image_url {
            doc.push_str(&format!("![Segment_{}]({})\n\n", i + 1, url));
        }
        doc.push_str(&format!("{}\n\n", segment.script));
        doc.push_str(&format!("> Transition Marker: {}\n\n", segment.transition));
    }

    doc.push_str(&format!("{}\n\n", script.outro));
    doc.push_str("---\n\nVALIDATED SYNTHESIS CORE // AI GENERATED CONTENT\n");
    doc
}

/// Write `script` to `path` in the format its extension selects.
pub fn export(path: &Path, topic: &str, script: &ScriptOutput) -> Result<ExportFormat> {
    let format = ExportFormat::for_path(path);
    let content = match format {
        ExportFormat::Json => {
            serde_json::to_string_pretty(script).context("Failed to serialize script")?
        }
        ExportFormat::Markdown => markdown_report(topic, script, Local::now()),
    };
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write export: {}", path.display()))?;
    Ok(format)
}
