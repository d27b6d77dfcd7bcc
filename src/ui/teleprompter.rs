//! Teleprompter view: the full script as one marked-up text, optionally
//! revealed a few characters at a time.

use std::io::Write;
use std::time::Duration;

use crate::config::TeleprompterSection;
use crate::types::ScriptOutput;

const DEFAULT_WIDTH: usize = 80;

/// Full teleprompter text with its stream markers.
pub fn teleprompter_text(script: &ScriptOutput) -> String {
    let segments: Vec<String> = script
        .news_segments
        .iter()
        .enumerate()
        .map(|(i, seg)| {
            format!(
                ">> DATA_STREAM_{}: {}\n{}\n\n[TRANSITION_MARK]\n{}",
                i + 1,
                seg.title.to_uppercase(),
                seg.script,
                seg.transition
            )
        })
        .collect();

    format!(
        "[SYSTEM_BOOT]\n[LINK_ESTABLISHED]\n\n{}\n\n{}\n\n[CLOSING_TRANSMISSION]\n{}\n[END_OF_LINE]\n",
        script.intro,
        segments.join("\n\n"),
        script.outro
    )
}

/// Current terminal width, or 80 columns when it cannot be determined.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| usize::from(w))
        .filter(|w| *w > 0)
        .unwrap_or(DEFAULT_WIDTH)
}

/// Wrap every line of `text` to `width`, keeping blank lines.
pub fn wrap_text(text: &str, width: usize) -> String {
    let width = width.max(20);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                textwrap::fill(line, width)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split `text` into the chunks a typewriter reveals per tick, respecting
/// character boundaries.
pub fn typewriter_chunks(text: &str, chars_per_tick: usize) -> Vec<&str> {
    let step = chars_per_tick.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in text.char_indices() {
        if count == step {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

/// Write `text` to `out` progressively, one chunk per tick.
pub async fn typewrite<W: Write>(
    text: &str,
    settings: &TeleprompterSection,
    out: &mut W,
) -> std::io::Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_millis(settings.tick_millis.max(1)));
    for chunk in typewriter_chunks(text, settings.chars_per_tick) {
        ticker.tick().await;
        out.write_all(chunk.as_bytes())?;
        out.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScriptSegment;

    fn script() -> ScriptOutput {
        ScriptOutput {
            intro: "Welcome back.".into(),
            news_segments: vec![
                ScriptSegment::new("Chip war", "Fabs are expanding.", "Meanwhile"),
                ScriptSegment::new("Ocean data", "Buoys report warming.", "Finally"),
            ],
            outro: "Signing off.".into(),
            thumbnail_url: None,
        }
    }

    #[test]
    fn test_markers_appear_in_order() {
        let text = teleprompter_text(&script());
        let order = [
            "[SYSTEM_BOOT]",
            "[LINK_ESTABLISHED]",
            "Welcome back.",
            ">> DATA_STREAM_1: CHIP WAR",
            "Fabs are expanding.",
            "[TRANSITION_MARK]\nMeanwhile",
            ">> DATA_STREAM_2: OCEAN DATA",
            "[CLOSING_TRANSMISSION]\nSigning off.",
            "[END_OF_LINE]",
        ];
        let mut cursor = 0;
        for marker in order {
            let found = text[cursor..]
                .find(marker)
                .unwrap_or_else(|| panic!("{} missing or out of order", marker));
            cursor += found + marker.len();
        }
    }

    #[test]
    fn test_wrap_keeps_blank_lines() {
        let wrapped = wrap_text("one two three four five six\n\nseven", 20);
        assert!(wrapped.contains("\n\n"));
        assert!(wrapped.lines().all(|l| l.chars().count() <= 20));
    }

    #[test]
    fn test_typewriter_chunks_cover_text() {
        let text = "héllo wörld, ünïcode";
        let chunks = typewriter_chunks(text, 8);
        assert_eq!(chunks.concat(), text);
        assert!(chunks.iter().all(|c| c.chars().count() <= 8));
        assert_eq!(chunks[0].chars().count(), 8);
    }

    #[test]
    fn test_typewriter_chunks_zero_step() {
        assert_eq!(typewriter_chunks("abc", 0), vec!["a", "b", "c"]);
        assert!(typewriter_chunks("", 8).is_empty());
    }

    #[tokio::test]
    async fn test_typewrite_writes_everything() {
        let settings = TeleprompterSection {
            chars_per_tick: 5,
            tick_millis: 1,
        };
        let mut out = Vec::new();
        typewrite("stream of text", &settings, &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "stream of text");
    }
}
