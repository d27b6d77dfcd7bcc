//! Article cards and image references for the terminal.

use console::style;

use crate::types::NewsArticle;
use crate::ui::icons::{IMAGE, LINK, NODE};

/// Render one article as a multi-line card. `index` is zero-based.
pub fn article_card(index: usize, article: &NewsArticle, width: usize) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{}{} {} {}",
        NODE,
        style(format!("NODE_{:02}", index + 1)).cyan().bold(),
        style(article.source.to_uppercase()).yellow(),
        style(&article.timestamp).dim()
    ));
    for line in textwrap::wrap(&article.title, width.saturating_sub(4).max(20)) {
        lines.push(format!("    {}", style(line).bold()));
    }
    if let Some(summary) = &article.summary {
        for line in textwrap::wrap(summary, width.saturating_sub(4).max(20)) {
            lines.push(format!("    {}", line));
        }
    }
    lines.push(format!(
        "    {}VIEW_SOURCE → {}",
        LINK,
        style(&article.url).underlined()
    ));
    lines.join("\n")
}

/// Section header followed by one card per article.
pub fn article_cards(articles: &[NewsArticle], width: usize) -> String {
    let mut out = format!("{}\n", style("EXTRACTED_DATA_NODES").bold().underlined());
    for (i, article) in articles.iter().enumerate() {
        out.push('\n');
        out.push_str(&article_card(i, article, width));
        out.push('\n');
    }
    out
}

/// Short description of an image reference. Inline data URLs are summarised
/// instead of dumping base64 to the terminal.
pub fn describe_image(url: &str) -> String {
    match url.strip_prefix("data:") {
        Some(rest) => {
            let mime = rest.split(';').next().unwrap_or("image");
            let payload = rest.split_once(',').map(|(_, data)| data.len()).unwrap_or(0);
            // base64 expands 3 bytes to 4 chars
            let kib = (payload * 3 / 4).div_ceil(1024);
            format!("{}{} inline, {} KiB", IMAGE, mime, kib)
        }
        None => format!("{}{}", IMAGE, url),
    }
}
