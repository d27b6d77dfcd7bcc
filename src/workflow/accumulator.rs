//! Evolving results of a workflow run.
//!
//! Both the article list and the script are swapped out wholesale on every
//! update. Readers holding an earlier `Arc` keep seeing a complete value.

use std::sync::Arc;

use crate::types::{NewsArticle, ScriptOutput};

/// Summary used when the backend returns fewer summaries than articles.
pub const MISSING_SUMMARY: &str = "No data synthesized.";

#[derive(Debug, Clone, Default)]
pub struct ResultAccumulator {
    articles: Arc<Vec<NewsArticle>>,
    script: Option<Arc<ScriptOutput>>,
}

impl ResultAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear both the article list and the script.
    pub fn reset(&mut self) {
        self.articles = Arc::new(Vec::new());
        self.script = None;
    }

    pub fn replace_articles(&mut self, articles: Vec<NewsArticle>) {
        self.articles = Arc::new(articles);
    }

    pub fn replace_script(&mut self, script: ScriptOutput) {
        self.script = Some(Arc::new(script));
    }

    pub fn articles(&self) -> Arc<Vec<NewsArticle>> {
        Arc::clone(&self.articles)
    }

    pub fn script(&self) -> Option<Arc<ScriptOutput>> {
        self.script.clone()
    }
}

/// Pair summary `i` with article `i`.
///
/// Missing or empty summaries fall back to [`MISSING_SUMMARY`]; surplus
/// summaries are ignored. The result always has `articles.len()` entries.
pub fn merge_summaries(articles: &[NewsArticle], summaries: &[String]) -> Vec<NewsArticle> {
    articles
        .iter()
        .enumerate()
        .map(|(i, article)| {
            let summary = summaries
                .get(i)
                .map(String::as_str)
                .filter(|s| !s.is_empty())
                .unwrap_or(MISSING_SUMMARY);
            article.with_summary(summary)
        })
        .collect()
}

/// Build a new script from `base` with image references attached.
///
/// `segment_images[i]` applies to segment `i`; segments beyond the slice
/// are carried over unchanged. A `None` leaves the field unset.
pub fn attach_images(
    base: &ScriptOutput,
    thumbnail: Option<String>,
    segment_images: Vec<Option<String>>,
) -> ScriptOutput {
    let mut images = segment_images.into_iter();
    let news_segments = base
        .news_segments
        .iter()
        .map(|segment| match images.next() {
            Some(image_url) => {
                let mut updated = segment.clone();
                updated.image_url = image_url;
                updated
            }
            None => segment.clone(),
        })
        .collect();

    ScriptOutput {
        intro: base.intro.clone(),
        news_segments,
        outro: base.outro.clone(),
        thumbnail_url: thumbnail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScriptSegment;

    fn article(title: &str) -> NewsArticle {
        NewsArticle::new(title, "Wire", "1h ago", format!("https://news/{}", title))
    }

    fn script_with(n: usize) -> ScriptOutput {
        ScriptOutput {
            intro: "intro".into(),
            news_segments: (0..n)
                .map(|i| ScriptSegment::new(format!("seg{}", i), "body", "next"))
                .collect(),
            outro: "outro".into(),
            thumbnail_url: None,
        }
    }

    #[test]
    fn test_merge_is_index_aligned_with_placeholder() {
        let articles = vec![article("a0"), article("a1"), article("a2")];
        let summaries = vec!["s0".to_string(), "s1".to_string()];
        let merged = merge_summaries(&articles, &summaries);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].summary.as_deref(), Some("s0"));
        assert_eq!(merged[1].summary.as_deref(), Some("s1"));
        assert_eq!(merged[2].summary.as_deref(), Some(MISSING_SUMMARY));
        assert_eq!(merged[2].title, "a2");
        assert_eq!(merged[0].url, "https://news/a0");
    }

    #[test]
    fn test_merge_ignores_surplus_and_empty_summaries() {
        let articles = vec![article("a0"), article("a1")];
        let summaries = vec![String::new(), "s1".to_string(), "extra".to_string()];
        let merged = merge_summaries(&articles, &summaries);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].summary.as_deref(), Some(MISSING_SUMMARY));
        assert_eq!(merged[1].summary.as_deref(), Some("s1"));
    }

    #[test]
    fn test_merge_keeps_summary_text_verbatim() {
        let articles = vec![article("a0"), article("a1")];
        let summaries = vec!["  padded text \n".to_string(), "   ".to_string()];
        let merged = merge_summaries(&articles, &summaries);
        assert_eq!(merged[0].summary.as_deref(), Some("  padded text \n"));
        assert_eq!(merged[1].summary.as_deref(), Some("   "));
    }

    #[test]
    fn test_merge_does_not_match_by_content() {
        let articles = vec![article("apple"), article("banana")];
        let summaries = vec!["about banana".to_string(), "about apple".to_string()];
        let merged = merge_summaries(&articles, &summaries);
        assert_eq!(merged[0].summary.as_deref(), Some("about banana"));
    }

    #[test]
    fn test_attach_images_leaves_unselected_segments_untouched() {
        let base = script_with(4);
        let updated = attach_images(
            &base,
            Some("thumb".into()),
            vec![Some("img0".into()), None],
        );

        assert_eq!(updated.thumbnail_url.as_deref(), Some("thumb"));
        assert_eq!(updated.news_segments[0].image_url.as_deref(), Some("img0"));
        assert!(updated.news_segments[1].image_url.is_none());
        assert_eq!(updated.news_segments[2], base.news_segments[2]);
        assert_eq!(updated.news_segments[3], base.news_segments[3]);
        assert_eq!(updated.intro, base.intro);
        // base value is not modified
        assert!(base.thumbnail_url.is_none());
    }

    #[test]
    fn test_replace_script_swaps_arc() {
        let mut acc = ResultAccumulator::new();
        acc.replace_script(script_with(1));
        let first = acc.script().unwrap();
        acc.replace_script(script_with(2));
        let second = acc.script().unwrap();

        assert_eq!(first.news_segments.len(), 1);
        assert_eq!(second.news_segments.len(), 2);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut acc = ResultAccumulator::new();
        acc.replace_articles(vec![article("a")]);
        acc.replace_script(script_with(1));
        let held = acc.articles();
        acc.reset();
        assert!(acc.articles().is_empty());
        assert!(acc.script().is_none());
        assert_eq!(held.len(), 1);
    }
}
