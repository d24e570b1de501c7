use std::collections::HashSet;
use std::io::Read as _;
use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;

use crate::article::item::NewsItem;
use crate::foundation::error::{NewsreelError, NewsreelResult};

/// Default number of items kept in a listing.
pub const DEFAULT_LISTING_CAP: usize = 50;

/// Source label whose items must mention an AI keyword to be kept.
const KEYWORD_FILTERED_SOURCE: &str = "Product Hunt";
const AI_KEYWORDS: &[&str] = &["ai", "gpt", "copilot", "llm", "agent", "ml"];

const MAX_LISTING_BYTES: u64 = 16 * 1024 * 1024;

/// Response body of the feed aggregator's `GET` endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FeedListing {
    /// Articles, newest first.
    pub items: Vec<NewsItem>,
}

/// Filter, sort, deduplicate and cap raw aggregated items.
///
/// Sorting is by descending publication time; items with unparsable dates keep their relative
/// order after all dated items. Deduplication keeps the first (newest) item per `link`.
pub fn normalize_listing(items: Vec<NewsItem>, cap: usize) -> Vec<NewsItem> {
    let mut items: Vec<NewsItem> = items.into_iter().filter(passes_keyword_filter).collect();

    items.sort_by(|a, b| match (a.published_at(), b.published_at()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let mut seen = HashSet::<String>::new();
    items.retain(|it| seen.insert(it.link.clone()));
    items.truncate(cap);
    items
}

fn passes_keyword_filter(item: &NewsItem) -> bool {
    if item.source != KEYWORD_FILTERED_SOURCE {
        return true;
    }
    item.title
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .any(|word| AI_KEYWORDS.iter().any(|k| word.eq_ignore_ascii_case(k)))
}

/// Case-insensitive substring search over title, source, summary and link.
///
/// A blank query matches everything.
pub fn search<'a>(items: &'a [NewsItem], query: &str) -> Vec<&'a NewsItem> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|it| {
            [
                it.title.as_str(),
                it.source.as_str(),
                it.summary.as_deref().unwrap_or(""),
                it.link.as_str(),
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&q))
        })
        .collect()
}

/// Read a listing from a local JSON file or an `http(s)` URL.
#[tracing::instrument]
pub fn load_listing(source: &str) -> NewsreelResult<FeedListing> {
    let body = if source.starts_with("http://") || source.starts_with("https://") {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(10))
            .build();
        let resp = agent
            .get(source)
            .call()
            .map_err(|e| NewsreelError::validation(format!("fetch listing '{source}': {e}")))?;
        let mut body = String::new();
        resp.into_reader()
            .take(MAX_LISTING_BYTES)
            .read_to_string(&mut body)
            .with_context(|| format!("read listing body from '{source}'"))?;
        body
    } else {
        let path = Path::new(source);
        std::fs::read_to_string(path)
            .with_context(|| format!("read listing '{}'", path.display()))?
    };

    let listing: FeedListing = serde_json::from_str(&body)?;
    tracing::debug!(items = listing.items.len(), "loaded listing");
    Ok(listing)
}

#[cfg(test)]
#[path = "../../tests/unit/article/feed.rs"]
mod tests;
