use crate::foundation::error::{NewsreelError, NewsreelResult};

/// One article record as supplied by the feed aggregator.
///
/// Immutable for the lifetime of a recording session.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NewsItem {
    /// Headline.
    pub title: String,
    /// Absolute article URL.
    pub link: String,
    /// Publisher label, e.g. `TechCrunch AI`.
    pub source: String,
    /// Publication timestamp as delivered by the feed (usually RFC 3339).
    pub date: String,
    /// Optional free-text summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Optional thumbnail URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl NewsItem {
    /// Hostname of `link` with a leading `www.` stripped.
    pub fn display_domain(&self) -> NewsreelResult<String> {
        let url = url::Url::parse(&self.link).map_err(|e| {
            NewsreelError::validation(format!("article link '{}' is not a URL: {e}", self.link))
        })?;
        let host = url.host_str().ok_or_else(|| {
            NewsreelError::validation(format!("article link '{}' has no host", self.link))
        })?;
        Ok(host.strip_prefix("www.").unwrap_or(host).to_string())
    }

    /// Parsed publication time, if `date` is RFC 3339 or RFC 2822.
    pub fn published_at(&self) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        let raw = self.date.trim();
        chrono::DateTime::parse_from_rfc3339(raw)
            .or_else(|_| chrono::DateTime::parse_from_rfc2822(raw))
            .ok()
    }

    /// Short `M/D/YYYY` date for captions, or the raw `date` when it does not parse.
    pub fn date_label(&self) -> String {
        match self.published_at() {
            Some(t) => t.format("%-m/%-d/%Y").to_string(),
            None => self.date.clone(),
        }
    }

    /// Text the bullet slides are cut from: the summary, or the title when there is none.
    pub fn summary_source(&self) -> &str {
        match self.summary.as_deref() {
            Some(s) if !s.trim().is_empty() => s,
            _ => &self.title,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/article/item.rs"]
mod tests;
