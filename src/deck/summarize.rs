/// Default maximum number of fragments (bullet slides) per article.
pub const DEFAULT_MAX_FRAGMENTS: usize = 4;

/// Split free text into at most `max_fragments` sentence-like fragments.
///
/// Whitespace runs collapse to a single space. A boundary is a `.`, `!` or `?` immediately
/// followed by whitespace; the punctuation stays with the sentence it ends. Text without such a
/// boundary yields a single fragment.
pub fn summarize(text: &str, max_fragments: usize) -> Vec<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut out = Vec::new();
    let mut current = String::new();
    let mut chars = collapsed.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary =
            matches!(c, '.' | '!' | '?') && chars.peek().is_some_and(|n| n.is_whitespace());
        if at_boundary {
            push_fragment(&mut out, &current);
            current.clear();
        }
    }
    push_fragment(&mut out, &current);

    out.truncate(max_fragments);
    out
}

fn push_fragment(out: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/deck/summarize.rs"]
mod tests;
