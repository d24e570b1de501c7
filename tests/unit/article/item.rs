use super::*;

fn item(link: &str, date: &str) -> NewsItem {
    NewsItem {
        title: "OpenAI launches X".to_string(),
        link: link.to_string(),
        source: "TechCrunch AI".to_string(),
        date: date.to_string(),
        summary: None,
        image: None,
    }
}

#[test]
fn display_domain_strips_www_and_path() {
    let it = item("https://www.theverge.com/article", "");
    assert_eq!(it.display_domain().unwrap(), "theverge.com");
}

#[test]
fn display_domain_keeps_other_subdomains() {
    let it = item("https://blog.example.com/a?b=c", "");
    assert_eq!(it.display_domain().unwrap(), "blog.example.com");
}

#[test]
fn display_domain_rejects_relative_links() {
    let it = item("#", "");
    assert!(matches!(
        it.display_domain(),
        Err(NewsreelError::Validation(_))
    ));
}

#[test]
fn date_label_formats_rfc3339_and_rfc2822() {
    assert_eq!(
        item("https://a.b", "2025-03-07T10:00:00Z").date_label(),
        "3/7/2025"
    );
    assert_eq!(
        item("https://a.b", "Fri, 07 Mar 2025 10:00:00 +0000").date_label(),
        "3/7/2025"
    );
}

#[test]
fn date_label_passes_through_unparsable() {
    assert_eq!(item("https://a.b", "yesterday").date_label(), "yesterday");
}

#[test]
fn summary_source_falls_back_to_title() {
    let mut it = item("https://a.b", "");
    assert_eq!(it.summary_source(), "OpenAI launches X");
    it.summary = Some("   ".to_string());
    assert_eq!(it.summary_source(), "OpenAI launches X");
    it.summary = Some("It does Y.".to_string());
    assert_eq!(it.summary_source(), "It does Y.");
}

#[test]
fn deserializes_feed_shape_without_optionals() {
    let it: NewsItem = serde_json::from_str(
        r#"{"title":"t","link":"https://x.y/z","source":"s","date":"2025-01-01T00:00:00Z"}"#,
    )
    .unwrap();
    assert_eq!(it.summary, None);
    assert_eq!(it.image, None);
}
