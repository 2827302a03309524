//! Link extraction and filtering rules.

use url::Url;
use website_fetch::LinkExtractor;

fn page_url() -> Url {
    Url::parse("https://example.com/docs/intro").unwrap()
}

fn extractor() -> LinkExtractor {
    LinkExtractor::new(&[], &[], None, true).unwrap()
}

fn urls(links: &[website_fetch::ExtractedLink]) -> Vec<&str> {
    links.iter().map(|l| l.url.as_str()).collect()
}

#[test]
fn skips_fragments_empty_and_special_schemes() {
    let html = r##"
        <a href="">empty</a>
        <a href="   ">blank</a>
        <a href="#section">fragment</a>
        <a href="mailto:x@example.com">mail</a>
        <a href="JavaScript:void(0)">js</a>
        <a href="tel:+123">phone</a>
        <a href="data:text/plain,hi">data</a>
        <a href="/docs/real">real</a>
    "##;
    let links = extractor().extract(html, &page_url());
    assert_eq!(urls(&links), vec!["https://example.com/docs/real"]);
}

#[test]
fn resolves_relative_and_strips_query_and_fragment() {
    let html = r#"<a href="guide?lang=en#top">guide</a>"#;
    let links = extractor().extract(html, &page_url());
    assert_eq!(urls(&links), vec!["https://example.com/docs/guide"]);
}

#[test]
fn same_domain_requires_exact_host() {
    let html = r#"
        <a href="https://example.com/here">same</a>
        <a href="https://sub.example.com/there">subdomain</a>
        <a href="https://other.com/elsewhere">other</a>
    "#;
    let links = extractor().extract(html, &page_url());
    assert_eq!(urls(&links), vec!["https://example.com/here"]);
}

#[test]
fn cross_domain_allowed_when_flag_off() {
    let html = r#"<a href="https://other.com/x">x</a>"#;
    let permissive = LinkExtractor::new(&[], &[], None, false).unwrap();
    assert_eq!(
        urls(&permissive.extract(html, &page_url())),
        vec!["https://other.com/x"]
    );
}

#[test]
fn dedupes_by_absolute_url_keeping_first() {
    let html = r#"
        <a href="/a">first</a>
        <a href="/a#sec">same after normalization</a>
        <a href="/a?x=1">same again</a>
        <a href="/b">second</a>
    "#;
    let links = extractor().extract(html, &page_url());
    assert_eq!(
        urls(&links),
        vec!["https://example.com/a", "https://example.com/b"]
    );
    assert_eq!(links[0].text, "first");
}

#[test]
fn path_prefix_matches_at_boundary() {
    let html = r#"
        <a href="/docs">exact</a>
        <a href="/docs/guide">child</a>
        <a href="/docsy">lookalike</a>
        <a href="/other">outside</a>
    "#;
    let prefixed = LinkExtractor::new(&[], &[], Some("/docs"), true).unwrap();
    let links = prefixed.extract(html, &page_url());
    assert_eq!(
        urls(&links),
        vec!["https://example.com/docs", "https://example.com/docs/guide"]
    );
}

#[test]
fn path_prefix_gets_leading_slash() {
    let html = r#"<a href="/docs/guide">child</a>"#;
    let prefixed = LinkExtractor::new(&[], &[], Some("docs"), true).unwrap();
    assert_eq!(prefixed.extract(html, &page_url()).len(), 1);
}

#[test]
fn include_and_exclude_globs() {
    let html = r#"
        <a href="/docs/api/one">api</a>
        <a href="/docs/api/internal/two">internal</a>
        <a href="/blog/post">blog</a>
    "#;
    let filtered = LinkExtractor::new(
        &["/docs/**".to_string()],
        &["/docs/api/internal/**".to_string()],
        None,
        true,
    )
    .unwrap();
    let links = filtered.extract(html, &page_url());
    assert_eq!(urls(&links), vec!["https://example.com/docs/api/one"]);
}

#[test]
fn context_comes_from_nearest_block_ancestor() {
    let html = r#"
        <p>The <a href="/styled">styled link</a> sits in a paragraph
        that explains what it points at.</p>
    "#;
    let links = extractor().extract(html, &page_url());
    assert_eq!(links.len(), 1);
    assert!(links[0].context.starts_with("The styled link sits in a paragraph"));
    assert_eq!(links[0].text, "styled link");
}

#[test]
fn context_is_truncated_to_200_chars() {
    let filler = "word ".repeat(100);
    let html = format!(r#"<p>{filler}<a href="/x">x</a></p>"#);
    let links = extractor().extract(&html, &page_url());
    assert_eq!(links[0].context.chars().count(), 200);
}

#[test]
fn anchor_text_is_collapsed() {
    let html = "<a href=\"/x\">  spaced \n\t out  </a>";
    let links = extractor().extract(html, &page_url());
    assert_eq!(links[0].text, "spaced out");
}
