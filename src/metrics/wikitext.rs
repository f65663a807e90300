//! Wikitext Scanning
//!
//! Shared helpers over raw article markup: `<ref>` counting and block
//! extraction, reference URL/host harvesting, citation-needed template
//! matching, and the username classifiers for anonymous traffic.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::tables;

/// Opening `<ref>` tag, with or without attributes
static REF_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<ref[ >]").expect("valid regex"));

/// `<ref>...</ref>` block bodies (self-closing refs carry no URLs)
static REF_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<ref[^>/]*>(.*?)</ref>").expect("valid regex"));

static URL_IN_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"]+"#).expect("valid regex"));

/// Temporary account: `~` + four-digit year + at least two hyphen-joined
/// groups of 1–5 digits (`~2025-00001-0`)
static TEMP_ACCOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^~\d{4}-\d{1,5}(-\d{1,5})+$").expect("valid regex"));

static IP_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,3}\.){3}\d{1,3}$|^([0-9a-fA-F]{0,4}:){1,7}[0-9a-fA-F]{0,4}$")
        .expect("valid regex")
});

/// Number of `<ref>` occurrences in the article
pub fn count_refs(wikitext: &str) -> usize {
    REF_TAG.find_iter(wikitext).count()
}

/// Number of "citation needed" template calls for the given edition
pub fn count_citation_needed(wikitext: &str, lang: &str) -> usize {
    let templates = tables::citation_templates(lang);
    let alternation = templates
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r"(?i)\{{\{{\s*(?:{alternation})\b[^}}]*\}}\}}");
    match Regex::new(&pattern) {
        Ok(re) => re.find_iter(wikitext).count(),
        Err(_) => 0,
    }
}

/// All URLs cited inside `<ref>` blocks, in document order
pub fn reference_urls(wikitext: &str) -> Vec<String> {
    REF_BLOCK
        .captures_iter(wikitext)
        .flat_map(|cap| {
            URL_IN_TEXT
                .find_iter(cap.get(1).map_or("", |m| m.as_str()))
                .map(|m| m.as_str().to_string())
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Lowercased host names of all reference URLs; unparseable URLs are
/// skipped.
pub fn reference_hosts(wikitext: &str) -> Vec<String> {
    reference_urls(wikitext)
        .iter()
        .filter_map(|raw| Url::parse(raw).ok())
        .filter_map(|url| url.host_str().map(|h| h.to_lowercase()))
        .collect()
}

/// MediaWiki temporary account (`~YYYY-…`)
pub fn is_temporary_account(username: &str) -> bool {
    TEMP_ACCOUNT.is_match(username)
}

/// Bare IPv4/IPv6 username, i.e. an unregistered editor
pub fn is_ip_address(username: &str) -> bool {
    IP_ADDRESS.is_match(username)
}
