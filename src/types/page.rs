//! Page Resolution
//!
//! Turns raw user input (bare titles or full Wikipedia URLs, possibly from
//! different language editions) into normalized [`PageInfo`] records keyed
//! by a stable `unique_key`.
//!
//! Resolution never fails: anything that does not look like a Wikipedia
//! article URL is passed through verbatim with the default language.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use url::Url;

/// Separator between title and language in the unique key
pub const KEY_SEPARATOR: &str = "___";

/// A resolved input page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// The raw user-supplied string (URL or bare title)
    pub original_input: String,
    /// Human-readable title: spaces instead of underscores, percent-decoded
    pub clean_title: String,
    /// Two-letter wiki edition code (`fr`, `en`, ...)
    pub language: String,
    /// `clean_title + "___" + language`; row key in the metric matrix
    pub unique_key: String,
}

impl PageInfo {
    fn new(original_input: &str, clean_title: String, language: String) -> Self {
        let unique_key = format!("{clean_title}{KEY_SEPARATOR}{language}");
        Self {
            original_input: original_input.to_string(),
            clean_title,
            language,
            unique_key,
        }
    }
}

/// Extract `(clean_title, language)` from a Wikipedia article URL.
///
/// Accepts `https://{lang}.wikipedia.org/wiki/{Title}`; returns `None` for
/// anything else (other hosts, missing `/wiki/` segment, unparseable URLs).
fn parse_article_url(input: &str) -> Option<(String, String)> {
    if !input.starts_with("http") {
        return None;
    }
    let url = Url::parse(input).ok()?;
    let host = url.host_str()?;
    if !host.ends_with(".wikipedia.org") {
        return None;
    }
    let language = host.split('.').next()?.to_string();
    if language.is_empty() {
        return None;
    }
    let raw_title = url.path().strip_prefix("/wiki/")?;
    if raw_title.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(raw_title).ok()?;
    let clean_title = decoded.replace('_', " ");
    Some((clean_title, language))
}

/// Resolve one input string into a [`PageInfo`]
pub fn resolve(input: &str, default_language: &str) -> PageInfo {
    match parse_article_url(input) {
        Some((clean_title, language)) => PageInfo::new(input, clean_title, language),
        None => PageInfo::new(input, input.to_string(), default_language.to_string()),
    }
}

/// Resolve a whole input list, collapsing duplicate `unique_key`s while
/// preserving first-seen order.
pub fn resolve_pages(inputs: &[String], default_language: &str) -> Vec<PageInfo> {
    let mut seen: HashMap<String, ()> = HashMap::with_capacity(inputs.len());
    let mut pages = Vec::with_capacity(inputs.len());
    for input in inputs {
        let page = resolve(input, default_language);
        if seen.insert(page.unique_key.clone(), ()).is_none() {
            pages.push(page);
        }
    }
    pages
}

/// Pick a default language by majority vote over the URL-derived inputs.
///
/// Bare titles carry no language information and do not vote. Ties break
/// toward the lexicographically smaller code so the choice is stable.
pub fn detect_language(inputs: &[String]) -> Option<String> {
    let mut votes: HashMap<String, usize> = HashMap::new();
    for input in inputs {
        if let Some((_, lang)) = parse_article_url(input) {
            *votes.entry(lang).or_insert(0) += 1;
        }
    }
    votes
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(lang, _)| lang)
}
