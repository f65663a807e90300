//! Reference Lists
//!
//! The two on-disk inputs read once at analysis start: the suspicious-domain
//! blacklist and the sockpuppet watchlist. Both accept plain line-per-entry
//! files or simple CSV (the blacklist honors a `domain` column, the
//! watchlist takes the first column).

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::config::ListsConfig;
use crate::types::Result;

/// External knowledge loaded at analysis start
#[derive(Debug, Default, Clone)]
pub struct ReferenceLists {
    /// Lowercased domains matched by substring against reference hosts
    blacklist: Vec<String>,
    /// Exact-match usernames
    sockpuppets: HashSet<String>,
}

impl ReferenceLists {
    /// Load both lists from the configured locations; an unset path yields
    /// an empty list (and the corresponding metric scores 0.0 everywhere).
    pub fn load(config: &ListsConfig) -> Result<Self> {
        let blacklist = match &config.blacklist {
            Some(path) => load_column(path, "domain")?
                .into_iter()
                .map(|d| d.to_lowercase())
                .collect(),
            None => Vec::new(),
        };
        let sockpuppets: HashSet<String> = match &config.sockpuppets {
            Some(path) => load_column(path, "username")?.into_iter().collect(),
            None => HashSet::new(),
        };
        if !blacklist.is_empty() {
            info!(domains = blacklist.len(), "loaded domain blacklist");
        }
        if !sockpuppets.is_empty() {
            info!(users = sockpuppets.len(), "loaded sockpuppet watchlist");
        }
        Ok(Self {
            blacklist,
            sockpuppets,
        })
    }

    #[cfg(test)]
    pub fn from_parts(blacklist: Vec<String>, sockpuppets: HashSet<String>) -> Self {
        Self {
            blacklist: blacklist.into_iter().map(|d| d.to_lowercase()).collect(),
            sockpuppets,
        }
    }

    /// Whether `host` belongs to a blacklisted domain (case-insensitive
    /// substring match, so `www.breitbart.com` matches `breitbart.com`)
    pub fn is_blacklisted_host(&self, host: &str) -> bool {
        let host = host.to_lowercase();
        self.blacklist.iter().any(|domain| host.contains(domain))
    }

    pub fn has_blacklist(&self) -> bool {
        !self.blacklist.is_empty()
    }

    pub fn is_sockpuppet(&self, username: &str) -> bool {
        self.sockpuppets.contains(username)
    }

    pub fn has_sockpuppets(&self) -> bool {
        !self.sockpuppets.is_empty()
    }
}

/// Read one column from a line-oriented file. CSV rows take the column
/// named in the header when present, the first field otherwise; plain
/// files contribute whole lines.
fn load_column(path: &Path, column: &str) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    let mut lines = content.lines();

    let mut column_idx = 0;
    let mut first_entry: Option<String> = None;
    if let Some(header) = lines.next() {
        let fields: Vec<&str> = header.split(',').map(str::trim).collect();
        match fields.iter().position(|f| f.eq_ignore_ascii_case(column)) {
            Some(idx) => column_idx = idx,
            // not a header row, keep it as data
            None => first_entry = extract_field(header, 0),
        }
    }

    let mut entries: Vec<String> = first_entry.into_iter().collect();
    for line in lines {
        if let Some(entry) = extract_field(line, column_idx) {
            entries.push(entry);
        }
    }
    Ok(entries)
}

fn extract_field(line: &str, idx: usize) -> Option<String> {
    let field = line.split(',').nth(idx)?.trim();
    if field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn test_plain_line_blacklist() {
        let file = write_file("breitbart.com\nRT.com\n\n");
        let lists = ReferenceLists::load(&ListsConfig {
            blacklist: Some(file.path().to_path_buf()),
            sockpuppets: None,
        })
        .unwrap();
        assert!(lists.is_blacklisted_host("www.breitbart.com"));
        assert!(lists.is_blacklisted_host("rt.com"));
        assert!(!lists.is_blacklisted_host("lemonde.fr"));
    }

    #[test]
    fn test_csv_blacklist_with_domain_column() {
        let file = write_file("id,domain,notes\n1,breitbart.com,far-right\n2,rt.com,state\n");
        let lists = ReferenceLists::load(&ListsConfig {
            blacklist: Some(file.path().to_path_buf()),
            sockpuppets: None,
        })
        .unwrap();
        assert!(lists.is_blacklisted_host("breitbart.com"));
        assert!(!lists.is_blacklisted_host("far-right"));
    }

    #[test]
    fn test_sockpuppet_first_column() {
        let file = write_file("username,case\nJeanDupont2024,affaire-x\nTrollFarm99,affaire-y\n");
        let lists = ReferenceLists::load(&ListsConfig {
            blacklist: None,
            sockpuppets: Some(file.path().to_path_buf()),
        })
        .unwrap();
        assert!(lists.is_sockpuppet("JeanDupont2024"));
        assert!(!lists.is_sockpuppet("jeandupont2024"), "exact match only");
    }

    #[test]
    fn test_headerless_csv_keeps_first_row() {
        let file = write_file("breitbart.com,note\nrt.com,note\n");
        let lists = ReferenceLists::load(&ListsConfig {
            blacklist: Some(file.path().to_path_buf()),
            sockpuppets: None,
        })
        .unwrap();
        assert!(lists.is_blacklisted_host("breitbart.com"));
        assert!(lists.is_blacklisted_host("rt.com"));
    }

    #[test]
    fn test_unset_paths_yield_empty_lists() {
        let lists = ReferenceLists::load(&ListsConfig::default()).unwrap();
        assert!(!lists.has_blacklist());
        assert!(!lists.has_sockpuppets());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = ReferenceLists::load(&ListsConfig {
            blacklist: Some("/nonexistent/blacklist.csv".into()),
            sockpuppets: None,
        });
        assert!(result.is_err());
    }
}
