//! Allow-list filtering.

use std::collections::HashSet;

/// Domains that must never appear in the output, together with all of their
/// subdomains.
#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
    entries: HashSet<String>,
}

impl ExcludeSet {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if `domain` equals an entry or ends with `.` + entry.
    ///
    /// Looks up every suffix that follows a `.` instead of scanning all
    /// entries, which gives the same answer as the naive `ends_with` check.
    pub fn is_excluded(&self, domain: &str) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        if self.entries.contains(domain) {
            return true;
        }
        domain
            .match_indices('.')
            .any(|(idx, _)| self.entries.contains(&domain[idx + 1..]))
    }
}

/// Remove every excluded domain.
pub fn apply_exclusions(domains: &HashSet<String>, exclude: &ExcludeSet) -> HashSet<String> {
    domains
        .iter()
        .filter(|domain| !exclude.is_excluded(domain))
        .cloned()
        .collect()
}
