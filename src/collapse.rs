//! Subdomain collapsing: drop domains already covered by a blocked parent.

use std::collections::HashSet;

/// Number of `.`-separated labels in a domain.
pub fn label_count(domain: &str) -> usize {
    domain.split('.').count()
}

/// Every proper parent of `domain`, from the immediate parent up to the
/// top-level label.
///
/// # Examples
/// ```
/// use dnsfold::collapse::parents;
/// let p: Vec<_> = parents("a.b.example.com").collect();
/// assert_eq!(p, vec!["b.example.com", "example.com", "com"]);
/// ```
pub fn parents(domain: &str) -> impl Iterator<Item = &str> {
    domain
        .match_indices('.')
        .map(move |(idx, _)| &domain[idx + 1..])
}

/// Keep only domains that are not strict subdomains of another domain in
/// the set.
///
/// Domains are visited from shallowest to deepest so every possible parent
/// is already decided when a child is checked.
pub fn remove_subdomains(domains: &HashSet<String>) -> HashSet<String> {
    let mut ordered: Vec<&String> = domains.iter().collect();
    ordered.sort_by(|a, b| {
        label_count(a)
            .cmp(&label_count(b))
            .then_with(|| a.cmp(b))
    });

    let mut kept: HashSet<String> = HashSet::with_capacity(domains.len());
    for domain in ordered {
        if !parents(domain).any(|parent| kept.contains(parent)) {
            kept.insert(domain.clone());
        }
    }
    kept
}
