//! Promotion of heavily listed registrable domains.
//!
//! When more than `threshold` distinct subdomains of one registrable domain
//! are listed, the registrable domain itself becomes the rule and the
//! subdomains are dropped.

use std::collections::{HashMap, HashSet};

/// Default number of subdomains that must be exceeded before promotion.
pub const DEFAULT_THRESHOLD: usize = 100;

/// One promoted registrable domain and how many subdomains it replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizationSuggestion {
    pub domain: String,
    pub removed: usize,
}

/// Output of [`optimize_domains`].
#[derive(Debug, Clone, Default)]
pub struct Optimization {
    pub domains: HashSet<String>,
    /// Sorted by descending `removed`, then by domain.
    pub suggestions: Vec<OptimizationSuggestion>,
}

/// Registrable domain of `domain`: its last two labels.
///
/// Returns `None` for domains with two labels or fewer. Public suffixes
/// spanning several labels (`co.uk`) are not recognised.
///
/// # Examples
/// ```
/// use dnsfold::optimizer::registrable_domain;
/// assert_eq!(registrable_domain("a.b.example.com"), Some("example.com"));
/// assert_eq!(registrable_domain("example.com"), None);
/// ```
pub fn registrable_domain(domain: &str) -> Option<&str> {
    let mut dots = domain.rmatch_indices('.').map(|(idx, _)| idx);
    let _last = dots.next()?;
    let second = dots.next()?;
    Some(&domain[second + 1..])
}

/// Promote registrable domains with more than `threshold` listed subdomains.
///
/// A registrable domain is skipped when it is already listed or appears in
/// `no_optimize`. This is a single pass: promoted domains are not fed back in.
pub fn optimize_domains(
    domains: &HashSet<String>,
    threshold: usize,
    no_optimize: &HashSet<String>,
) -> Optimization {
    let mut subdomain_map: HashMap<&str, Vec<&String>> = HashMap::new();
    for domain in domains {
        if let Some(parent) = registrable_domain(domain) {
            subdomain_map.entry(parent).or_default().push(domain);
        }
    }

    let mut optimized = domains.clone();
    let mut suggestions = Vec::new();

    for (parent, subdomains) in &subdomain_map {
        let count = subdomains.len();
        if count <= threshold || domains.contains(*parent) || no_optimize.contains(*parent) {
            continue;
        }

        for subdomain in subdomains {
            optimized.remove(subdomain.as_str());
        }
        optimized.insert((*parent).to_string());
        suggestions.push(OptimizationSuggestion {
            domain: (*parent).to_string(),
            removed: count,
        });
    }

    suggestions.sort_by(|a, b| b.removed.cmp(&a.removed).then_with(|| a.domain.cmp(&b.domain)));

    Optimization {
        domains: optimized,
        suggestions,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn domain_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-c]{1,2}", 1..5).prop_map(|labels| labels.join("."))
    }

    proptest! {
        /// Domains in the no-optimization set are never introduced
        #[test]
        fn prop_no_optimize_never_added(
            domains in prop::collection::hash_set(domain_strategy(), 0..60),
            no_optimize in prop::collection::hash_set(domain_strategy(), 0..10),
            threshold in 0usize..4
        ) {
            let result = optimize_domains(&domains, threshold, &no_optimize);
            for added in result.domains.difference(&domains) {
                prop_assert!(!no_optimize.contains(added));
            }
        }

        /// Every suggestion is reflected in the output set
        #[test]
        fn prop_suggestions_in_output(
            domains in prop::collection::hash_set(domain_strategy(), 0..60),
            threshold in 0usize..4
        ) {
            let result = optimize_domains(&domains, threshold, &HashSet::new());
            for s in &result.suggestions {
                prop_assert!(result.domains.contains(&s.domain));
                prop_assert!(s.removed > threshold);
            }
        }
    }
}
