//! The core pipeline: parse, exclude, collapse, optimize.
//!
//! Everything here is synchronous and works on complete inputs. Collapsing
//! depends on a global ordering by depth, so nothing is streamed.

use std::collections::HashSet;

use crate::collapse::remove_subdomains;
use crate::config::SourceKind;
use crate::fetcher::SourceLines;
use crate::filter::{apply_exclusions, ExcludeSet};
use crate::optimizer::{optimize_domains, OptimizationSuggestion};
use crate::parser::{collect_domains, wrap_bare_domain};

/// Counts reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub sources_total: usize,
    pub sources_failed: usize,
    /// Lines downloaded, before any filtering
    pub downloaded: usize,
    /// Distinct domains accepted by the parser
    pub unique: usize,
    pub after_exclusion: usize,
    pub after_collapse: usize,
    /// Rules in the generated list
    pub final_count: usize,
    /// Registrable domains promoted by the optimizer
    pub optimized: usize,
}

/// Allow-list and no-optimization list for one run
#[derive(Debug, Clone, Default)]
pub struct FilterLists {
    pub exclude: ExcludeSet,
    pub no_optimize: HashSet<String>,
}

/// Result of [`build_blocklist`]
#[derive(Debug, Clone, Default)]
pub struct BlocklistResult {
    pub domains: HashSet<String>,
    pub suggestions: Vec<OptimizationSuggestion>,
    pub summary: RunSummary,
}

/// Rule lines of every source, with bare-domain sources wrapped into rule syntax.
pub fn rule_lines(sources: &[SourceLines]) -> Vec<String> {
    let mut lines = Vec::new();
    for source in sources {
        match source.kind {
            SourceKind::Rules => lines.extend(source.lines.iter().cloned()),
            SourceKind::Domains => {
                lines.extend(source.lines.iter().filter_map(|l| wrap_bare_domain(l)))
            }
        }
    }
    lines
}

/// Turn downloaded source lines into the final domain set and report.
pub fn build_blocklist(
    sources: &[SourceLines],
    lists: &FilterLists,
    threshold: usize,
) -> BlocklistResult {
    let downloaded = sources.iter().map(|s| s.lines.len()).sum();

    let all_domains = collect_domains(rule_lines(sources));
    let filtered = apply_exclusions(&all_domains, &lists.exclude);
    let collapsed = remove_subdomains(&filtered);
    let optimization = optimize_domains(&collapsed, threshold, &lists.no_optimize);

    let summary = RunSummary {
        sources_total: sources.len(),
        sources_failed: sources.iter().filter(|s| !s.fetched).count(),
        downloaded,
        unique: all_domains.len(),
        after_exclusion: filtered.len(),
        after_collapse: collapsed.len(),
        final_count: optimization.domains.len(),
        optimized: optimization.suggestions.len(),
    };

    BlocklistResult {
        domains: optimization.domains,
        suggestions: optimization.suggestions,
        summary,
    }
}
