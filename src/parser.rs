//! Rule parsing: turns raw source lines into canonical blocked domains.
//!
//! Only the plain `||domain^` form is accepted. Anything carrying paths,
//! extra modifiers or regex syntax is dropped on purpose.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Characters that start an inline comment in the supported list formats.
const COMMENT_MARKERS: [char; 3] = ['!', '#', ';'];

/// Blocking rule prefix.
const RULE_PREFIX: &str = "||";

static RULE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\|\|([\w.*\-]+)\^$").expect("rule pattern is valid"));

/// Parse one raw line into a blocked domain.
///
/// Returns `None` for comments, allow rules, cosmetic filters and any rule
/// that is not a bare `||domain^` once comments and `^$all` are removed.
///
/// # Examples
/// ```
/// use dnsfold::parser::parse_rule;
/// assert_eq!(parse_rule("||ads.example^"), Some("ads.example".to_string()));
/// assert_eq!(parse_rule("||ads.example^$all"), Some("ads.example".to_string()));
/// assert_eq!(parse_rule("! comment"), None);
/// ```
pub fn parse_rule(line: &str) -> Option<String> {
    let line = strip_comment(line);
    if line.is_empty() {
        return None;
    }

    let line = strip_all_modifier(line);
    if !line.starts_with(RULE_PREFIX) {
        return None;
    }

    RULE_PATTERN
        .captures(&line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Wrap a line from a bare-domain source into rule syntax.
///
/// Wrapping happens before comment stripping, so a trailing comment ends up
/// inside the rule and the line is later rejected by [`parse_rule`].
pub fn wrap_bare_domain(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('!') {
        return None;
    }
    if line.starts_with(RULE_PREFIX) {
        Some(line.to_string())
    } else {
        Some(format!("{RULE_PREFIX}{line}^"))
    }
}

/// Parse every line and collect the unique domains.
pub fn collect_domains<I, S>(lines: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| parse_rule(line.as_ref()))
        .collect()
}

fn strip_comment(line: &str) -> &str {
    let line = line.trim();
    match line.find(COMMENT_MARKERS) {
        Some(idx) => line[..idx].trim(),
        None => line,
    }
}

/// `||domain^$all` -> `||domain^`
fn strip_all_modifier(line: &str) -> std::borrow::Cow<'_, str> {
    if line.starts_with(RULE_PREFIX) && line.contains("^$all") {
        if let Some(idx) = line.find("^$") {
            return format!("{}^", &line[..idx]).into();
        }
    }
    line.into()
}
