//! Formatting helpers for log and console output.

/// Compact count for log lines: `950`, `1.5K`, `2.3M`.
///
/// # Examples
/// ```
/// use dnsfold::utils::format_count;
/// assert_eq!(format_count(950), "950");
/// assert_eq!(format_count(1500), "1.5K");
/// assert_eq!(format_count(2_300_000), "2.3M");
/// ```
pub fn format_count(count: usize) -> String {
    match count {
        c if c >= 1_000_000 => format!("{:.1}M", c as f64 / 1e6),
        c if c >= 1_000 => format!("{:.1}K", c as f64 / 1e3),
        c => c.to_string(),
    }
}

/// Exact count with thousands separators, used in the run summary.
///
/// # Examples
/// ```
/// use dnsfold::utils::format_count_with_separator;
/// assert_eq!(format_count_with_separator(1234567), "1,234,567");
/// ```
pub fn format_count_with_separator(n: usize) -> String {
    let digits = n.to_string();
    let first = digits.len() % 3;
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - first) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Downloaded size in binary units.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Shorten `s` to at most `max_len` characters.
///
/// A cut string ends in `...` unless `max_len` is below 3, in which case it
/// is simply clipped.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len < 3 {
        return s.chars().take(max_len).collect();
    }
    let mut out: String = s.chars().take(max_len - 3).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1.0K");
        assert_eq!(format_count(45_600), "45.6K");
        assert_eq!(format_count(1_000_000), "1.0M");
        assert_eq!(format_count(12_345_678), "12.3M");
    }

    #[test]
    fn test_format_count_with_separator() {
        assert_eq!(format_count_with_separator(0), "0");
        assert_eq!(format_count_with_separator(999), "999");
        assert_eq!(format_count_with_separator(1000), "1,000");
        assert_eq!(format_count_with_separator(12345), "12,345");
        assert_eq!(format_count_with_separator(123456), "123,456");
        assert_eq!(format_count_with_separator(1234567), "1,234,567");
        assert_eq!(format_count_with_separator(1234567890), "1,234,567,890");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1_500_000), "1.4 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hagezi_pro", 20), "hagezi_pro");
        assert_eq!(truncate("shadowwhisperer_malware", 12), "shadowwhi...");
    }

    #[test]
    fn test_truncate_never_exceeds_max_len() {
        assert_eq!(truncate("abcdef", 2), "ab");
        assert_eq!(truncate("abcdef", 0), "");
        assert_eq!(truncate("abcdef", 3), "...");
        assert_eq!(truncate("abcdef", 4), "a...");
        for max_len in 0..8 {
            assert!(truncate("abcdef", max_len).chars().count() <= max_len);
        }
    }
}
