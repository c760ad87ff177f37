//! Lenient parsing for browser-submitted form fields.

/// Parse the leading integer of `input` the way HTML forms are usually
/// read: surrounding whitespace is ignored, an optional sign is accepted,
/// and parsing stops at the first non-digit (`"12kg"` reads as 12).
///
/// Returns `None` when no digits lead the input.
pub fn parse_leading_int(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let value: i64 = rest[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Trimmed, non-empty text or `None`.
pub fn non_empty(input: Option<&str>) -> Option<&str> {
    input.map(str::trim).filter(|s| !s.is_empty())
}

/// Wrap user text in `%...%`, escaping LIKE wildcards with a backslash.
pub fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
