//! FILENAME: field-format/src/number.rs
//! PURPOSE: Canonical numeric rendering and lenient numeric parsing.
//! CONTEXT: Hosts accept numeric field writes only in one canonical shape
//! (no grouping separators, fixed decimals for money). Reads may come back
//! with grouping separators or a trailing percent sign, so parsing is lenient.

/// Render with exactly `decimal_places` decimals.
pub fn format_fixed(value: f64, decimal_places: u8) -> String {
    let rendered = format!("{:.prec$}", value, prec = decimal_places as usize);
    normalize_negative_zero(rendered)
}

/// Render with at most `max_decimals` decimals, trimming trailing zeros.
pub fn format_trimmed(value: f64, max_decimals: u8) -> String {
    let fixed = format_fixed(value, max_decimals);
    if !fixed.contains('.') {
        return fixed;
    }
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Render a float without exponent notation, up to 10 decimals.
pub fn format_general(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    // For integers, don't show decimal point
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{:.0}", value);
    }

    format_trimmed(value, 10)
}

/// Round half away from zero, the way host integer fields do.
pub fn format_integer(value: f64) -> String {
    normalize_negative_zero(format!("{:.0}", value.round()))
}

/// Parse a host-rendered number: strips grouping commas, surrounding
/// whitespace and a trailing `%`. Accounting negatives "(12.00)" are accepted.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();

    let (negative, body) = match trimmed
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
    {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };

    let digits: String = body.chars().filter(|c| *c != ',').collect();
    if digits.is_empty() {
        return None;
    }

    let parsed: f64 = digits.parse().ok()?;
    if !parsed.is_finite() {
        return None;
    }
    Some(if negative { -parsed } else { parsed })
}

fn normalize_negative_zero(rendered: String) -> String {
    match rendered.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => rendered,
    }
}
