//! Display and parsing helpers for reports and stored values

use chrono::NaiveDate;

/// Format an amount as Ethiopian Birr, e.g. `ETB 12,345.60`.
///
/// Non-finite values render as `ETB 0.00`.
pub fn format_etb(value: f64) -> String {
    if !value.is_finite() {
        return "ETB 0.00".to_string();
    }

    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}ETB {grouped}.{cents}")
}

/// `YYYY-MM-DD`, or `-` when there is no date
pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => "-".to_string(),
    }
}

/// Trim, lowercase, then uppercase the first letter of every word
pub fn capitalize_words(text: &str) -> String {
    let lower = text.trim().to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut at_word_start = true;

    for ch in lower.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.push(ch);
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}
