//! Earning-rate extraction from free-text earning rules.
//!
//! Operators enter rules like `"HK$1 = 3 Membership Rewards 積分"` or a bare
//! `"2.5"`. Anything unparseable resolves to 0, which downstream renders as
//! 不適用 rather than erroring.

/// Extract the numeric earning rate (units earned per HK$1) from an
/// earning-rule description. Returns 0 when nothing parseable is found.
pub fn extract_earning_rate(text: &str) -> f64 {
    if let Some(rate) = rate_after_equals(text) {
        return rate;
    }

    let trimmed = text.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return leading_decimal(trimmed);
    }

    0.0
}

/// The first `=` that is followed (after optional whitespace) by a run of
/// digits/dots yields the rate; later equals signs are tried when an earlier
/// one has no number after it.
fn rate_after_equals(text: &str) -> Option<f64> {
    for (index, _) in text.match_indices('=') {
        let rest = text[index + 1..].trim_start();
        let run_len = rest
            .bytes()
            .take_while(|b| b.is_ascii_digit() || *b == b'.')
            .count();
        if run_len > 0 {
            return Some(leading_decimal(&rest[..run_len]));
        }
    }
    None
}

/// Numeric value of the leading decimal in a digits-and-dots run: digits up
/// to a single dot, stopping before a second dot. `"3.5.1"` reads as 3.5,
/// `"..."` as 0.
fn leading_decimal(run: &str) -> f64 {
    let mut end = 0;
    let mut seen_dot = false;
    for byte in run.bytes() {
        match byte {
            b'0'..=b'9' => end += 1,
            b'.' if !seen_dot => {
                seen_dot = true;
                end += 1;
            }
            _ => break,
        }
    }
    run[..end].parse().unwrap_or(0.0)
}
