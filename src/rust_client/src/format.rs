//! Display helpers for amounts and durations

use std::num::ParseFloatError;

/// Decimals of most SPL tokens
pub const DEFAULT_TOKEN_DECIMALS: u8 = 9;

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_MINUTE: i64 = 60;

/// Renders a countdown such as `1d 1h` or `5m 3s`.
///
/// Seconds are dropped once the countdown is at least a day long, and
/// anything at or below zero reads `Unlockable`.
pub fn format_time_remaining(seconds: i64) -> String {
    if seconds <= 0 {
        return "Unlockable".to_string();
    }

    let days = seconds / SECONDS_PER_DAY;
    let hours = (seconds % SECONDS_PER_DAY) / SECONDS_PER_HOUR;
    let minutes = (seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let secs = seconds % SECONDS_PER_MINUTE;

    let mut parts = Vec::with_capacity(4);
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if secs > 0 && days == 0 {
        parts.push(format!("{}s", secs));
    }

    join_parts(&parts)
}

fn join_parts(parts: &[String]) -> String {
    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}

/// Scales a smallest-unit amount to a decimal string with `decimals` digits
pub fn format_token_amount(amount: u64, decimals: u8) -> String {
    let scaled = amount as f64 / 10f64.powi(decimals as i32);
    format!("{:.*}", decimals as usize, scaled)
}

/// Parses a decimal string into the smallest unit, rounding down.
///
/// Goes through `f64`, so very large or very precise values lose precision.
pub fn parse_token_amount(amount: &str, decimals: u8) -> Result<u64, ParseFloatError> {
    let value: f64 = amount.trim().parse()?;
    Ok((value * 10f64.powi(decimals as i32)).floor() as u64)
}
