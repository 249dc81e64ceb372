use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

// Clamp holdings to the non-negative range
pub fn coerce_holdings(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

// Holdings from a float; NaN and infinities become zero
pub fn holdings_from_f64(value: f64) -> Decimal {
    Decimal::from_f64(value)
        .map(coerce_holdings)
        .unwrap_or(Decimal::ZERO)
}

// Parse user-entered holdings, e.g. "1,250.5", "0.75", "2e-3".
// Anything that is not a number, or is negative, yields zero.
pub fn parse_holdings(input: &str) -> Decimal {
    lazy_static! {
        static ref RE: Regex =
            Regex::new(r"^[+-]?(\d[\d,_]*(\.\d+)?|\.\d+)([eE][+-]?\d+)?$").unwrap();
    }

    let trimmed = input.trim();
    if !RE.is_match(trimmed) {
        debug!("Holdings input {:?} is not numeric, using 0", input);
        return Decimal::ZERO;
    }

    let mut normalized: String = trimmed
        .chars()
        .filter(|c| *c != ',' && *c != '_' && *c != '+')
        .collect();
    if let Some(rest) = normalized.strip_prefix("-.") {
        normalized = format!("-0.{}", rest);
    } else if let Some(rest) = normalized.strip_prefix('.') {
        normalized = format!("0.{}", rest);
    }

    let parsed = if normalized.contains(['e', 'E']) {
        Decimal::from_scientific(&normalized).ok()
    } else {
        Decimal::from_str(&normalized).ok()
    };

    coerce_holdings(parsed.unwrap_or(Decimal::ZERO))
}

// Price/value in the reference currency, two decimals with thousands separators.
// Sub-cent prices keep up to 8 significant decimals.
pub fn format_currency(amount: Decimal, currency: &str) -> String {
    let symbol = match currency.to_lowercase().as_str() {
        "usd" => "$",
        "eur" => "€",
        "gbp" => "£",
        _ => "",
    };

    let abs = amount.abs();
    let body = if !abs.is_zero() && abs < Decimal::new(1, 2) {
        abs.round_dp_with_strategy(8, RoundingStrategy::MidpointAwayFromZero)
            .normalize()
            .to_string()
    } else {
        group_thousands(abs.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero), 2)
    };

    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };

    if symbol.is_empty() {
        format!("{}{} {}", sign, body, currency.to_uppercase())
    } else {
        format!("{}{}{}", sign, symbol, body)
    }
}

// Holdings with four decimals, as shown in the watchlist
pub fn format_holdings(amount: Decimal) -> String {
    group_thousands(amount.round_dp_with_strategy(4, RoundingStrategy::ToZero), 4)
}

// Signed percentage with two decimals
pub fn format_percent(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded > Decimal::ZERO {
        format!("+{:.2}%", rounded)
    } else {
        format!("{:.2}%", rounded)
    }
}

fn group_thousands(value: Decimal, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value);
    let (integer, fraction) = match formatted.split_once('.') {
        Some((integer, fraction)) => (integer.to_string(), Some(fraction.to_string())),
        None => (formatted.clone(), None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match fraction {
        Some(fraction) => format!("{}.{}", grouped, fraction),
        None => grouped,
    }
}

// Render a price series as a compact unicode sparkline
pub fn render_sparkline(samples: &[f64], width: usize) -> String {
    const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

    let points: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
    if points.is_empty() || width == 0 {
        return String::new();
    }

    // Average down to `width` buckets
    let buckets: Vec<f64> = if points.len() <= width {
        points
    } else {
        let chunk = points.len().div_ceil(width);
        points
            .chunks(chunk)
            .map(|c| c.iter().sum::<f64>() / c.len() as f64)
            .collect()
    };

    let min = buckets.iter().copied().fold(f64::INFINITY, f64::min);
    let max = buckets.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    buckets
        .iter()
        .map(|v| {
            if range <= f64::EPSILON {
                BARS[3]
            } else {
                let index = ((v - min) / range * (BARS.len() - 1) as f64).round() as usize;
                BARS[index.min(BARS.len() - 1)]
            }
        })
        .collect()
}

// Horizontal bar for a percentage share, `width` cells wide
pub fn render_share_bar(percentage: Decimal, width: usize) -> String {
    let share = percentage
        .to_f64()
        .unwrap_or(0.0)
        .clamp(0.0, 100.0);
    let filled = ((share / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

// Escape text for Telegram HTML parse mode
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
