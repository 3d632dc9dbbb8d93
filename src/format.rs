// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Number → display string. Kept apart from the aggregator so the sums stay
//! exact and the formatting can change without touching them.

use rust_decimal::{Decimal, RoundingStrategy};

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Whole dollars: `$12,345`, negatives `$(500)`. Only an exact zero is `-`;
/// small nonzero amounts show as `$0` or `$(0)`.
pub fn fmt_currency(d: Decimal) -> String {
    if d.is_zero() {
        return "-".to_string();
    }
    let rounded = d.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    let digits = group_thousands(&rounded.abs().trunc().to_string());
    if d.is_sign_negative() {
        format!("$({})", digits)
    } else {
        format!("${}", digits)
    }
}

/// Plain amount with two decimals for console tables.
pub fn fmt_amount(d: Decimal) -> String {
    format!("{:.2}", d)
}

/// Millions with one decimal, for chart annotations: `1.2M`.
pub fn fmt_millions(d: Decimal) -> String {
    let m = (d / Decimal::from(1_000_000))
        .round_dp_with_strategy(1, RoundingStrategy::MidpointNearestEven);
    format!("{:.1}M", m)
}

/// Thousands, no decimals, for bar labels: `12`.
pub fn fmt_thousands(d: Decimal) -> String {
    let k = (d / Decimal::from(1_000))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    let digits = group_thousands(&k.abs().trunc().to_string());
    if k.is_sign_negative() && !k.is_zero() {
        format!("-{}", digits)
    } else {
        digits
    }
}
