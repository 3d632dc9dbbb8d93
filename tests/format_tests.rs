// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cashdash::format::{fmt_amount, fmt_currency, fmt_millions, fmt_thousands};
use cashdash::render::chart::{ChartSpec, bar_chart};
use cashdash::render::html;
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn currency_uses_whole_dollars_and_parentheses() {
    assert_eq!(fmt_currency(dec("12345")), "$12,345");
    assert_eq!(fmt_currency(dec("-500")), "$(500)");
    assert_eq!(fmt_currency(dec("999")), "$999");
    assert_eq!(fmt_currency(dec("1000")), "$1,000");
    assert_eq!(fmt_currency(dec("1234567.49")), "$1,234,567");
}

#[test]
fn currency_dash_only_for_exact_zero() {
    assert_eq!(fmt_currency(Decimal::ZERO), "-");
    assert_eq!(fmt_currency(dec("0.00")), "-");
    assert_eq!(fmt_currency(dec("0.4")), "$0");
    assert_eq!(fmt_currency(dec("-0.4")), "$(0)");
    assert_eq!(fmt_currency(dec("0.5")), "$0");
}

#[test]
fn currency_rounds_half_to_even() {
    assert_eq!(fmt_currency(dec("2.5")), "$2");
    assert_eq!(fmt_currency(dec("3.5")), "$4");
    assert_eq!(fmt_currency(dec("-2.5")), "$(2)");
}

#[test]
fn chart_number_formats() {
    assert_eq!(fmt_millions(dec("1250000")), "1.2M");
    assert_eq!(fmt_millions(dec("3400000")), "3.4M");
    assert_eq!(fmt_thousands(dec("12345")), "12");
    assert_eq!(fmt_thousands(dec("-4500")), "-4");
    assert_eq!(fmt_amount(dec("1.5")), "1.50");
}

#[test]
fn html_table_escapes_cells() {
    let out = html::styled_table(
        "R&D <cash>",
        &["Date".to_string(), "A".to_string()],
        &[vec!["2024-01-01".to_string(), "<b>".to_string()]],
    )
    .unwrap();
    assert!(out.contains("R&amp;D &lt;cash&gt;"));
    assert!(out.contains("&lt;b&gt;"));
    assert!(!out.contains("<b>"));
    assert_eq!(out.matches("<th ").count(), 2);
    assert_eq!(out.matches("<td ").count(), 2);
}

#[test]
fn html_page_wraps_fragment_unescaped() {
    let table = html::styled_table("Cash", &["Date".to_string()], &[]).unwrap();
    let page = html::page("Cash & Co", &table).unwrap();
    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains("<title>Cash &amp; Co</title>"));
    assert!(page.contains("<table style="));
}

#[test]
fn bar_chart_draws_bars_line_and_baseline() {
    let spec = ChartSpec {
        title: "Cash by Month",
        x_label: "Month",
        bar_label: "Monthly Total",
        line_label: "YTD Total",
        baseline_label: Some("Prior Year"),
        labels: vec!["2024-01".into(), "2024-02".into()],
        bars: vec![dec("1000"), dec("2000")],
        cumulative: vec![dec("1000"), dec("3000")],
        baseline: Some(vec![dec("900"), dec("2500")]),
    };
    let svg = bar_chart(&spec);
    assert!(svg.starts_with("<svg"));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert_eq!(svg.matches("<rect x=").count(), 2);
    assert!(svg.contains("polyline"));
    assert!(svg.contains("Prior Year"));
    assert!(svg.contains("Cash by Month"));
}

#[test]
fn bar_chart_handles_empty_series() {
    let spec = ChartSpec {
        title: "Current Month Cash",
        x_label: "Day",
        bar_label: "Daily Total",
        line_label: "MTD Total",
        baseline_label: None,
        labels: Vec::new(),
        bars: Vec::new(),
        cumulative: Vec::new(),
        baseline: None,
    };
    let svg = bar_chart(&spec);
    assert!(svg.starts_with("<svg"));
    assert!(!svg.contains("Prior Year"));
}
