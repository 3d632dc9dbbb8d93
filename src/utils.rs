// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::YearMonth;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_month(s: &str) -> Result<YearMonth> {
    s.parse()
}

pub fn parse_year(s: &str) -> Result<i32> {
    let y: i32 = s
        .trim()
        .parse()
        .with_context(|| format!("Invalid year '{}', expected YYYY", s))?;
    if !(1900..=9999).contains(&y) {
        anyhow::bail!("Year {} out of range", y);
    }
    Ok(y)
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Wall-clock date unless `--as-of` was given.
pub fn as_of(sub: &clap::ArgMatches) -> Result<NaiveDate> {
    match sub.try_get_one::<String>("as-of").ok().flatten() {
        Some(s) => parse_date(s),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

pub fn pretty_table(headers: &[String], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(Cell::new));
    for r in rows {
        t.add_row(r.into_iter().enumerate().map(|(i, v)| {
            let c = Cell::new(v);
            if i == 0 {
                c
            } else {
                c.set_alignment(CellAlignment::Right)
            }
        }));
    }
    t
}

/// Print `records` for `--json` (one array) or `--jsonl` (one object per
/// line). Returns false when neither flag was given.
pub fn maybe_print_json(sub: &clap::ArgMatches, records: &[Map<String, Value>]) -> Result<bool> {
    if sub.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(records)?);
    } else if sub.get_flag("jsonl") {
        for r in records {
            println!("{}", serde_json::to_string(r)?);
        }
    } else {
        return Ok(false);
    }
    Ok(true)
}
