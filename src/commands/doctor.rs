// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::ReportConfig;
use crate::db::{RevenueSource, Warehouse, categories_in_range, data_ready};
use crate::pipeline::ReportWindow;
use crate::utils::{as_of, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use std::collections::BTreeSet;

/// Problems that make the report disagree with the warehouse.
pub fn find_issues(conn: &Connection, cfg: &ReportConfig, window: &ReportWindow) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    if cfg.categories.is_empty() {
        rows.push(vec!["no_categories".into(), "category list is empty".into()]);
    }

    // 1) Categories that would be left out of the per-category columns
    let from = window.fetch_from(cfg.baseline);
    for (cat, n) in categories_in_range(conn, from, window.report_date)? {
        if !cfg.categories.contains(&cat) {
            rows.push(vec![
                "unlisted_category".into(),
                format!("{} ({} rows since {})", cat, n, from),
            ]);
        }
    }

    // 2) Days of the current month with no revenue at all
    let seen: BTreeSet<_> = Warehouse::new(conn)
        .transactions(window.month_start, window.report_date)?
        .into_iter()
        .map(|t| t.effective_date)
        .collect();
    for day in window
        .month_start
        .iter_days()
        .take_while(|d| *d <= window.report_date)
    {
        if !seen.contains(&day) {
            rows.push(vec!["empty_day".into(), day.to_string()]);
        }
    }

    // 3) Readiness gate
    if cfg.require_ready && !data_ready(conn)? {
        rows.push(vec![
            "not_ready".into(),
            "latest upstream load has not completed".into(),
        ]);
    }
    Ok(rows)
}

pub fn handle(conn: &Connection, cfg: &ReportConfig, sub: &clap::ArgMatches) -> Result<()> {
    let window = ReportWindow::for_run(as_of(sub)?);
    let rows = find_issues(conn, cfg, &window)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!(
            "{}",
            pretty_table(&["Issue".to_string(), "Detail".to_string()], rows)
        );
    }
    Ok(())
}
