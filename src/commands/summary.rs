// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::Aggregation;
use crate::config::ReportConfig;
use crate::db::{RevenueSource, Warehouse};
use crate::models::{BaselineKind, SummaryTable, YearMonth};
use crate::pipeline::{ReportWindow, build_report};
use crate::render::console;
use crate::utils::{as_of, maybe_print_json, parse_month, parse_year};
use anyhow::{Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, cfg: &ReportConfig, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("daily", sub)) => daily(conn, cfg, sub)?,
        Some(("monthly", sub)) => monthly(conn, cfg, sub)?,
        Some(("variance", sub)) => variance(conn, cfg, sub)?,
        _ => {}
    }
    Ok(())
}

fn print_table(sub: &clap::ArgMatches, table: &SummaryTable) -> Result<()> {
    let records = table.to_records();
    if !maybe_print_json(sub, &records)? {
        println!("{}", console::summary(table));
    }
    Ok(())
}

/// Daily table for `--month` (whole month) or for the current run window.
pub fn daily_table(conn: &Connection, cfg: &ReportConfig, sub: &clap::ArgMatches) -> Result<SummaryTable> {
    cfg.validate()?;
    let (from, to) = match sub.try_get_one::<String>("month").ok().flatten() {
        Some(m) => {
            let ym = parse_month(m)?;
            (ym.first_day(), ym.last_day())
        }
        None => {
            let w = ReportWindow::for_run(as_of(sub)?);
            (w.month_start, w.report_date)
        }
    };
    let txns = Warehouse::new(conn).transactions(from, to)?;
    Ok(Aggregation::new(&cfg.categories)
        .with_unlisted(cfg.unlisted)
        .daily(&txns, from, to))
}

/// Monthly table for `--year`, `--through`, or year-to-date of the run window.
pub fn monthly_table(
    conn: &Connection,
    cfg: &ReportConfig,
    sub: &clap::ArgMatches,
) -> Result<SummaryTable> {
    cfg.validate()?;
    let year_arg = sub.try_get_one::<String>("year").ok().flatten();
    let through_arg = sub.try_get_one::<String>("through").ok().flatten();
    let last: YearMonth = match (year_arg, through_arg) {
        (Some(y), _) => {
            let y = parse_year(y)?;
            YearMonth::new(y, 12).ok_or_else(|| anyhow::anyhow!("Invalid year {}", y))?
        }
        (None, Some(t)) => parse_month(t)?,
        (None, None) => ReportWindow::for_run(as_of(sub)?).month,
    };
    let first = YearMonth::new(last.year(), 1)
        .ok_or_else(|| anyhow::anyhow!("Invalid year {}", last.year()))?;
    let txns = Warehouse::new(conn).transactions(first.first_day(), last.last_day())?;
    Ok(Aggregation::new(&cfg.categories)
        .with_unlisted(cfg.unlisted)
        .monthly_through(&txns, last.year(), last.month()))
}

fn daily(conn: &Connection, cfg: &ReportConfig, sub: &clap::ArgMatches) -> Result<()> {
    print_table(sub, &daily_table(conn, cfg, sub)?)
}

fn monthly(conn: &Connection, cfg: &ReportConfig, sub: &clap::ArgMatches) -> Result<()> {
    print_table(sub, &monthly_table(conn, cfg, sub)?)
}

fn variance(conn: &Connection, cfg: &ReportConfig, sub: &clap::ArgMatches) -> Result<()> {
    if cfg.baseline == BaselineKind::None {
        bail!("No baseline configured (set baseline to prior-year or budget)");
    }
    let report = build_report(&Warehouse::new(conn), cfg, as_of(sub)?)?;
    let scope = sub.get_one::<String>("scope").map(String::as_str).unwrap_or("mtd");
    let block = match scope {
        "ytd" => report.ytd,
        _ => report.mtd,
    };
    let Some(block) = block else {
        bail!("Variance not available");
    };
    let records = block.to_records(cfg.baseline);
    if !maybe_print_json(sub, &records)? {
        println!("{}", console::variance(&block, cfg.baseline));
    }
    Ok(())
}
