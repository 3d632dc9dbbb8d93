// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{insert_revenue, upsert_budget};
use crate::models::{BaselineRow, Transaction, YearMonth};
use crate::utils::{parse_date, parse_decimal, parse_month};
use anyhow::{Context, Result, anyhow};
use csv::ReaderBuilder;
use rusqlite::Connection;
use tracing::info;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("revenue", sub)) => {
            import_revenue(conn, path_arg(sub)?)?;
        }
        Some(("budget", sub)) => {
            import_budget(conn, path_arg(sub)?)?;
        }
        _ => {}
    }
    Ok(())
}

fn path_arg(sub: &clap::ArgMatches) -> Result<&str> {
    sub.get_one::<String>("path")
        .map(|p| p.trim())
        .ok_or_else(|| anyhow!("--path is required"))
}

fn reader(path: &str) -> Result<csv::Reader<std::fs::File>> {
    ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))
}

/// Budget files key months either as `YYYY-MM` or by month-end date.
fn parse_budget_month(raw: &str) -> Result<YearMonth> {
    parse_month(raw)
        .or_else(|_| parse_date(raw).map(YearMonth::of))
        .with_context(|| format!("Invalid budget month '{}'", raw))
}

pub fn import_revenue(conn: &mut Connection, path: &str) -> Result<usize> {
    let mut rdr = reader(path)?;
    let tx = conn.transaction()?;
    let mut count = 0;
    for (line, result) in rdr.records().enumerate() {
        let rec = result?;
        let row = line + 2;
        let date_raw = rec.get(0).context("effective_date missing")?;
        let category = rec.get(1).context("category missing")?;
        let amount_raw = rec.get(2).context("amount missing")?;
        if category.is_empty() {
            return Err(anyhow!("Empty category on line {}", row));
        }
        let t = Transaction::new(
            parse_date(date_raw).with_context(|| format!("line {}", row))?,
            category,
            parse_decimal(amount_raw).with_context(|| format!("line {}", row))?,
        );
        insert_revenue(&tx, &t)?;
        count += 1;
    }
    tx.commit()?;
    info!(path, rows = count, "revenue imported");
    println!("Imported {} revenue rows from {}", count, path);
    Ok(count)
}

pub fn import_budget(conn: &mut Connection, path: &str) -> Result<usize> {
    let mut rdr = reader(path)?;
    let tx = conn.transaction()?;
    let mut count = 0;
    for (line, result) in rdr.records().enumerate() {
        let rec = result?;
        let row = line + 2;
        let month = parse_budget_month(rec.get(0).context("month missing")?)
            .with_context(|| format!("line {}", row))?;
        let category = rec.get(1).context("category missing")?.to_string();
        let amount = parse_decimal(rec.get(2).context("amount missing")?)
            .with_context(|| format!("line {}", row))?;
        upsert_budget(
            &tx,
            &BaselineRow {
                month,
                category,
                amount,
            },
        )?;
        count += 1;
    }
    tx.commit()?;
    info!(path, rows = count, "budget imported");
    println!("Imported {} budget rows from {}", count, path);
    Ok(count)
}
