// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{BaselineRow, Transaction, YearMonth};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Cashdash", "cashdash"));

pub const STATE_COMPLETED: &str = "Completed";

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")
}

pub fn db_path() -> Result<PathBuf> {
    let proj = project_dirs()?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("cashdash.sqlite"))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.json"))
}

/// Open the warehouse at `path` (or the default location) and make sure the
/// schema exists.
pub fn open_or_init(path: Option<&Path>) -> Result<Connection> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => db_path()?,
    };
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    debug!(path = %path.display(), "warehouse opened");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS revenue(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        effective_date TEXT NOT NULL,
        category TEXT NOT NULL,
        amount TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_revenue_date ON revenue(effective_date);

    CREATE TABLE IF NOT EXISTS budgets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        month TEXT NOT NULL,
        category TEXT NOT NULL,
        amount TEXT NOT NULL,
        UNIQUE(month, category)
    );

    -- upstream load runs; the report waits for the latest one to complete
    CREATE TABLE IF NOT EXISTS load_runs(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        state TEXT NOT NULL,
        finished_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
    );
    "#,
    )?;
    Ok(())
}

/// Tabular read side of the warehouse.
pub trait RevenueSource {
    /// Revenue rows with `from <= effective_date <= to`.
    fn transactions(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Transaction>>;

    /// Budget rows for every month of `year`.
    fn budget(&self, year: i32) -> Result<Vec<BaselineRow>>;
}

pub struct Warehouse<'c> {
    conn: &'c Connection,
}

impl<'c> Warehouse<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

fn parse_amount(raw: &str, what: &str) -> Result<Decimal> {
    raw.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid amount '{}' in {}", raw, what))
}

impl RevenueSource for Warehouse<'_> {
    fn transactions(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT effective_date, category, amount FROM revenue
             WHERE effective_date >= ?1 AND effective_date <= ?2
             ORDER BY effective_date, id",
        )?;
        let rows = stmt.query_map(params![from.to_string(), to.to_string()], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
            ))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (d, category, amt) = row?;
            let effective_date = crate::utils::parse_date(&d)?;
            let amount = parse_amount(&amt, "revenue")?;
            out.push(Transaction {
                effective_date,
                category,
                amount,
            });
        }
        debug!(count = out.len(), %from, %to, "revenue rows read");
        Ok(out)
    }

    fn budget(&self, year: i32) -> Result<Vec<BaselineRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT month, category, amount FROM budgets
             WHERE substr(month,1,4)=?1
             ORDER BY month, category",
        )?;
        let rows = stmt.query_map(params![format!("{:04}", year)], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
            ))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (m, category, amt) = row?;
            let month: YearMonth = m.parse()?;
            out.push(BaselineRow {
                month,
                category,
                amount: parse_amount(&amt, "budgets")?,
            });
        }
        Ok(out)
    }
}

pub fn insert_revenue(conn: &Connection, t: &Transaction) -> Result<()> {
    conn.execute(
        "INSERT INTO revenue(effective_date, category, amount) VALUES (?1,?2,?3)",
        params![t.effective_date.to_string(), t.category, t.amount.to_string()],
    )?;
    Ok(())
}

pub fn upsert_budget(conn: &Connection, b: &BaselineRow) -> Result<()> {
    conn.execute(
        "INSERT INTO budgets(month, category, amount) VALUES (?1,?2,?3)
         ON CONFLICT(month, category) DO UPDATE SET amount=excluded.amount",
        params![b.month.to_string(), b.category, b.amount.to_string()],
    )?;
    Ok(())
}

pub fn record_load_run(conn: &Connection, state: &str) -> Result<()> {
    conn.execute("INSERT INTO load_runs(state) VALUES (?1)", params![state])?;
    Ok(())
}

/// State and finish time of the most recent upstream load.
pub fn latest_load_run(conn: &Connection) -> Result<Option<(String, String)>> {
    let v = conn
        .query_row(
            "SELECT state, finished_at FROM load_runs ORDER BY finished_at DESC, id DESC LIMIT 1",
            [],
            |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)),
        )
        .optional()?;
    Ok(v)
}

pub fn data_ready(conn: &Connection) -> Result<bool> {
    Ok(matches!(
        latest_load_run(conn)?,
        Some((state, _)) if state.eq_ignore_ascii_case(STATE_COMPLETED)
    ))
}

/// Distinct categories seen in `[from, to]`, with row counts.
pub fn categories_in_range(
    conn: &Connection,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<(String, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT category, COUNT(*) FROM revenue
         WHERE effective_date >= ?1 AND effective_date <= ?2
         GROUP BY category ORDER BY category",
    )?;
    let rows = stmt.query_map(params![from.to_string(), to.to_string()], |r| {
        Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?))
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
