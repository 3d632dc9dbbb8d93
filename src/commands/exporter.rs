// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::summary::{daily_table, monthly_table};
use crate::config::ReportConfig;
use anyhow::{Context, Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, cfg: &ReportConfig, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub
        .get_one::<String>("format")
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| "csv".into());
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }
    let out = sub.get_one::<String>("out").context("--out is required")?;

    let table = match sub.get_one::<String>("table").map(String::as_str) {
        Some("monthly") => monthly_table(conn, cfg, sub)?,
        _ => daily_table(conn, cfg, sub)?,
    };

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out).with_context(|| format!("Create {}", out))?;
            wtr.write_record(table.headers())?;
            for r in &table.rows {
                let mut rec = vec![r.label.to_string()];
                rec.extend(r.values.iter().map(|v| v.to_string()));
                rec.push(r.total.to_string());
                wtr.write_record(&rec)?;
            }
            wtr.flush()?;
        }
        _ => {
            std::fs::write(out, serde_json::to_string_pretty(&table.to_records())?)
                .with_context(|| format!("Write {}", out))?;
        }
    }
    println!("Exported {} rows to {}", table.rows.len(), out);
    Ok(())
}
