// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cashdash::commands::{doctor, exporter, importer};
use cashdash::config::ReportConfig;
use cashdash::db::{
    self, RevenueSource, Warehouse, categories_in_range, data_ready, insert_revenue,
    latest_load_run, record_load_run,
};
use cashdash::models::{Transaction, YearMonth};
use cashdash::{cli, pipeline::ReportWindow};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::io::Write;
use tempfile::NamedTempFile;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn csv_file(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", body).unwrap();
    file.flush().unwrap();
    file
}

fn run_import(conn: &mut Connection, kind: &str, path: &str) {
    let matches = cli::build_cli().get_matches_from(["cashdash", "import", kind, "--path", path]);
    if let Some(("import", import_m)) = matches.subcommand() {
        importer::handle(conn, import_m).unwrap();
    } else {
        panic!("no import subcommand");
    }
}

fn cfg(categories: &[&str]) -> ReportConfig {
    ReportConfig {
        categories: categories.iter().map(|s| s.to_string()).collect(),
        ..ReportConfig::default()
    }
}

#[test]
fn import_revenue_then_read_window() {
    let mut conn = setup();
    let file = csv_file(
        "effective_date,category,amount\n\
         2024-01-01, A ,100.00\n\
         2024-01-02,B,50\n\
         2024-01-02,A,-20.5\n\
         2024-02-01,A,7\n",
    );
    let padded = format!("  {}  ", file.path().to_str().unwrap());
    run_import(&mut conn, "revenue", &padded);

    let rows = Warehouse::new(&conn)
        .transactions(d("2024-01-01"), d("2024-01-31"))
        .unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], Transaction::new(d("2024-01-01"), "A", "100.00".parse().unwrap()));
    assert_eq!(rows[2].amount, "-20.5".parse::<Decimal>().unwrap());
    assert!(rows.windows(2).all(|w| w[0].effective_date <= w[1].effective_date));
}

#[test]
fn import_revenue_rejects_bad_rows_atomically() {
    let mut conn = setup();
    let file = csv_file(
        "effective_date,category,amount\n\
         2024-01-01,A,1\n\
         2024-13-01,A,2\n",
    );
    let err = importer::import_revenue(&mut conn, file.path().to_str().unwrap()).unwrap_err();
    assert!(format!("{:#}", err).contains("line 3"));
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM revenue", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn import_budget_accepts_month_or_month_end() {
    let mut conn = setup();
    let file = csv_file(
        "month,category,amount\n\
         2024-01,A,100\n\
         2024-02-29,A,200\n\
         2024-02-29,A,250\n\
         2023-12,A,999\n",
    );
    run_import(&mut conn, "budget", file.path().to_str().unwrap());

    let rows = Warehouse::new(&conn).budget(2024).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].month, YearMonth::new(2024, 1).unwrap());
    assert_eq!(rows[1].month, YearMonth::new(2024, 2).unwrap());
    assert_eq!(rows[1].amount, Decimal::from(250));
}

#[test]
fn readiness_follows_latest_load_run() {
    let conn = setup();
    assert!(!data_ready(&conn).unwrap());
    assert!(latest_load_run(&conn).unwrap().is_none());

    record_load_run(&conn, "Completed").unwrap();
    assert!(data_ready(&conn).unwrap());

    record_load_run(&conn, "Failed").unwrap();
    assert!(!data_ready(&conn).unwrap());
    assert_eq!(latest_load_run(&conn).unwrap().unwrap().0, "Failed");

    record_load_run(&conn, "completed").unwrap();
    assert!(data_ready(&conn).unwrap());
}

#[test]
fn categories_in_range_counts_rows() {
    let conn = setup();
    for (date, cat) in [("2024-01-01", "A"), ("2024-01-02", "A"), ("2024-01-03", "Z")] {
        insert_revenue(&conn, &Transaction::new(d(date), cat, Decimal::ONE)).unwrap();
    }
    let seen = categories_in_range(&conn, d("2024-01-01"), d("2024-01-02")).unwrap();
    assert_eq!(seen, vec![("A".to_string(), 2)]);
}

#[test]
fn doctor_reports_unlisted_and_empty_days() {
    let conn = setup();
    insert_revenue(&conn, &Transaction::new(d("2024-03-01"), "A", Decimal::ONE)).unwrap();
    insert_revenue(&conn, &Transaction::new(d("2024-03-03"), "Z", Decimal::ONE)).unwrap();
    let mut c = cfg(&["A"]);
    c.require_ready = true;

    let issues = doctor::find_issues(&conn, &c, &ReportWindow::for_run(d("2024-03-04"))).unwrap();
    let kinds: Vec<&str> = issues.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(kinds, vec!["unlisted_category", "empty_day", "not_ready"]);
    assert!(issues[0][1].starts_with("Z (1 rows"));
    assert_eq!(issues[1][1], "2024-03-02");
}

#[test]
fn export_daily_csv_and_monthly_json() {
    let conn = setup();
    insert_revenue(&conn, &Transaction::new(d("2024-03-01"), "A", Decimal::from(100))).unwrap();
    insert_revenue(&conn, &Transaction::new(d("2024-03-02"), "B", Decimal::from(50))).unwrap();
    let c = cfg(&["A", "B"]);
    let dir = tempfile::tempdir().unwrap();

    let out = dir.path().join("daily.csv");
    let matches = cli::build_cli().get_matches_from([
        "cashdash",
        "export",
        "--table",
        "daily",
        "--as-of",
        "2024-03-03",
        "--out",
        out.to_str().unwrap(),
    ]);
    let Some(("export", sub)) = matches.subcommand() else {
        panic!("no export subcommand");
    };
    exporter::handle(&conn, &c, sub).unwrap();
    let text = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Date,A,B,Total");
    assert_eq!(lines[1], "2024-03-01,100,0,100");
    assert_eq!(lines[3], "Total,100,50,150");
    assert_eq!(lines.len(), 4);

    let out = dir.path().join("monthly.json");
    let matches = cli::build_cli().get_matches_from([
        "cashdash",
        "export",
        "--table",
        "monthly",
        "--format",
        "json",
        "--as-of",
        "2024-03-03",
        "--out",
        out.to_str().unwrap(),
    ]);
    let Some(("export", sub)) = matches.subcommand() else {
        panic!("no export subcommand");
    };
    exporter::handle(&conn, &c, sub).unwrap();
    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let rows = v.as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[2]["Date"], "2024-03");
    assert_eq!(rows[2]["Total"], "150");
    assert_eq!(rows[3]["Date"], "Total");
}
