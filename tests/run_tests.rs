// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cashdash::commands::run::{RunOptions, RunOutcome, execute, run_at, run_with_notice};
use cashdash::config::ReportConfig;
use cashdash::db::{self, Warehouse, insert_revenue, record_load_run, upsert_budget};
use cashdash::error::MailError;
use cashdash::models::{BaselineKind, BaselineRow, Transaction, VarianceKind, YearMonth};
use cashdash::notify::{DryRunMailer, Email, Mailer};
use cashdash::pipeline::{ArtifactKind, build_report, render_artifacts};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::cell::RefCell;
use std::io::Write;
use tempfile::TempDir;

#[derive(Default)]
struct RecordingMailer {
    sent: RefCell<Vec<Email>>,
}

impl Mailer for RecordingMailer {
    fn send(&self, email: &Email) -> Result<(), MailError> {
        self.sent.borrow_mut().push(email.clone());
        Ok(())
    }
}

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn dec(v: i64) -> Decimal {
    Decimal::from(v)
}

fn seeded() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    for (date, cat, amt) in [
        ("2024-03-01", "A", 100),
        ("2024-03-02", "B", 50),
        ("2024-03-02", "Z", 999),
        ("2024-03-04", "A", 5000),
        ("2024-02-10", "A", 200),
        ("2023-03-15", "A", 80),
        ("2023-02-01", "B", 30),
    ] {
        insert_revenue(&conn, &Transaction::new(d(date), cat, dec(amt))).unwrap();
    }
    conn
}

fn config(out: &TempDir) -> ReportConfig {
    ReportConfig {
        categories: vec!["A".into(), "B".into()],
        recipients: vec!["team@example.com".into()],
        failure_recipients: vec!["ops@example.com".into()],
        output_dir: out.path().to_path_buf(),
        ..ReportConfig::default()
    }
}

fn opts(as_of: &str) -> RunOptions {
    RunOptions {
        as_of: d(as_of),
        skip_readiness_check: false,
    }
}

#[test]
fn report_covers_month_to_date_through_yesterday() {
    let conn = seeded();
    let out = tempfile::tempdir().unwrap();
    let report = build_report(&Warehouse::new(&conn), &config(&out), d("2024-03-04")).unwrap();

    assert_eq!(report.window.report_date, d("2024-03-03"));
    assert_eq!(report.daily.period_rows().len(), 3);
    let total = report.daily.total_row().unwrap();
    assert_eq!(total.values, vec![dec(100), dec(50)]);
    assert_eq!(total.total, dec(150));

    assert_eq!(report.monthly.period_rows().len(), 3);
    assert_eq!(report.monthly.total_row().unwrap().total, dec(350));

    let mtd = report.mtd.as_ref().unwrap();
    assert_eq!(mtd.get(VarianceKind::Baseline, "A"), Some(dec(80)));
    assert_eq!(mtd.get(VarianceKind::Baseline, "B"), Some(dec(0)));
    assert_eq!(mtd.variance().total, dec(70));

    let ytd = report.ytd.as_ref().unwrap();
    assert_eq!(ytd.baseline().total, dec(110));
    assert_eq!(ytd.variance().total, dec(240));
    assert_eq!(
        report.ytd_baseline_cumulative,
        Some(vec![dec(0), dec(30), dec(110)])
    );
}

#[test]
fn budget_baseline_reads_budget_rows() {
    let conn = seeded();
    upsert_budget(
        &conn,
        &BaselineRow {
            month: YearMonth::new(2024, 3).unwrap(),
            category: "A".into(),
            amount: dec(90),
        },
    )
    .unwrap();
    let out = tempfile::tempdir().unwrap();
    let cfg = ReportConfig {
        baseline: BaselineKind::Budget,
        ..config(&out)
    };
    let report = build_report(&Warehouse::new(&conn), &cfg, d("2024-03-04")).unwrap();
    let mtd = report.mtd.unwrap();
    assert_eq!(mtd.get(VarianceKind::Baseline, "A"), Some(dec(90)));
    assert_eq!(mtd.get(VarianceKind::Variance, "A"), Some(dec(10)));
}

#[test]
fn no_baseline_skips_comparison_artifacts() {
    let conn = seeded();
    let out = tempfile::tempdir().unwrap();
    let cfg = ReportConfig {
        baseline: BaselineKind::None,
        ..config(&out)
    };
    let report = build_report(&Warehouse::new(&conn), &cfg, d("2024-03-04")).unwrap();
    assert!(report.mtd.is_none() && report.ytd.is_none());
    let names: Vec<String> = render_artifacts(&report)
        .unwrap()
        .into_iter()
        .map(|a| a.file_name)
        .collect();
    assert_eq!(
        names,
        vec!["day_chart.svg", "day_table.html", "month_chart.svg", "month_table.html"]
    );
}

#[test]
fn artifacts_come_in_mail_order() {
    let conn = seeded();
    let out = tempfile::tempdir().unwrap();
    let report = build_report(&Warehouse::new(&conn), &config(&out), d("2024-03-04")).unwrap();
    let artifacts = render_artifacts(&report).unwrap();
    let names: Vec<&str> = artifacts.iter().map(|a| a.file_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "day_chart.svg",
            "mtd_variance_table.html",
            "day_table.html",
            "month_chart.svg",
            "ytd_variance_table.html",
            "month_table.html",
        ]
    );
    assert_eq!(artifacts[1].caption, "Current Month Cash by Product vs Prior Year");
    assert_eq!(artifacts[2].caption, "Current Month Cash by Product by Day");
    assert_eq!(artifacts[4].caption, "YTD Cash by Product vs Prior Year");
    assert_eq!(artifacts[5].caption, "Cash by Product by Month");
    assert!(artifacts[2].content.contains("$150"));
    assert!(artifacts[1].content.contains("Current Year"));
}

#[test]
fn run_writes_artifacts_and_sends_one_email() {
    let conn = seeded();
    let out = tempfile::tempdir().unwrap();
    let cfg = config(&out);
    let mailer = RecordingMailer::default();

    let outcome = execute(&conn, &cfg, opts("2024-03-04"), &mailer).unwrap();
    let RunOutcome::Sent { artifacts } = outcome else {
        panic!("expected a sent report");
    };
    assert_eq!(artifacts.len(), 6);
    assert!(artifacts.iter().all(|p| p.exists()));

    let sent = mailer.sent.borrow();
    assert_eq!(sent.len(), 1);
    let email = &sent[0];
    assert_eq!(email.subject, "Daily Cash Dash - 03-04-2024");
    assert_eq!(email.to, vec!["team@example.com"]);
    assert!(email.html.starts_with("<html>"));
    assert!(email.html.contains("Good morning!"));
    assert!(email.html.contains("Data through 2024-03-03."));
    let attached: Vec<&str> = email.attachments.iter().map(|a| a.filename.as_str()).collect();
    assert_eq!(attached, vec!["day_chart.svg", "month_chart.svg"]);
    assert!(email.attachments.iter().all(|a| a.content_type == "image/svg+xml"));
}

#[test]
fn readiness_gate_skips_until_load_completes() {
    let conn = seeded();
    let out = tempfile::tempdir().unwrap();
    let cfg = ReportConfig {
        require_ready: true,
        ..config(&out)
    };
    let mailer = RecordingMailer::default();

    assert_eq!(
        execute(&conn, &cfg, opts("2024-03-04"), &mailer).unwrap(),
        RunOutcome::Skipped
    );
    record_load_run(&conn, "Running").unwrap();
    assert_eq!(
        execute(&conn, &cfg, opts("2024-03-04"), &mailer).unwrap(),
        RunOutcome::Skipped
    );
    assert!(mailer.sent.borrow().is_empty());

    let forced = RunOptions {
        skip_readiness_check: true,
        ..opts("2024-03-04")
    };
    assert!(matches!(
        execute(&conn, &cfg, forced, &mailer).unwrap(),
        RunOutcome::Sent { .. }
    ));

    record_load_run(&conn, "Completed").unwrap();
    assert!(matches!(
        execute(&conn, &cfg, opts("2024-03-04"), &mailer).unwrap(),
        RunOutcome::Sent { .. }
    ));
    assert_eq!(mailer.sent.borrow().len(), 2);
}

#[test]
fn failure_sends_one_notice_with_log() {
    // no schema: reading revenue fails
    let conn = Connection::open_in_memory().unwrap();
    let out = tempfile::tempdir().unwrap();
    let cfg = config(&out);
    let mut log = tempfile::NamedTempFile::new().unwrap();
    writeln!(log, "INFO get actuals data").unwrap();
    log.flush().unwrap();
    let mailer = RecordingMailer::default();

    let err = run_with_notice(&conn, &cfg, opts("2024-03-04"), &mailer, Some(log.path()))
        .unwrap_err();
    assert!(format!("{:#}", err).contains("Read revenue from warehouse"));

    let sent = mailer.sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Error - Daily Cash Dash");
    assert_eq!(sent[0].to, vec!["ops@example.com"]);
    assert!(sent[0].html.contains("Read revenue from warehouse"));
    assert_eq!(sent[0].attachments.len(), 1);
    assert_eq!(sent[0].attachments[0].body, b"INFO get actuals data\n".to_vec());
}

#[test]
fn invalid_config_fails_before_reading() {
    let conn = seeded();
    let out = tempfile::tempdir().unwrap();
    let cfg = ReportConfig {
        categories: Vec::new(),
        ..config(&out)
    };
    let mailer = RecordingMailer::default();
    assert!(run_with_notice(&conn, &cfg, opts("2024-03-04"), &mailer, None).is_err());
    let sent = mailer.sent.borrow();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].html.contains("category list is empty"));
    assert!(sent[0].attachments.is_empty());
}

#[test]
fn no_recipients_at_all_still_returns_error() {
    let conn = seeded();
    let out = tempfile::tempdir().unwrap();
    let cfg = ReportConfig {
        recipients: Vec::new(),
        failure_recipients: Vec::new(),
        ..config(&out)
    };
    let mailer = RecordingMailer::default();
    assert!(run_with_notice(&conn, &cfg, opts("2024-03-04"), &mailer, None).is_err());
    assert!(mailer.sent.borrow().is_empty());
}

#[test]
fn dry_run_mailer_writes_message_to_disk() {
    let conn = seeded();
    let out = tempfile::tempdir().unwrap();
    let cfg = config(&out);
    let mailer = DryRunMailer::new(out.path().join("email"));
    execute(&conn, &cfg, opts("2024-03-04"), &mailer).unwrap();

    let body = std::fs::read_to_string(out.path().join("email").join("email.html")).unwrap();
    assert!(body.contains("Subject: Daily Cash Dash - 03-04-2024"));
    assert!(out.path().join("email").join("day_chart.svg").exists());
    let page = std::fs::read_to_string(out.path().join("day_table.html")).unwrap();
    assert!(page.contains("Current Month Cash by Product by Day"));
    assert!(render_artifacts(
        &build_report(&Warehouse::new(&conn), &cfg, d("2024-03-04")).unwrap()
    )
    .unwrap()
    .iter()
    .any(|a| a.kind == ArtifactKind::Chart));
}

#[test]
fn unreachable_warehouse_sends_one_notice() {
    let out = tempfile::tempdir().unwrap();
    let cfg = config(&out);
    let db = out.path().join("missing").join("warehouse.sqlite");
    let mailer = RecordingMailer::default();

    let err = run_at(Some(db.as_path()), &cfg, opts("2024-03-02"), &mailer, None).unwrap_err();
    assert!(format!("{:#}", err).contains("Open DB at"));

    let sent = mailer.sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Error - Daily Cash Dash");
    assert!(sent[0].html.contains("Open DB at"));
}

#[test]
fn run_at_opens_warehouse_file() {
    let out = tempfile::tempdir().unwrap();
    let db_path = out.path().join("warehouse.sqlite");
    {
        let conn = db::open_or_init(Some(db_path.as_path())).unwrap();
        insert_revenue(&conn, &Transaction::new(d("2024-03-01"), "A", dec(100))).unwrap();
    }
    let cfg = config(&out);
    let mailer = RecordingMailer::default();

    let outcome = run_at(Some(db_path.as_path()), &cfg, opts("2024-03-02"), &mailer, None).unwrap();
    assert!(matches!(outcome, RunOutcome::Sent { .. }));
    let sent = mailer.sent.borrow();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].html.contains("$100"));
}
