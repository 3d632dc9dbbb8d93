// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The scheduled job: gate, fetch, aggregate, render, send. Any failure
//! produces exactly one failure notice.

use crate::config::ReportConfig;
use crate::db::{Warehouse, data_ready, open_or_init};
use crate::notify::{DryRunMailer, Mailer, SmtpMailer, compose_failure, compose_report};
use crate::pipeline::{build_report, render_artifacts, write_artifacts};
use crate::utils::as_of;
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub as_of: NaiveDate,
    pub skip_readiness_check: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Sent { artifacts: Vec<PathBuf> },
    /// Upstream data not ready; nothing sent.
    Skipped,
}

pub fn execute(
    conn: &Connection,
    cfg: &ReportConfig,
    opts: RunOptions,
    mailer: &dyn Mailer,
) -> Result<RunOutcome> {
    if cfg.require_ready && !opts.skip_readiness_check && !data_ready(conn)? {
        info!("data is not ready, skipping report");
        return Ok(RunOutcome::Skipped);
    }

    let report = build_report(&Warehouse::new(conn), cfg, opts.as_of)?;

    info!(dir = %cfg.output_dir.display(), "render artifacts");
    let artifacts = render_artifacts(&report)?;
    let paths = write_artifacts(&cfg.output_dir, &artifacts)?;

    info!("send email update");
    let email = compose_report(cfg, &report, &artifacts, opts.as_of)?;
    mailer.send(&email)?;

    info!("done, no problems");
    Ok(RunOutcome::Sent { artifacts: paths })
}

/// Open the warehouse at `db` and `execute`. A failure at any step, the
/// connection included, produces the failure notice.
pub fn run_at(
    db: Option<&Path>,
    cfg: &ReportConfig,
    opts: RunOptions,
    mailer: &dyn Mailer,
    log_path: Option<&Path>,
) -> Result<RunOutcome> {
    let result = open_or_init(db).and_then(|conn| execute(&conn, cfg, opts, mailer));
    notify_on_failure(cfg, mailer, log_path, result)
}

/// `execute` on an open connection, plus the failure notice when it errors.
pub fn run_with_notice(
    conn: &Connection,
    cfg: &ReportConfig,
    opts: RunOptions,
    mailer: &dyn Mailer,
    log_path: Option<&Path>,
) -> Result<RunOutcome> {
    notify_on_failure(cfg, mailer, log_path, execute(conn, cfg, opts, mailer))
}

/// Send one failure notice for `result`'s error. The error is returned
/// either way.
fn notify_on_failure(
    cfg: &ReportConfig,
    mailer: &dyn Mailer,
    log_path: Option<&Path>,
    result: Result<RunOutcome>,
) -> Result<RunOutcome> {
    let e = match result {
        Ok(outcome) => return Ok(outcome),
        Err(e) => e,
    };
    error!(error = %format!("{:#}", e), "run failed");
    match compose_failure(cfg, &e, log_path) {
        Ok(notice) => {
            if let Err(me) = mailer.send(&notice) {
                error!(error = %me, "failure notice not sent");
            }
        }
        Err(ce) => error!(error = %format!("{:#}", ce), "failure notice not sent"),
    }
    Err(e)
}

pub fn handle(
    db: Option<&Path>,
    cfg: &ReportConfig,
    sub: &clap::ArgMatches,
    log_path: Option<&Path>,
) -> Result<()> {
    let opts = RunOptions {
        as_of: as_of(sub)?,
        skip_readiness_check: sub.get_flag("skip-readiness-check"),
    };
    let mailer: Box<dyn Mailer> = if sub.get_flag("dry-run") {
        Box::new(DryRunMailer::new(cfg.output_dir.join("email")))
    } else {
        Box::new(SmtpMailer::from_config(cfg)?)
    };
    match run_at(db, cfg, opts, mailer.as_ref(), log_path)? {
        RunOutcome::Sent { artifacts } => {
            println!("Report sent ({} artifacts in {})", artifacts.len(), cfg.output_dir.display());
        }
        RunOutcome::Skipped => println!("Data is not ready, skipping report"),
    }
    Ok(())
}
