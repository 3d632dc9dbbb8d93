// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::PathBuf;

use cashdash::{cli, commands, config::ReportConfig, db, logging};

fn main() -> Result<()> {
    // a local .env supplies CASHDASH_* the same way the live environment does
    dotenvy::dotenv().ok();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut cfg = ReportConfig::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    cfg.apply_env(|k| std::env::var(k).ok())?;

    let log_file = matches
        .subcommand_matches("run")
        .map(|_| cfg.output_dir.join("cashdash.log"));
    logging::init(matches.get_count("verbose"), log_file.as_deref())?;

    let db_path = matches.get_one::<PathBuf>("db").map(PathBuf::as_path);

    // `run` opens the warehouse itself so a connection failure is mailed
    if let Some(("run", sub)) = matches.subcommand() {
        return commands::run::handle(db_path, &cfg, sub, log_file.as_deref());
    }

    let mut conn = db::open_or_init(db_path)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Warehouse initialized");
        }
        Some(("import", sub)) => commands::importer::handle(&mut conn, sub)?,
        Some(("status", sub)) => commands::status::handle(&conn, sub)?,
        Some(("summary", sub)) => commands::summary::handle(&conn, &cfg, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, &cfg, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(&conn, &cfg, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
