// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{data_ready, latest_load_run, record_load_run};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => match latest_load_run(conn)? {
            Some((state, at)) => {
                let ready = if data_ready(conn)? { "ready" } else { "not ready" };
                println!("Latest load: {} at {} ({})", state, at, ready);
            }
            None => println!("No load runs recorded (not ready)"),
        },
        Some(("mark", sub)) => {
            let state = sub.get_one::<String>("state").map(|s| s.trim()).unwrap_or_default();
            if state.is_empty() {
                anyhow::bail!("State must not be empty");
            }
            record_load_run(conn, state)?;
            println!("Recorded load run: {}", state);
        }
        _ => {}
    }
    Ok(())
}
