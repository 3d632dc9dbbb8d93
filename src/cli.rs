// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, command, value_parser};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn as_of_arg() -> Arg {
    Arg::new("as-of")
        .long("as-of")
        .value_name("YYYY-MM-DD")
        .help("Run as if today were this date (reports through the day before)")
}

pub fn build_cli() -> Command {
    command!()
        .name("cashdash")
        .about("Daily and monthly revenue roll-ups, rendered and mailed")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env("CASHDASH_DB")
                .value_name("PATH")
                .value_parser(value_parser!(std::path::PathBuf))
                .help("Warehouse SQLite file (default: platform data dir)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .env("CASHDASH_CONFIG")
                .value_name("PATH")
                .value_parser(value_parser!(std::path::PathBuf))
                .help("JSON config file (default: platform config dir)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("More log output (-v debug, -vv trace)"),
        )
        .subcommand(Command::new("init").about("Create the warehouse schema"))
        .subcommand(
            Command::new("import")
                .about("Load CSV rows into the warehouse")
                .subcommand_required(true)
                .subcommand(
                    Command::new("revenue")
                        .about("CSV columns: effective_date,category,amount")
                        .arg(Arg::new("path").long("path").required(true)),
                )
                .subcommand(
                    Command::new("budget")
                        .about("CSV columns: month,category,amount")
                        .arg(Arg::new("path").long("path").required(true)),
                ),
        )
        .subcommand(
            Command::new("status")
                .about("Upstream load status used by the readiness gate")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Show the latest load run"))
                .subcommand(
                    Command::new("mark")
                        .about("Record a finished load run")
                        .arg(Arg::new("state").required(true).help("e.g. Completed, Failed")),
                ),
        )
        .subcommand(
            Command::new("summary")
                .about("Print roll-up tables")
                .subcommand_required(true)
                .subcommand(json_args(
                    Command::new("daily")
                        .about("One row per day of a month")
                        .arg(Arg::new("month").long("month").value_name("YYYY-MM"))
                        .arg(as_of_arg()),
                ))
                .subcommand(json_args(
                    Command::new("monthly")
                        .about("One row per month of a year")
                        .arg(Arg::new("year").long("year").value_name("YYYY"))
                        .arg(
                            Arg::new("through")
                                .long("through")
                                .value_name("YYYY-MM")
                                .conflicts_with("year"),
                        )
                        .arg(as_of_arg()),
                ))
                .subcommand(json_args(
                    Command::new("variance")
                        .about("Actual vs baseline for month- or year-to-date")
                        .arg(
                            Arg::new("scope")
                                .long("scope")
                                .value_parser(["mtd", "ytd"])
                                .default_value("mtd"),
                        )
                        .arg(as_of_arg()),
                )),
        )
        .subcommand(
            Command::new("export")
                .about("Write a roll-up table to a file")
                .arg(
                    Arg::new("table")
                        .long("table")
                        .value_parser(["daily", "monthly"])
                        .required(true),
                )
                .arg(Arg::new("format").long("format").default_value("csv"))
                .arg(Arg::new("out").long("out").required(true))
                .arg(as_of_arg()),
        )
        .subcommand(
            Command::new("doctor")
                .about("Check warehouse data against the category list")
                .arg(as_of_arg()),
        )
        .subcommand(
            Command::new("run")
                .about("Build the report and email it")
                .arg(as_of_arg())
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Write the email to the output dir instead of sending"),
                )
                .arg(
                    Arg::new("skip-readiness-check")
                        .long("skip-readiness-check")
                        .action(ArgAction::SetTrue)
                        .help("Run even if the latest upstream load has not completed"),
                ),
        )
}
