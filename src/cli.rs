// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::feeds::gold::Timeframe;
use clap::{Arg, ArgAction, Command, value_parser};

const KARATS: [&str; 4] = ["24", "21", "18", "14"];

fn karat_arg(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id).long(id).value_name("KARAT").help(help)
}

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn range_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("from")
            .long("from")
            .value_name("YYYY-MM-DD")
            .help("Only purchases on or after this date"),
    )
    .arg(
        Arg::new("to")
            .long("to")
            .value_name("YYYY-MM-DD")
            .help("Only purchases on or before this date"),
    )
}

/// Market inputs shared by the valuation reports.
fn market_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("live")
            .long("live")
            .action(ArgAction::SetTrue)
            .help("Fetch gold price and exchange rate before reporting"),
    )
    .arg(
        Arg::new("price")
            .long("price")
            .value_name("USD_PER_OZ")
            .help("Use this spot price instead of the latest recorded one"),
    )
    .arg(
        Arg::new("rate")
            .long("rate")
            .value_name("EGP_PER_USD")
            .help("Use this USD/EGP rate instead of the latest recorded one"),
    )
    .arg(
        Arg::new("currency")
            .long("currency")
            .value_name("USD|EGP")
            .value_parser(["USD", "EGP", "usd", "egp"])
            .help("Display currency (defaults to the display_currency setting)"),
    )
}

fn purchase_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(
        Arg::new("date")
            .long("date")
            .value_name("YYYY-MM-DD")
            .required(required),
    )
    .arg(
        Arg::new("weight")
            .long("weight")
            .value_name("GRAMS")
            .required(required),
    )
    .arg(karat_arg("karat", "Karat of the gold bought (24, 21, 18, 14)").required(required))
    .arg(
        Arg::new("price")
            .long("price")
            .value_name("EGP_PER_GRAM")
            .required(required)
            .help("Price per gram as quoted, in EGP"),
    )
    .arg(karat_arg(
        "quoted-karat",
        "Karat the quoted price refers to (defaults to --karat)",
    ))
    .arg(
        Arg::new("manufacturing")
            .long("manufacturing")
            .value_name("EGP")
            .help("Flat manufacturing fee"),
    )
    .arg(
        Arg::new("other")
            .long("other")
            .value_name("EGP")
            .help("Other flat expenses"),
    )
    .arg(Arg::new("note").long("note"))
}

pub fn build_cli() -> Command {
    Command::new("goldclip")
        .version(clap::crate_version!())
        .about("Track gold purchases, convert karat prices, and value your holdings")
        .arg(
            Arg::new("owner")
                .long("owner")
                .global(true)
                .value_name("ID")
                .help("Owner whose purchases to use (defaults to the owner setting)"),
        )
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env("GOLDCLIP_DB")
                .value_name("PATH")
                .help("Database file (defaults to the platform data dir)"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .value_name("FILTER")
                .default_value("warn")
                .help("Log filter when RUST_LOG is unset"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("purchase")
                .about("Record and manage gold purchases")
                .subcommand(purchase_fields(Command::new("add"), true).about("Record a purchase"))
                .subcommand(json_args(range_args(
                    Command::new("list").about("List purchases").arg(
                        Arg::new("limit")
                            .long("limit")
                            .value_parser(value_parser!(usize)),
                    ),
                )))
                .subcommand(
                    purchase_fields(Command::new("edit"), false)
                        .about("Change a purchase; its total cost is recomputed")
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        ),
                )
                .subcommand(
                    Command::new("rm").about("Delete a purchase").arg(
                        Arg::new("id")
                            .long("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                ),
        )
        .subcommand(
            json_args(
                Command::new("convert")
                    .about("Convert a per-gram price between karats")
                    .arg(Arg::new("price").long("price").required(true))
                    .arg(
                        karat_arg("from", "Karat the price is quoted at")
                            .required(true)
                            .value_parser(KARATS),
                    )
                    .arg(
                        karat_arg("to", "Karat to convert to")
                            .required(true)
                            .value_parser(KARATS),
                    ),
            ),
        )
        .subcommand(json_args(
            Command::new("cost")
                .about("Preview the cost of a purchase without recording it")
                .arg(Arg::new("weight").long("weight").required(true))
                .arg(Arg::new("price").long("price").required(true))
                .arg(karat_arg("karat", "Karat of the gold bought").required(true))
                .arg(karat_arg(
                    "quoted-karat",
                    "Karat the quoted price refers to (defaults to --karat)",
                ))
                .arg(Arg::new("manufacturing").long("manufacturing"))
                .arg(Arg::new("other").long("other")),
        ))
        .subcommand(
            Command::new("price")
                .about("Gold spot price")
                .subcommand(Command::new("fetch").about("Fetch and record the live spot price"))
                .subcommand(json_args(
                    Command::new("list").about("Recorded spot prices").arg(
                        Arg::new("limit")
                            .long("limit")
                            .default_value("20")
                            .value_parser(value_parser!(usize)),
                    ),
                ))
                .subcommand(json_args(
                    Command::new("spot")
                        .about("Per-gram price of each karat")
                        .arg(Arg::new("price").long("price").value_name("USD_PER_OZ"))
                        .arg(
                            Arg::new("rate")
                                .long("rate")
                                .value_name("EGP_PER_USD")
                                .help("Also show EGP prices at this rate"),
                        ),
                ))
                .subcommand(json_args(
                    Command::new("history")
                        .about("Spot price history with the value of current holdings")
                        .arg(
                            Arg::new("tf")
                                .long("tf")
                                .default_value("month")
                                .value_parser(Timeframe::NAMES),
                        ),
                )),
        )
        .subcommand(
            Command::new("fx")
                .about("USD/EGP exchange rate")
                .subcommand(Command::new("fetch").about("Fetch and record the live rate"))
                .subcommand(json_args(
                    Command::new("list").about("Recorded rates").arg(
                        Arg::new("limit")
                            .long("limit")
                            .default_value("20")
                            .value_parser(value_parser!(usize)),
                    ),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Portfolio valuation")
                .subcommand(json_args(range_args(market_args(
                    Command::new("summary").about("Totals, current value, and profit/loss"),
                ))))
                .subcommand(json_args(range_args(market_args(
                    Command::new("performance")
                        .about("Profit/loss per purchase with best and worst performers"),
                ))))
                .subcommand(json_args(range_args(
                    Command::new("by-date").about("Purchases grouped by day"),
                ))),
        )
        .subcommand(
            Command::new("export").about("Export data").subcommand(range_args(
                Command::new("purchases")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .default_value("csv")
                            .help("csv or json"),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            )),
        )
        .subcommand(
            Command::new("import").about("Import data").subcommand(
                Command::new("purchases")
                    .about("Import purchases from CSV (same columns as export)")
                    .arg(Arg::new("path").long("path").required(true)),
            ),
        )
        .subcommand(
            Command::new("config")
                .about("Show or change settings")
                .subcommand(json_args(Command::new("show")))
                .subcommand(
                    Command::new("set")
                        .arg(
                            Arg::new("key")
                                .required(true)
                                .value_parser(crate::config::KEYS),
                        )
                        .arg(Arg::new("value").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Check stored data for inconsistencies"))
}
