// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
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
            .help("Print as JSON lines"),
    )
}

fn id_arg() -> Arg {
    Arg::new("id").long("id").required(true).help("Record id")
}

pub fn build_cli() -> Command {
    Command::new("coinkeep")
        .version(clap::crate_version!())
        .about("Personal finance ledger with base-currency normalization")
        .subcommand(
            Command::new("init")
                .about("Set up the profile (first run only)")
                .arg(Arg::new("name").long("name").required(true))
                .arg(
                    Arg::new("currency")
                        .long("currency")
                        .help("Base currency code; defaults to COINKEEP_DEFAULT_CURRENCY"),
                ),
        )
        .subcommand(
            Command::new("profile")
                .about("Show or edit the profile")
                .subcommand(json_flags(Command::new("show")))
                .subcommand(
                    Command::new("rename").arg(Arg::new("name").long("name").required(true)),
                )
                .subcommand(
                    Command::new("avatar")
                        .arg(Arg::new("file").long("file").help("Image file to use"))
                        .arg(
                            Arg::new("clear")
                                .long("clear")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("file"),
                        ),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Income and expense transactions")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("amount").long("amount").required(true).allow_hyphen_values(true))
                        .arg(Arg::new("merchant").long("merchant").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .default_value("expense")
                                .value_parser(["income", "expense"]),
                        )
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("date").long("date").help("YYYY-MM-DD, defaults to today")),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(
                        Arg::new("limit")
                            .long("limit")
                            .value_parser(value_parser!(usize)),
                    ),
                ))
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(json_flags(
                    Command::new("categories").about("Known categories with usage counts"),
                )),
        )
        .subcommand(
            Command::new("sub")
                .about("Recurring monthly subscriptions")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("day")
                                .long("day")
                                .required(true)
                                .value_parser(value_parser!(u32)),
                        )
                        .arg(Arg::new("category").long("category")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(Command::new("toggle").arg(id_arg())),
        )
        .subcommand(
            Command::new("fx")
                .about("Base currency and exchange rates")
                .subcommand(
                    Command::new("set-base").arg(Arg::new("currency").required(true)),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(Command::new("fetch"))
                .subcommand(Command::new("currencies"))
                .subcommand(
                    Command::new("convert")
                        .arg(Arg::new("amount").long("amount").required(true).allow_hyphen_values(true))
                        .arg(Arg::new("from").long("from").required(true))
                        .arg(Arg::new("to").long("to").required(true)),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Aggregated statistics")
                .subcommand(json_flags(Command::new("summary")))
                .subcommand(json_flags(
                    Command::new("monthly").arg(
                        Arg::new("months")
                            .long("months")
                            .value_parser(value_parser!(usize)),
                    ),
                ))
                .subcommand(json_flags(Command::new("by-category"))),
        )
        .subcommand(
            Command::new("advisor")
                .about("AI spending insights and chat")
                .subcommand(json_flags(Command::new("insights")))
                .subcommand(
                    Command::new("chat").arg(Arg::new("message").long("message").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Check stored data for problems"))
        .subcommand(
            Command::new("reset")
                .about("Erase all data and start over")
                .arg(
                    Arg::new("yes")
                        .long("yes")
                        .action(ArgAction::SetTrue)
                        .help("Confirm the wipe"),
                ),
        )
}
