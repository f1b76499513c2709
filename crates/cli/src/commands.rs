//! Clap command tree.

use clap::{value_parser, Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("masterdata")
        .about("Manage master data key-groups and values")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("db")
                .long("db")
                .value_name("PATH")
                .global(true)
                .help("Journal file (default: masterdata.journal)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .global(true)
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("actor")
                .long("actor")
                .value_name("NAME")
                .global(true)
                .help("Actor stamped on written rows (default: configured system actor)"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Print output as JSON"),
        )
        .subcommand(keys_command())
        .subcommand(values_command())
        .subcommand(
            Command::new("import")
                .about("Reconcile rows from a TSV, CSV or JSON-lines file")
                .arg(Arg::new("file").required(true).value_name("FILE"))
                .arg(
                    Arg::new("format")
                        .long("format")
                        .value_parser(["tsv", "csv", "jsonl"])
                        .help("Input format (default: from the file extension)"),
                ),
        )
}

fn keys_command() -> Command {
    Command::new("keys")
        .about("Key-group operations")
        .subcommand_required(true)
        .subcommand(Command::new("list").about("List every key-group"))
        .subcommand(
            Command::new("find")
                .about("Show the key-group rows for GROUP")
                .arg(Arg::new("group").required(true)),
        )
        .subcommand(
            Command::new("add")
                .about("Insert a new key-group named GROUP")
                .arg(Arg::new("group").required(true))
                .arg(active_flag()),
        )
        .subcommand(edit_args(
            Command::new("update")
                .about("Change a key-group's name or flags")
                .arg(Arg::new("group").required(true))
                .arg(Arg::new("row_id").required(true).value_name("ROW_ID")),
        ))
}

fn values_command() -> Command {
    Command::new("values")
        .about("Value operations")
        .subcommand_required(true)
        .subcommand(
            Command::new("list")
                .about("List values in GROUP, or every value")
                .arg(Arg::new("group")),
        )
        .subcommand(
            Command::new("get")
                .about("Show the first value in GROUP named NAME")
                .arg(Arg::new("group").required(true))
                .arg(Arg::new("name").required(true)),
        )
        .subcommand(
            Command::new("add")
                .about("Insert a value (no duplicate check)")
                .arg(Arg::new("group").required(true))
                .arg(Arg::new("name").required(true))
                .arg(active_flag()),
        )
        .subcommand(edit_args(
            Command::new("update")
                .about("Change a value's name or flags")
                .arg(Arg::new("group").required(true))
                .arg(Arg::new("row_id").required(true).value_name("ROW_ID")),
        ))
}

fn active_flag() -> Arg {
    Arg::new("active")
        .long("active")
        .action(ArgAction::SetTrue)
        .help("Mark the new row active")
}

fn edit_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("name").long("name").help("New name"))
        .arg(
            Arg::new("active")
                .long("active")
                .value_name("BOOL")
                .value_parser(value_parser!(bool)),
        )
        .arg(
            Arg::new("deleted")
                .long("deleted")
                .value_name("BOOL")
                .value_parser(value_parser!(bool)),
        )
}
