//! ArgMatches → Action conversion.

use std::path::PathBuf;

use clap::ArgMatches;
use masterdata::import::ImportFormat;
use masterdata::RowId;

/// What the user asked for.
#[derive(Debug, PartialEq)]
pub enum Action {
    KeysList,
    KeysFind { group: String },
    KeysAdd { group: String, active: bool },
    KeysUpdate { group: String, row_id: RowId, edit: Edit },
    ValuesList { group: Option<String> },
    ValuesGet { group: String, name: String },
    ValuesAdd { group: String, name: String, active: bool },
    ValuesUpdate { group: String, row_id: RowId, edit: Edit },
    Import { path: PathBuf, format: ImportFormat },
}

/// Fields an `update` command may change. `None` keeps the stored value.
#[derive(Debug, Default, PartialEq)]
pub struct Edit {
    pub name: Option<String>,
    pub active: Option<bool>,
    pub deleted: Option<bool>,
}

/// Convert clap ArgMatches into an Action.
pub fn matches_to_action(matches: &ArgMatches) -> Result<Action, String> {
    let (sub_name, sub_matches) = matches
        .subcommand()
        .ok_or_else(|| "No command provided".to_string())?;

    match sub_name {
        "keys" => parse_keys(sub_matches),
        "values" => parse_values(sub_matches),
        "import" => parse_import(sub_matches),
        other => Err(format!("Unknown command: {}", other)),
    }
}

fn required(m: &ArgMatches, id: &str) -> Result<String, String> {
    m.get_one::<String>(id)
        .cloned()
        .ok_or_else(|| format!("Missing argument: {}", id))
}

fn parse_edit(m: &ArgMatches) -> Edit {
    Edit {
        name: m.get_one::<String>("name").cloned(),
        active: m.get_one::<bool>("active").copied(),
        deleted: m.get_one::<bool>("deleted").copied(),
    }
}

// =========================================================================
// Keys
// =========================================================================

fn parse_keys(matches: &ArgMatches) -> Result<Action, String> {
    let (sub, m) = matches.subcommand().ok_or("No keys subcommand")?;
    match sub {
        "list" => Ok(Action::KeysList),
        "find" => Ok(Action::KeysFind {
            group: required(m, "group")?,
        }),
        "add" => Ok(Action::KeysAdd {
            group: required(m, "group")?,
            active: m.get_flag("active"),
        }),
        "update" => Ok(Action::KeysUpdate {
            group: required(m, "group")?,
            row_id: RowId::from(required(m, "row_id")?),
            edit: parse_edit(m),
        }),
        other => Err(format!("Unknown keys subcommand: {}", other)),
    }
}

// =========================================================================
// Values
// =========================================================================

fn parse_values(matches: &ArgMatches) -> Result<Action, String> {
    let (sub, m) = matches.subcommand().ok_or("No values subcommand")?;
    match sub {
        "list" => Ok(Action::ValuesList {
            group: m.get_one::<String>("group").cloned(),
        }),
        "get" => Ok(Action::ValuesGet {
            group: required(m, "group")?,
            name: required(m, "name")?,
        }),
        "add" => Ok(Action::ValuesAdd {
            group: required(m, "group")?,
            name: required(m, "name")?,
            active: m.get_flag("active"),
        }),
        "update" => Ok(Action::ValuesUpdate {
            group: required(m, "group")?,
            row_id: RowId::from(required(m, "row_id")?),
            edit: parse_edit(m),
        }),
        other => Err(format!("Unknown values subcommand: {}", other)),
    }
}

// =========================================================================
// Import
// =========================================================================

fn parse_import(m: &ArgMatches) -> Result<Action, String> {
    let path = PathBuf::from(required(m, "file")?);
    let format = match m.get_one::<String>("format") {
        Some(name) => ImportFormat::from_name(name),
        None => ImportFormat::from_path(&path),
    }
    .ok_or_else(|| {
        format!(
            "Cannot tell the format of {}; pass --format tsv|csv|jsonl",
            path.display()
        )
    })?;
    Ok(Action::Import { path, format })
}
