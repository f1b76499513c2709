//! masterdata CLI: manage key-groups and values in a journal-backed store.
//!
//! `masterdata [--db PATH] [--config FILE] [--json] COMMAND` runs one
//! command and exits. Set `RUST_LOG` for store logging (default `warn`).

mod commands;
mod format;
mod parse;

use std::fs::File;
use std::io::BufReader;
use std::process;

use anyhow::{Context, Result};
use masterdata::{MasterData, MasterDataConfig, MasterKey, MasterValue};
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::{format_error, format_output, Output, OutputMode};
use parse::{matches_to_action, Action, Edit};

const DEFAULT_DB: &str = "masterdata.journal";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let matches = build_cli().get_matches();
    let mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    match run(&matches) {
        Ok(output) => {
            println!("{}", format_output(&output, mode));
        }
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            process::exit(1);
        }
    }
}

fn run(matches: &clap::ArgMatches) -> Result<Output> {
    let action = matches_to_action(matches).map_err(anyhow::Error::msg)?;
    let db = open_database(matches)?;
    let actor = matches
        .get_one::<String>("actor")
        .cloned()
        .unwrap_or_else(|| db.config().system_actor.clone());

    let output = execute(&db, action, &actor)?;
    db.flush().context("Failed to flush journal")?;
    Ok(output)
}

fn open_database(matches: &clap::ArgMatches) -> Result<MasterData> {
    let config = match matches.get_one::<String>("config") {
        Some(path) => MasterDataConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path))?,
        None => MasterDataConfig::default(),
    };
    let path = matches
        .get_one::<String>("db")
        .map(|s| s.as_str())
        .unwrap_or(DEFAULT_DB);

    MasterData::builder()
        .path(path)
        .config(config)
        .open()
        .with_context(|| format!("Failed to open database {}", path))
}

fn execute(db: &MasterData, action: Action, actor: &str) -> Result<Output> {
    let output = match action {
        Action::KeysList => Output::Keys(db.keys.list_all()?),
        Action::KeysFind { group } => Output::Keys(db.keys.find_by_group(&group)?),
        Action::KeysAdd { group, active } => {
            Output::Written(db.keys.insert(MasterKey::new(group, actor).active(active))?)
        }
        Action::KeysUpdate { group, row_id, edit } => {
            let current = db.keys.find_by_group(&group)?.into_iter().find(|k| k.row_id == row_id);
            match current {
                Some(mut key) => {
                    apply_edit(&mut key.name, &mut key.is_active, &mut key.is_deleted, edit);
                    key.audit.touch(actor);
                    Output::Written(db.keys.update(&group, &row_id, key)?)
                }
                None => Output::NotFound,
            }
        }
        Action::ValuesList { group: Some(group) } => {
            Output::Values(db.values.try_list_all_by_group(&group)?)
        }
        Action::ValuesList { group: None } => Output::Values(db.values.list_all()?),
        Action::ValuesGet { group, name } => Output::Value(db.values.find_by_name(&group, &name)?),
        Action::ValuesAdd { group, name, active } => {
            Output::Written(db.values.insert(MasterValue::new(group, name, actor).active(active))?)
        }
        Action::ValuesUpdate { group, row_id, edit } => {
            let current = db
                .values
                .try_list_all_by_group(&group)?
                .into_iter()
                .find(|v| v.row_id == row_id);
            match current {
                Some(mut value) => {
                    apply_edit(&mut value.name, &mut value.is_active, &mut value.is_deleted, edit);
                    value.audit.touch(actor);
                    Output::Written(db.values.update(&group, &row_id, value)?)
                }
                None => Output::NotFound,
            }
        }
        Action::Import { path, format } => {
            let file = File::open(&path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            let rows = format.parse(BufReader::new(file))?;
            Output::Report(db.reconciler.reconcile_rows(rows)?)
        }
    };
    Ok(output)
}

fn apply_edit(name: &mut String, active: &mut bool, deleted: &mut bool, edit: Edit) {
    if let Some(new_name) = edit.name {
        *name = new_name;
    }
    if let Some(flag) = edit.active {
        *active = flag;
    }
    if let Some(flag) = edit.deleted {
        *deleted = flag;
    }
}
