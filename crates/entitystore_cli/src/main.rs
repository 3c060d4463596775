//! CLI entry point for inspecting and maintaining an entity store.
//!
//! # Responsibility
//! - Drive `entitystore_core` against a directory for local sanity checks.
//! - Keep output deterministic and line-oriented.

use clap::{Parser, Subcommand};
use entitystore_core::{EntitiesRepository, Entity, JsonFileEntitiesRepository, RepoResult};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Inspect and maintain a file-backed entity store.
#[derive(Debug, Parser)]
#[command(name = "entitystore", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding the store's backing file
    #[arg(short, long, value_name = "DIR", default_value = ".", global = true)]
    dir: PathBuf,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, value_name = "LOG_DIR", global = true)]
    log_dir: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print core linkage and version
    Ping,

    /// List every list name, including empty lists
    Lists,

    /// Print the entities stored in one list
    Entities {
        /// List to print
        list: String,
    },

    /// Create an empty list
    AddList {
        /// List to create
        list: String,
    },

    /// Remove every entity with this id, in every list
    Delete {
        /// Entity id
        id: String,
    },

    /// Delete the backing file
    Clear,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = entitystore_core::default_log_level();
        if let Err(err) = entitystore_core::init_logging(level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    match run(&cli.dir, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(dir: &Path, command: Command) -> RepoResult<()> {
    let repo = match command {
        Command::Ping => {
            println!("entitystore_core ping={}", entitystore_core::ping());
            println!("entitystore_core version={}", entitystore_core::core_version());
            return Ok(());
        }
        _ => JsonFileEntitiesRepository::try_new(dir)?,
    };

    match command {
        Command::Ping => {}
        Command::Lists => {
            for list in repo.get_lists()? {
                println!("{list}");
            }
        }
        Command::Entities { list } => {
            for entity in repo.get_entities(&list)? {
                println!("{}", format_entity(&entity));
            }
        }
        Command::AddList { list } => repo.add_list(&list)?,
        Command::Delete { id } => repo.delete(&id)?,
        Command::Clear => repo.clear()?,
    }
    Ok(())
}

fn format_entity(entity: &Entity) -> String {
    let properties = entity
        .properties
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "{}\t{}\tv{}\toffline={}\t{}",
        entity.id,
        entity.label.as_deref().unwrap_or("-"),
        entity.version,
        entity.offline,
        properties
    )
}
