//! Command-line front end for the Gradebook store.
//!
//! # Responsibility
//! - Map subcommands onto one [`StudentSession`] per invocation.
//! - Print plain text by default, JSON with `--json`.
//!
//! # Invariants
//! - Every failure is reported on stderr with a non-zero exit code.

use clap::{Args, Parser, Subcommand};
use gradebook_core::{
    default_log_level, init_logging, EditOutcome, PartitionKey, ReadMode, SearchHit,
    StoreConfig, StudentRecord, StudentSession,
};
use log::info;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;

/// gradebook - partitioned student-record store
#[derive(Parser, Debug)]
#[command(name = "gradebook", version, about = "Partitioned student-record store")]
struct Cli {
    /// Storage root (defaults to $GRADEBOOK_ROOT or ./Alumnos)
    #[arg(long, value_name = "DIR", global = true)]
    root: Option<PathBuf>,

    /// Program of the active partition
    #[arg(long, global = true)]
    program: Option<String>,

    /// Term of the active partition
    #[arg(long, global = true)]
    term: Option<String>,

    /// Propagate read failures instead of treating them as empty
    #[arg(long, global = true)]
    strict: bool,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable rolling file logs in this directory
    #[arg(long, value_name = "DIR", global = true)]
    log_dir: Option<PathBuf>,

    /// Log level used with --log-dir
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List program directories
    Programs,
    /// List records of the active partition
    List,
    /// Insert a record into its own program/term partition
    Add(RecordArgs),
    /// Edit a record of the active partition, moving it when program/term change
    Edit {
        /// Id of the record being edited
        #[arg(long = "original-id")]
        original_id: String,
        #[command(flatten)]
        record: RecordArgs,
    },
    /// Delete a record from the active partition
    Delete { id: String },
    /// Look up records in the active partition
    Find {
        /// Exact id (case-insensitive)
        #[arg(long, conflicts_with = "name", required_unless_present = "name")]
        id: Option<String>,
        /// Name fragment (case-insensitive)
        #[arg(long)]
        name: Option<String>,
    },
    /// Search every partition by exact id or name fragment
    Search { text: String },
    /// Import a comma-delimited file
    Import {
        path: PathBuf,
        /// Insert every line into the active partition instead of routing
        #[arg(long)]
        local: bool,
    },
}

#[derive(Args, Debug)]
struct RecordArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    id: String,
    #[arg(long)]
    score: f64,
    #[arg(long = "record-term")]
    record_term: String,
    #[arg(long)]
    age: i32,
    #[arg(long = "record-program")]
    record_program: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long, default_value = "")]
    address: String,
}

impl From<RecordArgs> for StudentRecord {
    fn from(args: RecordArgs) -> Self {
        Self {
            name: args.name,
            id: args.id,
            score: args.score,
            term: args.record_term,
            age: args.age,
            program: args.record_program,
            email: args.email,
            phone: args.phone,
            address: args.address,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, &log_dir.to_string_lossy())?;
    }

    let config = build_config(&cli);
    let key = PartitionKey::new(
        cli.program
            .clone()
            .unwrap_or_else(|| config.default_partition.program.clone()),
        cli.term
            .clone()
            .unwrap_or_else(|| config.default_partition.term.clone()),
    );
    let mut session = StudentSession::open_at(&config, key).map_err(|err| err.to_string())?;
    info!(
        "event=cli_command module=cli status=start partition={}",
        session.active_key()
    );

    let json = cli.json;
    match cli.command {
        Command::Programs => {
            let programs = session.list_programs().map_err(|err| err.to_string())?;
            if json {
                print_json(&json!(programs))?;
            } else {
                programs.iter().for_each(|program| println!("{program}"));
            }
        }
        Command::List => {
            let records = session.list_records().map_err(|err| err.to_string())?;
            print_records(&records, json)?;
        }
        Command::Add(args) => {
            let record = StudentRecord::from(args);
            report_violations(&session, &record)?;
            session.insert(&record).map_err(|err| err.to_string())?;
            print_status(json, "inserted", &record.partition_key().to_string())?;
        }
        Command::Edit {
            original_id,
            record,
        } => {
            let record = StudentRecord::from(record);
            report_violations(&session, &record)?;
            let outcome = session
                .update(&original_id, &record)
                .map_err(|err| err.to_string())?;
            match outcome {
                EditOutcome::UpdatedInPlace => {
                    print_status(json, "updated", &session.active_key().to_string())?
                }
                EditOutcome::Moved { to, .. } => print_status(json, "moved", &to.to_string())?,
            }
        }
        Command::Delete { id } => {
            session.delete(&id).map_err(|err| err.to_string())?;
            print_status(json, "deleted", &session.active_key().to_string())?;
        }
        Command::Find { id, name } => {
            let records = match (id, name) {
                (Some(id), _) => session
                    .find_by_id(&id)
                    .map(|found| found.into_iter().collect::<Vec<_>>()),
                (None, Some(fragment)) => session.find_by_name_fragment(&fragment),
                (None, None) => Ok(Vec::new()),
            }
            .map_err(|err| err.to_string())?;
            print_records(&records, json)?;
        }
        Command::Search { text } => {
            let hits = session.search_all_partitions(&text);
            print_hits(&hits, json)?;
        }
        Command::Import { path, local } => {
            let inserted = if local {
                session.import_into_active(&path)
            } else {
                session.import_delimited(&path)
            }
            .map_err(|err| err.to_string())?;
            if json {
                print_json(&json!({
                    "inserted": inserted,
                    "active": session.active_key(),
                }))?;
            } else {
                println!("imported {inserted} record(s); active {}", session.active_key());
            }
        }
    }
    Ok(())
}

fn build_config(cli: &Cli) -> StoreConfig {
    let mut config = StoreConfig::from_env();
    if let Some(root) = &cli.root {
        config.root_dir = root.clone();
    }
    if cli.strict {
        config.read_mode = ReadMode::Strict;
    }
    config
}

fn report_violations(session: &StudentSession, record: &StudentRecord) -> Result<(), String> {
    let messages = session.validate(record);
    if messages.is_empty() {
        Ok(())
    } else {
        Err(messages.join("; "))
    }
}

fn print_records(records: &[StudentRecord], json: bool) -> Result<(), String> {
    if json {
        return print_json(&json!(records));
    }
    if records.is_empty() {
        println!("no records");
    }
    for record in records {
        println!("{}", describe(record));
    }
    Ok(())
}

fn print_hits(hits: &[SearchHit], json: bool) -> Result<(), String> {
    if json {
        return print_json(&json!(hits));
    }
    if hits.is_empty() {
        println!("no matches");
    }
    for hit in hits {
        println!("[{}] {}", hit.partition, describe(&hit.record));
    }
    Ok(())
}

fn print_status(json: bool, status: &str, partition: &str) -> Result<(), String> {
    if json {
        print_json(&json!({ "status": status, "partition": partition }))
    } else {
        println!("{status} ({partition})");
        Ok(())
    }
}

fn print_json(value: &serde_json::Value) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|err| err.to_string())?;
    println!("{text}");
    Ok(())
}

fn describe(record: &StudentRecord) -> String {
    format!(
        "{} | {} | score {} | age {} | {}/{}",
        record.id, record.name, record.score, record.age, record.program, record.term
    )
}
