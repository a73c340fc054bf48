//! FFI use-case API for the UI shell.
//!
//! # Responsibility
//! - Expose the student session operation set to Dart via FRB.
//! - Keep error semantics simple: envelopes with `ok`, a stable error code
//!   and a human-readable message.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - No hidden "current partition": every partition-scoped call receives
//!   `program` and `term` explicitly.
//! - The storage root is resolved once per process.

use gradebook_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    EditOutcome, ImportError, PartitionKey, SearchHit, ServiceError, StoreConfig, StudentRecord,
    StudentSession,
};
use log::warn;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const ENTRY_ROOT_DIR_NAME: &str = "gradebook_entry";
static ENTRY_CONFIG: OnceLock<StoreConfig> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Exposes core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory for rolling logs.
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Flat student record shape shared with Dart.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecordDto {
    pub name: String,
    pub id: String,
    pub score: f64,
    pub term: String,
    pub age: i32,
    pub program: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl From<StudentRecord> for StudentRecordDto {
    fn from(value: StudentRecord) -> Self {
        Self {
            name: value.name,
            id: value.id,
            score: value.score,
            term: value.term,
            age: value.age,
            program: value.program,
            email: value.email,
            phone: value.phone,
            address: value.address,
        }
    }
}

impl From<StudentRecordDto> for StudentRecord {
    fn from(value: StudentRecordDto) -> Self {
        Self {
            name: value.name.trim().to_string(),
            id: value.id.trim().to_string(),
            score: value.score,
            term: value.term.trim().to_string(),
            age: value.age,
            program: value.program.trim().to_string(),
            email: value.email.trim().to_string(),
            phone: value.phone.trim().to_string(),
            address: value.address.trim().to_string(),
        }
    }
}

/// Generic action envelope for mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// `validation|conflict|not_found|store|import` on failure.
    pub error_code: Option<String>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            error_code: None,
            message: message.into(),
        }
    }

    fn failure(operation: &str, err: &ServiceError) -> Self {
        Self {
            ok: false,
            error_code: Some(error_code(err).to_string()),
            message: format!("{operation} failed: {err}"),
        }
    }
}

/// Partition selection envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionResponse {
    pub ok: bool,
    /// Absolute-or-root-relative path of the selected partition file.
    pub path: Option<String>,
    pub message: String,
}

/// Record list envelope for list and lookup calls.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordListResponse {
    pub items: Vec<StudentRecordDto>,
    pub message: String,
}

/// Program list envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramListResponse {
    pub items: Vec<String>,
    pub message: String,
}

/// One hierarchy-wide search match.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchItem {
    pub program: String,
    pub term: String,
    pub path: String,
    pub record: StudentRecordDto,
}

/// Hierarchy-wide search envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    pub items: Vec<SearchItem>,
    pub message: String,
}

/// Bulk-import envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResponse {
    pub ok: bool,
    pub inserted: u32,
    /// Active partition after the import (last routed partition when routing).
    pub active_path: Option<String>,
    pub message: String,
}

/// Selects (creating when missing) a partition and returns its file path.
#[flutter_rust_bridge::frb(sync)]
pub fn select_partition(program: String, term: String) -> PartitionResponse {
    match open_session(&program, &term) {
        Ok(session) => PartitionResponse {
            ok: true,
            path: Some(path_string(session.active_path())),
            message: "Partition selected.".to_string(),
        },
        Err(err) => PartitionResponse {
            ok: false,
            path: None,
            message: format!("select_partition failed: {err}"),
        },
    }
}

/// Lists program directories under the storage root.
#[flutter_rust_bridge::frb(sync)]
pub fn list_programs() -> ProgramListResponse {
    let router = gradebook_core::PartitionRouter::from_config(resolve_entry_config());
    match router.list_programs() {
        Ok(items) => ProgramListResponse {
            message: format!("Found {} program(s).", items.len()),
            items,
        },
        Err(err) => ProgramListResponse {
            items: Vec::new(),
            message: format!("list_programs failed: {err}"),
        },
    }
}

/// Lists all records of one partition in storage order.
#[flutter_rust_bridge::frb(sync)]
pub fn list_records(program: String, term: String) -> RecordListResponse {
    records_response(
        "list_records",
        open_session(&program, &term).and_then(|session| session.list_records()),
    )
}

/// Returns validation messages for `record`; empty when valid.
#[flutter_rust_bridge::frb(sync)]
pub fn validate_record(record: StudentRecordDto) -> Vec<String> {
    gradebook_core::validation_messages(&record.into())
}

/// Inserts a record into its own program/term partition.
#[flutter_rust_bridge::frb(sync)]
pub fn insert_record(record: StudentRecordDto) -> ActionResponse {
    let record = StudentRecord::from(record);
    let result = open_session_at(record.partition_key()).and_then(|session| session.insert(&record));
    match result {
        Ok(()) => ActionResponse::success("Student created."),
        Err(err) => ActionResponse::failure("insert_record", &err),
    }
}

/// Edits `original_id` in the given partition, moving the record when its
/// program/term changed.
#[flutter_rust_bridge::frb(sync)]
pub fn update_record(
    program: String,
    term: String,
    original_id: String,
    record: StudentRecordDto,
) -> ActionResponse {
    let record = StudentRecord::from(record);
    let result = open_session(&program, &term)
        .and_then(|mut session| session.update(original_id.trim(), &record));
    match result {
        Ok(EditOutcome::UpdatedInPlace) => ActionResponse::success("Student updated."),
        Ok(EditOutcome::Moved { to, .. }) => {
            ActionResponse::success(format!("Student moved to {to}."))
        }
        Err(err) => ActionResponse::failure("update_record", &err),
    }
}

/// Deletes a record from the given partition.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_record(program: String, term: String, id: String) -> ActionResponse {
    match open_session(&program, &term).and_then(|session| session.delete(id.trim())) {
        Ok(()) => ActionResponse::success("Student deleted."),
        Err(err) => ActionResponse::failure("delete_record", &err),
    }
}

/// Finds one record by id (case-insensitive) in the given partition.
#[flutter_rust_bridge::frb(sync)]
pub fn find_by_id(program: String, term: String, id: String) -> RecordListResponse {
    records_response(
        "find_by_id",
        open_session(&program, &term)
            .and_then(|session| session.find_by_id(id.trim()))
            .map(|found| found.into_iter().collect()),
    )
}

/// Finds records by name fragment (case-insensitive) in the given partition.
#[flutter_rust_bridge::frb(sync)]
pub fn find_by_name_fragment(program: String, term: String, fragment: String) -> RecordListResponse {
    records_response(
        "find_by_name_fragment",
        open_session(&program, &term)
            .and_then(|session| session.find_by_name_fragment(fragment.trim())),
    )
}

/// Searches every partition by exact id or name fragment.
#[flutter_rust_bridge::frb(sync)]
pub fn search_all_partitions(text: String) -> SearchResponse {
    let config = resolve_entry_config();
    let hits =
        gradebook_core::search_partitions(&config.root_dir, &config.extension, text.trim());
    let items = hits.into_iter().map(to_search_item).collect::<Vec<_>>();
    SearchResponse {
        message: result_message(items.len()),
        items,
    }
}

/// Imports a comma-delimited file.
///
/// With `route_by_record`, each record goes to its own program/term
/// partition; otherwise everything lands in the given partition.
#[flutter_rust_bridge::frb(sync)]
pub fn import_delimited(
    program: String,
    term: String,
    path: String,
    route_by_record: bool,
) -> ImportResponse {
    let mut session = match open_session(&program, &term) {
        Ok(session) => session,
        Err(err) => return import_failure(format!("import_delimited failed: {err}")),
    };
    let source = PathBuf::from(path.trim());
    let result = if route_by_record {
        session.import_delimited(&source)
    } else {
        session.import_into_active(&source)
    };

    match result {
        Ok(inserted) => ImportResponse {
            ok: true,
            inserted: u32::try_from(inserted).unwrap_or(u32::MAX),
            active_path: Some(path_string(session.active_path())),
            message: format!("Imported {inserted} record(s)."),
        },
        Err(err) => {
            warn!("event=ffi_import module=ffi status=error error_code={}", import_error_code(&err));
            import_failure(format!("import_delimited failed: {err}"))
        }
    }
}

fn import_failure(message: String) -> ImportResponse {
    ImportResponse {
        ok: false,
        inserted: 0,
        active_path: None,
        message,
    }
}

fn resolve_entry_config() -> &'static StoreConfig {
    ENTRY_CONFIG.get_or_init(|| {
        let mut config = StoreConfig::from_env();
        if std::env::var_os(gradebook_core::config::ROOT_ENV_VAR).is_none() {
            config.root_dir = std::env::temp_dir().join(ENTRY_ROOT_DIR_NAME);
        }
        config
    })
}

fn open_session(program: &str, term: &str) -> Result<StudentSession, ServiceError> {
    open_session_at(PartitionKey::new(program.trim(), term.trim()))
}

fn open_session_at(key: PartitionKey) -> Result<StudentSession, ServiceError> {
    StudentSession::open_at(resolve_entry_config(), key)
}

fn records_response(
    operation: &str,
    result: Result<Vec<StudentRecord>, ServiceError>,
) -> RecordListResponse {
    match result {
        Ok(records) => RecordListResponse {
            message: result_message(records.len()),
            items: records.into_iter().map(StudentRecordDto::from).collect(),
        },
        Err(err) => RecordListResponse {
            items: Vec::new(),
            message: format!("{operation} failed: {err}"),
        },
    }
}

fn result_message(count: usize) -> String {
    if count == 0 {
        "No results.".to_string()
    } else {
        format!("Found {count} result(s).")
    }
}

fn to_search_item(hit: SearchHit) -> SearchItem {
    SearchItem {
        program: hit.partition.program,
        term: hit.partition.term,
        path: path_string(&hit.path),
        record: hit.record.into(),
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn error_code(err: &ServiceError) -> &'static str {
    match err {
        ServiceError::Validation(_) => "validation",
        ServiceError::Conflict { .. } => "conflict",
        ServiceError::NotFound { .. } => "not_found",
        ServiceError::Store(_) => "store",
        ServiceError::Import(_) => "import",
    }
}

fn import_error_code(err: &ImportError) -> &'static str {
    match err {
        ImportError::Io { .. } => "import_io",
        ImportError::Parse { .. } => "import_parse",
        ImportError::Store(_) => "store",
    }
}
