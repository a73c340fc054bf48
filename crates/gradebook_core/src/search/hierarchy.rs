//! Breadth-first scan over the partition hierarchy.
//!
//! # Responsibility
//! - Visit every directory under the root with an explicit FIFO worklist.
//! - Strictly decode each partition line and test it against the query.
//!
//! # Invariants
//! - Directory entries are visited in file-name order, so results are
//!   deterministic for a given tree.
//! - Undecodable lines and unreadable files/directories are skipped, never
//!   fatal.
//! - Symlinked directories are never entered, so every directory is visited
//!   at most once.
//! - No cross-partition deduplication is performed.

use crate::model::partition::PartitionKey;
use crate::model::student::StudentRecord;
use crate::store::codec::try_decode;
use crate::store::PartitionFile;
use log::{debug, warn};
use serde::Serialize;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

/// Single match returned by [`search_partitions`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// Key derived from the partition location (`<program>/<term>.<ext>`).
    pub partition: PartitionKey,
    pub path: PathBuf,
    pub record: StudentRecord,
}

/// Searches every partition file under `root`.
///
/// A record matches when its id equals `text` ignoring case, or its name
/// contains `text` ignoring case. Returns an empty list for blank queries and
/// for an absent or non-directory root.
pub fn search_partitions(root: &Path, extension: &str, text: &str) -> Vec<SearchHit> {
    let query = text.trim();
    if query.is_empty() || !root.is_dir() {
        return Vec::new();
    }
    let query_lower = query.to_lowercase();

    let mut hits = Vec::new();
    let mut visited_files = 0_usize;
    let mut pending = VecDeque::from([root.to_path_buf()]);

    while let Some(dir) = pending.pop_front() {
        let mut entries = match fs::read_dir(&dir) {
            Ok(entries) => entries
                .filter_map(Result::ok)
                .filter_map(|entry| Some((entry.path(), entry.file_type().ok()?)))
                .collect::<Vec<_>>(),
            Err(err) => {
                warn!(
                    "event=hierarchy_search module=search status=skip path={} error={}",
                    dir.display(),
                    err
                );
                continue;
            }
        };
        entries.sort_by(|left, right| left.0.cmp(&right.0));

        for (path, file_type) in entries {
            if file_type.is_dir() {
                pending.push_back(path);
            } else if file_type.is_symlink() && path.is_dir() {
                debug!(
                    "event=hierarchy_search module=search status=skip reason=symlinked_dir path={}",
                    path.display()
                );
            } else if path.is_file() && has_extension(&path, extension) {
                visited_files += 1;
                scan_partition(&path, query, &query_lower, &mut hits);
            }
        }
    }

    debug!(
        "event=hierarchy_search module=search status=ok files={} hits={}",
        visited_files,
        hits.len()
    );
    hits
}

fn scan_partition(path: &Path, query: &str, query_lower: &str, hits: &mut Vec<SearchHit>) {
    let lines = match PartitionFile::new(path).read_lines() {
        Ok(lines) => lines,
        Err(err) => {
            warn!(
                "event=hierarchy_search module=search status=skip path={} error={}",
                path.display(),
                err
            );
            return;
        }
    };

    let partition = partition_key_for(path);
    for record in lines.iter().filter_map(|line| try_decode(line).ok()) {
        let id_match = !record.id.is_empty() && record.id.eq_ignore_ascii_case(query);
        let name_match =
            !record.name.is_empty() && record.name.to_lowercase().contains(query_lower);
        if id_match || name_match {
            hits.push(SearchHit {
                partition: partition.clone(),
                path: path.to_path_buf(),
                record,
            });
        }
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

fn partition_key_for(path: &Path) -> PartitionKey {
    let term = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let program = path
        .parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    PartitionKey::new(program, term)
}
