//! Durable line storage for one partition file.
//!
//! # Responsibility
//! - Create the partition file (and its parent directories) on demand.
//! - Read non-blank lines, rewrite the whole file, or append one line.
//!
//! # Invariants
//! - `write_all` replaces the file through a temporary sibling and an atomic
//!   rename; a crash leaves either the old or the new content.
//! - `append` never merges the new line into an unterminated last line.

use super::{StoreError, StoreResult};
use log::{debug, error};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[cfg(windows)]
pub const LINE_TERMINATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_TERMINATOR: &str = "\n";

/// Typed outcome of reading a partition file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionRead {
    /// File was absent and has just been created empty.
    Created,
    /// Existing file; non-blank lines in file order.
    Lines(Vec<String>),
}

impl PartitionRead {
    pub fn into_lines(self) -> Vec<String> {
        match self {
            Self::Created => Vec::new(),
            Self::Lines(lines) => lines,
        }
    }
}

/// Line store bound to one partition file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionFile {
    path: PathBuf,
}

impl PartitionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the file (and parent directories) when absent.
    ///
    /// Returns `true` when the file was created by this call.
    pub fn ensure_exists(&self) -> StoreResult<bool> {
        if self.path.is_file() {
            return Ok(false);
        }
        self.ensure_parent()?;
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(_) => {
                debug!(
                    "event=partition_create module=store status=ok path={}",
                    self.path.display()
                );
                Ok(true)
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(err) => Err(StoreError::io("create", &self.path, err)),
        }
    }

    /// Reads all non-blank lines, creating an empty file when absent.
    ///
    /// Bytes that are not valid UTF-8 become U+FFFD; they never fail the read.
    pub fn read(&self) -> StoreResult<PartitionRead> {
        if self.ensure_exists()? {
            return Ok(PartitionRead::Created);
        }

        let file = File::open(&self.path).map_err(|err| StoreError::io("open", &self.path, err))?;
        let lines = lossy_lines(BufReader::new(file))
            .map_err(|err| StoreError::io("read", &self.path, err))?
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .collect();
        Ok(PartitionRead::Lines(lines))
    }

    /// Reads all non-blank lines in file order, terminators stripped.
    pub fn read_lines(&self) -> StoreResult<Vec<String>> {
        self.read().map(PartitionRead::into_lines)
    }

    /// Overwrites the file with exactly `lines`, skipping blank entries.
    pub fn write_all<S: AsRef<str>>(&self, lines: &[S]) -> StoreResult<()> {
        self.ensure_parent()?;
        let tmp_path = self.temp_path();

        let result = write_lines(&tmp_path, lines)
            .and_then(|()| fs::rename(&tmp_path, &self.path))
            .map_err(|err| StoreError::io("rewrite", &self.path, err));

        if let Err(err) = &result {
            // Best effort: the temp file is orphaned on failure.
            let _ = fs::remove_file(&tmp_path);
            error!(
                "event=partition_rewrite module=store status=error path={} error={}",
                self.path.display(),
                err
            );
        } else {
            debug!(
                "event=partition_rewrite module=store status=ok path={} lines={}",
                self.path.display(),
                lines.len()
            );
        }
        result
    }

    /// Appends one line, preserving existing content.
    pub fn append(&self, line: &str) -> StoreResult<()> {
        self.ensure_parent()?;
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|err| StoreError::io("open", &self.path, err))?;

        let needs_terminator =
            ends_without_newline(&mut file).map_err(|err| StoreError::io("read", &self.path, err))?;

        let mut buffer = String::with_capacity(line.len() + 2 * LINE_TERMINATOR.len());
        if needs_terminator {
            buffer.push_str(LINE_TERMINATOR);
        }
        buffer.push_str(line);
        buffer.push_str(LINE_TERMINATOR);

        file.write_all(buffer.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|err| StoreError::io("append", &self.path, err))
    }

    fn ensure_parent(&self) -> StoreResult<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
                fs::create_dir_all(parent)
                    .map_err(|err| StoreError::io("create directory", parent, err))
            }
            _ => Ok(()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.path
            .with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4().simple()))
    }
}

/// Splits `reader` on `\n`, dropping one trailing `\r` per line and decoding
/// each line as lossy UTF-8.
pub(crate) fn lossy_lines<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    reader
        .split(b'\n')
        .map(|chunk| {
            let mut bytes = chunk?;
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        })
        .collect()
}

fn write_lines<S: AsRef<str>>(path: &Path, lines: &[S]) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        writer.write_all(line.as_bytes())?;
        writer.write_all(LINE_TERMINATOR.as_bytes())?;
    }
    let file = writer.into_inner().map_err(|err| err.into_error())?;
    file.sync_all()
}

fn ends_without_newline(file: &mut File) -> io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    let mut last = [0_u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}
