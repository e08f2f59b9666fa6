/* src/strings/src/error.rs */

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by string-table load/persist.
///
/// A table that fails validation is never downgraded to an empty table: a
/// corrupt file on disk means hand-edited translations would be silently
/// thrown away on the next compile, so both variants are fatal to the
/// current operation.
#[derive(Debug, Error)]
pub enum TableError {
  #[error("string table i/o failed for {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("string table {path} failed validation: {message}")]
  Validation { path: PathBuf, message: String },
}

pub type TableResult<T> = Result<T, TableError>;
