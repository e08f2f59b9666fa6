/* src/compiler/src/error.rs */

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
  #[error("i/o failed for {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A translate literal could not be decoded. Nothing is written for the
  /// affected template.
  #[error("string extraction failed: {message}")]
  Extraction { message: String },

  /// A translate literal is already a string key, which means the input is
  /// compiled output. Re-hashing it would corrupt every table keyed on the
  /// original text, so the compile refuses. (A handwritten literal that
  /// happens to be 32 lowercase hex chars trips this too.)
  #[error("source appears to be already compiled (literal {literal:?} is a string key)")]
  AlreadyCompiled { literal: String },

  /// A generated artifact failed its post-write check; this signals a bug in
  /// generation, never a condition to warn-and-continue on.
  #[error("compiled template {path} failed validation: {message}")]
  Validation { path: PathBuf, message: String },

  #[error(transparent)]
  Table(#[from] weft_strings::TableError),
}

pub type CompileResult<T> = Result<T, CompileError>;
