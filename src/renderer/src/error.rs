/* src/renderer/src/error.rs */

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while parsing or executing a template.
///
/// A missing translation key is deliberately not represented here: lookup
/// misses fall back to the untranslated text and rendering continues.
#[derive(Debug, Error)]
pub enum RenderError {
  #[error("template i/o failed for {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("template parse error: {message}")]
  Parse { message: String },

  #[error("malformed string literal: {message}")]
  Decode { message: String },

  #[error("format error: {message}")]
  Format { message: String },

  #[error("block error: {message}")]
  Block { message: String },

  #[error(transparent)]
  Table(#[from] weft_strings::TableError),
}

pub type RenderResult<T> = Result<T, RenderError>;
