/* src/renderer/src/lib.rs */

mod ast;
mod engine;
mod error;
mod format;
mod helpers;
mod literal;
mod parser;
mod session;
mod token;

pub use engine::TemplateEngine;
pub use error::{RenderError, RenderResult};
pub use literal::decode_literal;

/// Parse-check template source without executing it. The compiler runs this
/// over every compiled artifact before committing it.
pub fn check_template(source: &str) -> RenderResult<()> {
  parser::parse_source(source).map(|_| ())
}
