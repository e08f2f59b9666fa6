/* src/compiler/src/lib.rs */

mod compile;
mod error;
mod extract;

pub use compile::TemplateCompiler;
pub use error::{CompileError, CompileResult};
pub use extract::{extract_strings, Extraction};
