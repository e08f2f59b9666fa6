/* src/strings/src/lib.rs */

mod error;
mod key;
mod table;

pub use error::{TableError, TableResult};
pub use key::{is_string_key, string_key, KEY_LEN};
pub use table::{load, merge, persist, table_path, StringTable};
