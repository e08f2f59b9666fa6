/* src/strings/src/table.rs */

// Per-(template, language) string tables: {string key -> translated text}.
// Tables live at `<strings_root>/<lang>/<template_path>` as JSON objects.
// BTreeMap keeps serialization deterministic so recompiles produce stable
// diffs for translators.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{TableError, TableResult};

pub type StringTable = BTreeMap<String, String>;

/// On-disk location of the table for one (template, language) pair.
pub fn table_path(strings_root: &Path, lang: &str, template_path: &str) -> PathBuf {
  strings_root.join(lang).join(template_path)
}

/// Read a persisted table. A missing file is an empty table (first compile
/// for this language); a file that exists but cannot be read or parsed is a
/// validation failure, never an empty table.
pub fn load(strings_root: &Path, lang: &str, template_path: &str) -> TableResult<StringTable> {
  let path = table_path(strings_root, lang, template_path);
  if !path.exists() {
    return Ok(StringTable::new());
  }
  let raw =
    fs::read_to_string(&path).map_err(|source| TableError::Io { path: path.clone(), source })?;
  parse_table(&raw).map_err(|message| TableError::Validation { path, message })
}

/// Merge freshly extracted strings with a persisted (possibly hand-edited)
/// table. Extraction seeds every key with its untranslated default; persisted
/// entries win on key collision. With `prune` unset, persisted entries whose
/// key is no longer extracted survive (text that is only temporarily removed
/// keeps its translation); with `prune` set they are dropped.
pub fn merge(extracted: &StringTable, persisted: &StringTable, prune: bool) -> StringTable {
  let mut result = extracted.clone();
  for (key, translated) in persisted {
    if extracted.contains_key(key) {
      result.insert(key.clone(), translated.clone());
    } else if !prune {
      result.insert(key.clone(), translated.clone());
    }
  }
  result
}

/// Serialize `table` under `<strings_root>/<lang>/<template_path>`, creating
/// intermediate directories. The written file is re-read and re-parsed before
/// the operation counts as committed; a mismatch there is a generation bug
/// and fails hard.
pub fn persist(
  strings_root: &Path,
  lang: &str,
  template_path: &str,
  table: &StringTable,
) -> TableResult<()> {
  let path = table_path(strings_root, lang, template_path);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent)
      .map_err(|source| TableError::Io { path: parent.to_path_buf(), source })?;
  }

  let mut json = serde_json::to_string_pretty(table)
    .map_err(|e| TableError::Validation { path: path.clone(), message: e.to_string() })?;
  json.push('\n');
  fs::write(&path, &json).map_err(|source| TableError::Io { path: path.clone(), source })?;

  // Structural-validity check on what actually landed on disk.
  let written =
    fs::read_to_string(&path).map_err(|source| TableError::Io { path: path.clone(), source })?;
  let reparsed =
    parse_table(&written).map_err(|message| TableError::Validation { path: path.clone(), message })?;
  if &reparsed != table {
    return Err(TableError::Validation {
      path,
      message: "written table does not round-trip".to_string(),
    });
  }
  Ok(())
}

fn parse_table(raw: &str) -> Result<StringTable, String> {
  let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
  let obj = value.as_object().ok_or("table root is not a JSON object")?;
  let mut table = StringTable::new();
  for (key, val) in obj {
    let text = val.as_str().ok_or_else(|| format!("value for key {key} is not a string"))?;
    table.insert(key.clone(), text.to_string());
  }
  Ok(table)
}
