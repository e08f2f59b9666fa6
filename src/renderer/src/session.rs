/* src/renderer/src/session.rs */

// Per-render mutable state. One session per top-level render call; it owns
// the flat block namespace, the capture-buffer stack, and the lazily loaded
// string-table cache. Nothing here outlives the render, so a changed table
// on disk is only observed by the next session.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::RenderResult;
use weft_strings::StringTable;

pub(crate) struct RenderSession {
  pub(crate) lang: Option<String>,
  tables: HashMap<PathBuf, Rc<StringTable>>,
  /// Closed block values, one flat namespace across the whole render tree.
  pub(crate) blocks: HashMap<String, String>,
  capture: Vec<Frame>,
}

/// One capture scope: a render frame (`block == None`) or an open named
/// block.
pub(crate) struct Frame {
  pub(crate) block: Option<String>,
  pub(crate) buf: String,
}

impl RenderSession {
  pub(crate) fn new(lang: Option<String>) -> Self {
    Self { lang, tables: HashMap::new(), blocks: HashMap::new(), capture: Vec::new() }
  }

  pub(crate) fn write(&mut self, text: &str) {
    if let Some(frame) = self.capture.last_mut() {
      frame.buf.push_str(text);
    }
  }

  pub(crate) fn push_frame(&mut self, block: Option<String>) {
    self.capture.push(Frame { block, buf: String::new() });
  }

  pub(crate) fn pop_frame(&mut self) -> Option<Frame> {
    self.capture.pop()
  }

  pub(crate) fn top_block(&self) -> Option<&str> {
    self.capture.last().and_then(|f| f.block.as_deref())
  }

  pub(crate) fn depth(&self) -> usize {
    self.capture.len()
  }

  /// Session-lifetime table cache; first access loads from disk, later
  /// renders of the same template reuse the loaded table.
  pub(crate) fn table(
    &mut self,
    strings_root: &Path,
    lang: &str,
    template_path: &str,
  ) -> RenderResult<Rc<StringTable>> {
    let key = weft_strings::table_path(strings_root, lang, template_path);
    if let Some(table) = self.tables.get(&key) {
      return Ok(Rc::clone(table));
    }
    let loaded = Rc::new(weft_strings::load(strings_root, lang, template_path)?);
    self.tables.insert(key, Rc::clone(&loaded));
    Ok(loaded)
  }
}
