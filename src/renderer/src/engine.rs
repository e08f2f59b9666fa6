/* src/renderer/src/engine.rs */

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::ast::{Call, Expr, Node};
use crate::error::{RenderError, RenderResult};
use crate::format::format_positional;
use crate::helpers::{escape_html, is_truthy, resolve, stringify};
use crate::parser::parse_source;
use crate::session::RenderSession;
use weft_strings::StringTable;

/// Dual-mode template engine.
///
/// With no compiled language set, `render` executes raw source from the
/// template root. After `set_compiled_lang`, it executes compiled artifacts
/// from the compiled root and resolves translate keys through the string
/// table for that language, loaded lazily per template and cached for the
/// life of one render session.
pub struct TemplateEngine {
  template_root: PathBuf,
  suffix: String,
  compiled_root: PathBuf,
  strings_root: PathBuf,
  lang: Option<String>,
}

impl TemplateEngine {
  pub fn new(
    template_root: impl Into<PathBuf>,
    suffix: &str,
    compiled_root: impl Into<PathBuf>,
    strings_root: impl Into<PathBuf>,
  ) -> Self {
    Self {
      template_root: template_root.into(),
      suffix: normalize_suffix(suffix),
      compiled_root: compiled_root.into(),
      strings_root: strings_root.into(),
      lang: None,
    }
  }

  /// Switch to compiled templates localized for `lang`.
  pub fn set_compiled_lang(&mut self, lang: impl Into<String>) {
    self.lang = Some(lang.into());
  }

  /// Top-level render. Creates a fresh session (flat block map, empty table
  /// cache), executes the template, and returns its trimmed output.
  pub fn render(&self, name: &str, data: &Value) -> RenderResult<String> {
    let mut session = RenderSession::new(self.lang.clone());
    let out = self.render_frame(&mut session, name, data)?;
    debug_assert_eq!(session.depth(), 0);
    Ok(out)
  }

  /// One render frame: resolve source per session language, parse, execute
  /// against exactly the passed bindings, return trimmed captured output.
  /// Nested frames run to completion before the caller resumes, which is
  /// what lets a child populate blocks before it renders the layout.
  fn render_frame(
    &self,
    session: &mut RenderSession,
    name: &str,
    data: &Value,
  ) -> RenderResult<String> {
    let rel = format!("{name}{}", self.suffix);
    let (path, table) = match session.lang.clone() {
      Some(lang) => {
        let table = session.table(&self.strings_root, &lang, &rel)?;
        (self.compiled_root.join(&rel), Some(table))
      }
      None => (self.template_root.join(&rel), None),
    };

    let source = fs::read_to_string(&path)
      .map_err(|source| RenderError::Io { path: path.clone(), source })?;
    let nodes = parse_source(&source).map_err(|e| annotate(e, &path))?;

    session.push_frame(None);
    self.exec(session, &nodes, data, table.as_deref())?;
    if let Some(open) = session.top_block() {
      return Err(RenderError::Block {
        message: format!("unclosed block `{open}` in {}", path.display()),
      });
    }
    match session.pop_frame() {
      Some(frame) => Ok(frame.buf.trim().to_string()),
      None => Err(RenderError::Block { message: "capture stack underflow".to_string() }),
    }
  }

  fn exec(
    &self,
    session: &mut RenderSession,
    nodes: &[Node],
    data: &Value,
    table: Option<&StringTable>,
  ) -> RenderResult<()> {
    for node in nodes {
      match node {
        Node::Text(text) => session.write(text),

        Node::If { path, then_nodes, else_nodes } => {
          let truthy = resolve(path, data).is_some_and(is_truthy);
          let branch = if truthy { then_nodes } else { else_nodes };
          self.exec(session, branch, data, table)?;
        }

        Node::Each { path, body_nodes } => {
          if let Some(Value::Array(items)) = resolve(path, data) {
            for item in items {
              let scoped = scope_item(data, item);
              self.exec(session, body_nodes, &scoped, table)?;
            }
          }
        }

        Node::Call(call) => self.exec_call(session, call, data, table)?,
      }
    }
    Ok(())
  }

  fn exec_call(
    &self,
    session: &mut RenderSession,
    call: &Call,
    data: &Value,
    table: Option<&StringTable>,
  ) -> RenderResult<()> {
    match call {
      Call::Translate { args } => {
        let text = self.translate_text(session, args, data, table)?;
        session.write(&text);
      }

      Call::TranslateReturning { args } => {
        let text = self.translate_text(session, args, data, table)?;
        session.write(text.trim());
      }

      Call::StartBlock { name } => session.push_frame(Some(name.clone())),

      Call::EndBlock { name } => {
        if session.top_block() != Some(name.as_str()) {
          return Err(RenderError::Block {
            message: format!("end_block(\"{name}\") does not match an open block"),
          });
        }
        match session.pop_frame() {
          Some(frame) => {
            session.blocks.insert(name.clone(), frame.buf.trim().to_string());
          }
          None => {
            return Err(RenderError::Block { message: "capture stack underflow".to_string() });
          }
        }
      }

      Call::RenderBlock { name, fallback } => {
        if let Some(value) = session.blocks.get(name) {
          let value = value.clone();
          session.write(&value);
        } else if let Some(expr) = fallback {
          let value = self.eval_expr(session, expr, data, table)?;
          session.write(&stringify(&value));
        }
      }

      Call::Render { template, bindings } => {
        let mut bound = serde_json::Map::new();
        for (key, expr) in bindings {
          bound.insert(key.clone(), self.eval_expr(session, expr, data, table)?);
        }
        let out = self.render_frame(session, template, &Value::Object(bound))?;
        session.write(&out);
      }
    }
    Ok(())
  }

  /// Shared translate / translate_returning body: resolve through the table
  /// (miss falls back to the text itself), format positionally, HTML-escape.
  fn translate_text(
    &self,
    session: &mut RenderSession,
    args: &[Expr],
    data: &Value,
    table: Option<&StringTable>,
  ) -> RenderResult<String> {
    let Some((first, rest)) = args.split_first() else {
      return Err(RenderError::Format { message: "translate requires a text argument".to_string() });
    };
    let text = stringify(&self.eval_expr(session, first, data, table)?);
    let resolved = table.and_then(|t| t.get(&text).cloned()).unwrap_or(text);

    let mut values = Vec::with_capacity(rest.len());
    for expr in rest {
      values.push(self.eval_expr(session, expr, data, table)?);
    }
    Ok(escape_html(&format_positional(&resolved, &values)?))
  }

  fn eval_expr(
    &self,
    session: &mut RenderSession,
    expr: &Expr,
    data: &Value,
    table: Option<&StringTable>,
  ) -> RenderResult<Value> {
    Ok(match expr {
      Expr::Str(s) => Value::String(s.clone()),
      Expr::Int(i) => Value::Number((*i).into()),
      Expr::Path(path) => resolve(path, data).cloned().unwrap_or(Value::Null),
      Expr::Len(path) => {
        let len = match resolve(path, data) {
          Some(Value::Array(items)) => items.len(),
          Some(Value::String(s)) => s.chars().count(),
          Some(Value::Object(map)) => map.len(),
          _ => 0,
        };
        Value::Number((len as i64).into())
      }
      Expr::TranslateReturning(args) => {
        Value::String(self.translate_text(session, args, data, table)?.trim().to_string())
      }
    })
  }
}

/// Bind `$` to the current each item, shifting the previous `$` to `$$`.
fn scope_item(data: &Value, item: &Value) -> Value {
  let mut map = match data {
    Value::Object(map) => map.clone(),
    _ => serde_json::Map::new(),
  };
  if let Some(current) = map.get("$").cloned() {
    map.insert("$$".to_string(), current);
  }
  map.insert("$".to_string(), item.clone());
  Value::Object(map)
}

fn normalize_suffix(suffix: &str) -> String {
  let trimmed = suffix.trim_start_matches('.');
  format!(".{trimmed}")
}

fn annotate(e: RenderError, path: &Path) -> RenderError {
  match e {
    RenderError::Parse { message } => {
      RenderError::Parse { message: format!("{}: {message}", path.display()) }
    }
    other => other,
  }
}
