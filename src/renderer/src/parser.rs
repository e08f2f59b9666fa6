/* src/renderer/src/parser.rs */

use crate::ast::{Call, Expr, Node};
use crate::error::{RenderError, RenderResult};
use crate::literal::{decode_literal, literal_span};
use crate::token::{tokenize, Token};

pub(crate) fn parse_source(src: &str) -> RenderResult<Vec<Node>> {
  let tokens = tokenize(src)?;
  let mut pos = 0;
  let nodes = parse_until(&tokens, &mut pos, &|_| false)?;
  debug_assert_eq!(pos, tokens.len());
  Ok(nodes)
}

fn parse_until(
  tokens: &[Token],
  pos: &mut usize,
  stop: &dyn Fn(&str) -> bool,
) -> RenderResult<Vec<Node>> {
  let mut nodes = Vec::new();

  while *pos < tokens.len() {
    match &tokens[*pos] {
      Token::Text(value) => {
        nodes.push(Node::Text(value.clone()));
        *pos += 1;
      }
      Token::Tag(tag) => {
        if stop(tag) {
          return Ok(nodes);
        }

        if tag == "else" || tag == "endif" || tag == "endeach" {
          return Err(parse_err(&format!("orphan <? {tag} ?>")));
        }

        if let Some(path) = directive_arg(tag, "if") {
          let path = path.to_string();
          *pos += 1;
          let then_nodes = parse_until(tokens, pos, &|d| d == "else" || d == "endif")?;
          let mut else_nodes = Vec::new();
          match current_tag(tokens, *pos) {
            Some("else") => {
              *pos += 1;
              else_nodes = parse_until(tokens, pos, &|d| d == "endif")?;
              if current_tag(tokens, *pos) != Some("endif") {
                return Err(parse_err(&format!("unclosed <? if {path} ?>")));
              }
              *pos += 1;
            }
            Some("endif") => {
              *pos += 1;
            }
            _ => return Err(parse_err(&format!("unclosed <? if {path} ?>"))),
          }
          nodes.push(Node::If { path, then_nodes, else_nodes });
        } else if let Some(path) = directive_arg(tag, "each") {
          let path = path.to_string();
          *pos += 1;
          let body_nodes = parse_until(tokens, pos, &|d| d == "endeach")?;
          if current_tag(tokens, *pos) != Some("endeach") {
            return Err(parse_err(&format!("unclosed <? each {path} ?>")));
          }
          *pos += 1;
          nodes.push(Node::Each { path, body_nodes });
        } else {
          nodes.push(Node::Call(parse_call(tag)?));
          *pos += 1;
        }
      }
    }
  }

  Ok(nodes)
}

fn current_tag(tokens: &[Token], pos: usize) -> Option<&str> {
  match tokens.get(pos) {
    Some(Token::Tag(tag)) => Some(tag.as_str()),
    _ => None,
  }
}

/// `if path` / `each path` directive argument, or None when `tag` is not that
/// directive.
fn directive_arg<'a>(tag: &'a str, keyword: &str) -> Option<&'a str> {
  let rest = tag.strip_prefix(keyword)?;
  if rest.starts_with(char::is_whitespace) {
    let arg = rest.trim();
    if !arg.is_empty() {
      return Some(arg);
    }
  }
  None
}

fn parse_err(message: &str) -> RenderError {
  RenderError::Parse { message: message.to_string() }
}

// -- Call / expression sub-parser over one tag body --

struct Cursor<'a> {
  s: &'a str,
  pos: usize,
}

impl<'a> Cursor<'a> {
  fn rest(&self) -> &'a str {
    &self.s[self.pos..]
  }

  fn peek(&self) -> Option<char> {
    self.rest().chars().next()
  }

  fn skip_ws(&mut self) {
    while let Some(c) = self.peek() {
      if !c.is_whitespace() {
        break;
      }
      self.pos += c.len_utf8();
    }
  }

  fn eat(&mut self, expected: char) -> bool {
    if self.peek() == Some(expected) {
      self.pos += expected.len_utf8();
      true
    } else {
      false
    }
  }

  /// A path-ish word: idents, dots, `$` scopes.
  fn word(&mut self) -> &'a str {
    let start = self.pos;
    while let Some(c) = self.peek() {
      if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | '/' | '-') {
        self.pos += c.len_utf8();
      } else {
        break;
      }
    }
    &self.s[start..self.pos]
  }
}

fn parse_call(tag: &str) -> RenderResult<Call> {
  let mut cur = Cursor { s: tag, pos: 0 };
  let call = parse_call_body(&mut cur)
    .map_err(|e| parse_err(&format!("in <? {tag} ?>: {}", render_message(&e))))?;
  cur.skip_ws();
  if cur.peek().is_some() {
    return Err(parse_err(&format!("in <? {tag} ?>: trailing input after call")));
  }
  Ok(call)
}

fn render_message(e: &RenderError) -> String {
  match e {
    RenderError::Parse { message } | RenderError::Decode { message } => message.clone(),
    other => other.to_string(),
  }
}

fn parse_call_body(cur: &mut Cursor) -> RenderResult<Call> {
  cur.skip_ws();
  let name = cur.word().to_string();
  cur.skip_ws();
  if !cur.eat('(') {
    return Err(parse_err(&format!("expected `(` after `{name}`")));
  }

  match name.as_str() {
    "translate" => {
      let args = parse_args(cur)?;
      require_text_arg(&args, "translate")?;
      Ok(Call::Translate { args })
    }
    "translate_returning" => {
      let args = parse_args(cur)?;
      require_text_arg(&args, "translate_returning")?;
      Ok(Call::TranslateReturning { args })
    }
    "start_block" => Ok(Call::StartBlock { name: parse_single_name(cur, "start_block")? }),
    "end_block" => Ok(Call::EndBlock { name: parse_single_name(cur, "end_block")? }),
    "render_block" => {
      let name = parse_string_arg(cur, "render_block")?;
      cur.skip_ws();
      let fallback = if cur.eat(',') { Some(parse_expr(cur)?) } else { None };
      expect_close(cur)?;
      Ok(Call::RenderBlock { name, fallback })
    }
    "render" => {
      let template = parse_string_arg(cur, "render")?;
      let mut bindings = Vec::new();
      cur.skip_ws();
      while cur.eat(',') {
        cur.skip_ws();
        let key = cur.word().to_string();
        if key.is_empty() {
          return Err(parse_err("expected binding name"));
        }
        cur.skip_ws();
        if !cur.eat('=') {
          return Err(parse_err(&format!("expected `=` after binding `{key}`")));
        }
        bindings.push((key, parse_expr(cur)?));
        cur.skip_ws();
      }
      expect_close(cur)?;
      Ok(Call::Render { template, bindings })
    }
    "" => Err(parse_err("expected operation name")),
    other => Err(parse_err(&format!("unknown operation `{other}`"))),
  }
}

/// Comma-separated expressions up to and including the closing paren.
fn parse_args(cur: &mut Cursor) -> RenderResult<Vec<Expr>> {
  let mut args = Vec::new();
  cur.skip_ws();
  if cur.eat(')') {
    return Ok(args);
  }
  loop {
    args.push(parse_expr(cur)?);
    cur.skip_ws();
    if cur.eat(',') {
      continue;
    }
    expect_close(cur)?;
    return Ok(args);
  }
}

fn parse_expr(cur: &mut Cursor) -> RenderResult<Expr> {
  cur.skip_ws();
  match cur.peek() {
    Some('"' | '\'') => {
      let span =
        literal_span(cur.rest()).ok_or_else(|| parse_err("unterminated string literal"))?;
      let raw = &cur.rest()[..span];
      cur.pos += span;
      Ok(Expr::Str(decode_literal(raw)?))
    }
    Some(c) if c.is_ascii_digit() || c == '-' => {
      let start = cur.pos;
      if c == '-' {
        cur.pos += 1;
      }
      while cur.peek().is_some_and(|d| d.is_ascii_digit()) {
        cur.pos += 1;
      }
      cur.s[start..cur.pos]
        .parse::<i64>()
        .map(Expr::Int)
        .map_err(|_| parse_err("invalid integer literal"))
    }
    _ => {
      let word = cur.word().to_string();
      if word.is_empty() {
        return Err(parse_err("expected expression"));
      }
      cur.skip_ws();
      match word.as_str() {
        "len" if cur.peek() == Some('(') => {
          cur.eat('(');
          cur.skip_ws();
          let path = cur.word().to_string();
          if path.is_empty() {
            return Err(parse_err("len() expects a data path"));
          }
          cur.skip_ws();
          if !cur.eat(')') {
            return Err(parse_err("expected `)` after len() path"));
          }
          Ok(Expr::Len(path))
        }
        "translate_returning" if cur.peek() == Some('(') => {
          cur.eat('(');
          let args = parse_args(cur)?;
          require_text_arg(&args, "translate_returning")?;
          Ok(Expr::TranslateReturning(args))
        }
        "translate" if cur.peek() == Some('(') => {
          Err(parse_err("translate writes to output; use translate_returning in expressions"))
        }
        _ => Ok(Expr::Path(word)),
      }
    }
  }
}

fn parse_string_arg(cur: &mut Cursor, op: &str) -> RenderResult<String> {
  match parse_expr(cur)? {
    Expr::Str(s) => Ok(s),
    _ => Err(parse_err(&format!("{op} expects a quoted name"))),
  }
}

/// Single string argument followed by the closing paren.
fn parse_single_name(cur: &mut Cursor, op: &str) -> RenderResult<String> {
  let name = parse_string_arg(cur, op)?;
  expect_close(cur)?;
  Ok(name)
}

fn expect_close(cur: &mut Cursor) -> RenderResult<()> {
  cur.skip_ws();
  if cur.eat(')') { Ok(()) } else { Err(parse_err("expected `)`")) }
}

fn require_text_arg(args: &[Expr], op: &str) -> RenderResult<()> {
  if args.is_empty() { Err(parse_err(&format!("{op} requires a text argument"))) } else { Ok(()) }
}
