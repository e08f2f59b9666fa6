/* src/renderer/src/token.rs */

use crate::error::{RenderError, RenderResult};

/// Template source split into literal markup and `<? ... ?>` tags.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Token {
  Text(String),
  Tag(String),
}

pub(crate) fn tokenize(src: &str) -> RenderResult<Vec<Token>> {
  let mut tokens = Vec::new();
  let mut rest = src;

  while let Some(open) = rest.find("<?") {
    if open > 0 {
      tokens.push(Token::Text(rest[..open].to_string()));
    }
    let after = &rest[open + 2..];
    let Some(close) = after.find("?>") else {
      return Err(RenderError::Parse { message: "unterminated <? tag".to_string() });
    };
    let body = after[..close].trim();
    if !body.is_empty() {
      tokens.push(Token::Tag(body.to_string()));
    }
    rest = &after[close + 2..];
  }
  if !rest.is_empty() {
    tokens.push(Token::Text(rest.to_string()));
  }
  Ok(tokens)
}
