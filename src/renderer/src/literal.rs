/* src/renderer/src/literal.rs */

// String-literal grammar shared by the renderer's parser and the compiler's
// extractor. Both quote styles exist so translatable text can contain either
// quote char without escaping gymnastics:
//
//   double-quoted: `\n \t \r \0 \\ \" \' \xNN` decode; any other escape is
//   malformed.
//   single-quoted: only `\\` and `\'` decode; any other backslash is kept
//   literally, as it would be when evaluating the literal as source.

use crate::error::{RenderError, RenderResult};

/// Byte length of the literal starting at the beginning of `s` (including
/// both quote chars), or `None` when the literal never terminates. A
/// backslash always skips the following char, whichever quote style.
pub(crate) fn literal_span(s: &str) -> Option<usize> {
  let mut chars = s.char_indices();
  let (_, quote) = chars.next()?;
  if quote != '"' && quote != '\'' {
    return None;
  }
  while let Some((i, c)) = chars.next() {
    if c == '\\' {
      chars.next()?;
    } else if c == quote {
      return Some(i + c.len_utf8());
    }
  }
  None
}

/// Decode a quoted literal (quote chars included) to its canonical runtime
/// text.
pub fn decode_literal(raw: &str) -> RenderResult<String> {
  let mut chars = raw.chars();
  let quote = match chars.next() {
    Some(q @ ('"' | '\'')) => q,
    _ => return Err(malformed("missing opening quote")),
  };

  let mut out = String::with_capacity(raw.len());
  loop {
    match chars.next() {
      None => return Err(malformed("unterminated literal")),
      Some(c) if c == quote => {
        if chars.next().is_some() {
          return Err(malformed("content after closing quote"));
        }
        return Ok(out);
      }
      Some('\\') => {
        let esc = chars.next().ok_or_else(|| malformed("unterminated literal"))?;
        if quote == '\'' {
          match esc {
            '\\' | '\'' => out.push(esc),
            other => {
              // Single-quoted strings keep unrecognized backslashes as-is.
              out.push('\\');
              out.push(other);
            }
          }
        } else {
          match esc {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            'x' => {
              let hi = chars.next().and_then(|c| c.to_digit(16));
              let lo = chars.next().and_then(|c| c.to_digit(16));
              match (hi, lo) {
                (Some(hi), Some(lo)) => out.push(char::from((hi * 16 + lo) as u8)),
                _ => return Err(malformed("\\x expects two hex digits")),
              }
            }
            other => return Err(malformed(&format!("invalid escape \\{other}"))),
          }
        }
      }
      Some(c) => out.push(c),
    }
  }
}

fn malformed(message: &str) -> RenderError {
  RenderError::Decode { message: message.to_string() }
}
