/* src/renderer/src/format.rs */

// Positional printf-style substitution for translatable text. Only `%s`,
// `%d`, and `%%` exist; translated text that reorders words still consumes
// arguments left to right, so translations must keep placeholder order.

use serde_json::Value;

use crate::error::{RenderError, RenderResult};
use crate::helpers::stringify;

pub(crate) fn format_positional(fmt: &str, args: &[Value]) -> RenderResult<String> {
  let mut out = String::with_capacity(fmt.len());
  let mut chars = fmt.chars();
  let mut next_arg = 0usize;

  while let Some(c) = chars.next() {
    if c != '%' {
      out.push(c);
      continue;
    }
    match chars.next() {
      Some('%') => out.push('%'),
      Some('s') => {
        out.push_str(&stringify(take_arg(fmt, args, &mut next_arg)?));
      }
      Some('d') => {
        let value = take_arg(fmt, args, &mut next_arg)?;
        out.push_str(&int_cast(value).to_string());
      }
      Some(other) => {
        return Err(RenderError::Format {
          message: format!("unknown conversion %{other} in {fmt:?}"),
        });
      }
      None => {
        return Err(RenderError::Format { message: format!("dangling % in {fmt:?}") });
      }
    }
  }
  Ok(out)
}

fn take_arg<'a>(fmt: &str, args: &'a [Value], next: &mut usize) -> RenderResult<&'a Value> {
  let arg = args.get(*next).ok_or_else(|| RenderError::Format {
    message: format!("too few arguments for {fmt:?} (got {})", args.len()),
  })?;
  *next += 1;
  Ok(arg)
}

/// Integer cast with the permissive semantics translated text relies on:
/// floats truncate, strings contribute their leading integer, everything
/// else is 0.
fn int_cast(value: &Value) -> i64 {
  match value {
    Value::Number(n) => {
      if let Some(i) = n.as_i64() {
        i
      } else if let Some(f) = n.as_f64() {
        f as i64
      } else {
        0
      }
    }
    Value::Bool(b) => i64::from(*b),
    Value::String(s) => {
      let trimmed = s.trim_start();
      let end = trimmed
        .char_indices()
        .take_while(|&(i, c)| c.is_ascii_digit() || (i == 0 && c == '-'))
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);
      trimmed[..end].parse().unwrap_or(0)
    }
    _ => 0,
  }
}
