/* src/compiler/src/extract.rs */

// Literal extraction and rewrite. Works on raw source text, not the parsed
// template: only the matched literal span changes, every other byte of the
// source survives into the compiled artifact.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{CompileError, CompileResult};
use weft_renderer::decode_literal;
use weft_strings::{is_string_key, string_key};

/// Output of one extraction run: the key -> canonical-text set and the
/// rewritten source.
#[derive(Debug)]
pub struct Extraction {
  pub strings: BTreeMap<String, String>,
  pub source: String,
}

fn double_quoted_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r#"\btranslate(?:_returning)?\s*\(\s*"(?:[^"\\]|\\.)*""#).unwrap()
  })
}

fn single_quoted_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"\btranslate(?:_returning)?\s*\(\s*'(?:[^'\\]|\\.)*'").unwrap())
}

/// Extract every translate / translate_returning literal from `src`.
///
/// Pure with respect to the input: two call sites with identical text share
/// one key, later arguments are left in place, and a decode failure aborts
/// the whole template with nothing extracted.
pub fn extract_strings(src: &str) -> CompileResult<Extraction> {
  let mut strings = BTreeMap::new();
  let pass_one = replace_pass(double_quoted_re(), src, &mut strings)?;
  let source = replace_pass(single_quoted_re(), &pass_one, &mut strings)?;
  Ok(Extraction { strings, source })
}

fn replace_pass(
  re: &Regex,
  src: &str,
  strings: &mut BTreeMap<String, String>,
) -> CompileResult<String> {
  let mut failure: Option<CompileError> = None;
  let out = re.replace_all(src, |caps: &regex::Captures| {
    let matched = &caps[0];
    if failure.is_some() {
      return matched.to_string();
    }
    match rewrite_match(matched, strings) {
      Ok(replacement) => replacement,
      Err(e) => {
        failure = Some(e);
        matched.to_string()
      }
    }
  });
  match failure {
    Some(e) => Err(e),
    None => Ok(out.into_owned()),
  }
}

/// `matched` runs from the call name through the closing quote of the first
/// argument. Only the literal is replaced, re-quoted with its original quote
/// char.
fn rewrite_match(matched: &str, strings: &mut BTreeMap<String, String>) -> CompileResult<String> {
  let lit_start = matched
    .find(['"', '\''])
    .ok_or_else(|| CompileError::Extraction { message: format!("no literal in {matched:?}") })?;
  let (head, literal) = matched.split_at(lit_start);

  let decoded =
    decode_literal(literal).map_err(|e| CompileError::Extraction { message: e.to_string() })?;
  if is_string_key(&decoded) {
    return Err(CompileError::AlreadyCompiled { literal: decoded });
  }

  let key = string_key(&decoded);
  let quote = &literal[..1];
  let replacement = format!("{head}{quote}{key}{quote}");
  strings.insert(key, decoded);
  Ok(replacement)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_and_rewrites_double_quoted() {
    let src = r#"<p><? translate("Hello %s", name) ?></p>"#;
    let ex = extract_strings(src).unwrap();
    let key = string_key("Hello %s");
    assert_eq!(ex.strings.len(), 1);
    assert_eq!(ex.strings[&key], "Hello %s");
    assert_eq!(ex.source, format!(r#"<p><? translate("{key}", name) ?></p>"#));
  }

  #[test]
  fn extracts_single_quoted_with_original_quote() {
    let src = "<? translate('Here are %d fruits:', len(fruits)) ?>";
    let ex = extract_strings(src).unwrap();
    let key = string_key("Here are %d fruits:");
    assert_eq!(ex.source, format!("<? translate('{key}', len(fruits)) ?>"));
  }

  #[test]
  fn translate_returning_is_matched_too() {
    let src = r#"<? render("layout", title=translate_returning("Fruits")) ?>"#;
    let ex = extract_strings(src).unwrap();
    let key = string_key("Fruits");
    assert_eq!(ex.source, format!(r#"<? render("layout", title=translate_returning("{key}")) ?>"#));
  }

  #[test]
  fn identical_text_shares_one_key() {
    let src = r#"<? translate("Hi") ?> <? translate('Hi') ?>"#;
    let ex = extract_strings(src).unwrap();
    assert_eq!(ex.strings.len(), 1);
    let key = string_key("Hi");
    // Each site keeps its own quote style around the shared key.
    assert_eq!(ex.source, format!(r#"<? translate("{key}") ?> <? translate('{key}') ?>"#));
  }

  #[test]
  fn later_literal_arguments_are_untouched() {
    let src = r#"<? translate("Hello %s", "World") ?>"#;
    let ex = extract_strings(src).unwrap();
    let key = string_key("Hello %s");
    assert_eq!(ex.strings.len(), 1);
    assert_eq!(ex.source, format!(r#"<? translate("{key}", "World") ?>"#));
  }

  #[test]
  fn escaped_quotes_hash_on_decoded_text() {
    let src = r#"<? translate("say \"hi\"") ?>"#;
    let ex = extract_strings(src).unwrap();
    let key = string_key(r#"say "hi""#);
    assert_eq!(ex.strings[&key], r#"say "hi""#);
    assert_eq!(ex.source, format!(r#"<? translate("{key}") ?>"#));
  }

  #[test]
  fn non_translate_calls_are_ignored() {
    let src = r#"<? render("partial/fruit", fruit=$) ?><? start_block("title") ?>"#;
    let ex = extract_strings(src).unwrap();
    assert!(ex.strings.is_empty());
    assert_eq!(ex.source, src);
  }

  #[test]
  fn non_literal_first_argument_is_ignored() {
    // Only statically visible literals are extracted.
    let src = "<? translate(message) ?>";
    let ex = extract_strings(src).unwrap();
    assert!(ex.strings.is_empty());
    assert_eq!(ex.source, src);
  }

  #[test]
  fn invalid_escape_aborts_extraction() {
    let src = r#"<? translate("ok") ?><? translate("bad \q") ?>"#;
    let err = extract_strings(src).unwrap_err();
    assert!(matches!(err, CompileError::Extraction { .. }));
  }

  #[test]
  fn compiled_input_is_refused() {
    let key = string_key("Hello");
    let src = format!(r#"<? translate("{key}") ?>"#);
    let err = extract_strings(&src).unwrap_err();
    assert!(matches!(err, CompileError::AlreadyCompiled { .. }));
  }

  #[test]
  fn whitespace_between_name_and_literal_is_kept() {
    let src = "<? translate (  'Hi' ) ?>";
    let ex = extract_strings(src).unwrap();
    let key = string_key("Hi");
    assert_eq!(ex.source, format!("<? translate (  '{key}' ) ?>"));
  }
}
