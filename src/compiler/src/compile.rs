/* src/compiler/src/compile.rs */

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CompileError, CompileResult};
use crate::extract::extract_strings;

/// Orchestrates one compilation pass: source -> extraction -> compiled
/// artifact under the compiled root (mirrored layout) -> merged string table
/// per target language under the strings root.
pub struct TemplateCompiler {
  template_root: PathBuf,
  suffix: String,
  compiled_root: PathBuf,
  strings_root: PathBuf,
  langs: Vec<String>,
  prune: bool,
}

impl TemplateCompiler {
  pub fn new(
    template_root: impl Into<PathBuf>,
    suffix: &str,
    compiled_root: impl Into<PathBuf>,
    strings_root: impl Into<PathBuf>,
    langs: Vec<String>,
  ) -> Self {
    let trimmed = suffix.trim_start_matches('.');
    Self {
      template_root: template_root.into(),
      suffix: format!(".{trimmed}"),
      compiled_root: compiled_root.into(),
      strings_root: strings_root.into(),
      langs,
      prune: false,
    }
  }

  /// When set, persisted translations whose key is no longer extracted are
  /// dropped instead of carried forward.
  pub fn set_prune(&mut self, prune: bool) {
    self.prune = prune;
  }

  /// Compile one template, identified by its path relative to the template
  /// root (suffix included). Any failure aborts this template before the
  /// failing step writes; outputs already written for other templates are
  /// never touched.
  pub fn compile_one(&self, template: &str) -> CompileResult<()> {
    let source_path = self.template_root.join(template);
    let source = fs::read_to_string(&source_path)
      .map_err(|source| CompileError::Io { path: source_path, source })?;

    let extraction = extract_strings(&source)?;

    // The compiled artifact must still parse; a rewrite that broke the
    // template is a generation bug, caught before anything lands on disk.
    let compiled_path = self.compiled_root.join(template);
    weft_renderer::check_template(&extraction.source).map_err(|e| CompileError::Validation {
      path: compiled_path.clone(),
      message: e.to_string(),
    })?;

    if let Some(parent) = compiled_path.parent() {
      fs::create_dir_all(parent)
        .map_err(|source| CompileError::Io { path: parent.to_path_buf(), source })?;
    }
    fs::write(&compiled_path, &extraction.source)
      .map_err(|source| CompileError::Io { path: compiled_path, source })?;

    for lang in &self.langs {
      let persisted = weft_strings::load(&self.strings_root, lang, template)?;
      let merged = weft_strings::merge(&extraction.strings, &persisted, self.prune);
      weft_strings::persist(&self.strings_root, lang, template, &merged)?;
    }
    Ok(())
  }

  /// Compile every template under the template root whose name ends with the
  /// configured suffix. Templates have disjoint outputs, so order does not
  /// matter; the walk is sorted anyway so failures reproduce. Stops at the
  /// first failing template.
  pub fn compile_all(&self) -> CompileResult<Vec<String>> {
    let templates = self.find_templates()?;
    for template in &templates {
      self.compile_one(template)?;
    }
    Ok(templates)
  }

  /// Relative paths (suffix included) of every template under the root.
  pub fn find_templates(&self) -> CompileResult<Vec<String>> {
    let mut found = Vec::new();
    walk(&self.template_root, &self.template_root, &self.suffix, &mut found)?;
    found.sort();
    Ok(found)
  }
}

fn walk(root: &Path, dir: &Path, suffix: &str, found: &mut Vec<String>) -> CompileResult<()> {
  let entries =
    fs::read_dir(dir).map_err(|source| CompileError::Io { path: dir.to_path_buf(), source })?;
  for entry in entries {
    let entry =
      entry.map_err(|source| CompileError::Io { path: dir.to_path_buf(), source })?;
    let path = entry.path();
    if path.is_dir() {
      walk(root, &path, suffix, found)?;
    } else if path.file_name().is_some_and(|n| n.to_string_lossy().ends_with(suffix)) {
      if let Ok(rel) = path.strip_prefix(root) {
        let rel = rel
          .components()
          .map(|c| c.as_os_str().to_string_lossy())
          .collect::<Vec<_>>()
          .join("/");
        found.push(rel);
      }
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use weft_renderer::TemplateEngine;
  use weft_strings::{string_key, StringTable};

  struct Roots {
    _tmp: tempfile::TempDir,
    templates: PathBuf,
    compiled: PathBuf,
    strings: PathBuf,
  }

  fn roots() -> Roots {
    let tmp = tempfile::tempdir().unwrap();
    let templates = tmp.path().join("templates");
    fs::create_dir_all(&templates).unwrap();
    Roots {
      templates,
      compiled: tmp.path().join("compiled"),
      strings: tmp.path().join("strings"),
      _tmp: tmp,
    }
  }

  fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
  }

  fn compiler(r: &Roots, langs: &[&str]) -> TemplateCompiler {
    TemplateCompiler::new(
      &r.templates,
      ".html",
      &r.compiled,
      &r.strings,
      langs.iter().map(|l| l.to_string()).collect(),
    )
  }

  #[test]
  fn compile_one_writes_artifact_and_seeds_tables() {
    let r = roots();
    write(&r.templates, "hello.html", r#"<? translate("Hello %s", name) ?>"#);
    compiler(&r, &["de", "fr"]).compile_one("hello.html").unwrap();

    let key = string_key("Hello %s");
    let artifact = fs::read_to_string(r.compiled.join("hello.html")).unwrap();
    assert_eq!(artifact, format!(r#"<? translate("{key}", name) ?>"#));

    for lang in ["de", "fr"] {
      let table = weft_strings::load(&r.strings, lang, "hello.html").unwrap();
      assert_eq!(table.get(&key).map(String::as_str), Some("Hello %s"));
    }
  }

  #[test]
  fn recompile_keeps_hand_edited_translations() {
    let r = roots();
    write(&r.templates, "page.html", r#"<? translate("Hello %s") ?>"#);
    let c = compiler(&r, &["de"]);
    c.compile_one("page.html").unwrap();

    // Translator edits the generated table.
    let key = string_key("Hello %s");
    let mut table = weft_strings::load(&r.strings, "de", "page.html").unwrap();
    table.insert(key.clone(), "Hallo %s".to_string());
    weft_strings::persist(&r.strings, "de", "page.html", &table).unwrap();

    c.compile_one("page.html").unwrap();
    let table = weft_strings::load(&r.strings, "de", "page.html").unwrap();
    assert_eq!(table.get(&key).map(String::as_str), Some("Hallo %s"));
  }

  #[test]
  fn prune_drops_stale_keys_and_default_keeps_them() {
    let r = roots();
    write(&r.templates, "page.html", r#"<? translate("current") ?>"#);
    let stale_key = string_key("removed text");
    let mut persisted = StringTable::new();
    persisted.insert(stale_key.clone(), "übersetzt".to_string());
    weft_strings::persist(&r.strings, "de", "page.html", &persisted).unwrap();

    let mut c = compiler(&r, &["de"]);
    c.compile_one("page.html").unwrap();
    let table = weft_strings::load(&r.strings, "de", "page.html").unwrap();
    assert!(table.contains_key(&stale_key));

    weft_strings::persist(&r.strings, "de", "page.html", &persisted).unwrap();
    c.set_prune(true);
    c.compile_one("page.html").unwrap();
    let table = weft_strings::load(&r.strings, "de", "page.html").unwrap();
    assert!(!table.contains_key(&stale_key));
    assert!(table.contains_key(&string_key("current")));
  }

  #[test]
  fn corrupt_persisted_table_fails_compile() {
    let r = roots();
    write(&r.templates, "page.html", r#"<? translate("x") ?>"#);
    write(&r.strings, "de/page.html", "{ nope");
    let err = compiler(&r, &["de"]).compile_one("page.html").unwrap_err();
    assert!(matches!(err, CompileError::Table(_)));
  }

  #[test]
  fn extraction_failure_writes_nothing() {
    let r = roots();
    write(&r.templates, "bad.html", r#"<? translate("bad \q") ?>"#);
    let err = compiler(&r, &["de"]).compile_one("bad.html").unwrap_err();
    assert!(matches!(err, CompileError::Extraction { .. }));
    assert!(!r.compiled.join("bad.html").exists());
    assert!(!r.strings.join("de/bad.html").exists());
  }

  #[test]
  fn recompiling_compiled_output_is_refused() {
    let r = roots();
    write(&r.templates, "page.html", r#"<? translate("Hello") ?>"#);
    let c = compiler(&r, &[]);
    c.compile_one("page.html").unwrap();

    // Point a second compiler at the compiled tree as if it were source.
    let tmp2 = tempfile::tempdir().unwrap();
    let c2 = TemplateCompiler::new(&r.compiled, ".html", tmp2.path(), tmp2.path(), vec![]);
    let err = c2.compile_one("page.html").unwrap_err();
    assert!(matches!(err, CompileError::AlreadyCompiled { .. }));
  }

  #[test]
  fn missing_source_is_io_error() {
    let r = roots();
    assert!(matches!(
      compiler(&r, &[]).compile_one("ghost.html").unwrap_err(),
      CompileError::Io { .. }
    ));
  }

  #[test]
  fn compile_all_walks_nested_dirs_and_filters_suffix() {
    let r = roots();
    write(&r.templates, "index.html", r#"<? translate("a") ?>"#);
    write(&r.templates, "partial/fruit.html", r#"<? translate("b") ?>"#);
    write(&r.templates, "notes.txt", "not a template");

    let compiled = compiler(&r, &["de"]).compile_all().unwrap();
    assert_eq!(compiled, vec!["index.html".to_string(), "partial/fruit.html".to_string()]);
    assert!(r.compiled.join("partial/fruit.html").is_file());
    assert!(!r.compiled.join("notes.txt").exists());
  }

  #[test]
  fn compile_all_stops_at_first_failure() {
    let r = roots();
    write(&r.templates, "a.html", r#"<? translate("ok") ?>"#);
    write(&r.templates, "b.html", r#"<? translate("bad \q") ?>"#);
    write(&r.templates, "c.html", r#"<? translate("ok") ?>"#);

    let err = compiler(&r, &[]).compile_all().unwrap_err();
    assert!(matches!(err, CompileError::Extraction { .. }));
    // a.html sorts first and was compiled before the failure.
    assert!(r.compiled.join("a.html").exists());
    assert!(!r.compiled.join("b.html").exists());
  }

  #[test]
  fn demo_templates_compile_and_render_both_modes() {
    let demo = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demo/templates");
    let tmp = tempfile::tempdir().unwrap();
    let compiled = tmp.path().join("compiled");
    let strings = tmp.path().join("strings");

    let c = TemplateCompiler::new(&demo, ".html", &compiled, &strings, vec!["de".to_string()]);
    let done = c.compile_all().unwrap();
    assert_eq!(done, vec!["fruits.html", "layout.html", "partial/fruit.html"]);

    let data = json!({"show_fruits": true, "fruits": ["apple", "banana", "cherry"]});
    let engine = TemplateEngine::new(&demo, ".html", &compiled, &strings);
    let raw = engine.render("fruits", &data).unwrap();
    assert!(raw.contains("<title>Fruits</title>"));
    assert!(raw.contains("It&#x27;s important to eat fruits."));
    assert!(raw.contains("Here are 3 fruits:"));
    assert!(raw.contains("The cherry is tasty."));

    // Freshly seeded tables hold defaults, so compiled output matches raw.
    let mut localized = TemplateEngine::new(&demo, ".html", &compiled, &strings);
    localized.set_compiled_lang("de");
    assert_eq!(localized.render("fruits", &data).unwrap(), raw);
  }

  #[test]
  fn compiled_template_renders_localized() {
    let r = roots();
    write(&r.templates, "hello.html", r#"<? translate("Hello %s", "World") ?>"#);
    compiler(&r, &["de"]).compile_one("hello.html").unwrap();

    let key = string_key("Hello %s");
    let mut table = weft_strings::load(&r.strings, "de", "hello.html").unwrap();
    table.insert(key, "Hallo %s".to_string());
    weft_strings::persist(&r.strings, "de", "hello.html", &table).unwrap();

    let mut engine = TemplateEngine::new(&r.templates, ".html", &r.compiled, &r.strings);
    let raw = engine.render("hello", &json!({})).unwrap();
    assert_eq!(raw, "Hello World");
    engine.set_compiled_lang("de");
    assert_eq!(engine.render("hello", &json!({})).unwrap(), "Hallo World");
  }
}
