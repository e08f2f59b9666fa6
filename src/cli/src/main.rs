/* src/cli/src/main.rs */

mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use weft_compiler::TemplateCompiler;
use weft_renderer::TemplateEngine;

#[derive(Parser)]
#[command(name = "weft", about = "Template compiler and renderer with string localization")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Extract translatable strings, write compiled templates and per-language string tables
  Compile {
    /// Template dir
    #[arg(short = 't', long)]
    templates: PathBuf,
    /// Compiled template dir
    #[arg(short = 'c', long)]
    compiled: PathBuf,
    /// Strings dir
    #[arg(short = 's', long)]
    strings: PathBuf,
    /// Langs to generate string tables for (comma separated)
    #[arg(short = 'a', long, value_delimiter = ',')]
    langs: Vec<String>,
    /// Template suffix
    #[arg(short = 'x', long, default_value = ".html")]
    suffix: String,
    /// Compile just one template (path relative to the template dir)
    #[arg(short = 'o', long)]
    only: Option<String>,
    /// Remove string entries whose text is no longer referenced
    #[arg(short = 'D', long)]
    prune: bool,
  },
  /// Render one template to stdout
  Render {
    /// Template dir
    #[arg(short = 't', long)]
    templates: PathBuf,
    /// Compiled template dir
    #[arg(short = 'c', long)]
    compiled: PathBuf,
    /// Strings dir
    #[arg(short = 's', long)]
    strings: PathBuf,
    /// Template suffix
    #[arg(short = 'x', long, default_value = ".html")]
    suffix: String,
    /// Use compiled templates localized for this language
    #[arg(short = 'l', long)]
    lang: Option<String>,
    /// JSON object bound as the template's data
    #[arg(short = 'd', long, default_value = "{}")]
    data: String,
    /// Template name, without suffix
    name: String,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  match cli.command {
    Command::Compile { templates, compiled, strings, langs, suffix, only, prune } => {
      ui::banner("compile");
      let mut compiler = TemplateCompiler::new(&templates, &suffix, &compiled, &strings, langs);
      compiler.set_prune(prune);
      match only {
        Some(template) => {
          compiler
            .compile_one(&template)
            .with_context(|| format!("failed to compile {template}"))?;
          ui::ok(&format!("compiled {template}"));
        }
        None => {
          let done = compiler.compile_all().context("compilation failed")?;
          for template in &done {
            ui::detail_ok(template);
          }
          ui::ok(&format!("{} template(s) compiled", done.len()));
        }
      }
      ui::blank();
      Ok(())
    }

    Command::Render { templates, compiled, strings, suffix, lang, data, name } => {
      let data: serde_json::Value =
        serde_json::from_str(&data).context("--data is not valid JSON")?;
      let mut engine = TemplateEngine::new(&templates, &suffix, &compiled, &strings);
      if let Some(lang) = lang {
        engine.set_compiled_lang(lang);
      }
      let out = engine.render(&name, &data).with_context(|| format!("failed to render {name}"))?;
      println!("{out}");
      Ok(())
    }
  }
}
