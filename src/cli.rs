//! Minimal CLI: schema → (type graph | check)
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::{error, info};

use json_typegraph::{convert_schema, emit, ConvertOptions};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// convert JSON Schema documents into a canonical type graph
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// convert and print the type graph as JSON
    Graph(GraphOut),
    /// convert every input and report which ones fail
    Check(CheckOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more schema files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// JSON options file (e.g. `{ "root_name": "Welcome" }`)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct GraphOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// top-level type name; overrides the options file
    #[arg(long)]
    root_type: Option<String>,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    input_settings: InputSettings,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn options(&self) -> Result<ConvertOptions> {
        match &self.config {
            Some(path) => ConvertOptions::load(path)
                .with_context(|| format!("failed to load options from {}", path.display())),
            None => Ok(ConvertOptions::default()),
        }
    }

    fn load_process(&self, mut apply: impl FnMut(&Path, Value) -> Result<()>) -> Result<()> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        for source_path in source_paths {
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read {}", source_path.display()))?;
            let json_value = serde_json::from_str::<Value>(&source).with_context(|| {
                format!("failed to parse JSON source file ({})", source_path.display())
            })?;
            apply(&source_path, json_value)?;
        }
        Ok(())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Graph(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                let mut options = target.input_settings.options()?;
                if let Some(root_type) = &target.root_type {
                    options.root_name = root_type.clone();
                }

                let mut outputs = Vec::new();
                target.input_settings.load_process(|path, document| {
                    let conv = convert_schema(&document, &options)
                        .with_context(|| format!("failed to convert {}", path.display()))?;
                    info!(file = %path.display(), types = conv.graph.len(), "converted");
                    outputs.push(emit::describe(&conv.graph, conv.root));
                    Ok(())
                })?;

                let rendered = match outputs.len() {
                    1 => outputs.remove(0),
                    _ => Value::Array(outputs),
                };
                let src = serde_json::to_string_pretty(&rendered)?;
                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(out, &src)?;
                } else {
                    println!("{src}");
                }
                Ok(())
            }
            Command::Check(target) => {
                let options = target.input_settings.options()?;
                let mut failures = 0usize;
                let mut total = 0usize;
                target.input_settings.load_process(|path, document| {
                    total += 1;
                    match convert_schema(&document, &options) {
                        Ok(conv) => {
                            println!("ok    {} ({} types)", path.display(), conv.graph.len())
                        }
                        Err(err) => {
                            failures += 1;
                            error!(file = %path.display(), %err, "conversion failed");
                            println!("FAIL  {}: {err}", path.display());
                        }
                    }
                    Ok(())
                })?;
                if failures > 0 {
                    bail!("{failures} of {total} schemas failed to convert");
                }
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                matched_any = true;
                out.push(entry?);
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
