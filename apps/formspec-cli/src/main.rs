//! formspec command-line driver
//!
//! Structured output (reports, field tables, PDFs, scripts) goes to stdout
//! or the requested file; tracing goes to stderr.

mod config;
mod fonts;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use formspec_core::sample::DEFAULT_SPEC_MARKDOWN;
use formspec_core::{validate_text, PageSize, Unit, ValidationReport};
use formspec_export::{script_for_engine, ScriptKind};
use formspec_reconcile::{extract_fields, reconcile};
use formspec_render::{generate_from_text, EngineKind, GenerateOutcome};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::fonts::load_fonts;

#[derive(Parser, Debug)]
#[command(name = "formspec")]
#[command(version, about = "Validate form specs and render them as fillable PDFs")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the unit geometry is normalized into (mm, pt)
    #[arg(long, global = true)]
    unit: Option<Unit>,

    /// Override the page size used when the spec declares none (A4, LETTER)
    #[arg(long, global = true)]
    page_size: Option<PageSize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a spec and print the report as JSON
    Validate {
        input: PathBuf,
    },
    /// Render a spec into a fillable PDF
    Generate {
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Rendering engine: simple or vector
        #[arg(short, long)]
        engine: Option<EngineKind>,

        /// Refuse to render when validation produced warnings
        #[arg(long)]
        strict: bool,

        /// Skip the /NeedAppearances post-processing step
        #[arg(long)]
        no_need_appearances: bool,

        /// Directory holding the configured font files
        #[arg(long)]
        font_dir: Option<PathBuf>,
    },
    /// List the AcroForm fields of a PDF as JSON
    Fields {
        pdf: PathBuf,
    },
    /// Compare a spec's field ids against the fields of a PDF
    Reconcile {
        spec: PathBuf,
        pdf: PathBuf,
    },
    /// Write a standalone generator script for a spec
    Export {
        input: PathBuf,

        /// simple-canvas, vector-canvas or client; follows the configured engine when absent
        #[arg(short, long)]
        kind: Option<ScriptKind>,

        /// Output file; defaults to the script's conventional name
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the built-in sample spec
    Sample,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Args::parse()) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(unit) = args.unit {
        config.validation.unit_fallback = unit;
    }
    if let Some(page_size) = args.page_size {
        config.validation.page_fallback = page_size;
    }

    match args.command {
        Command::Validate { input } => {
            let report = validate_text(&read_spec(&input)?, &config.validation);
            print_json(&report)?;
            Ok(exit_for(report.is_valid()))
        }
        Command::Generate {
            input,
            output,
            engine,
            strict,
            no_need_appearances,
            font_dir,
        } => {
            if let Some(engine) = engine {
                config.render.engine = engine;
            }
            config.render.strict |= strict;
            if no_need_appearances {
                config.render.need_appearances = false;
            }
            if font_dir.is_some() {
                config.fonts.dir = font_dir;
            }
            generate(&config, &input, &output)
        }
        Command::Fields { pdf } => {
            let extracted = extract_fields(&read_pdf(&pdf)?)?;
            print_json(&extracted)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Reconcile { spec, pdf } => {
            let report = validate_text(&read_spec(&spec)?, &config.validation);
            let normalized = valid_spec(&report)?;
            let reconciliation = reconcile(normalized, &read_pdf(&pdf)?)?;
            print_json(&reconciliation)?;
            Ok(exit_for(reconciliation.is_aligned()))
        }
        Command::Export { input, kind, output } => {
            let report = validate_text(&read_spec(&input)?, &config.validation);
            let normalized = valid_spec(&report)?;
            let kind = kind.unwrap_or_else(|| script_for_engine(config.render.engine));
            let output = output.unwrap_or_else(|| PathBuf::from(kind.file_name()));
            fs::write(&output, kind.render(normalized))
                .with_context(|| format!("Failed to write script: {}", output.display()))?;
            tracing::info!(kind = %kind, path = %output.display(), "script written");
            Ok(ExitCode::SUCCESS)
        }
        Command::Sample => {
            print!("{DEFAULT_SPEC_MARKDOWN}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn generate(config: &Config, input: &Path, output: &Path) -> Result<ExitCode> {
    let fonts = load_fonts(&config.fonts)?;
    let text = read_spec(input)?;

    match generate_from_text(&text, &config.generate_options(), &fonts)? {
        GenerateOutcome::Rendered(generated) => {
            fs::write(output, &generated.pdf)
                .with_context(|| format!("Failed to write PDF: {}", output.display()))?;
            for warning in &generated.validation.warnings {
                tracing::warn!("{warning}");
            }
            for entry in &generated.log {
                println!("{entry}");
            }
            tracing::info!(
                engine = %generated.engine,
                fields = generated.field_count,
                path = %output.display(),
                "PDF written"
            );
            Ok(ExitCode::SUCCESS)
        }
        GenerateOutcome::Rejected(report) => {
            print_json(&report)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn valid_spec(report: &ValidationReport) -> Result<&formspec_core::NormalizedSpec> {
    match report.normalized.as_ref() {
        Some(normalized) if report.errors.is_empty() => Ok(normalized),
        _ => bail!("Spec is invalid: {}", report.errors.join("; ")),
    }
}

fn read_spec(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read spec: {}", path.display()))
}

fn read_pdf(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read PDF: {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn exit_for(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_generate_flags_parse() {
        let args = Args::try_parse_from([
            "formspec", "generate", "spec.md", "-o", "out.pdf", "--engine", "b", "--strict",
        ])
        .unwrap();
        match args.command {
            Command::Generate { engine, strict, .. } => {
                assert_eq!(engine, Some(EngineKind::Vector));
                assert!(strict);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_overrides_parse() {
        let args =
            Args::try_parse_from(["formspec", "validate", "spec.yaml", "--unit", "pt", "--page-size", "letter"])
                .unwrap();
        assert_eq!(args.unit, Some(Unit::Pt));
        assert_eq!(args.page_size, Some(PageSize::Letter));
    }

    #[test]
    fn test_unknown_engine_rejected() {
        assert!(Args::try_parse_from(["formspec", "generate", "s", "-o", "o", "-e", "typst"]).is_err());
    }

    #[test]
    fn test_valid_spec_requires_normalized_tree() {
        let report = validate_text("", &Default::default());
        assert!(valid_spec(&report).is_err());

        let report = validate_text(DEFAULT_SPEC_MARKDOWN, &Default::default());
        assert!(valid_spec(&report).is_ok());
    }
}
