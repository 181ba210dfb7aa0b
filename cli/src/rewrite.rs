#![deny(missing_docs)]

//! # Rewrite Command
//!
//! Reads a specification, runs the rewrite pass, and writes the result.
//! The output file is only touched once the whole pass has succeeded.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use spec_rewrite_core::{DocumentFormat, RewriteOutput, Rewriter};

use crate::config::{load_options, ContextArgs};
use crate::error::CliResult;
use crate::report::Report;

/// Input format selection.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatArg {
    /// Detect from content.
    #[default]
    Auto,
    /// Force JSON.
    Json,
    /// Force YAML.
    Yaml,
}

impl FormatArg {
    /// The forced format, if any.
    pub fn forced(self) -> Option<DocumentFormat> {
        match self {
            FormatArg::Auto => None,
            FormatArg::Json => Some(DocumentFormat::Json),
            FormatArg::Yaml => Some(DocumentFormat::Yaml),
        }
    }
}

/// Arguments for the rewrite command.
#[derive(clap::Args, Debug, Clone)]
pub struct RewriteArgs {
    /// Path to the source specification (JSON or YAML).
    #[clap(long)]
    pub input: PathBuf,

    /// Path to the options file.
    #[clap(long)]
    pub options: PathBuf,

    /// Output path. Writes to stdout when omitted.
    #[clap(long)]
    pub output: Option<PathBuf>,

    /// Input format.
    #[clap(long, value_enum, default_value_t = FormatArg::Auto)]
    pub format: FormatArg,

    #[clap(flatten)]
    pub context: ContextArgs,

    /// Print a status report as JSON (to stdout with `--output`, else stderr).
    #[clap(long)]
    pub report: bool,
}

/// Executes the rewrite and, if asked, prints the status report.
pub fn execute(args: &RewriteArgs) -> CliResult<()> {
    let result = run(args);

    if args.report {
        let report = match &result {
            Ok(()) => Report::success(output_label(args)),
            Err(err) => Report::failure(err),
        };
        if args.output.is_some() {
            println!("{}", report.to_json());
        } else {
            eprintln!("{}", report.to_json());
        }
    }
    result
}

fn run(args: &RewriteArgs) -> CliResult<()> {
    let options = load_options(&args.options, &args.context)?;
    let raw = fs::read(&args.input)?;

    let rewriter = Rewriter::new(&options);
    let out = match args.format.forced() {
        Some(format) => rewriter.rewrite_as(&raw, format)?,
        None => rewriter.rewrite(&raw)?,
    };
    write_output(args, &out)?;

    tracing::info!(
        input = %args.input.display(),
        output = %output_label(args),
        format = %out.format,
        operations = out.summary.operations,
        "rewrote specification"
    );
    Ok(())
}

fn write_output(args: &RewriteArgs, out: &RewriteOutput) -> CliResult<()> {
    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, &out.bytes)?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&out.bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn output_label(args: &RewriteArgs) -> String {
    args.output
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string())
}
