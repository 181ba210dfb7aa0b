#![deny(missing_docs)]

//! # Spec Rewrite CLI
//!
//! Command line front end for the rewrite engine.
//!
//! Supported Commands:
//! - `rewrite`: Adds integration, authorizer and preflight directives to a specification.
//! - `plan`: Lists which binding serves each operation.

use clap::{Parser, Subcommand};

use crate::error::CliResult;

mod config;
mod error;
mod logging;
mod plan;
mod report;
mod rewrite;

#[derive(Parser, Debug)]
#[clap(author, version, about = "OpenAPI rewriter for API Gateway Lambda integrations")]
struct Cli {
    /// Emit logs as JSON lines.
    #[clap(long, global = true)]
    log_json: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rewrite a specification for deployment.
    Rewrite(rewrite::RewriteArgs),
    /// Show how each operation resolves, without rewriting.
    Plan(plan::PlanArgs),
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    let result = match &cli.command {
        Commands::Rewrite(args) => rewrite::execute(args),
        Commands::Plan(args) => plan::execute(args),
    };
    if let Err(err) = &result {
        tracing::error!(reason = err.reason(), "{}", err);
    }
    result
}
