#![deny(missing_docs)]

//! # Plan Command
//!
//! Shows which binding serves each operation of a specification without
//! rewriting it. Stops at the first operation nothing serves.

use std::fs;
use std::path::PathBuf;

use spec_rewrite_core::document::operations;
use spec_rewrite_core::{Authorization, PoolRef, Resolution, RewriteOptions, RouteResolver};

use crate::config::{load_options, ContextArgs};
use crate::error::CliResult;
use crate::rewrite::FormatArg;

/// Arguments for the plan command.
#[derive(clap::Args, Debug, Clone)]
pub struct PlanArgs {
    /// Path to the source specification (JSON or YAML).
    #[clap(long)]
    pub input: PathBuf,

    /// Path to the options file.
    #[clap(long)]
    pub options: PathBuf,

    /// Input format.
    #[clap(long, value_enum, default_value_t = FormatArg::Auto)]
    pub format: FormatArg,
}

/// Prints one line per operation.
pub fn execute(args: &PlanArgs) -> CliResult<()> {
    let options = load_options(&args.options, &ContextArgs::default())?;
    let raw = fs::read(&args.input)?;
    let tree = match args.format.forced() {
        Some(format) => spec_rewrite_core::parse_as(&raw, format)?,
        None => spec_rewrite_core::parse(&raw)?.0,
    };

    for line in plan(&tree, &options)? {
        println!("{}", line);
    }
    Ok(())
}

/// Describes how each operation of `tree` resolves.
pub fn plan(tree: &serde_json::Value, options: &RewriteOptions) -> CliResult<Vec<String>> {
    let resolver = RouteResolver::new(&options.bindings, options.default_binding.as_ref());

    let mut lines = Vec::new();
    for op in operations(tree)? {
        let line = match resolver.resolve(&op.path, &op.key, op.method)? {
            Resolution::Binding(binding) => format!(
                "{} {} -> {} [{}]",
                op.method,
                op.path,
                binding.integration_target,
                describe_auth(&binding.authorization)
            ),
            Resolution::Default(target) => {
                format!("{} {} -> {} [default]", op.method, op.path, target)
            }
        };
        lines.push(line);
    }
    Ok(lines)
}

fn describe_auth(auth: &Authorization) -> String {
    match auth {
        Authorization::None => "anonymous".to_string(),
        Authorization::DefaultPool => "default pool".to_string(),
        Authorization::Pool(PoolRef::Arn(arn)) => format!("pool {}", arn),
        Authorization::Pool(PoolRef::Name(name)) => format!("pool {}", name),
    }
}
