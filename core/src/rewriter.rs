#![deny(missing_docs)]

//! # Rewrite Pass
//!
//! One forward pass over a specification document:
//!
//! 1. **Resolve** every operation of every path to a binding or the default.
//! 2. **Inject** the Lambda proxy directive.
//! 3. **Authorize** the operation, registering the pool's scheme on first use.
//! 4. **Preflight**: once a path's operations are done, add an `options`
//!    operation when CORS defaults are configured and none is declared.
//! 5. **Register** the new security schemes under `components`.
//!
//! The pass consumes the tree and only hands it back on success, so a failed
//! pass never leaves a half-rewritten document behind.

use crate::authorizer::{self, AuthDecision, AuthorizerRegistry};
use crate::cors;
use crate::document::{self, operation_method, paths_of, pointer_for, DocumentFormat};
use crate::error::{RewriteError, RewriteResult};
use crate::integration;
use crate::options::RewriteOptions;
use crate::resolver::{Resolution, RouteResolver};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// What a pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteSummary {
    /// Operations that received an integration directive.
    pub operations: usize,
    /// Operations served by the default binding.
    pub fallback_operations: usize,
    /// Operations that received a security requirement.
    pub secured_operations: usize,
    /// Paths that gained a synthesized preflight operation.
    pub preflights: Vec<String>,
    /// Security schemes added to the document.
    pub authorizers: Vec<String>,
}

/// Result of rewriting a raw document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutput {
    /// Rewritten document, in `format`.
    pub bytes: Vec<u8>,
    /// Format of both input and output.
    pub format: DocumentFormat,
    /// What the pass changed.
    pub summary: RewriteSummary,
}

/// Runs rewrite passes with a fixed set of options.
#[derive(Debug, Clone)]
pub struct Rewriter<'a> {
    options: &'a RewriteOptions,
    resolver: RouteResolver<'a>,
}

impl<'a> Rewriter<'a> {
    /// Creates a rewriter for the given options.
    pub fn new(options: &'a RewriteOptions) -> Self {
        Rewriter {
            options,
            resolver: RouteResolver::new(&options.bindings, options.default_binding.as_ref()),
        }
    }

    /// Detects the format of `raw`, rewrites it, and serializes it back.
    pub fn rewrite(&self, raw: &[u8]) -> RewriteResult<RewriteOutput> {
        let (tree, format) = document::parse(raw)?;
        self.finish(tree, format)
    }

    /// Rewrites `raw` read in an explicitly given format.
    pub fn rewrite_as(&self, raw: &[u8], format: DocumentFormat) -> RewriteResult<RewriteOutput> {
        let tree = document::parse_as(raw, format)?;
        self.finish(tree, format)
    }

    fn finish(&self, tree: Value, format: DocumentFormat) -> RewriteResult<RewriteOutput> {
        debug!(%format, "parsed source document");
        let (tree, summary) = self.apply(tree)?;
        let bytes = document::serialize(&tree, format)?;
        Ok(RewriteOutput {
            bytes,
            format,
            summary,
        })
    }

    /// Applies the pass to a parsed tree.
    pub fn apply(&self, mut tree: Value) -> RewriteResult<(Value, RewriteSummary)> {
        let mut registry = AuthorizerRegistry::from_document(&tree)?;
        let mut summary = RewriteSummary::default();

        if paths_of(&tree)?.is_some() {
            let paths = tree
                .get_mut("paths")
                .and_then(Value::as_object_mut)
                .ok_or_else(|| {
                    RewriteError::invalid_document("/paths", "paths must be a mapping")
                })?;

            for (path, item) in paths.iter_mut() {
                let item = item.as_object_mut().ok_or_else(|| {
                    RewriteError::invalid_document(
                        pointer_for(&["paths", path.as_str()]),
                        "path item must be a mapping",
                    )
                })?;
                self.rewrite_path(path, item, &mut registry, &mut summary)?;
            }
        }

        registry.write_into(&mut tree)?;
        summary.authorizers = registry.created().map(String::from).collect();

        info!(
            operations = summary.operations,
            fallback = summary.fallback_operations,
            secured = summary.secured_operations,
            preflights = summary.preflights.len(),
            authorizers = summary.authorizers.len(),
            "rewrite pass complete"
        );
        Ok((tree, summary))
    }

    fn rewrite_path(
        &self,
        path: &str,
        item: &mut Map<String, Value>,
        registry: &mut AuthorizerRegistry,
        summary: &mut RewriteSummary,
    ) -> RewriteResult<()> {
        for (key, operation) in item.iter_mut() {
            let Some(method) = operation_method(key) else {
                continue;
            };
            let operation = operation.as_object_mut().ok_or_else(|| {
                RewriteError::invalid_document(
                    pointer_for(&["paths", path, key.as_str()]),
                    "operation must be a mapping",
                )
            })?;

            let resolution = self.resolver.resolve(path, key, method)?;
            if let Resolution::Default(target) = resolution {
                warn!(path, method = %key, target, "no binding registered, using default integration");
                summary.fallback_operations += 1;
            }

            let directive = integration::lambda_proxy(resolution.target(), &self.options.context)?;
            integration::inject(operation, directive);
            summary.operations += 1;

            let decision = registry.authorize(
                resolution.binding(),
                self.options.default_pool.as_ref(),
                &self.options.context,
            )?;
            match decision {
                AuthDecision::Resolved(scheme) => {
                    let scopes = resolution
                        .binding()
                        .map(|b| b.method_options.scopes())
                        .unwrap_or_default();
                    authorizer::require(operation, &scheme, scopes);
                    summary.secured_operations += 1;
                    debug!(path, method = %key, target = resolution.target(), %scheme, "operation integrated");
                }
                AuthDecision::NoAuth => {
                    debug!(path, method = %key, target = resolution.target(), "operation integrated without authorizer");
                }
            }
        }

        if let Some(defaults) = &self.options.cors {
            if cors::ensure_preflight(item, defaults) {
                debug!(path, "synthesized preflight operation");
                summary.preflights.push(path.to_string());
            }
        }
        Ok(())
    }
}

/// Parses, rewrites and serializes `raw` with the given options.
pub fn rewrite(raw: &[u8], options: &RewriteOptions) -> RewriteResult<RewriteOutput> {
    Rewriter::new(options).rewrite(raw)
}
