#![deny(missing_docs)]

//! # Spec Rewrite Core
//!
//! Rewrites an OpenAPI document so that every operation carries an API
//! Gateway integration directive and, where configured, a Cognito
//! authorizer requirement. Paths without a declared preflight operation gain
//! a mock `options` operation when CORS defaults are supplied.
//!
//! The engine is pure: it takes bytes or a parsed tree plus
//! [`RewriteOptions`], and returns the rewritten document or a
//! [`RewriteError`]. It performs no I/O.

/// Shared error types.
pub mod error;

/// JSON/YAML loading and serialization.
pub mod document;

/// Route binding data model.
pub mod binding;

/// Pass configuration.
pub mod options;

/// Binding registration.
pub mod registrar;

/// Binding lookup for document routes.
pub mod resolver;

/// Backend integration directives.
pub mod integration;

/// Cognito authorizer resolution and registration.
pub mod authorizer;

/// CORS preflight synthesis.
pub mod cors;

/// The rewrite pass.
pub mod rewriter;

pub use binding::{
    Authorization, HttpMethod, IntegrationKind, MethodOptions, PoolRef, RouteBinding,
    RouteBindingSpec,
};
pub use cors::{AllowHeadersSource, CorsDefaults};
pub use document::{parse, parse_as, serialize, DocumentFormat, OperationRef};
pub use error::{RewriteError, RewriteResult};
pub use options::{GatewayContext, RewriteOptions, RewriteOptionsSpec};
pub use registrar::Registrar;
pub use resolver::{Resolution, RouteResolver};
pub use rewriter::{rewrite, RewriteOutput, RewriteSummary, Rewriter};
