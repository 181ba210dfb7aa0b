#![deny(missing_docs)]

//! # Integration Directives
//!
//! Writes the `x-amazon-apigateway-integration` extension that points an
//! operation at its Lambda backend.

use crate::error::{RewriteError, RewriteResult};
use crate::options::GatewayContext;
use serde_json::{json, Map, Value};

/// Operation extension holding the backend directive.
pub const INTEGRATION_KEY: &str = "x-amazon-apigateway-integration";

/// Passthrough behaviour written on every directive.
pub const PASSTHROUGH_WHEN_NO_MATCH: &str = "when_no_match";

/// Lambda proxy integrations are always invoked with POST.
const PROXY_HTTP_METHOD: &str = "POST";

const PROXY_TYPE: &str = "aws_proxy";

/// Builds the invocation URI for a Lambda target.
pub fn invocation_uri(target: &str, context: &GatewayContext) -> RewriteResult<String> {
    let region = context
        .region
        .as_deref()
        .filter(|r| !r.is_empty())
        .ok_or_else(|| RewriteError::MissingContext("region".into()))?;
    Ok(format!(
        "arn:{}:apigateway:{}:lambda:path/2015-03-31/functions/{}/invocations",
        context.partition, region, target
    ))
}

/// Builds a Lambda proxy directive.
pub fn lambda_proxy(target: &str, context: &GatewayContext) -> RewriteResult<Value> {
    Ok(json!({
        "type": PROXY_TYPE,
        "httpMethod": PROXY_HTTP_METHOD,
        "uri": invocation_uri(target, context)?,
        "passthroughBehavior": PASSTHROUGH_WHEN_NO_MATCH,
    }))
}

/// Sets (or replaces) the directive on an operation.
pub fn inject(operation: &mut Map<String, Value>, directive: Value) {
    operation.insert(INTEGRATION_KEY.to_string(), directive);
}
