#![deny(missing_docs)]

//! # Route Bindings
//!
//! A route binding ties one `(resource path, method)` pair of the document to
//! a backend integration target and, optionally, to an identity pool that
//! gates access to it.
//!
//! Bindings arrive over the wire as [`RouteBindingSpec`], a flat bag of
//! optional fields, and are validated into [`RouteBinding`] where the
//! mutually exclusive choices are a single enum.

use crate::error::{RewriteError, RewriteResult};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// HTTP method a binding applies to.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HttpMethod {
    /// Catch-all method.
    #[display("ANY")]
    Any,
    /// GET
    #[display("GET")]
    Get,
    /// POST
    #[display("POST")]
    Post,
    /// PUT
    #[display("PUT")]
    Put,
    /// DELETE
    #[display("DELETE")]
    Delete,
    /// PATCH
    #[display("PATCH")]
    Patch,
    /// HEAD
    #[display("HEAD")]
    Head,
    /// OPTIONS
    #[display("OPTIONS")]
    Options,
    /// TRACE
    #[display("TRACE")]
    Trace,
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ANY" => Ok(HttpMethod::Any),
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            "TRACE" => Ok(HttpMethod::Trace),
            other => Err(format!("unknown HTTP method '{}'", other)),
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.to_string()
    }
}

/// Kind of backend a binding integrates with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationKind {
    /// Lambda proxy integration, the only kind the rewriter can emit.
    #[default]
    Lambda,
    /// Any other tag. Bindings of this kind never match a route.
    #[serde(other)]
    Unsupported,
}

/// Reference to an identity pool: either fully qualified or a bare name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PoolRef {
    /// Fully-qualified reference, used as-is.
    Arn(String),
    /// Bare pool name, expanded with the gateway context.
    Name(String),
}

impl PoolRef {
    /// Builds a reference from the optional ARN/name pair, `None` if neither is set.
    ///
    /// The caller supplies the error to raise when both are set.
    pub(crate) fn from_pair(
        arn: Option<String>,
        name: Option<String>,
        conflict: impl FnOnce() -> RewriteError,
    ) -> RewriteResult<Option<PoolRef>> {
        let arn = arn.filter(|s| !s.is_empty());
        let name = name.filter(|s| !s.is_empty());
        match (arn, name) {
            (Some(_), Some(_)) => Err(conflict()),
            (Some(arn), None) => Ok(Some(PoolRef::Arn(arn))),
            (None, Some(name)) => Ok(Some(PoolRef::Name(name))),
            (None, None) => Ok(None),
        }
    }
}

/// How an operation bound to this route is authorized.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Authorization {
    /// Left unauthenticated.
    #[default]
    None,
    /// Uses the pass-level default pool, if one is configured.
    DefaultPool,
    /// Uses a pool specific to this binding.
    Pool(PoolRef),
}

/// Per-method options carried by a binding.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodOptions {
    /// OAuth scopes listed on the security requirement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_scopes: Option<Vec<String>>,
}

impl MethodOptions {
    /// Options requiring the given scopes.
    pub fn with_scopes<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MethodOptions {
            authorization_scopes: Some(scopes.into_iter().map(Into::into).collect()),
        }
    }

    /// Scope list, empty when unset.
    pub fn scopes(&self) -> &[String] {
        self.authorization_scopes.as_deref().unwrap_or(&[])
    }
}

/// A validated route binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteBinding {
    /// Resource path, e.g. `/environments/{env-id}`.
    pub resource_path: String,
    /// Method the binding applies to.
    pub method: HttpMethod,
    /// Backend kind.
    pub kind: IntegrationKind,
    /// Opaque reference to the backend, e.g. a function ARN.
    pub integration_target: String,
    /// Authorization choice.
    pub authorization: Authorization,
    /// Method options.
    pub method_options: MethodOptions,
}

impl RouteBinding {
    /// A Lambda binding without authorization.
    pub fn new(
        resource_path: impl Into<String>,
        method: HttpMethod,
        integration_target: impl Into<String>,
    ) -> Self {
        RouteBinding {
            resource_path: resource_path.into(),
            method,
            kind: IntegrationKind::Lambda,
            integration_target: integration_target.into(),
            authorization: Authorization::None,
            method_options: MethodOptions::default(),
        }
    }

    /// Sets the authorization choice.
    pub fn with_authorization(mut self, authorization: Authorization) -> Self {
        self.authorization = authorization;
        self
    }

    /// Sets the method options.
    pub fn with_method_options(mut self, options: MethodOptions) -> Self {
        self.method_options = options;
        self
    }

    /// Checks invariants that the enum representation cannot express.
    pub fn validate(&self) -> RewriteResult<()> {
        if self.integration_target.trim().is_empty() {
            return Err(RewriteError::MissingIntegrationTarget {
                resource_path: self.resource_path.clone(),
                method: self.method.to_string(),
            });
        }
        Ok(())
    }
}

/// Legacy nested holder for the integration target.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationProps {
    /// Function ARN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lambda_arn: Option<String>,
}

/// Wire form of a route binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteBindingSpec {
    /// Resource path.
    pub resource_path: String,
    /// Method.
    pub method: HttpMethod,
    /// Backend kind, `lambda` when omitted.
    #[serde(default, rename = "integrationType")]
    pub integration_kind: IntegrationKind,
    /// Backend reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_target: Option<String>,
    /// Legacy location of the backend reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_props: Option<IntegrationProps>,
    /// Requests the pass-level default pool.
    #[serde(default)]
    pub use_default_authorizer: bool,
    /// Bare pool name.
    #[serde(default, alias = "cognitoUserPool", skip_serializing_if = "Option::is_none")]
    pub authorizer_pool_name: Option<String>,
    /// Fully-qualified pool reference.
    #[serde(default, alias = "cognitoUserPoolArn", skip_serializing_if = "Option::is_none")]
    pub authorizer_pool_ref: Option<String>,
    /// Method options.
    #[serde(default)]
    pub method_options: MethodOptions,
}

impl TryFrom<RouteBindingSpec> for RouteBinding {
    type Error = RewriteError;

    fn try_from(spec: RouteBindingSpec) -> RewriteResult<Self> {
        let resource_path = spec.resource_path;
        let method = spec.method.to_string();

        let pool = PoolRef::from_pair(spec.authorizer_pool_ref, spec.authorizer_pool_name, || {
            if spec.use_default_authorizer {
                RewriteError::AmbiguousAuthorizerConfig {
                    resource_path: resource_path.clone(),
                    method: method.clone(),
                }
            } else {
                RewriteError::AmbiguousIntegrationPool {
                    resource_path: resource_path.clone(),
                    method: method.clone(),
                }
            }
        })?;

        let authorization = match (spec.use_default_authorizer, pool) {
            (true, Some(_)) => {
                return Err(RewriteError::AmbiguousAuthorizerConfig {
                    resource_path,
                    method,
                })
            }
            (true, None) => Authorization::DefaultPool,
            (false, Some(pool)) => Authorization::Pool(pool),
            (false, None) => Authorization::None,
        };

        let integration_target = spec
            .integration_target
            .or_else(|| spec.integration_props.and_then(|p| p.lambda_arn))
            .unwrap_or_default();

        let binding = RouteBinding {
            resource_path,
            method: spec.method,
            kind: spec.integration_kind,
            integration_target,
            authorization,
            method_options: spec.method_options,
        };
        binding.validate()?;
        Ok(binding)
    }
}
