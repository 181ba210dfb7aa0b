#![deny(missing_docs)]

//! # Authorizer Resolution
//!
//! Decides, per operation, whether a Cognito user-pool authorizer applies and
//! registers the backing security scheme in `components.securitySchemes`.
//!
//! Registration is keyed by the fully-qualified pool ARN: however many
//! operations share a pool, they all resolve to the same scheme name and the
//! scheme is written once.

use crate::binding::{Authorization, PoolRef, RouteBinding};
use crate::document::pointer_for;
use crate::error::{RewriteError, RewriteResult};
use crate::options::GatewayContext;
use indexmap::IndexMap;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Prefix of every security scheme registered by the rewriter.
pub const SCHEME_PREFIX: &str = "cognitoAuthorizer_";

/// Pool name used when none can be derived.
pub const PLACEHOLDER_POOL_NAME: &str = "default";

/// Operation-level security requirement key.
pub const SECURITY_KEY: &str = "security";

const AUTHORIZER_TYPE: &str = "cognito_user_pools";

/// Characters outside the OpenAPI component-key alphabet.
const INVALID_KEY_CHARS: &str = r"[^a-zA-Z0-9._-]";

/// Outcome of authorizer resolution for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    /// No security requirement is written.
    NoAuth,
    /// The operation is gated by the named security scheme.
    Resolved(String),
}

/// A pool ARN plus the human-readable name its scheme is named after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPool {
    /// Fully-qualified pool reference.
    pub arn: String,
    /// Name used in the scheme key.
    pub name: String,
}

impl PoolRef {
    /// Expands the reference into an ARN.
    pub fn qualify(&self, context: &GatewayContext) -> RewriteResult<String> {
        match self {
            PoolRef::Arn(arn) => Ok(arn.clone()),
            PoolRef::Name(name) => {
                let region = required(&context.region, "region")?;
                let account = required(&context.account_id, "accountId")?;
                Ok(format!(
                    "arn:{}:cognito-idp:{}:{}:userpool/{}",
                    context.partition, region, account, name
                ))
            }
        }
    }
}

fn required<'a>(field: &'a Option<String>, label: &str) -> RewriteResult<&'a str> {
    field
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| RewriteError::MissingContext(label.to_string()))
}

/// Trailing `/` segment of an ARN, if non-empty.
pub fn trailing_segment(arn: &str) -> Option<&str> {
    arn.rsplit('/').next().filter(|s| !s.is_empty())
}

/// Scheme key for a pool name.
pub fn scheme_name(pool_name: &str) -> String {
    static INVALID_RE: OnceLock<Regex> = OnceLock::new();
    let re = INVALID_RE
        .get_or_init(|| Regex::new(INVALID_KEY_CHARS).expect("Invalid regex constant"));
    format!("{}{}", SCHEME_PREFIX, re.replace_all(pool_name, "_"))
}

/// Picks the pool an operation must be gated by.
///
/// `binding` is `None` when the route fell back to the default integration;
/// such routes are never gated.
pub fn select_pool(
    binding: Option<&RouteBinding>,
    default_pool: Option<&PoolRef>,
    context: &GatewayContext,
) -> RewriteResult<Option<ResolvedPool>> {
    let Some(binding) = binding else {
        return Ok(None);
    };

    let (pool, from_default) = match (&binding.authorization, default_pool) {
        (Authorization::None, _) | (Authorization::DefaultPool, None) => return Ok(None),
        (Authorization::DefaultPool, Some(pool)) => (pool, true),
        (Authorization::Pool(pool), _) => (pool, false),
    };

    let arn = pool.qualify(context)?;
    let name = match pool {
        PoolRef::Name(name) => name.clone(),
        PoolRef::Arn(_) if from_default => PLACEHOLDER_POOL_NAME.to_string(),
        PoolRef::Arn(_) => trailing_segment(&arn)
            .unwrap_or(PLACEHOLDER_POOL_NAME)
            .to_string(),
    };
    Ok(Some(ResolvedPool { arn, name }))
}

/// Builds the security scheme for a pool ARN.
pub fn security_scheme(arn: &str) -> Value {
    json!({
        "type": "apiKey",
        "name": "Authorization",
        "in": "header",
        "x-amazon-apigateway-authtype": AUTHORIZER_TYPE,
        "x-amazon-apigateway-authorizer": {
            "type": AUTHORIZER_TYPE,
            "providerARNs": [arn],
        },
    })
}

/// Writes the operation's security requirement.
pub fn require(operation: &mut Map<String, Value>, scheme: &str, scopes: &[String]) {
    let mut requirement = Map::new();
    requirement.insert(scheme.to_string(), json!(scopes));
    operation.insert(SECURITY_KEY.to_string(), Value::Array(vec![Value::Object(requirement)]));
}

/// Per-pass table of authorizer registrations.
#[derive(Debug, Clone, Default)]
pub struct AuthorizerRegistry {
    /// Provider ARNs of schemes already present in the input document.
    existing: HashMap<String, Vec<String>>,
    /// ARN to scheme name, in first-registration order.
    by_arn: IndexMap<String, String>,
    /// Schemes to be written, name to ARN.
    created: IndexMap<String, String>,
}

impl AuthorizerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry aware of the schemes the document already declares.
    pub fn from_document(root: &Value) -> RewriteResult<Self> {
        let mut registry = Self::new();
        let Some(schemes) = security_schemes(root)? else {
            return Ok(registry);
        };
        for (name, scheme) in schemes {
            let arns: Vec<String> = scheme
                .pointer("/x-amazon-apigateway-authorizer/providerARNs")
                .and_then(Value::as_array)
                .map(|list| list.iter().filter_map(Value::as_str).map(String::from).collect())
                .unwrap_or_default();
            registry.existing.insert(name.clone(), arns);
        }
        Ok(registry)
    }

    /// Returns the scheme name for a pool, registering it on first use.
    pub fn register(&mut self, pool: &ResolvedPool) -> RewriteResult<String> {
        if let Some(name) = self.by_arn.get(&pool.arn) {
            return Ok(name.clone());
        }

        let name = scheme_name(&pool.name);
        let conflict = |existing: String| RewriteError::AuthorizerNameConflict {
            name: name.clone(),
            existing,
            requested: pool.arn.clone(),
        };

        if let Some(arns) = self.existing.get(&name) {
            if !arns.contains(&pool.arn) {
                return Err(conflict(if arns.is_empty() {
                    "<non-cognito scheme>".to_string()
                } else {
                    arns.join(",")
                }));
            }
        } else if let Some(other) = self.created.get(&name) {
            return Err(conflict(other.clone()));
        } else {
            self.created.insert(name.clone(), pool.arn.clone());
        }

        self.by_arn.insert(pool.arn.clone(), name.clone());
        Ok(name)
    }

    /// Resolves and registers the authorizer for one operation.
    pub fn authorize(
        &mut self,
        binding: Option<&RouteBinding>,
        default_pool: Option<&PoolRef>,
        context: &GatewayContext,
    ) -> RewriteResult<AuthDecision> {
        match select_pool(binding, default_pool, context)? {
            None => Ok(AuthDecision::NoAuth),
            Some(pool) => self.register(&pool).map(AuthDecision::Resolved),
        }
    }

    /// Names of the schemes this pass has to add, in registration order.
    pub fn created(&self) -> impl Iterator<Item = &str> {
        self.created.keys().map(String::as_str)
    }

    /// Adds the newly registered schemes to `components.securitySchemes`.
    pub fn write_into(&self, root: &mut Value) -> RewriteResult<()> {
        if self.created.is_empty() {
            return Ok(());
        }
        let root = root
            .as_object_mut()
            .ok_or_else(|| RewriteError::invalid_document("", "document root must be a mapping"))?;

        let components = child_mapping(root, "components", &["components"])?;
        let schemes = child_mapping(
            components,
            "securitySchemes",
            &["components", "securitySchemes"],
        )?;
        for (name, arn) in &self.created {
            schemes.insert(name.clone(), security_scheme(arn));
        }
        Ok(())
    }
}

fn security_schemes(root: &Value) -> RewriteResult<Option<&Map<String, Value>>> {
    let components = match root.get("components") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Object(components)) => components,
        Some(_) => {
            return Err(RewriteError::invalid_document(
                "/components",
                "components must be a mapping",
            ))
        }
    };
    match components.get("securitySchemes") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(schemes)) => Ok(Some(schemes)),
        Some(_) => Err(RewriteError::invalid_document(
            "/components/securitySchemes",
            "securitySchemes must be a mapping",
        )),
    }
}

fn child_mapping<'a>(
    parent: &'a mut Map<String, Value>,
    key: &str,
    pointer: &[&str],
) -> RewriteResult<&'a mut Map<String, Value>> {
    let slot = parent
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if slot.is_null() {
        *slot = Value::Object(Map::new());
    }
    slot.as_object_mut().ok_or_else(|| {
        RewriteError::invalid_document(pointer_for(pointer), format!("{} must be a mapping", key))
    })
}
