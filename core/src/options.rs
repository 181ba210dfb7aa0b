#![deny(missing_docs)]

//! # Rewrite Options
//!
//! Everything a pass needs besides the document: the registered bindings, the
//! fallback binding, CORS defaults, the default identity pool and the gateway
//! context used to expand references.
//!
//! Options are an explicit value handed to each pass; nothing is shared
//! between passes.

use crate::binding::{PoolRef, RouteBinding, RouteBindingSpec};
use crate::cors::CorsDefaults;
use crate::error::{RewriteError, RewriteResult};
use serde::{Deserialize, Serialize};

/// Partition used when none is configured.
pub const DEFAULT_PARTITION: &str = "aws";

/// Region/account context used to build fully-qualified references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayContext {
    /// ARN partition.
    pub partition: String,
    /// Deployment region.
    pub region: Option<String>,
    /// Account id.
    pub account_id: Option<String>,
}

impl Default for GatewayContext {
    fn default() -> Self {
        GatewayContext {
            partition: DEFAULT_PARTITION.to_string(),
            region: None,
            account_id: None,
        }
    }
}

impl GatewayContext {
    /// Context for a region and account in the default partition.
    pub fn new(region: impl Into<String>, account_id: impl Into<String>) -> Self {
        GatewayContext {
            partition: DEFAULT_PARTITION.to_string(),
            region: Some(region.into()),
            account_id: Some(account_id.into()),
        }
    }
}

/// Validated options of one pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RewriteOptions {
    /// Bindings in registration order.
    pub bindings: Vec<RouteBinding>,
    /// Fallback used when no binding matches.
    pub default_binding: Option<RouteBinding>,
    /// Preflight defaults; no preflight is synthesized when `None`.
    pub cors: Option<CorsDefaults>,
    /// Pool used by bindings that request the default authorizer.
    pub default_pool: Option<PoolRef>,
    /// Region/account context.
    pub context: GatewayContext,
}

impl RewriteOptions {
    /// Options with the given bindings and context, and nothing else.
    pub fn new(bindings: Vec<RouteBinding>, context: GatewayContext) -> Self {
        RewriteOptions {
            bindings,
            context,
            ..RewriteOptions::default()
        }
    }

    /// Decodes options from a JSON property bag.
    pub fn from_json_str(raw: &str) -> RewriteResult<Self> {
        let spec: RewriteOptionsSpec =
            serde_json::from_str(raw).map_err(|e| RewriteError::InvalidConfig(e.to_string()))?;
        Self::try_from(spec)
    }

    /// Decodes options from a YAML property bag.
    pub fn from_yaml_str(raw: &str) -> RewriteResult<Self> {
        let spec: RewriteOptionsSpec =
            serde_yaml::from_str(raw).map_err(|e| RewriteError::InvalidConfig(e.to_string()))?;
        Self::try_from(spec)
    }
}

/// Wire form of the pass options.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteOptionsSpec {
    /// Registered bindings.
    #[serde(default)]
    pub api_integrations: Vec<RouteBindingSpec>,
    /// Fallback binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_api_integration: Option<RouteBindingSpec>,
    /// Preflight defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_cors_preflight_options: Option<CorsDefaults>,
    /// Default pool name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_cognito_user_pool: Option<String>,
    /// Default pool reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_cognito_user_pool_arn: Option<String>,
    /// ARN partition, `aws` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,
    /// Deployment region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Account id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

impl TryFrom<RewriteOptionsSpec> for RewriteOptions {
    type Error = RewriteError;

    fn try_from(spec: RewriteOptionsSpec) -> RewriteResult<Self> {
        let default_pool = PoolRef::from_pair(
            spec.default_cognito_user_pool_arn,
            spec.default_cognito_user_pool,
            || RewriteError::AmbiguousDefaultPool,
        )?;

        let bindings = spec
            .api_integrations
            .into_iter()
            .map(RouteBinding::try_from)
            .collect::<RewriteResult<Vec<_>>>()?;

        let default_binding = spec
            .default_api_integration
            .map(RouteBinding::try_from)
            .transpose()?;

        Ok(RewriteOptions {
            bindings,
            default_binding,
            cors: spec.default_cors_preflight_options,
            default_pool,
            context: GatewayContext {
                partition: spec
                    .partition
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(|| DEFAULT_PARTITION.to_string()),
                region: spec.region,
                account_id: spec.account_id,
            },
        })
    }
}
