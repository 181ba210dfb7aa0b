#![deny(missing_docs)]

//! # Binding Registrar
//!
//! Collects route bindings before a pass. The registrar is the caller-side
//! guarantee the resolver relies on: every binding has a target and no
//! route is registered twice.

use crate::binding::{Authorization, HttpMethod, MethodOptions, RouteBinding};
use crate::error::{RewriteError, RewriteResult};
use crate::resolver::normalize_path;
use std::collections::HashSet;

/// Scope required by authorized bindings registered without method options.
pub const DEFAULT_SCOPE: &str = "openid";

/// Ordered, duplicate-free collection of route bindings.
#[derive(Debug, Clone, Default)]
pub struct Registrar {
    bindings: Vec<RouteBinding>,
    routes: HashSet<(String, HttpMethod)>,
}

impl Registrar {
    /// Creates an empty registrar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a Lambda function gated by the default authorizer.
    ///
    /// Without explicit options the binding requires the `openid` scope.
    pub fn register_lambda(
        &mut self,
        resource_path: &str,
        method: HttpMethod,
        target: &str,
        options: Option<MethodOptions>,
    ) -> RewriteResult<&RouteBinding> {
        let binding = RouteBinding::new(resource_path, method, target)
            .with_authorization(Authorization::DefaultPool)
            .with_method_options(
                options.unwrap_or_else(|| MethodOptions::with_scopes([DEFAULT_SCOPE])),
            );
        self.register(binding)
    }

    /// Registers a Lambda function reachable without authorization.
    pub fn register_anonymous_lambda(
        &mut self,
        resource_path: &str,
        method: HttpMethod,
        target: &str,
        options: Option<MethodOptions>,
    ) -> RewriteResult<&RouteBinding> {
        let binding = RouteBinding::new(resource_path, method, target)
            .with_method_options(options.unwrap_or_default());
        self.register(binding)
    }

    /// Registers an arbitrary binding.
    pub fn register(&mut self, binding: RouteBinding) -> RewriteResult<&RouteBinding> {
        binding.validate()?;

        let key = (normalize_path(&binding.resource_path), binding.method);
        if self.routes.contains(&key) {
            return Err(RewriteError::DuplicateBinding {
                resource_path: binding.resource_path,
                method: binding.method.to_string(),
            });
        }
        self.routes.insert(key);

        tracing::debug!(
            path = %binding.resource_path,
            method = %binding.method,
            target = %binding.integration_target,
            "registered route binding"
        );
        self.bindings.push(binding);
        Ok(&self.bindings[self.bindings.len() - 1])
    }

    /// Registered bindings, in registration order.
    pub fn bindings(&self) -> &[RouteBinding] {
        &self.bindings
    }

    /// Number of registered bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Consumes the registrar, yielding the bindings in registration order.
    pub fn into_bindings(self) -> Vec<RouteBinding> {
        self.bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::PoolRef;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_register_lambda_defaults() {
        let mut registrar = Registrar::new();
        let binding = registrar
            .register_lambda("/widgets", HttpMethod::Get, "fn-1", None)
            .unwrap();
        assert_eq!(binding.authorization, Authorization::DefaultPool);
        assert_eq!(binding.method_options.scopes(), [DEFAULT_SCOPE.to_string()]);
    }

    #[test]
    fn test_register_anonymous_defaults() {
        let mut registrar = Registrar::new();
        let binding = registrar
            .register_anonymous_lambda("/health", HttpMethod::Get, "fn-2", None)
            .unwrap();
        assert_eq!(binding.authorization, Authorization::None);
        assert!(binding.method_options.scopes().is_empty());
    }

    #[test]
    fn test_explicit_options_win() {
        let mut registrar = Registrar::new();
        let binding = registrar
            .register_lambda(
                "/widgets",
                HttpMethod::Post,
                "fn-1",
                Some(MethodOptions::with_scopes(["widgets/write"])),
            )
            .unwrap();
        assert_eq!(binding.method_options.scopes(), ["widgets/write".to_string()]);
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let mut registrar = Registrar::new();
        registrar
            .register_lambda("/widgets", HttpMethod::Get, "fn-1", None)
            .unwrap();
        let err = registrar
            .register_anonymous_lambda("Widgets/", HttpMethod::Get, "fn-2", None)
            .unwrap_err();
        assert_eq!(
            err,
            RewriteError::DuplicateBinding {
                resource_path: "Widgets/".into(),
                method: "GET".into()
            }
        );
        // Same path, other method is fine.
        registrar
            .register_anonymous_lambda("Widgets/", HttpMethod::Put, "fn-2", None)
            .unwrap();
        assert_eq!(registrar.len(), 2);
    }

    #[test]
    fn test_empty_target_rejected() {
        let mut registrar = Registrar::new();
        let err = registrar
            .register(RouteBinding::new("/a", HttpMethod::Get, " "))
            .unwrap_err();
        assert_eq!(err.code(), "MissingIntegrationTarget");
        assert!(registrar.is_empty());
    }

    #[test]
    fn test_into_bindings_keeps_order() {
        let mut registrar = Registrar::new();
        registrar
            .register(
                RouteBinding::new("/b", HttpMethod::Get, "fn-b")
                    .with_authorization(Authorization::Pool(PoolRef::Name("p".into()))),
            )
            .unwrap();
        registrar
            .register_anonymous_lambda("/a", HttpMethod::Get, "fn-a", None)
            .unwrap();
        let targets: Vec<String> = registrar
            .into_bindings()
            .into_iter()
            .map(|b| b.integration_target)
            .collect();
        assert_eq!(targets, vec!["fn-b", "fn-a"]);
    }
}
