#![deny(missing_docs)]

//! # Route Resolution
//!
//! Decides which binding serves a `(path, method)` pair of the document.
//!
//! Paths are compared after lower-casing and trimming one leading and one
//! trailing `/`; methods are compared case-insensitively. The first matching
//! Lambda binding in registration order wins, then the default binding's
//! target, otherwise the route is unresolved.

use crate::binding::{HttpMethod, IntegrationKind, RouteBinding};
use crate::error::{RewriteError, RewriteResult};

/// Outcome of resolving one route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// A registered binding matched.
    Binding(&'a RouteBinding),
    /// No binding matched; the default binding's target applies.
    Default(&'a str),
}

impl<'a> Resolution<'a> {
    /// Integration target selected for the route.
    pub fn target(&self) -> &'a str {
        match *self {
            Resolution::Binding(binding) => &binding.integration_target,
            Resolution::Default(target) => target,
        }
    }

    /// The matched binding, `None` for a fallback.
    pub fn binding(&self) -> Option<&'a RouteBinding> {
        match *self {
            Resolution::Binding(binding) => Some(binding),
            Resolution::Default(_) => None,
        }
    }
}

/// Lower-cases a path and trims a single leading and trailing separator.
pub fn normalize_path(path: &str) -> String {
    let lowered = path.to_lowercase();
    let trimmed = lowered.strip_prefix('/').unwrap_or(&lowered);
    trimmed.strip_suffix('/').unwrap_or(trimmed).to_string()
}

/// Matches document routes against registered bindings.
#[derive(Debug, Clone)]
pub struct RouteResolver<'a> {
    bindings: Vec<(String, &'a RouteBinding)>,
    default_target: Option<&'a str>,
}

impl<'a> RouteResolver<'a> {
    /// Builds a resolver; the default binding only contributes its target,
    /// and only if it is of the supported kind.
    pub fn new(bindings: &'a [RouteBinding], default_binding: Option<&'a RouteBinding>) -> Self {
        RouteResolver {
            bindings: bindings
                .iter()
                .filter(|b| b.kind == IntegrationKind::Lambda)
                .map(|b| (normalize_path(&b.resource_path), b))
                .collect(),
            default_target: default_binding
                .filter(|b| b.kind == IntegrationKind::Lambda)
                .map(|b| b.integration_target.as_str())
                .filter(|t| !t.is_empty()),
        }
    }

    /// Finds the binding registered for a route, ignoring the default.
    pub fn find(&self, path: &str, method: HttpMethod) -> Option<&'a RouteBinding> {
        let wanted = normalize_path(path);
        self.bindings
            .iter()
            .find(|(normalized, binding)| *normalized == wanted && binding.method == method)
            .map(|(_, binding)| *binding)
    }

    /// Resolves a route, falling back to the default target.
    ///
    /// `method_key` is the key as declared in the document and is only used
    /// for error reporting.
    pub fn resolve(
        &self,
        path: &str,
        method_key: &str,
        method: HttpMethod,
    ) -> RewriteResult<Resolution<'a>> {
        if let Some(binding) = self.find(path, method) {
            return Ok(Resolution::Binding(binding));
        }
        self.default_target
            .map(Resolution::Default)
            .ok_or_else(|| RewriteError::UnresolvedIntegration {
                path: path.to_string(),
                method: method_key.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/Widgets/"), "widgets");
        assert_eq!(normalize_path("Widgets/"), "widgets");
        assert_eq!(normalize_path("/a/{Id}"), "a/{id}");
        assert_eq!(normalize_path("//a//"), "/a/");
        assert_eq!(normalize_path("/"), "");
    }

    #[test]
    fn test_matches_case_and_slashes() {
        let bindings = vec![RouteBinding::new("Widgets/", HttpMethod::Get, "fn-123")];
        let resolver = RouteResolver::new(&bindings, None);
        let res = resolver.resolve("/widgets", "get", HttpMethod::Get).unwrap();
        assert_eq!(res.target(), "fn-123");
        assert!(res.binding().is_some());
    }

    #[test]
    fn test_method_must_match() {
        let bindings = vec![RouteBinding::new("/widgets", HttpMethod::Get, "fn-123")];
        let resolver = RouteResolver::new(&bindings, None);
        let err = resolver
            .resolve("/widgets", "POST", HttpMethod::Post)
            .unwrap_err();
        assert_eq!(
            err,
            RewriteError::UnresolvedIntegration {
                path: "/widgets".into(),
                method: "POST".into()
            }
        );
    }

    #[test]
    fn test_first_registered_wins() {
        let bindings = vec![
            RouteBinding::new("/a", HttpMethod::Get, "first"),
            RouteBinding::new("a/", HttpMethod::Get, "second"),
        ];
        let resolver = RouteResolver::new(&bindings, None);
        assert_eq!(resolver.resolve("/a", "get", HttpMethod::Get).unwrap().target(), "first");
    }

    #[test]
    fn test_unsupported_kind_is_skipped() {
        let mut http = RouteBinding::new("/a", HttpMethod::Get, "https://backend");
        http.kind = IntegrationKind::Unsupported;
        let bindings = vec![http, RouteBinding::new("/a", HttpMethod::Get, "fn")];
        let resolver = RouteResolver::new(&bindings, None);
        assert_eq!(resolver.resolve("/a", "get", HttpMethod::Get).unwrap().target(), "fn");
    }

    #[test]
    fn test_falls_back_to_default() {
        let fallback = RouteBinding::new("*", HttpMethod::Any, "fn-mock");
        let resolver = RouteResolver::new(&[], Some(&fallback));
        let res = resolver.resolve("/x", "delete", HttpMethod::Delete).unwrap();
        assert_eq!(res, Resolution::Default("fn-mock"));
        assert!(res.binding().is_none());
    }

    #[test]
    fn test_any_binding_only_matches_any_operation() {
        let bindings = vec![RouteBinding::new("/proxy", HttpMethod::Any, "fn")];
        let resolver = RouteResolver::new(&bindings, None);
        assert!(resolver.find("/proxy", HttpMethod::Get).is_none());
        assert!(resolver.find("/proxy", HttpMethod::Any).is_some());
    }
}
