#![deny(missing_docs)]

//! # CORS Preflight
//!
//! Synthesizes an `options` operation backed by a mock integration for paths
//! that do not declare one. The mock answers `204` and fills the
//! `Access-Control-*` headers from the pass-level [`CorsDefaults`].

use crate::binding::HttpMethod;
use crate::document::operation_method;
use crate::integration::{INTEGRATION_KEY, PASSTHROUGH_WHEN_NO_MATCH};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Status code returned by preflight responses.
pub const PREFLIGHT_STATUS: &str = "204";

/// Allow-headers value emitted unless configured headers are requested.
pub const CANONICAL_ALLOW_HEADERS: &str =
    "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token,X-Amz-User-Agent";

const RESPONSE_HEADERS: [&str; 5] = [
    "Access-Control-Allow-Origin",
    "Access-Control-Allow-Methods",
    "Access-Control-Allow-Credentials",
    "Vary",
    "Access-Control-Allow-Headers",
];

/// Where the `Access-Control-Allow-Headers` value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AllowHeadersSource {
    /// The fixed [`CANONICAL_ALLOW_HEADERS`] list.
    #[default]
    Canonical,
    /// `CorsDefaults::allow_headers`, joined with commas.
    Configured,
}

/// Cross-origin defaults applied to synthesized preflight operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CorsDefaults {
    /// Allowed origins, in declaration order.
    pub allow_origins: IndexSet<String>,
    /// Allowed request headers.
    pub allow_headers: Vec<String>,
    /// Allowed methods.
    pub allow_methods: Vec<String>,
    /// Whether credentials are allowed.
    pub allow_credentials: bool,
    /// Source of the allow-headers value.
    pub allow_headers_source: AllowHeadersSource,
}

impl Default for CorsDefaults {
    fn default() -> Self {
        CorsDefaults {
            allow_origins: IndexSet::from(["*".to_string()]),
            allow_headers: CANONICAL_ALLOW_HEADERS.split(',').map(String::from).collect(),
            allow_methods: ["GET", "POST", "OPTIONS", "DELETE"]
                .into_iter()
                .map(String::from)
                .collect(),
            allow_credentials: true,
            allow_headers_source: AllowHeadersSource::Canonical,
        }
    }
}

impl CorsDefaults {
    /// Defaults restricted to the given origins.
    pub fn for_origins<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CorsDefaults {
            allow_origins: origins.into_iter().map(Into::into).collect(),
            ..CorsDefaults::default()
        }
    }

    fn allow_headers_value(&self) -> String {
        match self.allow_headers_source {
            AllowHeadersSource::Canonical => CANONICAL_ALLOW_HEADERS.to_string(),
            AllowHeadersSource::Configured => self.allow_headers.join(","),
        }
    }

    /// Builds the preflight operation node.
    pub fn preflight_operation(&self) -> Value {
        let mut headers = Map::new();
        for name in RESPONSE_HEADERS {
            headers.insert(name.to_string(), json!({"schema": {"type": "string"}}));
        }

        let origins: Vec<&str> = self.allow_origins.iter().map(String::as_str).collect();

        let mut parameters = Map::new();
        parameters.insert(
            response_header("Access-Control-Allow-Credentials"),
            quoted(&self.allow_credentials.to_string()),
        );
        parameters.insert(
            response_header("Access-Control-Allow-Methods"),
            quoted(&self.allow_methods.join(",")),
        );
        parameters.insert(
            response_header("Access-Control-Allow-Headers"),
            quoted(&self.allow_headers_value()),
        );
        parameters.insert(
            response_header("Access-Control-Allow-Origin"),
            quoted(&origins.join(",")),
        );
        parameters.insert(response_header("Vary"), quoted("Origin"));

        json!({
            "responses": {
                PREFLIGHT_STATUS: {
                    "description": format!("{} response", PREFLIGHT_STATUS),
                    "headers": headers,
                }
            },
            INTEGRATION_KEY: {
                "responses": {
                    "default": {
                        "statusCode": PREFLIGHT_STATUS,
                        "responseParameters": parameters,
                    }
                },
                "requestTemplates": {
                    "application/json": "{ statusCode: 200 }"
                },
                "passthroughBehavior": PASSTHROUGH_WHEN_NO_MATCH,
                "type": "mock",
            }
        })
    }
}

/// Adds a preflight operation to the path item unless one is declared.
///
/// Returns whether an operation was added.
pub fn ensure_preflight(path_item: &mut Map<String, Value>, cors: &CorsDefaults) -> bool {
    let declared = path_item
        .keys()
        .any(|key| operation_method(key) == Some(HttpMethod::Options));
    if declared {
        return false;
    }
    path_item.insert("options".to_string(), cors.preflight_operation());
    true
}

fn response_header(name: &str) -> String {
    format!("method.response.header.{}", name)
}

fn quoted(value: &str) -> Value {
    Value::String(format!("'{}'", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parameter<'a>(op: &'a Value, header: &str) -> &'a str {
        op[INTEGRATION_KEY]["responses"]["default"]["responseParameters"]
            [response_header(header).as_str()]
        .as_str()
        .unwrap()
    }

    #[test]
    fn test_preflight_values_from_defaults() {
        let cors = CorsDefaults {
            allow_origins: IndexSet::from(["https://a.example".into(), "https://b.example".into()]),
            allow_methods: vec!["GET".into(), "PUT".into()],
            allow_credentials: false,
            ..CorsDefaults::default()
        };
        let op = cors.preflight_operation();

        assert_eq!(parameter(&op, "Access-Control-Allow-Methods"), "'GET,PUT'");
        assert_eq!(
            parameter(&op, "Access-Control-Allow-Origin"),
            "'https://a.example,https://b.example'"
        );
        assert_eq!(parameter(&op, "Access-Control-Allow-Credentials"), "'false'");
        assert_eq!(parameter(&op, "Vary"), "'Origin'");
        assert_eq!(op[INTEGRATION_KEY]["type"], "mock");
        assert_eq!(op[INTEGRATION_KEY]["responses"]["default"]["statusCode"], "204");
        assert_eq!(op["responses"]["204"]["description"], "204 response");
    }

    #[test]
    fn test_response_headers_order() {
        let op = CorsDefaults::default().preflight_operation();
        let names: Vec<&String> = op["responses"]["204"]["headers"]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert_eq!(names, RESPONSE_HEADERS.to_vec());
    }

    #[test]
    fn test_allow_headers_canonical_by_default() {
        let cors = CorsDefaults {
            allow_headers: vec!["X-Custom".into()],
            ..CorsDefaults::default()
        };
        let op = cors.preflight_operation();
        assert_eq!(
            parameter(&op, "Access-Control-Allow-Headers"),
            format!("'{}'", CANONICAL_ALLOW_HEADERS)
        );
    }

    #[test]
    fn test_allow_headers_configured() {
        let cors = CorsDefaults {
            allow_headers: vec!["X-Custom".into(), "Authorization".into()],
            allow_headers_source: AllowHeadersSource::Configured,
            ..CorsDefaults::default()
        };
        let op = cors.preflight_operation();
        assert_eq!(
            parameter(&op, "Access-Control-Allow-Headers"),
            "'X-Custom,Authorization'"
        );
    }

    #[test]
    fn test_ensure_preflight_respects_existing() {
        let mut item = json!({"OPTIONS": {"summary": "mine"}, "get": {}});
        let added = ensure_preflight(item.as_object_mut().unwrap(), &CorsDefaults::default());
        assert!(!added);
        assert_eq!(item, json!({"OPTIONS": {"summary": "mine"}, "get": {}}));
    }

    #[test]
    fn test_ensure_preflight_adds_once() {
        let mut item = json!({"get": {}});
        let cors = CorsDefaults::default();
        assert!(ensure_preflight(item.as_object_mut().unwrap(), &cors));
        assert!(!ensure_preflight(item.as_object_mut().unwrap(), &cors));
        assert_eq!(item.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_decodes_historical_shape() {
        let cors: CorsDefaults = serde_json::from_value(json!({
            "allowOrigins": ["http://localhost:4200", "http://localhost:4200"],
            "allowMethods": ["GET"],
            "allowCredentials": true
        }))
        .unwrap();
        assert_eq!(cors.allow_origins.len(), 1);
        assert_eq!(cors.allow_headers_source, AllowHeadersSource::Canonical);
        assert_eq!(cors.allow_headers, CorsDefaults::default().allow_headers);
    }
}
