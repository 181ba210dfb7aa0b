#![deny(missing_docs)]

//! # Document Loading
//!
//! Detects whether a raw specification is JSON or YAML, decodes it into an
//! order-preserving `serde_json::Value`, and emits the rewritten tree back in
//! the same format.

use crate::binding::HttpMethod;
use crate::error::{RewriteError, RewriteResult};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Path-item key API Gateway uses for the catch-all method.
pub const ANY_METHOD_KEY: &str = "x-amazon-apigateway-any-method";

/// Serialization format of a specification document.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// Structured text (JSON).
    #[display("json")]
    Json,
    /// Block text (YAML).
    #[display("yaml")]
    Yaml,
}

impl FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(DocumentFormat::Json),
            "yaml" | "yml" => Ok(DocumentFormat::Yaml),
            other => Err(format!("unknown document format '{}'", other)),
        }
    }
}

/// A single operation found under `paths`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRef {
    /// Path key, as declared.
    pub path: String,
    /// Method key, as declared (e.g. `get`, `x-amazon-apigateway-any-method`).
    pub key: String,
    /// Method the key stands for.
    pub method: HttpMethod,
}

/// Parses raw bytes, detecting the format.
///
/// Both readings are attempted independently. A reading only counts if it
/// yields a mapping at the root. When both succeed the trees must agree
/// (every JSON text is also YAML), and the input is reported as JSON.
pub fn parse(raw: &[u8]) -> RewriteResult<(Value, DocumentFormat)> {
    let json = parse_json(raw);
    let yaml = parse_yaml(raw);

    match (json, yaml) {
        (Ok(from_json), Ok(from_yaml)) => {
            if readings_agree(&from_json, &from_yaml) {
                Ok((from_json, DocumentFormat::Json))
            } else {
                Err(RewriteError::AmbiguousFormat)
            }
        }
        (Ok(from_json), Err(_)) => Ok((from_json, DocumentFormat::Json)),
        (Err(_), Ok(from_yaml)) => Ok((from_yaml, DocumentFormat::Yaml)),
        (Err(json), Err(yaml)) => Err(RewriteError::UnrecognizedFormat { json, yaml }),
    }
}

/// Parses raw bytes in an explicitly requested format.
pub fn parse_as(raw: &[u8], format: DocumentFormat) -> RewriteResult<Value> {
    let attempt = match format {
        DocumentFormat::Json => parse_json(raw),
        DocumentFormat::Yaml => parse_yaml(raw),
    };
    attempt.map_err(|message| match format {
        DocumentFormat::Json => RewriteError::UnrecognizedFormat {
            json: message,
            yaml: "not attempted".into(),
        },
        DocumentFormat::Yaml => RewriteError::UnrecognizedFormat {
            json: "not attempted".into(),
            yaml: message,
        },
    })
}

/// Serializes a tree into the given format.
pub fn serialize(tree: &Value, format: DocumentFormat) -> RewriteResult<Vec<u8>> {
    let fail = |reason: String| RewriteError::Serialization {
        format: format.to_string(),
        reason,
    };
    match format {
        DocumentFormat::Json => {
            let mut bytes = serde_json::to_vec_pretty(tree).map_err(|e| fail(e.to_string()))?;
            bytes.push(b'\n');
            Ok(bytes)
        }
        DocumentFormat::Yaml => serde_yaml::to_string(tree)
            .map(String::into_bytes)
            .map_err(|e| fail(e.to_string())),
    }
}

/// Maps a path-item key to the method it declares, if it is an operation.
pub fn operation_method(key: &str) -> Option<HttpMethod> {
    if key.eq_ignore_ascii_case(ANY_METHOD_KEY) {
        return Some(HttpMethod::Any);
    }
    match key.parse::<HttpMethod>() {
        Ok(HttpMethod::Any) | Err(_) => None,
        Ok(method) => Some(method),
    }
}

/// Lists every operation of the document in path/method order.
pub fn operations(tree: &Value) -> RewriteResult<Vec<OperationRef>> {
    let Some(paths) = paths_of(tree)? else {
        return Ok(Vec::new());
    };

    let mut out = Vec::new();
    for (path, item) in paths {
        let item = item.as_object().ok_or_else(|| {
            RewriteError::invalid_document(
                pointer_for(&["paths", path.as_str()]),
                "path item must be a mapping",
            )
        })?;
        for key in item.keys() {
            if let Some(method) = operation_method(key) {
                out.push(OperationRef {
                    path: path.clone(),
                    key: key.clone(),
                    method,
                });
            }
        }
    }
    Ok(out)
}

/// Returns the `paths` mapping, `None` when the document declares none.
pub(crate) fn paths_of(tree: &Value) -> RewriteResult<Option<&serde_json::Map<String, Value>>> {
    match tree.get("paths") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(paths)) => Ok(Some(paths)),
        Some(_) => Err(RewriteError::invalid_document("/paths", "paths must be a mapping")),
    }
}

/// Builds an RFC 6901 pointer from raw segments.
pub(crate) fn pointer_for(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|s| format!("/{}", s.replace('~', "~0").replace('/', "~1")))
        .collect()
}

fn parse_json(raw: &[u8]) -> Result<Value, String> {
    let value: Value = serde_json::from_slice(raw).map_err(|e| e.to_string())?;
    require_mapping(value)
}

/// YAML is read into its own value model first so that `<<` merge keys are
/// applied before the tree is handed to the pass.
fn parse_yaml(raw: &[u8]) -> Result<Value, String> {
    let mut value: serde_yaml::Value = serde_yaml::from_slice(raw).map_err(|e| e.to_string())?;
    value.apply_merge().map_err(|e| e.to_string())?;
    let value = serde_json::to_value(value).map_err(|e| e.to_string())?;
    require_mapping(value)
}

/// Structural equality where numbers compare by value, so `-0` read as a
/// float on one side and an integer on the other still agree.
fn readings_agree(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y || x.as_f64() == y.as_f64(),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| readings_agree(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, l)| y.get(k).is_some_and(|r| readings_agree(l, r)))
        }
        _ => a == b,
    }
}

fn require_mapping(value: Value) -> Result<Value, String> {
    if value.is_object() {
        Ok(value)
    } else {
        Err("document root is not a mapping".to_string())
    }
}
