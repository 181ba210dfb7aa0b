#![deny(missing_docs)]

//! # Error Handling
//!
//! Provides the `RewriteError` enum returned by every fallible operation of a
//! rewrite pass. Every variant is fatal for the pass it was raised in.

use derive_more::Display;

/// The Rewrite Error Enum.
///
/// Variants carry enough context (path, method, offending field) to be logged
/// verbatim by the caller.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum RewriteError {
    /// The input is neither a JSON nor a YAML mapping document.
    #[display("Unrecognized document format (json: {json}; yaml: {yaml})")]
    UnrecognizedFormat {
        /// Message of the JSON attempt.
        json: String,
        /// Message of the YAML attempt.
        yaml: String,
    },

    /// The input parses as both JSON and YAML, but into different documents.
    #[display("Ambiguous document format: JSON and YAML readings differ")]
    AmbiguousFormat,

    /// A region the merge has to walk is not a mapping.
    #[display("Invalid document at '{pointer}': {reason}")]
    InvalidDocument {
        /// JSON pointer of the offending node.
        pointer: String,
        /// What was expected.
        reason: String,
    },

    /// No binding and no default integration covers a route.
    #[display("No integration found for {path} {method}, and no default provided")]
    UnresolvedIntegration {
        /// Path as declared in the document.
        path: String,
        /// Method key as declared in the document.
        method: String,
    },

    /// A binding asks for the default authorizer and names its own pool.
    #[display(
        "Binding {method} {resource_path} cannot use the default authorizer AND specify a custom user pool"
    )]
    AmbiguousAuthorizerConfig {
        /// Resource path of the binding.
        resource_path: String,
        /// Method of the binding.
        method: String,
    },

    /// Both a default pool reference and a default pool name were supplied.
    #[display("Only one of defaultCognitoUserPoolArn or defaultCognitoUserPool may be provided")]
    AmbiguousDefaultPool,

    /// A binding supplies both a pool reference and a pool name.
    #[display(
        "Binding {method} {resource_path} must only provide a user pool ARN or a user pool name, not both"
    )]
    AmbiguousIntegrationPool {
        /// Resource path of the binding.
        resource_path: String,
        /// Method of the binding.
        method: String,
    },

    /// A binding was registered without an integration target.
    #[display("Binding {method} {resource_path} has no integration target")]
    MissingIntegrationTarget {
        /// Resource path of the binding.
        resource_path: String,
        /// Method of the binding.
        method: String,
    },

    /// A route was registered twice.
    #[display("A binding for {method} {resource_path} is already registered")]
    DuplicateBinding {
        /// Resource path of the binding.
        resource_path: String,
        /// Method of the binding.
        method: String,
    },

    /// The derived security scheme name is taken by a scheme for another pool.
    #[display("Security scheme '{name}' already points at '{existing}', cannot reuse it for '{requested}'")]
    AuthorizerNameConflict {
        /// Security scheme name.
        name: String,
        /// Pool reference of the existing scheme.
        existing: String,
        /// Pool reference of the new registration.
        requested: String,
    },

    /// Region or account context required by the pass was not supplied.
    #[display("Missing gateway context: {_0}")]
    MissingContext(String),

    /// Pass options could not be decoded.
    #[display("Invalid rewrite options: {_0}")]
    InvalidConfig(String),

    /// The rewritten tree could not be emitted in the detected format.
    #[display("Could not convert back to {format}: {reason}")]
    Serialization {
        /// Target format name.
        format: String,
        /// Underlying serializer message.
        reason: String,
    },
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for RewriteError {}

/// Helper type alias for Result using RewriteError.
pub type RewriteResult<T> = Result<T, RewriteError>;

impl RewriteError {
    /// Short machine-readable reason, stable across message wording changes.
    pub fn code(&self) -> &'static str {
        match self {
            RewriteError::UnrecognizedFormat { .. } => "UnrecognizedFormat",
            RewriteError::AmbiguousFormat => "AmbiguousFormat",
            RewriteError::InvalidDocument { .. } => "InvalidDocument",
            RewriteError::UnresolvedIntegration { .. } => "UnresolvedIntegration",
            RewriteError::AmbiguousAuthorizerConfig { .. } => "AmbiguousAuthorizerConfig",
            RewriteError::AmbiguousDefaultPool => "AmbiguousDefaultPool",
            RewriteError::AmbiguousIntegrationPool { .. } => "AmbiguousIntegrationPool",
            RewriteError::MissingIntegrationTarget { .. } => "MissingIntegrationTarget",
            RewriteError::DuplicateBinding { .. } => "DuplicateBinding",
            RewriteError::AuthorizerNameConflict { .. } => "AuthorizerNameConflict",
            RewriteError::MissingContext(_) => "MissingContext",
            RewriteError::InvalidConfig(_) => "InvalidConfig",
            RewriteError::Serialization { .. } => "SerializationError",
        }
    }

    pub(crate) fn invalid_document(pointer: impl Into<String>, reason: impl Into<String>) -> Self {
        RewriteError::InvalidDocument {
            pointer: pointer.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_display() {
        let err = RewriteError::UnresolvedIntegration {
            path: "/widgets".into(),
            method: "post".into(),
        };
        assert_eq!(
            format!("{}", err),
            "No integration found for /widgets post, and no default provided"
        );
        assert_eq!(err.code(), "UnresolvedIntegration");
    }

    #[test]
    fn test_serialization_code_matches_contract() {
        let err = RewriteError::Serialization {
            format: "yaml".into(),
            reason: "boom".into(),
        };
        assert_eq!(err.code(), "SerializationError");
        assert_eq!(format!("{}", err), "Could not convert back to yaml: boom");
    }
}
