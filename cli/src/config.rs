#![deny(missing_docs)]

//! # Options Loading
//!
//! Reads the pass options file and layers the deployment context given on
//! the command line (or through the environment) on top of it.

use std::fs;
use std::path::Path;

use spec_rewrite_core::RewriteOptions;

use crate::error::CliResult;

/// Region and account overrides.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ContextArgs {
    /// Region used to expand integration URIs and bare pool names.
    #[clap(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Account used to expand bare pool names.
    #[clap(long, env = "AWS_ACCOUNT_ID")]
    pub account_id: Option<String>,
}

/// Loads options from `path`.
///
/// Files ending in `.json` are read as JSON, anything else as YAML.
/// Context values given in `overrides` replace those from the file.
pub fn load_options(path: &Path, overrides: &ContextArgs) -> CliResult<RewriteOptions> {
    let raw = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let mut options = if is_json {
        RewriteOptions::from_json_str(&raw)?
    } else {
        RewriteOptions::from_yaml_str(&raw)?
    };

    if let Some(region) = &overrides.region {
        options.context.region = Some(region.clone());
    }
    if let Some(account_id) = &overrides.account_id {
        options.context.account_id = Some(account_id.clone());
    }

    tracing::debug!(
        path = %path.display(),
        bindings = options.bindings.len(),
        default = options.default_binding.is_some(),
        cors = options.cors.is_some(),
        "loaded rewrite options"
    );
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_yaml_options_with_override() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("options.yaml");
        fs::write(
            &path,
            "apiIntegrations:\n  - resourcePath: /a\n    method: GET\n    integrationTarget: fn-a\nregion: eu-west-1\naccountId: '1'\n",
        )
        .unwrap();

        let overrides = ContextArgs {
            region: Some("us-east-1".into()),
            account_id: None,
        };
        let options = load_options(&path, &overrides).unwrap();
        assert_eq!(options.bindings.len(), 1);
        assert_eq!(options.context.region.as_deref(), Some("us-east-1"));
        assert_eq!(options.context.account_id.as_deref(), Some("1"));
    }

    #[test]
    fn test_json_options_by_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("options.JSON");
        fs::write(
            &path,
            r#"{"defaultApiIntegration": {"resourcePath": "*", "method": "ANY", "integrationTarget": "fn-mock"}}"#,
        )
        .unwrap();

        let options = load_options(&path, &ContextArgs::default()).unwrap();
        assert!(options.default_binding.is_some());
        assert!(options.bindings.is_empty());
    }

    #[test]
    fn test_invalid_options_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("options.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_options(&path, &ContextArgs::default()).unwrap_err();
        assert_eq!(err.reason(), "InvalidConfig");
    }

    #[test]
    fn test_missing_options_file() {
        let dir = tempdir().unwrap();
        let err = load_options(&dir.path().join("nope.yaml"), &ContextArgs::default()).unwrap_err();
        assert_eq!(err.reason(), "IoError");
    }
}
