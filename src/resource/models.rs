//! Request and response shapes exchanged with the scheduler over stdin/stdout

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, Source};
use crate::resource::base_name;
use crate::storage::UploadOptions;
use crate::version::types::{MetadataPair, ObservedVersion, deserialize_optional_version};

/// Request read by `check`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CheckRequest {
    pub source: Source,
    #[serde(default, deserialize_with = "deserialize_optional_version")]
    pub version: Option<ObservedVersion>,
}

/// Versions newer than the request's, oldest first
pub type CheckResponse = Vec<ObservedVersion>;

/// Request read by `in`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct InRequest {
    pub source: Source,
    #[serde(default, deserialize_with = "deserialize_optional_version")]
    pub version: Option<ObservedVersion>,
    #[serde(default)]
    pub params: InParams,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct InParams {
    pub unpack: bool,
    pub skip_download: Option<SkipDownload>,
}

/// `params.skip_download` accepts a boolean or its string spelling
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SkipDownload {
    Flag(bool),
    Text(String),
}

impl InParams {
    /// Resolves `skip_download`, falling back to the source setting when unset
    pub fn skip_download(&self, fallback: bool) -> Result<bool, ConfigError> {
        match &self.skip_download {
            None => Ok(fallback),
            Some(SkipDownload::Flag(flag)) => Ok(*flag),
            Some(SkipDownload::Text(text)) if text.is_empty() => Ok(fallback),
            Some(SkipDownload::Text(text)) => {
                parse_bool(text).ok_or_else(|| ConfigError::InvalidSkipDownload(text.clone()))
            }
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Request read by `out`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutRequest {
    pub source: Source,
    #[serde(default)]
    pub params: OutParams,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutParams {
    /// Glob matched against files under the source directory
    pub file: String,
    pub predefined_acl: Option<String>,
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
}

impl OutParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.file.is_empty() {
            return Err(ConfigError::MissingFile);
        }
        Ok(())
    }

    pub fn upload_options(&self) -> UploadOptions {
        let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());

        UploadOptions {
            content_type: non_empty(&self.content_type),
            predefined_acl: non_empty(&self.predefined_acl),
            cache_control: non_empty(&self.cache_control),
        }
    }
}

/// Response written by `in` and `out`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VersionResponse {
    pub version: ObservedVersion,
    pub metadata: Vec<MetadataPair>,
}

/// Metadata describing an object: its file name and, when resolved, its URL
pub fn metadata(object_path: &str, url: Option<&str>) -> Vec<MetadataPair> {
    let mut metadata = vec![MetadataPair::new("filename", base_name(object_path))];

    if let Some(url) = url {
        metadata.push(MetadataPair::new("url", url));
    }

    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!({}), false, false)]
    #[case(json!({}), true, true)]
    #[case(json!({ "skip_download": true }), false, true)]
    #[case(json!({ "skip_download": false }), true, false)]
    #[case(json!({ "skip_download": "true" }), false, true)]
    #[case(json!({ "skip_download": "False" }), true, false)]
    #[case(json!({ "skip_download": "1" }), false, true)]
    #[case(json!({ "skip_download": "" }), true, true)]
    fn skip_download_resolves_with_fallback(
        #[case] params: serde_json::Value,
        #[case] fallback: bool,
        #[case] expected: bool,
    ) {
        let params: InParams = serde_json::from_value(params).unwrap();
        assert_eq!(params.skip_download(fallback).unwrap(), expected);
    }

    #[test]
    fn skip_download_rejects_unknown_text() {
        let params: InParams = serde_json::from_value(json!({ "skip_download": "maybe" })).unwrap();

        let err = params.skip_download(false).unwrap_err();
        assert_eq!(err.to_string(), "invalid skip_download value specified: maybe");
    }

    #[test]
    fn in_request_without_version_or_params() {
        let request: InRequest =
            serde_json::from_value(json!({ "source": { "bucket": "b", "regexp": "f-(.*)" } }))
                .unwrap();

        assert_eq!(request.version, None);
        assert_eq!(request.params, InParams::default());
    }

    #[test]
    fn out_params_require_file() {
        let params = OutParams::default();
        assert_eq!(params.validate().unwrap_err().to_string(), "please specify the file");
    }

    #[test]
    fn upload_options_drop_empty_values() {
        let params: OutParams = serde_json::from_value(json!({
            "file": "*.tgz",
            "content_type": "application/gzip",
            "predefined_acl": ""
        }))
        .unwrap();

        assert_eq!(
            params.upload_options(),
            UploadOptions {
                content_type: Some("application/gzip".into()),
                predefined_acl: None,
                cache_control: None,
            }
        );
    }

    #[test]
    fn metadata_includes_url_only_when_resolved() {
        assert_eq!(
            metadata("folder/file-1.0.tgz", Some("gs://b/folder/file-1.0.tgz")),
            vec![
                MetadataPair::new("filename", "file-1.0.tgz"),
                MetadataPair::new("url", "gs://b/folder/file-1.0.tgz"),
            ]
        );
        assert_eq!(
            metadata("version", None),
            vec![MetadataPair::new("filename", "version")]
        );
    }

    #[test]
    fn version_response_serializes_wire_shape() {
        let response = VersionResponse {
            version: ObservedVersion::Generation(12),
            metadata: metadata("folder/version", None),
        };

        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({
                "version": { "generation": "12" },
                "metadata": [{ "name": "filename", "value": "version" }]
            })
        );
    }
}
