//! Common types shared by the version layer and the resource commands

use serde::{Deserialize, Deserializer, Serialize};

/// A version as reported to and received from the scheduler.
///
/// On the wire this is `{"path": "..."}` in pattern mode and
/// `{"generation": "1234"}` in fixed-object mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "VersionFields", into = "VersionFields")]
pub enum ObservedVersion {
    Path(String),
    Generation(i64),
}

impl ObservedVersion {
    pub fn path(&self) -> Option<&str> {
        match self {
            ObservedVersion::Path(path) => Some(path),
            ObservedVersion::Generation(_) => None,
        }
    }

    pub fn generation(&self) -> Option<i64> {
        match self {
            ObservedVersion::Path(_) => None,
            ObservedVersion::Generation(generation) => Some(*generation),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct VersionFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    generation: Option<String>,
}

impl VersionFields {
    fn is_empty(&self) -> bool {
        self.path.as_deref().unwrap_or_default().is_empty()
            && self.generation.as_deref().unwrap_or_default().is_empty()
    }
}

impl TryFrom<VersionFields> for ObservedVersion {
    type Error = String;

    fn try_from(fields: VersionFields) -> Result<Self, Self::Error> {
        let path = fields.path.filter(|p| !p.is_empty());
        let generation = fields.generation.filter(|g| !g.is_empty());

        match (path, generation) {
            (Some(_), Some(_)) => Err("version must not set both path and generation".to_string()),
            (Some(path), None) => Ok(ObservedVersion::Path(path)),
            (None, Some(generation)) => generation
                .parse::<i64>()
                .map(ObservedVersion::Generation)
                .map_err(|e| format!("invalid generation '{}': {}", generation, e)),
            (None, None) => Err("version must set either path or generation".to_string()),
        }
    }
}

impl From<ObservedVersion> for VersionFields {
    fn from(version: ObservedVersion) -> Self {
        match version {
            ObservedVersion::Path(path) => VersionFields {
                path: Some(path),
                generation: None,
            },
            ObservedVersion::Generation(generation) => VersionFields {
                path: None,
                generation: Some(generation.to_string()),
            },
        }
    }
}

/// Deserialize an optional version where `null`, a missing field, and `{}` all
/// mean "no version".
pub(crate) fn deserialize_optional_version<'de, D>(
    deserializer: D,
) -> Result<Option<ObservedVersion>, D::Error>
where
    D: Deserializer<'de>,
{
    let fields = Option::<VersionFields>::deserialize(deserializer)?;
    match fields {
        None => Ok(None),
        Some(fields) if fields.is_empty() => Ok(None),
        Some(fields) => ObservedVersion::try_from(fields)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// A name/value pair describing a fetched or published artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataPair {
    pub name: String,
    pub value: String,
}

impl MetadataPair {
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
        }
    }
}
