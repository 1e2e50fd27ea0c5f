//! Error types for tag parsing.

use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// A role, department or permission tag that is not part of the closed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} tag: {tag}")]
pub struct UnknownTag {
    /// Which category the tag was parsed as.
    pub kind: &'static str,
    /// The rejected tag.
    pub tag: String,
}

impl UnknownTag {
    pub(crate) fn new(kind: &'static str, tag: &str) -> Self {
        Self {
            kind,
            tag: tag.to_string(),
        }
    }
}

/// Deserialize a tag through its `FromStr` impl, so the wire accepts exactly
/// what `parse` accepts.
pub(crate) fn deserialize_tag<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = UnknownTag>,
{
    let tag = String::deserialize(deserializer)?;
    tag.parse().map_err(serde::de::Error::custom)
}
