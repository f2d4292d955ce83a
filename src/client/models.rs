//! Wire payloads and the polymorphic result decoder.
//!
//! Script payloads come in two shapes (V1 and V2) with no discriminator on
//! the wire. [`ScriptResult`] keeps the decoded JSON and the caller picks
//! the shape: the accessor it calls is authoritative. A payload that
//! carries only the shared fields (`id`, `title`) decodes as either
//! variant, with the variant-specific fields left `None`.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ClientError;

/* ---- Script variants ---- */

/// Creator block of a V1 script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptCreator {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Creator / editor block of a V2 script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptCreatedBy {
    pub id: Option<i64>,
    pub name: Option<String>,
}

/// Attachment descriptor of a V2 script. V1 scripts list bare filenames.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptAttachment {
    pub id: Option<i64>,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptV1 {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<ScriptCreator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptV2 {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<ScriptCreatedBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<ScriptAttachment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited_by: Option<ScriptCreatedBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_group: Option<String>,
}

/// Script format version. Used both as the `script_type` parameter of
/// `CreateScript` and as the caller's hint when decoding a [`ScriptResult`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ScriptType {
    #[default]
    V1,
    V2,
}

impl ScriptType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptType::V1 => "V1",
            ScriptType::V2 => "V2",
        }
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScriptType {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "V1" | "1" => Ok(ScriptType::V1),
            "V2" | "2" => Ok(ScriptType::V2),
            other => Err(ClientError::Validation(format!(
                "unknown script type '{other}' (expected V1 or V2)"
            ))),
        }
    }
}

/// A script decoded into the shape chosen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Script {
    V1(ScriptV1),
    V2(ScriptV2),
}

impl Script {
    pub fn id(&self) -> i64 {
        match self {
            Script::V1(s) => s.id,
            Script::V2(s) => s.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Script::V1(s) => &s.title,
            Script::V2(s) => &s.title,
        }
    }

    pub fn script_type(&self) -> ScriptType {
        match self {
            Script::V1(_) => ScriptType::V1,
            Script::V2(_) => ScriptType::V2,
        }
    }

    /// Attachment filenames, whatever the shape they were listed in.
    pub fn attachment_names(&self) -> Vec<String> {
        match self {
            Script::V1(s) => s.attachments.clone().unwrap_or_default(),
            Script::V2(s) => s
                .attachments
                .iter()
                .flatten()
                .filter_map(|a| a.filename.clone())
                .collect(),
        }
    }
}

/* ---- Polymorphic payloads ---- */

/// A script payload whose version is not known until the caller asks.
///
/// Always a JSON object; anything else fails to deserialize.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScriptResult(Value);

impl ScriptResult {
    /// Parse raw response bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ClientError> {
        serde_json::from_slice(bytes).map_err(|source| ClientError::Variant {
            expected: "script object",
            source,
        })
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn as_v1(&self) -> Result<ScriptV1, ClientError> {
        ScriptV1::deserialize(&self.0).map_err(|source| ClientError::Variant {
            expected: "V1 script",
            source,
        })
    }

    pub fn as_v2(&self) -> Result<ScriptV2, ClientError> {
        ScriptV2::deserialize(&self.0).map_err(|source| ClientError::Variant {
            expected: "V2 script",
            source,
        })
    }

    /// Decode with a caller-supplied version hint.
    pub fn decode(&self, kind: ScriptType) -> Result<Script, ClientError> {
        match kind {
            ScriptType::V1 => self.as_v1().map(Script::V1),
            ScriptType::V2 => self.as_v2().map(Script::V2),
        }
    }
}

impl<'de> Deserialize<'de> for ScriptResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if !value.is_object() {
            return Err(de::Error::invalid_type(
                unexpected(&value),
                &"a script object",
            ));
        }
        Ok(ScriptResult(value))
    }
}

/// Success payload of a legacy action: a script object for the script
/// actions, a bare filename string for `CreateScriptAttachment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LegacyActionResult(Value);

impl LegacyActionResult {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ClientError> {
        serde_json::from_slice(bytes).map_err(|source| ClientError::Variant {
            expected: "JSON document",
            source,
        })
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn as_script_result(&self) -> Result<ScriptResult, ClientError> {
        ScriptResult::deserialize(&self.0).map_err(|source| ClientError::Variant {
            expected: "script object",
            source,
        })
    }

    /// Interpret the payload as the filename returned by
    /// `CreateScriptAttachment`.
    pub fn as_attachment(&self) -> Result<String, ClientError> {
        String::deserialize(&self.0).map_err(|source| ClientError::Variant {
            expected: "attachment filename",
            source,
        })
    }
}

/// Body of a 404 (and other error) response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn unexpected(value: &Value) -> de::Unexpected<'_> {
    match value {
        Value::Null => de::Unexpected::Unit,
        Value::Bool(b) => de::Unexpected::Bool(*b),
        Value::Number(_) => de::Unexpected::Other("number"),
        Value::String(s) => de::Unexpected::Str(s),
        Value::Array(_) => de::Unexpected::Seq,
        Value::Object(_) => de::Unexpected::Map,
    }
}
