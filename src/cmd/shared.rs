/*!
shared.rs - helpers used by every subcommand.

Focus:
  - Globals: connection flags resolved against the environment
  - build_client / runtime
  - parameter parsing: parse_key_value, parse_script_id, load_param_file_into_map
  - payload encoding: encode_code, read_code, attachment_value
*/

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use landscape_api::client::{BearerToken, Client, ClientOptions, QueryValues, StaticHeader};

use crate::utils::env_non_empty;

pub const BASE_URL_ENV: &str = "LANDSCAPE_BASE_URL";
pub const TOKEN_ENV: &str = "LANDSCAPE_API_TOKEN";

/// Separator between file name and base64 content in attachment values.
pub const ATTACHMENT_SEPARATOR: &str = "$$";

/* ---- Global Options ---- */

/// Connection and output flags shared by all subcommands.
#[derive(Debug, Clone, Default)]
pub struct Globals {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub headers: Vec<String>,
    pub timeout: Option<u64>,
    pub json: bool,
}

impl Globals {
    /// Flag first, then `LANDSCAPE_BASE_URL`.
    pub fn resolve_base_url(&self) -> Result<String> {
        self.base_url
            .clone()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| env_non_empty(BASE_URL_ENV))
            .ok_or_else(|| {
                anyhow::anyhow!("no base URL specified (use --base-url or {BASE_URL_ENV})")
            })
    }

    /// Flag first, then `LANDSCAPE_API_TOKEN`. A missing token is not an error:
    /// credentials may come from `--header`.
    pub fn resolve_token(&self) -> Option<String> {
        self.token
            .clone()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| env_non_empty(TOKEN_ENV))
    }
}

/* ---- Client / Runtime ---- */

pub fn build_client(globals: &Globals) -> Result<Client> {
    let base_url = globals.resolve_base_url()?;
    let mut options = ClientOptions::default();

    if let Some(token) = globals.resolve_token() {
        options = options.with_request_editor(BearerToken::new(&token)?);
    } else {
        tracing::debug!("no API token configured; requests are sent without bearer auth");
    }
    for raw in &globals.headers {
        let (name, value) = parse_key_value(raw).context("invalid --header")?;
        options = options.with_request_editor(StaticHeader::new(&name, &value)?);
    }
    if let Some(secs) = globals.timeout {
        options = options.with_timeout(Duration::from_secs(secs));
    }

    let client = Client::new(&base_url, options)
        .with_context(|| format!("failed to create client for '{base_url}'"))?;
    tracing::debug!(base_url = %client.base_url(), "client ready");
    Ok(client)
}

/// Commands are synchronous; each one drives its requests on a fresh runtime.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")
}

/* ---- Parameter Parsing ---- */

/// Split `KEY=VALUE`. The key is trimmed and must be non-empty; the value is
/// kept verbatim (it may itself contain `=`).
pub fn parse_key_value(raw: &str) -> Result<(String, String)> {
    let Some((k, v)) = raw.split_once('=') else {
        anyhow::bail!("expected KEY=VALUE, got '{raw}'");
    };
    let key = k.trim();
    if key.is_empty() {
        anyhow::bail!("empty key in '{raw}'");
    }
    Ok((key.to_string(), v.to_string()))
}

/// clap value parser for script and attachment ids.
pub fn parse_script_id(raw: &str) -> std::result::Result<i64, String> {
    raw.trim()
        .parse::<i64>()
        .map_err(|e| format!("'{raw}' is not a numeric id: {e}"))
}

/// Collect `--param` pairs, then fill in entries from `--param-file` that the
/// command line did not already set.
pub fn collect_params(params: &[String], param_file: Option<&Path>) -> Result<QueryValues> {
    let mut query = QueryValues::new();
    for kv in params {
        let (k, v) = parse_key_value(kv).context("invalid --param")?;
        query.add(k, v);
    }
    if let Some(path) = param_file {
        load_param_file_into_map(path, &mut query)?;
    }
    Ok(query)
}

/// Merge a JSON or YAML object into `query`. Keys already present win.
/// Arrays become repeated values; other non-string scalars use their JSON text.
pub fn load_param_file_into_map(path: &Path, query: &mut QueryValues) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read param file: {}", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    let value: serde_json::Value = if is_yaml {
        let yaml_v: serde_yaml::Value =
            serde_yaml::from_str(&raw).context("failed to parse YAML param file")?;
        serde_json::to_value(yaml_v).context("failed to convert YAML to JSON")?
    } else {
        serde_json::from_str(&raw).context("failed to parse JSON param file")?
    };

    let obj = value
        .as_object()
        .ok_or_else(|| anyhow::anyhow!("param file root must be an object"))?;

    for (k, v) in obj {
        if query.contains_key(k) {
            tracing::debug!(param = %k, "command line overrides param file entry");
            continue;
        }
        match v {
            serde_json::Value::Array(items) => {
                for item in items {
                    query.add(k.clone(), scalar_text(item));
                }
            }
            other => {
                query.add(k.clone(), scalar_text(other));
            }
        }
    }
    Ok(())
}

fn scalar_text(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/* ---- Payload Encoding ---- */

pub fn encode_code(code: &[u8]) -> String {
    STANDARD.encode(code)
}

/// Script body from `-c` or `--code-file`, base64-encoded for the wire.
/// clap guarantees at most one is present.
pub fn read_code(code: Option<&str>, code_file: Option<&Path>) -> Result<String> {
    match (code, code_file) {
        (Some(c), _) => Ok(encode_code(c.as_bytes())),
        (None, Some(path)) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read code file: {}", path.display()))?;
            Ok(encode_code(&bytes))
        }
        (None, None) => anyhow::bail!("script code is required (use --code or --code-file)"),
    }
}

/// `<filename>$$<base64 content>` for a local file.
pub fn attachment_value(path: &Path) -> Result<String> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| anyhow::anyhow!("attachment path has no file name: {}", path.display()))?;
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read attachment: {}", path.display()))?;
    Ok(format!("{name}{ATTACHMENT_SEPARATOR}{}", encode_code(&bytes)))
}

/// Check a user-supplied `-f` value has a file name and valid base64 content.
pub fn validate_attachment_value(raw: &str) -> Result<()> {
    let Some((name, content)) = raw.split_once(ATTACHMENT_SEPARATOR) else {
        anyhow::bail!("attachment must look like <filename>$$<base64 content>");
    };
    if name.trim().is_empty() {
        anyhow::bail!("attachment file name is empty");
    }
    STANDARD
        .decode(content)
        .context("attachment content is not valid base64")?;
    Ok(())
}
