/*!
output.rs - rendering of API responses and command errors.

JSON success output:
{
  "status": "ok",
  "operation": "CreateScript",
  "http_status": 200,
  "summary": { "id": "1", "title": "..." },
  "body": { ...response body, or a string when not JSON... }
}

A non-2xx response is rendered the same way with "status": "error", then
surfaced as a `StatusFailure` so the process exits non-zero.

JSON error output:
{
  "status": "error",
  "error": "message",
  "http_status": 200,          (decode failures only)
  "body": "<raw body excerpt>" (decode failures only)
}
*/

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{Value, json};

use landscape_api::client::{
    ActionOutcome, ApiResponse, ClientError, LegacyActionResult, Script, ScriptType,
};

use crate::cmd::format::{
    Role, StyleOptions, box_header, color, emoji, kv_table, status_role, truncate_ellipsis,
};

/// Longest raw body excerpt shown with a decode error.
const BODY_PREVIEW_CHARS: usize = 2048;

/// A response whose status was not 2xx. Already printed when returned.
#[derive(Debug, thiserror::Error)]
#[error("{operation} returned {status}: {detail}")]
pub struct StatusFailure {
    pub operation: String,
    pub status: StatusCode,
    pub detail: String,
}

/// One response, ready to print.
#[derive(Debug, Clone)]
pub struct Report {
    pub operation: String,
    pub status: StatusCode,
    pub summary: Vec<(String, String)>,
    pub body: Value,
    message: Option<String>,
}

impl Report {
    pub fn from_response<T>(operation: impl Into<String>, resp: &ApiResponse<T>) -> Self {
        Report {
            operation: operation.into(),
            status: resp.status(),
            summary: Vec::new(),
            body: body_value(resp.body()),
            message: resp.json404.as_ref().and_then(|e| e.message.clone()),
        }
    }

    pub fn with_summary(mut self, rows: Vec<(String, String)>) -> Self {
        self.summary = rows;
        self
    }

    fn failure_detail(&self) -> String {
        if let Some(m) = &self.message {
            return m.clone();
        }
        match &self.body {
            Value::Null => "no response body".to_string(),
            Value::String(s) => s.clone(),
            Value::Object(map) => map
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| self.body.to_string()),
            other => other.to_string(),
        }
    }

    fn to_json(&self) -> Value {
        let summary: serde_json::Map<String, Value> = self
            .summary
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        json!({
            "status": if self.status.is_success() { "ok" } else { "error" },
            "operation": self.operation,
            "http_status": self.status.as_u16(),
            "summary": summary,
            "body": self.body,
        })
    }

    fn render_human(&self, style: &StyleOptions) -> String {
        let code = self.status.as_u16();
        let tag = if self.status.is_success() { "success" } else { "error" };
        let title = format!("{} {}", emoji(tag, style), self.status).trim().to_string();
        let mut out = vec![box_header(
            color(status_role(code), title, style),
            Some(&self.operation),
            style,
        )];

        if !self.summary.is_empty() {
            out.push(kv_table(&self.summary, style));
        }
        match &self.body {
            Value::Null => out.push(color(
                Role::Dim,
                format!("{} No response body", emoji("info", style)),
                style,
            )),
            Value::String(s) => out.push(s.clone()),
            other => out.push(
                serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
            ),
        }
        out.join("\n")
    }
}

/// Empty -> null, JSON -> parsed, anything else -> lossy text.
fn body_value(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

/// Print `report`; fail with [`StatusFailure`] when the status is not 2xx.
pub fn write_report(report: &Report, json: bool) -> Result<()> {
    if json {
        let v = report.to_json();
        println!(
            "{}",
            serde_json::to_string_pretty(&v).unwrap_or_else(|_| v.to_string())
        );
    } else {
        println!("{}", report.render_human(&StyleOptions::detect()));
    }

    if report.status.is_success() {
        return Ok(());
    }
    Err(StatusFailure {
        operation: report.operation.clone(),
        status: report.status,
        detail: report.failure_detail(),
    }
    .into())
}

/// Status and raw body kept by a decode failure anywhere in `err`'s chain.
fn decode_diagnostics(err: &anyhow::Error) -> Option<(StatusCode, String)> {
    let client_err = err.chain().find_map(|c| c.downcast_ref::<ClientError>())?;
    let status = client_err.status()?;
    let body = client_err.body()?;
    let text = truncate_ellipsis(&String::from_utf8_lossy(body), BODY_PREVIEW_CHARS);
    Some((status, text))
}

pub(crate) fn error_json(err: &anyhow::Error) -> Value {
    let mut v = json!({"status": "error", "error": format!("{err:#}")});
    if let Some((status, body)) = decode_diagnostics(err) {
        v["http_status"] = json!(status.as_u16());
        v["body"] = Value::String(body);
    }
    v
}

fn error_human(err: &anyhow::Error, style: &StyleOptions) -> String {
    let title = format!("{} Error", emoji("error", style)).trim().to_string();
    let msg = format!("{err:#}");
    let mut out = box_header(title, Some(color(Role::Error, &msg, style)), style);
    if let Some((status, body)) = decode_diagnostics(err) {
        out.push('\n');
        out.push_str(&color(Role::Accent, format!("{status} response body:"), style));
        out.push('\n');
        out.push_str(&body);
    }
    out
}

/// Print a command error in the selected output mode.
pub fn output_error(json: bool, err: &anyhow::Error) {
    if json {
        let v = error_json(err);
        println!(
            "{}",
            serde_json::to_string_pretty(&v).unwrap_or_else(|_| v.to_string())
        );
    } else {
        eprintln!("{}", error_human(err, &StyleOptions::detect()));
    }
}

/* ---- Summaries ---- */

/// Key facts of a decoded script, in display order.
pub fn script_rows(script: &Script) -> Vec<(String, String)> {
    let mut rows = vec![
        ("id".to_string(), script.id().to_string()),
        ("title".to_string(), script.title().to_string()),
        ("type".to_string(), script.script_type().to_string()),
    ];
    match script {
        Script::V1(s) => {
            if let Some(c) = s.creator.as_ref().and_then(|c| c.name.clone()) {
                rows.push(("creator".into(), c));
            }
            if let Some(t) = &s.creation_time {
                rows.push(("created".into(), t.clone()));
            }
            if let Some(status) = &s.status {
                rows.push(("status".into(), status.clone()));
            }
        }
        Script::V2(s) => {
            if let Some(c) = s.created_by.as_ref().and_then(|c| c.name.clone()) {
                rows.push(("created by".into(), c));
            }
            if let Some(t) = &s.created_at {
                rows.push(("created".into(), t.clone()));
            }
            if let Some(v) = s.version_number {
                rows.push(("version".into(), v.to_string()));
            }
            if let Some(status) = &s.status {
                rows.push(("status".into(), status.clone()));
            }
        }
    }
    let names = script.attachment_names();
    if !names.is_empty() {
        rows.push(("attachments".into(), names.join(", ")));
    }
    rows
}

/// Summary of a legacy action response. The payload shape follows from the
/// action; scripts are decoded with `hint`. A payload that does not match is
/// logged and left unsummarised, the raw body is still printed.
pub fn legacy_rows(
    outcome: ActionOutcome,
    resp: &ApiResponse<LegacyActionResult>,
    hint: ScriptType,
) -> Vec<(String, String)> {
    let Some(payload) = resp.json200.as_ref() else {
        return Vec::new();
    };
    let decoded = match outcome {
        ActionOutcome::Script => payload
            .as_script_result()
            .and_then(|r| r.decode(hint))
            .map(|s| script_rows(&s)),
        ActionOutcome::Attachment => payload
            .as_attachment()
            .map(|name| vec![("filename".to_string(), name)]),
        ActionOutcome::Empty => Ok(Vec::new()),
    };
    decoded.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "response payload does not match the expected shape");
        Vec::new()
    })
}
