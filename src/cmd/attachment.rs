/*!
`attachment.rs`

`script attachment` subcommands:

  create  -s SCRIPT_ID (-f NAME$$BASE64 | --path FILE)
  get     -s SCRIPT_ID -i ATTACHMENT_ID
  remove  -s SCRIPT_ID --filename NAME

`--path` reads a local file and builds the `NAME$$BASE64` value itself.
*/

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use landscape_api::client::{Client, LegacyAction, QueryValues, ScriptType};

use crate::cmd::output::Report;
use crate::cmd::script::invoke;
use crate::cmd::shared::{attachment_value, parse_script_id, validate_attachment_value};

#[derive(Args, Debug)]
pub struct AttachmentArgs {
    #[command(subcommand)]
    pub command: AttachmentCommand,
}

#[derive(Subcommand, Debug)]
pub enum AttachmentCommand {
    /// Create a script attachment
    Create(CreateAttachmentArgs),

    /// Get a script attachment by script ID and attachment ID
    Get(GetAttachmentArgs),

    /// Remove a script attachment by file name
    Remove(RemoveAttachmentArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CreateAttachmentArgs {
    /// ID of the script to attach to
    #[arg(short = 's', long = "script-id", value_parser = parse_script_id)]
    pub script_id: i64,

    /// Attachment as <filename>$$<base64 encoded contents>
    #[arg(short = 'f', long = "file", conflicts_with = "path", required_unless_present = "path")]
    pub file: Option<String>,

    /// Local file to attach
    #[arg(long, value_name = "FILE")]
    pub path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct GetAttachmentArgs {
    #[arg(short = 's', long = "script-id", value_parser = parse_script_id)]
    pub script_id: i64,

    /// ID of the attachment
    #[arg(short = 'i', long = "script-attachment-id", value_parser = parse_script_id)]
    pub attachment_id: i64,
}

#[derive(Args, Debug, Clone)]
pub struct RemoveAttachmentArgs {
    #[arg(short = 's', long = "script-id", value_parser = parse_script_id)]
    pub script_id: i64,

    /// File name of the attachment
    #[arg(long)]
    pub filename: String,
}

pub async fn run(client: &Client, command: AttachmentCommand) -> Result<Report> {
    match command {
        AttachmentCommand::Create(a) => {
            let file = match (&a.file, &a.path) {
                (Some(raw), _) => {
                    validate_attachment_value(raw)?;
                    raw.clone()
                }
                (None, Some(path)) => attachment_value(path)?,
                (None, None) => anyhow::bail!("attachment is required (use --file or --path)"),
            };
            let query = QueryValues::from([
                ("script_id", a.script_id.to_string()),
                ("file", file),
            ]);
            invoke(
                client,
                LegacyAction::CreateScriptAttachment,
                &query,
                ScriptType::default(),
            )
            .await
        }
        AttachmentCommand::Get(a) => {
            let resp = client
                .get_script_attachment_with_response(a.script_id, a.attachment_id)
                .await
                .with_context(|| {
                    format!(
                        "failed to get attachment {} of script {}",
                        a.attachment_id, a.script_id
                    )
                })?;
            let mut rows = vec![
                ("script".to_string(), a.script_id.to_string()),
                ("attachment".to_string(), a.attachment_id.to_string()),
            ];
            if let Some(content) = &resp.json200 {
                rows.push(("size".to_string(), format!("{} bytes", content.len())));
            }
            Ok(Report::from_response(
                format!(
                    "GET /api/scripts/{}/attachments/{}",
                    a.script_id, a.attachment_id
                ),
                &resp,
            )
            .with_summary(rows))
        }
        AttachmentCommand::Remove(a) => {
            let query = QueryValues::from([
                ("script_id", a.script_id.to_string()),
                ("filename", a.filename),
            ]);
            invoke(
                client,
                LegacyAction::RemoveScriptAttachment,
                &query,
                ScriptType::default(),
            )
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use landscape_api::client::ClientOptions;
    use mockito::Matcher;
    use reqwest::StatusCode;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        command: AttachmentCommand,
    }

    fn parse(args: &[&str]) -> AttachmentCommand {
        TestCli::try_parse_from(std::iter::once("attachment").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    fn client(base: &str) -> Client {
        Client::new(base, ClientOptions::default()).unwrap()
    }

    #[test]
    fn create_needs_file_or_path() {
        assert!(TestCli::try_parse_from(["attachment", "create", "-s", "1"]).is_err());
    }

    #[tokio::test]
    async fn create_from_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        std::fs::write(&path, "hello").unwrap();

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("action".into(), "CreateScriptAttachment".into()),
                Matcher::UrlEncoded("script_id".into(), "1".into()),
                Matcher::UrlEncoded("file".into(), "note.txt$$aGVsbG8=".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#""note.txt""#)
            .create_async()
            .await;

        let path_arg = path.to_str().unwrap();
        let report = run(
            &client(&server.url()),
            parse(&["create", "-s", "1", "--path", path_arg]),
        )
        .await
        .unwrap();
        assert_eq!(
            report.summary,
            vec![("filename".to_string(), "note.txt".to_string())]
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_rejects_malformed_file_value() {
        let server = mockito::Server::new_async().await;
        let err = run(
            &client(&server.url()),
            parse(&["create", "-s", "1", "-f", "note.txt"]),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("<filename>$$<base64 content>"));
    }

    #[tokio::test]
    async fn get_attachment_content() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/scripts/1/attachments/2")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#""file contents""#)
            .create_async()
            .await;

        let report = run(&client(&server.url()), parse(&["get", "-s", "1", "-i", "2"]))
            .await
            .unwrap();
        assert_eq!(report.body, serde_json::json!("file contents"));
        assert!(report.summary.contains(&("size".to_string(), "13 bytes".to_string())));
    }

    #[tokio::test]
    async fn remove_by_filename() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("action".into(), "RemoveScriptAttachment".into()),
                Matcher::UrlEncoded("script_id".into(), "1".into()),
                Matcher::UrlEncoded("filename".into(), "note.txt".into()),
            ]))
            .with_status(204)
            .create_async()
            .await;

        let report = run(
            &client(&server.url()),
            parse(&["remove", "-s", "1", "--filename", "note.txt"]),
        )
        .await
        .unwrap();
        assert_eq!(report.status, StatusCode::NO_CONTENT);
        mock.assert_async().await;
    }
}
