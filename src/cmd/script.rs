/*!
`script.rs`

Implements the `script` subcommand family:

  script create   -t TITLE (-c CODE | --code-file PATH) [-s V1|V2]
                  [--time-limit N] [--username U] [--access-group G]
  script edit     SCRIPT_ID (-c CODE | --code-file PATH) [-t TITLE]
                  [--username U] [--time-limit N] [--decode-as V1|V2]
  script copy     SCRIPT_ID -t DEST_TITLE [--access-group G] [--decode-as V1|V2]
  script remove   SCRIPT_ID
  script get      SCRIPT_ID [-s V1|V2]
  script archive  SCRIPT_ID
  script redact   SCRIPT_ID
  script attachment ...   (see attachment.rs)

create/edit/copy/remove go through the legacy action endpoint; get,
archive and redact use the REST endpoints. Script code is sent base64
encoded.
*/

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use landscape_api::client::{Client, LegacyAction, QueryValues, ScriptType};

use crate::cmd::attachment::{self, AttachmentArgs};
use crate::cmd::output::{Report, legacy_rows, script_rows, write_report};
use crate::cmd::shared::{Globals, build_client, parse_script_id, read_code, runtime};

/* -------------------------------------------------------------------------- */
/* Argument Structs                                                           */
/* -------------------------------------------------------------------------- */

#[derive(Args, Debug)]
pub struct ScriptArgs {
    #[command(subcommand)]
    pub command: ScriptCommand,
}

#[derive(Subcommand, Debug)]
pub enum ScriptCommand {
    /// Create a new script
    Create(CreateArgs),

    /// Edit an existing script
    Edit(EditArgs),

    /// Copy a script under a new title
    Copy(CopyArgs),

    /// Remove a script
    Remove(IdArg),

    /// Get an existing script
    Get(GetArgs),

    /// Archive a script
    Archive(IdArg),

    /// Redact a script
    Redact(IdArg),

    /// Create or manage script attachments
    Attachment(AttachmentArgs),
}

/// Script body, inline or from a file.
#[derive(Args, Debug, Clone)]
pub struct CodeArgs {
    /// Script code (plain text; encoded before sending)
    #[arg(short, long, conflicts_with = "code_file", required_unless_present = "code_file")]
    pub code: Option<String>,

    /// Read script code from a file
    #[arg(long = "code-file", value_name = "PATH")]
    pub code_file: Option<PathBuf>,
}

impl CodeArgs {
    fn encoded(&self) -> Result<String> {
        read_code(self.code.as_deref(), self.code_file.as_deref())
    }
}

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Script title
    #[arg(short, long)]
    pub title: String,

    #[command(flatten)]
    pub code: CodeArgs,

    /// Script format version
    #[arg(short = 's', long = "script-type", default_value_t = ScriptType::V1)]
    pub script_type: ScriptType,

    /// Seconds the script may run
    #[arg(long = "time-limit", value_name = "SECS")]
    pub time_limit: Option<u64>,

    /// User the script runs as
    #[arg(long)]
    pub username: Option<String>,

    #[arg(long = "access-group")]
    pub access_group: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    #[arg(value_parser = parse_script_id, value_name = "SCRIPT_ID")]
    pub script_id: i64,

    #[command(flatten)]
    pub code: CodeArgs,

    /// New title (unchanged if omitted)
    #[arg(short, long)]
    pub title: Option<String>,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long = "time-limit", value_name = "SECS")]
    pub time_limit: Option<u64>,

    /// Shape used to summarise the returned script
    #[arg(long = "decode-as", default_value_t = ScriptType::V1)]
    pub decode_as: ScriptType,
}

#[derive(Args, Debug, Clone)]
pub struct CopyArgs {
    #[arg(value_parser = parse_script_id, value_name = "SCRIPT_ID")]
    pub script_id: i64,

    /// Title of the copy
    #[arg(short = 't', long = "title")]
    pub destination_title: String,

    #[arg(long = "access-group")]
    pub access_group: Option<String>,

    #[arg(long = "decode-as", default_value_t = ScriptType::V1)]
    pub decode_as: ScriptType,
}

#[derive(Args, Debug, Clone)]
pub struct GetArgs {
    #[arg(value_parser = parse_script_id, value_name = "SCRIPT_ID")]
    pub script_id: i64,

    /// Decode and summarise the script as this version
    #[arg(short = 's', long = "script-type")]
    pub script_type: Option<ScriptType>,
}

#[derive(Args, Debug, Clone)]
pub struct IdArg {
    #[arg(value_parser = parse_script_id, value_name = "SCRIPT_ID")]
    pub script_id: i64,
}

/* -------------------------------------------------------------------------- */
/* Public Entry Point                                                         */
/* -------------------------------------------------------------------------- */

pub fn execute_script(globals: &Globals, args: ScriptArgs) -> Result<()> {
    let client = build_client(globals)?;
    let report = runtime()?.block_on(run(&client, args.command))?;
    write_report(&report, globals.json)
}

/* -------------------------------------------------------------------------- */
/* Core Logic                                                                 */
/* -------------------------------------------------------------------------- */

pub async fn run(client: &Client, command: ScriptCommand) -> Result<Report> {
    match command {
        ScriptCommand::Create(a) => {
            let query = create_query(&a)?;
            invoke(client, LegacyAction::CreateScript, &query, a.script_type).await
        }
        ScriptCommand::Edit(a) => {
            let query = edit_query(&a)?;
            invoke(client, LegacyAction::EditScript, &query, a.decode_as).await
        }
        ScriptCommand::Copy(a) => {
            let query = copy_query(&a);
            invoke(client, LegacyAction::CopyScript, &query, a.decode_as).await
        }
        ScriptCommand::Remove(a) => {
            let query = QueryValues::from([("script_id", a.script_id.to_string())]);
            invoke(client, LegacyAction::RemoveScript, &query, ScriptType::default()).await
        }
        ScriptCommand::Get(a) => get(client, &a).await,
        ScriptCommand::Archive(a) => {
            let resp = client
                .archive_script_with_response(a.script_id)
                .await
                .with_context(|| format!("failed to archive script {}", a.script_id))?;
            Ok(Report::from_response(
                format!("POST /api/scripts/{}:archive", a.script_id),
                &resp,
            ))
        }
        ScriptCommand::Redact(a) => {
            let resp = client
                .redact_script_with_response(a.script_id)
                .await
                .with_context(|| format!("failed to redact script {}", a.script_id))?;
            Ok(Report::from_response(
                format!("POST /api/scripts/{}:redact", a.script_id),
                &resp,
            ))
        }
        ScriptCommand::Attachment(a) => attachment::run(client, a.command).await,
    }
}

/// Invoke a legacy action and summarise its payload.
pub(crate) async fn invoke(
    client: &Client,
    action: LegacyAction,
    query: &QueryValues,
    hint: ScriptType,
) -> Result<Report> {
    tracing::debug!(%action, hint = %hint, "running script action");
    let resp = client
        .invoke_legacy_action_with_response(&action.params(), query)
        .await
        .with_context(|| format!("{action} failed"))?;
    let rows = legacy_rows(action.outcome(), &resp, hint);
    Ok(Report::from_response(action.as_str(), &resp).with_summary(rows))
}

async fn get(client: &Client, args: &GetArgs) -> Result<Report> {
    let resp = client
        .get_script_with_response(args.script_id)
        .await
        .with_context(|| format!("failed to get script {}", args.script_id))?;
    let mut report = Report::from_response(format!("GET /api/scripts/{}", args.script_id), &resp);

    if let (Some(kind), Some(payload)) = (args.script_type, resp.json200.as_ref()) {
        match payload.decode(kind) {
            Ok(script) => report = report.with_summary(script_rows(&script)),
            Err(e) => tracing::warn!(
                script_id = args.script_id,
                error = %e,
                "script does not match the requested {kind} shape"
            ),
        }
    }
    Ok(report)
}

/* -------------------------------------------------------------------------- */
/* Query Builders                                                             */
/* -------------------------------------------------------------------------- */

fn create_query(args: &CreateArgs) -> Result<QueryValues> {
    let mut q = QueryValues::new();
    q.set("title", args.title.as_str())
        .set("code", args.code.encoded()?)
        .set("script_type", args.script_type.as_str());
    if let Some(t) = args.time_limit {
        q.set("time_limit", t.to_string());
    }
    if let Some(u) = &args.username {
        q.set("username", u.as_str());
    }
    if let Some(g) = &args.access_group {
        q.set("access_group", g.as_str());
    }
    Ok(q)
}

fn edit_query(args: &EditArgs) -> Result<QueryValues> {
    let mut q = QueryValues::new();
    q.set("script_id", args.script_id.to_string())
        .set("code", args.code.encoded()?);
    if let Some(t) = &args.title {
        q.set("title", t.as_str());
    }
    if let Some(u) = &args.username {
        q.set("username", u.as_str());
    }
    if let Some(t) = args.time_limit {
        q.set("time_limit", t.to_string());
    }
    Ok(q)
}

fn copy_query(args: &CopyArgs) -> QueryValues {
    let mut q = QueryValues::new();
    q.set("script_id", args.script_id.to_string())
        .set("destination_title", args.destination_title.as_str());
    if let Some(g) = &args.access_group {
        q.set("access_group", g.as_str());
    }
    q
}

/* -------------------------------------------------------------------------- */
/* Tests                                                                      */
/* -------------------------------------------------------------------------- */
