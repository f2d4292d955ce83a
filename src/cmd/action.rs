/*!
`action.rs`

Generic legacy action invocation:

  action <ACTION> [--param KEY=VALUE]... [--param-file params.(json|yaml)]
                  [--api-version V] [--decode-as V1|V2]

ACTION is a wire name (`CreateScript`) or its kebab form (`create-script`).
Unknown names are accepted with `--raw-action` and sent verbatim.
Parameters from --param override entries of --param-file. Values are sent
as given; nothing is base64-encoded here.
*/

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use landscape_api::client::{
    ActionOutcome, Client, LEGACY_API_VERSION, LegacyAction, LegacyActionParams, QueryValues,
    ScriptType,
};

use crate::cmd::output::{Report, legacy_rows, write_report};
use crate::cmd::shared::{Globals, build_client, collect_params, runtime};

#[derive(Args, Debug)]
pub struct ActionArgs {
    /// Action name (e.g. CreateScript or create-script)
    #[arg(value_name = "ACTION", required_unless_present = "raw_action")]
    pub action: Option<LegacyAction>,

    /// Send an action name this tool does not know, verbatim
    #[arg(long = "raw-action", value_name = "NAME", conflicts_with = "action")]
    pub raw_action: Option<String>,

    /// Provide parameter (KEY=VALUE), repeatable
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Load parameters from file (JSON or YAML). CLI --param overrides file entries
    #[arg(long = "param-file", value_name = "PATH")]
    pub param_file: Option<PathBuf>,

    /// API version sent with the action
    #[arg(long = "api-version", default_value = LEGACY_API_VERSION)]
    pub api_version: String,

    /// Shape used to summarise a returned script
    #[arg(long = "decode-as", default_value_t = ScriptType::V1)]
    pub decode_as: ScriptType,
}

impl ActionArgs {
    fn invocation(&self) -> Result<(LegacyActionParams, Option<LegacyAction>)> {
        let (name, known) = match (&self.action, &self.raw_action) {
            (Some(a), _) => (a.as_str().to_string(), Some(*a)),
            (None, Some(raw)) => (raw.clone(), raw.parse::<LegacyAction>().ok()),
            (None, None) => anyhow::bail!("no action specified"),
        };
        let params = LegacyActionParams::new(name).with_version(self.api_version.as_str());
        Ok((params, known))
    }
}

pub fn execute_action(globals: &Globals, args: ActionArgs) -> Result<()> {
    let client = build_client(globals)?;
    let report = runtime()?.block_on(run(&client, &args))?;
    write_report(&report, globals.json)
}

pub async fn run(client: &Client, args: &ActionArgs) -> Result<Report> {
    let (params, known) = args.invocation()?;
    let query: QueryValues = collect_params(&args.params, args.param_file.as_deref())?;

    tracing::debug!(
        action = %params.action,
        version = %params.version,
        params = query.len(),
        "running legacy action"
    );
    let resp = client
        .invoke_legacy_action_with_response(&params, &query)
        .await
        .with_context(|| format!("{} failed", params.action))?;

    // Unknown actions are shown raw; their payload shape is not known.
    let outcome = known.map(|a| a.outcome()).unwrap_or(ActionOutcome::Empty);
    let rows = legacy_rows(outcome, &resp, args.decode_as);
    Ok(Report::from_response(params.action.as_str(), &resp).with_summary(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use landscape_api::client::ClientOptions;
    use mockito::Matcher;
    use reqwest::StatusCode;
    use std::io::Write;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        args: ActionArgs,
    }

    fn parse(args: &[&str]) -> ActionArgs {
        TestCli::try_parse_from(std::iter::once("action").chain(args.iter().copied()))
            .unwrap()
            .args
    }

    fn client(base: &str) -> Client {
        Client::new(base, ClientOptions::default()).unwrap()
    }

    #[test]
    fn kebab_and_wire_names_parse() {
        assert_eq!(parse(&["copy-script"]).action, Some(LegacyAction::CopyScript));
        assert_eq!(parse(&["CopyScript"]).action, Some(LegacyAction::CopyScript));
        assert!(TestCli::try_parse_from(["action", "NoSuchAction"]).is_err());
        assert!(TestCli::try_parse_from(["action"]).is_err());
    }

    #[test]
    fn raw_action_keeps_known_outcome() {
        let args = parse(&["--raw-action", "EditScript", "--api-version", "2012-01-01"]);
        let (params, known) = args.invocation().unwrap();
        assert_eq!(params.action, "EditScript");
        assert_eq!(params.version, "2012-01-01");
        assert_eq!(known, Some(LegacyAction::EditScript));
    }

    #[tokio::test]
    async fn params_file_and_flags_are_merged() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "script_id: 3\ndestination_title: from file").unwrap();
        let file_arg = file.path().to_str().unwrap().to_string();

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("action".into(), "CopyScript".into()),
                Matcher::UrlEncoded("version".into(), "2011-08-01".into()),
                Matcher::UrlEncoded("script_id".into(), "3".into()),
                Matcher::UrlEncoded("destination_title".into(), "from flag".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":4,"title":"from flag"}"#)
            .create_async()
            .await;

        let args = parse(&[
            "copy-script",
            "--param",
            "destination_title=from flag",
            "--param-file",
            &file_arg,
        ]);
        let report = run(&client(&server.url()), &args).await.unwrap();
        assert_eq!(report.operation, "CopyScript");
        assert_eq!(report.summary[0], ("id".to_string(), "4".to_string()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_version_surfaces_bad_request() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/")
            .match_query(Matcher::UrlEncoded("version".into(), "".into()))
            .with_status(400)
            .with_body("missing version")
            .create_async()
            .await;

        let args = parse(&["create-script", "--api-version", ""]);
        let report = run(&client(&server.url()), &args).await.unwrap();
        assert_eq!(report.status, StatusCode::BAD_REQUEST);
        assert!(report.summary.is_empty());

        let err = write_report(&report, true).unwrap_err();
        assert!(err.to_string().contains("missing version"));
    }
}
