//! Legacy action dispatch.
//!
//! The legacy API exposes named procedures behind a single endpoint. Every
//! invocation is a POST to `{base}/api/` carrying `version` and `action` in
//! the query, next to the action's own parameters.

use std::fmt;
use std::str::FromStr;

use reqwest::{Method, Request, Response};

use super::models::LegacyActionResult;
use super::query::QueryValues;
use super::response::ApiResponse;
use super::{Client, ClientError};

/// API version sent with every legacy action.
pub const LEGACY_API_VERSION: &str = "2011-08-01";

const VERSION_PARAM: &str = "version";
const ACTION_PARAM: &str = "action";

/// What a legacy action returns on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// A script object (V1 or V2 shape).
    Script,
    /// A bare attachment filename.
    Attachment,
    /// Nothing (HTTP 204).
    Empty,
}

/// The legacy actions this client knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegacyAction {
    CreateScript,
    EditScript,
    CopyScript,
    RemoveScript,
    CreateScriptAttachment,
    RemoveScriptAttachment,
}

impl LegacyAction {
    pub const fn variants() -> &'static [LegacyAction] {
        &[
            LegacyAction::CreateScript,
            LegacyAction::EditScript,
            LegacyAction::CopyScript,
            LegacyAction::RemoveScript,
            LegacyAction::CreateScriptAttachment,
            LegacyAction::RemoveScriptAttachment,
        ]
    }

    /// Name as sent in the `action` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            LegacyAction::CreateScript => "CreateScript",
            LegacyAction::EditScript => "EditScript",
            LegacyAction::CopyScript => "CopyScript",
            LegacyAction::RemoveScript => "RemoveScript",
            LegacyAction::CreateScriptAttachment => "CreateScriptAttachment",
            LegacyAction::RemoveScriptAttachment => "RemoveScriptAttachment",
        }
    }

    /// Lower-case, dash separated name (`create-script`).
    pub fn kebab_name(&self) -> &'static str {
        match self {
            LegacyAction::CreateScript => "create-script",
            LegacyAction::EditScript => "edit-script",
            LegacyAction::CopyScript => "copy-script",
            LegacyAction::RemoveScript => "remove-script",
            LegacyAction::CreateScriptAttachment => "create-script-attachment",
            LegacyAction::RemoveScriptAttachment => "remove-script-attachment",
        }
    }

    pub fn outcome(&self) -> ActionOutcome {
        match self {
            LegacyAction::CreateScript | LegacyAction::EditScript | LegacyAction::CopyScript => {
                ActionOutcome::Script
            }
            LegacyAction::CreateScriptAttachment => ActionOutcome::Attachment,
            LegacyAction::RemoveScript | LegacyAction::RemoveScriptAttachment => {
                ActionOutcome::Empty
            }
        }
    }

    /// Invocation parameters at the current API version.
    pub fn params(self) -> LegacyActionParams {
        LegacyActionParams::new(self.as_str())
    }
}

impl fmt::Display for LegacyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LegacyAction {
    type Err = ClientError;

    /// Accepts the exact wire name (`CreateScript`) or the exact kebab
    /// name (`create-script`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim();
        LegacyAction::variants()
            .iter()
            .copied()
            .find(|a| {
                a.as_str() == norm || a.kebab_name() == norm
            })
            .ok_or_else(|| ClientError::Validation(format!("unknown legacy action '{norm}'")))
    }
}

/// `version` and `action` of one invocation, as raw strings.
///
/// Nothing is validated locally: an empty version or action is sent as-is
/// and rejected by the server with HTTP 400.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyActionParams {
    pub version: String,
    pub action: String,
}

impl LegacyActionParams {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            version: LEGACY_API_VERSION.to_string(),
            action: action.into(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

impl From<LegacyAction> for LegacyActionParams {
    fn from(action: LegacyAction) -> Self {
        action.params()
    }
}

impl Client {
    /// Build (without sending) the request for one legacy invocation.
    ///
    /// The query holds `version` and `action` from `params` plus every pair
    /// of `query`. Caller pairs named `version` or `action` are dropped.
    pub fn legacy_action_request(
        &self,
        params: &LegacyActionParams,
        query: &QueryValues,
    ) -> Result<Request, ClientError> {
        let mut merged = QueryValues::new();
        merged
            .set(VERSION_PARAM, params.version.as_str())
            .set(ACTION_PARAM, params.action.as_str());
        for (name, value) in query.iter() {
            if name == VERSION_PARAM || name == ACTION_PARAM {
                tracing::warn!(parameter = name, "ignoring reserved legacy action parameter");
                continue;
            }
            merged.add(name, value);
        }

        let mut url = self.endpoint(&[""]);
        merged.apply_to(&mut url);
        self.build_request(Method::POST, url)
    }

    /// Invoke a legacy action and return the raw response, whatever its status.
    pub async fn invoke_legacy_action(
        &self,
        params: &LegacyActionParams,
        query: &QueryValues,
    ) -> Result<Response, ClientError> {
        let request = self.legacy_action_request(params, query)?;
        tracing::info!(
            action = %params.action,
            version = %params.version,
            parameters = query.len(),
            "invoking legacy action"
        );
        self.execute(request).await
    }

    /// Invoke a legacy action and decode the body by status.
    pub async fn invoke_legacy_action_with_response(
        &self,
        params: &LegacyActionParams,
        query: &QueryValues,
    ) -> Result<ApiResponse<LegacyActionResult>, ClientError> {
        let response = self.invoke_legacy_action(params, query).await?;
        ApiResponse::from_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{BearerToken, ClientOptions};
    use mockito::Matcher;
    use reqwest::StatusCode;
    use reqwest::header::AUTHORIZATION;

    fn client(base: &str) -> Client {
        Client::new(
            base,
            ClientOptions::default().with_request_editor(BearerToken::new("test-token").unwrap()),
        )
        .unwrap()
    }

    fn query_of(request: &Request) -> QueryValues {
        request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn script_query() -> QueryValues {
        QueryValues::from([("title", "new script"), ("code", "ZWNobyAiSGVsbG8i")])
    }

    #[test]
    fn action_names_round_trip() {
        for action in LegacyAction::variants() {
            assert_eq!(action.as_str().parse::<LegacyAction>().unwrap(), *action);
            assert_eq!(action.kebab_name().parse::<LegacyAction>().unwrap(), *action);
        }
        assert!("GetScripts".parse::<LegacyAction>().is_err());
    }

    #[test]
    fn action_names_are_case_sensitive() {
        assert!("createscript".parse::<LegacyAction>().is_err());
        assert!("CREATE-SCRIPT".parse::<LegacyAction>().is_err());
        assert_eq!(
            " CopyScript ".parse::<LegacyAction>().unwrap(),
            LegacyAction::CopyScript
        );
    }

    #[test]
    fn outcomes() {
        assert_eq!(LegacyAction::CopyScript.outcome(), ActionOutcome::Script);
        assert_eq!(
            LegacyAction::CreateScriptAttachment.outcome(),
            ActionOutcome::Attachment
        );
        assert_eq!(LegacyAction::RemoveScript.outcome(), ActionOutcome::Empty);
    }

    #[test]
    fn params_default_version() {
        let params = LegacyAction::EditScript.params();
        assert_eq!(params.version, LEGACY_API_VERSION);
        assert_eq!(params.action, "EditScript");
        assert_eq!(params.with_version("2020-01-01").version, "2020-01-01");
    }

    #[test]
    fn request_query_is_union_of_params_and_map() {
        let c = client("https://landscape.example");
        let mut extra = script_query();
        extra.add("tags", "a").add("tags", "b");
        let request = c
            .legacy_action_request(&LegacyAction::CreateScript.params(), &extra)
            .unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.url().path(), "/api/");
        let sent = query_of(&request);
        let mut expected = extra.clone();
        expected
            .set("version", LEGACY_API_VERSION)
            .set("action", "CreateScript");
        assert_eq!(sent, expected);
        assert_eq!(request.url().query_pairs().count(), 6);
        assert_eq!(
            request.headers().get(AUTHORIZATION).unwrap(),
            "Bearer test-token"
        );
    }

    #[test]
    fn reserved_names_in_map_are_not_duplicated() {
        let c = client("https://landscape.example/");
        let extra = QueryValues::from([("action", "RemoveScript"), ("script_id", "42")]);
        let request = c
            .legacy_action_request(&LegacyAction::EditScript.params(), &extra)
            .unwrap();
        let sent = query_of(&request);
        assert_eq!(sent.get_all("action"), ["EditScript".to_string()]);
        assert_eq!(sent.get("script_id"), Some("42"));
        assert_eq!(sent.len(), 3);
    }

    #[test]
    fn base_path_is_preserved() {
        let c = client("https://landscape.example/landscape");
        let request = c
            .legacy_action_request(&LegacyAction::RemoveScript.params(), &QueryValues::new())
            .unwrap();
        assert_eq!(request.url().path(), "/landscape/api/");
    }

    #[tokio::test]
    async fn missing_version_is_surfaced_as_400() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/")
            .match_query(Matcher::UrlEncoded("version".into(), "".into()))
            .with_status(400)
            .create_async()
            .await;

        let params = LegacyActionParams::new("CreateScript").with_version("");
        let resp = client(&server.url())
            .invoke_legacy_action(&params, &script_query())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_action_is_surfaced_as_400() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("version".into(), LEGACY_API_VERSION.into()),
                Matcher::UrlEncoded("action".into(), "".into()),
            ]))
            .with_status(400)
            .create_async()
            .await;

        let resp = client(&server.url())
            .invoke_legacy_action(&LegacyActionParams::new(""), &script_query())
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 400);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_script_raw_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/")
            .match_header("authorization", "Bearer test-token")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("action".into(), "CreateScript".into()),
                Matcher::UrlEncoded("title".into(), "new script".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":42,"title":"new script"}"#)
            .create_async()
            .await;

        let resp = client(&server.url())
            .invoke_legacy_action(&LegacyAction::CreateScript.params(), &script_query())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = resp.text().await.unwrap();
        assert!(body.contains("new script"), "unexpected payload: {body}");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_script_typed_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/")
            .match_query(Matcher::UrlEncoded("action".into(), "CreateScript".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":42,"title":"new script"}"#)
            .create_async()
            .await;

        let resp = client(&server.url())
            .invoke_legacy_action_with_response(
                &LegacyAction::CreateScript.params(),
                &script_query(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status_code(), 200);
        let script = resp
            .json200
            .expect("expected JSON200 payload")
            .as_script_result()
            .unwrap()
            .as_v1()
            .unwrap();
        assert_eq!(script.id, 42);
        assert_eq!(script.title, "new script");
    }

    #[tokio::test]
    async fn edit_script_typed_response_as_v2() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("action".into(), "EditScript".into()),
                Matcher::UrlEncoded("script_id".into(), "42".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":42,"title":"edited title","created_by":{"id":5,"name":"jim"}}"#)
            .create_async()
            .await;

        let query = QueryValues::from([("script_id", "42"), ("title", "edited title")]);
        let resp = client(&server.url())
            .invoke_legacy_action_with_response(&LegacyAction::EditScript.params(), &query)
            .await
            .unwrap();
        let script = resp.json200.unwrap().as_script_result().unwrap().as_v2().unwrap();
        assert_eq!(script.title, "edited title");
        assert_eq!(script.created_by.unwrap().id, Some(5));
    }

    #[tokio::test]
    async fn copy_script_typed_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("action".into(), "CopyScript".into()),
                Matcher::UrlEncoded("destination_title".into(), "copy title".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":99,"title":"copy title"}"#)
            .create_async()
            .await;

        let query = QueryValues::from([("script_id", "42"), ("destination_title", "copy title")]);
        let resp = client(&server.url())
            .invoke_legacy_action_with_response(&LegacyAction::CopyScript.params(), &query)
            .await
            .unwrap();
        let script = resp.json200.unwrap().as_script_result().unwrap().as_v1().unwrap();
        assert_eq!(script.id, 99);
        assert_eq!(script.title, "copy title");
    }

    #[tokio::test]
    async fn remove_script_no_content() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/")
            .match_query(Matcher::UrlEncoded("action".into(), "RemoveScript".into()))
            .with_status(204)
            .create_async()
            .await;

        let query = QueryValues::from([("script_id", "42")]);
        let resp = client(&server.url())
            .invoke_legacy_action(&LegacyAction::RemoveScript.params(), &query)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn remove_attachment_typed_no_payload() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/")
            .match_query(Matcher::UrlEncoded(
                "action".into(),
                "RemoveScriptAttachment".into(),
            ))
            .with_status(204)
            .create_async()
            .await;

        let query = QueryValues::from([("script_id", "42"), ("filename", "note.txt")]);
        let resp = client(&server.url())
            .invoke_legacy_action_with_response(
                &LegacyAction::RemoveScriptAttachment.params(),
                &query,
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(resp.json200.is_none());
        assert!(resp.body().is_empty());
    }

    #[tokio::test]
    async fn create_attachment_typed_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("action".into(), "CreateScriptAttachment".into()),
                Matcher::UrlEncoded("file".into(), "note.txt$$Zm9v".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#""note.txt""#)
            .create_async()
            .await;

        let query = QueryValues::from([("script_id", "42"), ("file", "note.txt$$Zm9v")]);
        let resp = client(&server.url())
            .invoke_legacy_action_with_response(
                &LegacyAction::CreateScriptAttachment.params(),
                &query,
            )
            .await
            .unwrap();
        let payload = resp.json200.expect("expected JSON200 payload");
        assert_eq!(payload.as_attachment().unwrap(), "note.txt");
        assert!(payload.as_script_result().is_err());
    }

    #[tokio::test]
    async fn connection_failure_is_a_transport_error() {
        // Bind then drop a listener so the port is closed.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let err = client(&format!("http://{addr}"))
            .invoke_legacy_action(&LegacyAction::RemoveScript.params(), &QueryValues::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
