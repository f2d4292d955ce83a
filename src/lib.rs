//! Typed client for the Landscape script management API.
//!
//! Two request styles are exposed:
//!   - legacy actions: named procedures (`CreateScript`, `EditScript`, ...)
//!     invoked through one endpoint with `version` + `action` query params
//!   - REST endpoints: `GET /api/scripts/{id}`, `POST /api/scripts/{id}:archive`, ...
//!
//! ```no_run
//! use landscape_api::client::{BearerToken, Client, ClientOptions, LegacyAction, QueryValues};
//!
//! # async fn run() -> Result<(), landscape_api::client::ClientError> {
//! let client = Client::new(
//!     "https://landscape.example.com",
//!     ClientOptions::default().with_request_editor(BearerToken::new("token")?),
//! )?;
//! let query = QueryValues::from([("title", "hello"), ("code", "ZWNobyBoaQ=="), ("script_type", "V1")]);
//! let resp = client
//!     .invoke_legacy_action_with_response(&LegacyAction::CreateScript.params(), &query)
//!     .await?;
//! if let Some(payload) = resp.json200 {
//!     let script = payload.as_script_result()?.as_v1()?;
//!     println!("created script {} ({})", script.id, script.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
