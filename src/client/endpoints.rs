//! Typed REST endpoints for scripts and their attachments.
//!
//! Each wrapper issues one request with no body and returns either the raw
//! response or an [`ApiResponse`].

use reqwest::{Method, Response};

use super::models::ScriptResult;
use super::response::{ApiResponse, NoContent};
use super::{Client, ClientError};

impl Client {
    /// `GET /api/scripts/{script_id}`
    pub async fn get_script(&self, script_id: i64) -> Result<Response, ClientError> {
        let id = script_id.to_string();
        let url = self.endpoint(&["scripts", &id]);
        self.execute(self.build_request(Method::GET, url)?).await
    }

    pub async fn get_script_with_response(
        &self,
        script_id: i64,
    ) -> Result<ApiResponse<ScriptResult>, ClientError> {
        ApiResponse::from_response(self.get_script(script_id).await?).await
    }

    /// `GET /api/scripts/{script_id}/attachments/{attachment_id}`
    ///
    /// A 200 carries the attachment content as a JSON string.
    pub async fn get_script_attachment(
        &self,
        script_id: i64,
        attachment_id: i64,
    ) -> Result<Response, ClientError> {
        let id = script_id.to_string();
        let attachment = attachment_id.to_string();
        let url = self.endpoint(&["scripts", &id, "attachments", &attachment]);
        self.execute(self.build_request(Method::GET, url)?).await
    }

    pub async fn get_script_attachment_with_response(
        &self,
        script_id: i64,
        attachment_id: i64,
    ) -> Result<ApiResponse<String>, ClientError> {
        ApiResponse::from_response(self.get_script_attachment(script_id, attachment_id).await?)
            .await
    }

    /// `POST /api/scripts/{script_id}:archive`
    pub async fn archive_script(&self, script_id: i64) -> Result<Response, ClientError> {
        self.script_verb(script_id, "archive").await
    }

    pub async fn archive_script_with_response(
        &self,
        script_id: i64,
    ) -> Result<ApiResponse<NoContent>, ClientError> {
        ApiResponse::from_empty_response(self.archive_script(script_id).await?).await
    }

    /// `POST /api/scripts/{script_id}:redact`
    pub async fn redact_script(&self, script_id: i64) -> Result<Response, ClientError> {
        self.script_verb(script_id, "redact").await
    }

    pub async fn redact_script_with_response(
        &self,
        script_id: i64,
    ) -> Result<ApiResponse<NoContent>, ClientError> {
        ApiResponse::from_empty_response(self.redact_script(script_id).await?).await
    }

    async fn script_verb(&self, script_id: i64, verb: &str) -> Result<Response, ClientError> {
        let segment = format!("{script_id}:{verb}");
        let url = self.endpoint(&["scripts", &segment]);
        tracing::info!(script_id, verb, "script custom method");
        self.execute(self.build_request(Method::POST, url)?).await
    }
}
