//! Typed responses: the raw status, headers and body of a round trip plus
//! the payloads decoded from it.

use std::borrow::Cow;

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde::de::DeserializeOwned;

use super::ClientError;
use super::models::ErrorEnvelope;

/// Marker payload for endpoints whose success carries no body (HTTP 204).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoContent;

/// A fully read response with lazily decoded typed fields.
///
/// `json200` is set only for a 200 with a JSON content type, `json404` only
/// for a 404 with a JSON content type. Every other status leaves both empty
/// and is still returned; the raw body stays available either way.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    pub json200: Option<T>,
    pub json404: Option<ErrorEnvelope>,
}

impl<T> ApiResponse<T> {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    fn from_parts_with(
        status: StatusCode,
        headers: HeaderMap,
        body: Vec<u8>,
        decode_success: bool,
    ) -> Result<Self, ClientError>
    where
        T: DeserializeOwned,
    {
        let json = is_json(&headers);
        let json200 = if decode_success && json && status == StatusCode::OK {
            Some(decode(status, &body)?)
        } else {
            None
        };
        let json404 = if json && status == StatusCode::NOT_FOUND {
            Some(decode(status, &body)?)
        } else {
            None
        };
        Ok(Self {
            status,
            headers,
            body,
            json200,
            json404,
        })
    }
}

impl<T: DeserializeOwned> ApiResponse<T> {
    /// Build from already-read parts.
    pub fn from_parts(
        status: StatusCode,
        headers: HeaderMap,
        body: Vec<u8>,
    ) -> Result<Self, ClientError> {
        Self::from_parts_with(status, headers, body, true)
    }

    pub(crate) async fn from_response(response: reqwest::Response) -> Result<Self, ClientError> {
        let (status, headers, body) = read(response).await?;
        Self::from_parts(status, headers, body)
    }
}

impl ApiResponse<NoContent> {
    /// Build from already-read parts without ever decoding a success body.
    pub fn from_empty_parts(
        status: StatusCode,
        headers: HeaderMap,
        body: Vec<u8>,
    ) -> Result<Self, ClientError> {
        ApiResponse::<ErrorEnvelope>::from_parts_with(status, headers, body, false).map(|r| {
            ApiResponse {
                status: r.status,
                headers: r.headers,
                body: r.body,
                json200: None,
                json404: r.json404,
            }
        })
    }

    pub(crate) async fn from_empty_response(
        response: reqwest::Response,
    ) -> Result<Self, ClientError> {
        let (status, headers, body) = read(response).await?;
        Self::from_empty_parts(status, headers, body)
    }
}

async fn read(response: reqwest::Response) -> Result<(StatusCode, HeaderMap, Vec<u8>), ClientError> {
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();
    tracing::trace!(%status, bytes = body.len(), "read response body");
    Ok((status, headers, body))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
}

fn decode<U: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<U, ClientError> {
    serde_json::from_slice(body).map_err(|source| ClientError::Decode {
        status,
        body: body.to_vec(),
        source,
    })
}
