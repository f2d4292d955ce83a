//! Request decoration hooks.
//!
//! Every request built by the client passes through its editors right before
//! it is sent. Credentials are attached here; signing schemes live outside
//! this crate and plug in by implementing [`RequestEditor`].

use std::fmt;

use reqwest::Request;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};

use super::ClientError;

/// Hook invoked on each outgoing request before it is sent.
pub trait RequestEditor: Send + Sync {
    fn edit(&self, request: &mut Request) -> Result<(), ClientError>;
}

impl<F> RequestEditor for F
where
    F: Fn(&mut Request) -> Result<(), ClientError> + Send + Sync,
{
    fn edit(&self, request: &mut Request) -> Result<(), ClientError> {
        self(request)
    }
}

/// Attaches `Authorization: Bearer <token>`.
#[derive(Clone)]
pub struct BearerToken {
    value: HeaderValue,
}

impl BearerToken {
    pub fn new(token: &str) -> Result<Self, ClientError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ClientError::Validation("bearer token is empty".into()));
        }
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| ClientError::Validation(format!("invalid bearer token: {e}")))?;
        value.set_sensitive(true);
        Ok(Self { value })
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

impl RequestEditor for BearerToken {
    fn edit(&self, request: &mut Request) -> Result<(), ClientError> {
        request
            .headers_mut()
            .insert(AUTHORIZATION, self.value.clone());
        Ok(())
    }
}

/// Sets one fixed header on every request (replacing any previous value).
#[derive(Debug, Clone)]
pub struct StaticHeader {
    name: HeaderName,
    value: HeaderValue,
}

impl StaticHeader {
    pub fn new(name: &str, value: &str) -> Result<Self, ClientError> {
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|e| ClientError::Validation(format!("invalid header name '{name}': {e}")))?;
        let value = HeaderValue::from_str(value.trim()).map_err(|e| {
            ClientError::Validation(format!("invalid value for header '{name}': {e}"))
        })?;
        Ok(Self { name, value })
    }

    pub fn name(&self) -> &HeaderName {
        &self.name
    }
}

impl RequestEditor for StaticHeader {
    fn edit(&self, request: &mut Request) -> Result<(), ClientError> {
        request
            .headers_mut()
            .insert(self.name.clone(), self.value.clone());
        Ok(())
    }
}
