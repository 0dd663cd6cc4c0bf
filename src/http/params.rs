//! Request parameters.
//!
//! Clients send `token`, `key` and `value` either in the query string or in a
//! urlencoded body, and older scripts POST with everything in the query. The
//! [`FormValues`] extractor collects both: body pairs first, then query pairs.
//! Lookups take the first occurrence of a name, so the body wins over the
//! query and a repeated name does not fail the request.

use crate::http::error::ApiError;
use axum::async_trait;
use axum::extract::{Form, FromRequest, Query, Request};
use axum::http::{header, Method};
use tracing::debug;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Name/value pairs from the request body and query string, in lookup order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormValues(Vec<(String, String)>);

impl FormValues {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    /// The first value given for `name`, or `""` when it is absent.
    pub fn value(&self, name: &str) -> &str {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .unwrap_or_default()
    }
}

fn has_form_body(req: &Request) -> bool {
    if req.method() == Method::GET || req.method() == Method::HEAD {
        return false;
    }

    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with(FORM_CONTENT_TYPE))
}

#[async_trait]
impl<S> FromRequest<S> for FormValues
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<Vec<(String, String)>>::try_from_uri(req.uri()).map_err(|e| {
            debug!(error = %e, "Rejected malformed query string");
            ApiError::InvalidForm
        })?;

        // Bodies of any other content type are ignored, not rejected.
        let mut pairs = if has_form_body(&req) {
            let Form(body) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| {
                    debug!(error = %e, "Rejected malformed form body");
                    ApiError::InvalidForm
                })?;
            body
        } else {
            Vec::new()
        };

        pairs.extend(query);
        Ok(Self(pairs))
    }
}
