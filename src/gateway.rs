//! Request/response shim in front of a [`SharedFilter`].
//!
//! The gateway speaks JSON but owns no transport: a server hands it the request path and body
//! and writes back the [`Response`] it returns. Two routes exist:
//!
//! - `/add/` with body `{"item": "..."}` answers `{"message": "Item added", "added": true}`
//! - `/check/` with body `{"item": "..."}` answers `{"exists": <bool>}`
//!
//! Bodies that cannot be decoded are answered with status `422`, unknown paths with `404` and
//! answers that cannot be encoded with `500`. All of them carry a body `{"detail": "..."}`.
//!
//! # Examples
//! ```
//! use bloomcheck::gateway::Gateway;
//! use bloomcheck::sizing::FilterConfig;
//!
//! let gateway = Gateway::from_config(FilterConfig::default());
//!
//! let response = gateway.handle("/add/", br#"{"item": "apple"}"#);
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body, br#"{"message":"Item added","added":true}"#);
//!
//! let response = gateway.handle("/check/", br#"{"item": "apple"}"#);
//! assert_eq!(response.body, br#"{"exists":true}"#);
//! ```
use log::{trace, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filters::shared::SharedFilter;
use crate::hash_utils::{HashFamily, Murmur3};
use crate::sizing::FilterConfig;

/// Request body of both routes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRequest {
    /// Item to add or check.
    pub item: String,
}

/// Response body of `/add/`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddResponse {
    /// Human readable outcome.
    pub message: String,
    /// Always `true`, adding an item cannot fail.
    pub added: bool,
}

/// Response body of `/check/`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    /// `false` if the item was definitely never added, `true` if it possibly was.
    pub exists: bool,
}

/// Response body of failed requests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// What went wrong.
    pub detail: String,
}

/// Routes served by the [`Gateway`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/add/`
    Add,
    /// `/check/`
    Check,
}

impl Route {
    /// Match a request path, with or without trailing slash.
    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "/add" => Some(Self::Add),
            "/check" => Some(Self::Check),
            _ => None,
        }
    }
}

/// Encoded response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    /// HTTP-style status code.
    pub status: u16,
    /// JSON body.
    pub body: Vec<u8>,
}

impl Response {
    fn json<T: Serialize>(status: u16, value: &T) -> serde_json::Result<Self> {
        let body = serde_json::to_vec(value)?;
        Ok(Self { status, body })
    }

    /// Encode `value` with status `200`, or answer `500` if it cannot be encoded.
    fn ok<T: Serialize>(value: &T) -> Self {
        Self::json(200, value).unwrap_or_else(|e| {
            warn!("cannot encode response: {}", e);
            Self::error(500, format!("cannot encode response: {}", e))
        })
    }

    fn error(status: u16, detail: impl Into<String>) -> Self {
        let body = serde_json::json!({ "detail": detail.into() });
        Self {
            status,
            body: body.to_string().into_bytes(),
        }
    }
}

/// Membership service on top of one filter that is sized once and shared by all clones.
#[derive(Clone, Debug)]
pub struct Gateway<H = Murmur3> {
    filter: SharedFilter<H>,
}

impl Gateway {
    /// Size the filter from `config`.
    pub fn from_config(config: FilterConfig) -> Self {
        Self::new(SharedFilter::with_config(config))
    }

    /// Size the filter from raw parameters.
    ///
    /// An [`Error::InvalidConfiguration`] means the service must not start.
    pub fn with_properties(
        expected_items: usize,
        target_false_positive_rate: f64,
    ) -> Result<Self> {
        match FilterConfig::new(expected_items, target_false_positive_rate) {
            Ok(config) => Ok(Self::from_config(config)),
            Err(e) => {
                warn!("refusing to start gateway: {}", e);
                Err(e)
            }
        }
    }

    /// Read a JSON config document and size the filter from it.
    pub fn from_json_config(json: &str) -> Result<Self> {
        let config: FilterConfig = serde_json::from_str(json).map_err(|e| {
            warn!("refusing to start gateway: {}", e);
            Error::invalid_configuration(e.to_string())
        })?;
        Ok(Self::from_config(config))
    }
}

impl<H> Gateway<H>
where
    H: HashFamily,
{
    /// Serve requests from an existing filter handle.
    pub fn new(filter: SharedFilter<H>) -> Self {
        Self { filter }
    }

    /// Get filter handle.
    pub fn filter(&self) -> &SharedFilter<H> {
        &self.filter
    }

    /// Add item.
    pub fn add(&self, request: &ItemRequest) -> AddResponse {
        self.filter.insert(&request.item);
        trace!("added item ({} bytes)", request.item.len());
        AddResponse {
            message: "Item added".to_owned(),
            added: true,
        }
    }

    /// Check item.
    pub fn check(&self, request: &ItemRequest) -> CheckResponse {
        let exists = self.filter.query(&request.item);
        trace!("checked item ({} bytes): exists={}", request.item.len(), exists);
        CheckResponse { exists }
    }

    /// Decode `body` and dispatch it to `route`.
    ///
    /// Fails with [`Error::MalformedRequest`] if `body` is not a valid [`ItemRequest`].
    pub fn dispatch(&self, route: Route, body: &[u8]) -> Result<Response> {
        let request: ItemRequest = serde_json::from_slice(body)?;
        let response = match route {
            Route::Add => Response::ok(&self.add(&request)),
            Route::Check => Response::ok(&self.check(&request)),
        };
        Ok(response)
    }

    /// Serve one request.
    pub fn handle(&self, path: &str, body: &[u8]) -> Response {
        let Some(route) = Route::from_path(path) else {
            trace!("no route for {}", path);
            return Response::error(404, "Not Found");
        };

        self.dispatch(route, body).unwrap_or_else(|e| {
            trace!("rejected request for {:?}: {}", route, e);
            Response::error(422, e.to_string())
        })
    }
}
