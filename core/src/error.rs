//! Error types for the shipping API client.
//!
//! # Design
//! Vendor-level failures arrive inside an HTTP 200 as an `errors` envelope.
//! `ApiClient` classifies them as `ApiError::BadRequest`; endpoint facades
//! then relabel the same payload with an endpoint-specific variant
//! (`Auth`, `Order`, ...) so callers can match on where the failure came
//! from. Mapping errors are never relabelled or swallowed: a response that
//! does not fit its declared shape is a vendor change or an SDK defect.

use serde_json::Value;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by `ApiClient` and the endpoint facades.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    /// The server returned a non-2xx status without a vendor error envelope.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body was not valid JSON.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Vendor error envelope, not yet attributed to an endpoint.
    #[error("bad request: {0}")]
    BadRequest(BadRequest),

    #[error("authentication rejected: {0}")]
    Auth(BadRequest),

    #[error("calculation rejected: {0}")]
    Calculation(BadRequest),

    #[error("order request rejected: {0}")]
    Order(BadRequest),

    #[error("cargo marking rejected: {0}")]
    Marking(BadRequest),

    #[error("label printing rejected: {0}")]
    Print(BadRequest),

    /// The response did not match the declared type descriptor.
    #[error("response mapping failed: {0}")]
    Mapping(#[from] MappingError),

    /// Invalid client configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Vendor operation groups, used to relabel `BadRequest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Auth,
    Calculation,
    Order,
    Marking,
    Print,
}

impl ApiError {
    /// Returns a closure that turns `BadRequest` into the endpoint-specific
    /// variant and passes every other error through untouched.
    pub fn for_endpoint(endpoint: Endpoint) -> impl Fn(ApiError) -> ApiError {
        move |err| match err {
            ApiError::BadRequest(bad) => match endpoint {
                Endpoint::Auth => ApiError::Auth(bad),
                Endpoint::Calculation => ApiError::Calculation(bad),
                Endpoint::Order => ApiError::Order(bad),
                Endpoint::Marking => ApiError::Marking(bad),
                Endpoint::Print => ApiError::Print(bad),
            },
            other => other,
        }
    }

    /// The vendor envelope carried by this error, whichever endpoint raised it.
    pub fn bad_request(&self) -> Option<&BadRequest> {
        match self {
            ApiError::BadRequest(bad)
            | ApiError::Auth(bad)
            | ApiError::Calculation(bad)
            | ApiError::Order(bad)
            | ApiError::Marking(bad)
            | ApiError::Print(bad) => Some(bad),
            _ => None,
        }
    }
}

/// A vendor error envelope (`{"errors": [...]}`) and the status it came with.
#[derive(Debug, Clone, PartialEq)]
pub struct BadRequest {
    pub status: u16,
    pub errors: Vec<VendorError>,
    /// The envelope exactly as received.
    pub envelope: Value,
}

impl BadRequest {
    /// Classify a decoded response body. Returns `None` unless the body is an
    /// object whose `errors` key holds a non-empty array.
    pub fn from_envelope(status: u16, body: &Value) -> Option<Self> {
        let errors = body.as_object()?.get("errors")?.as_array()?;
        if errors.is_empty() {
            return None;
        }
        Some(Self {
            status,
            errors: errors.iter().map(VendorError::from_value).collect(),
            envelope: body.clone(),
        })
    }
}

impl std::fmt::Display for BadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

/// One entry of the vendor `errors` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorError {
    pub code: Option<String>,
    pub message: String,
    pub field: Option<String>,
}

impl VendorError {
    fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self {
                code: None,
                message: match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
                field: None,
            };
        };
        let text = |key: &str| {
            obj.get(key).and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
        };
        Self {
            code: text("code"),
            message: text("message").unwrap_or_default(),
            field: text("field"),
        }
    }
}

impl std::fmt::Display for VendorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.code, &self.field) {
            (Some(code), Some(field)) => write!(f, "[{code}] {field}: {}", self.message),
            (Some(code), None) => write!(f, "[{code}] {}", self.message),
            (None, Some(field)) => write!(f, "{field}: {}", self.message),
            (None, None) => write!(f, "{}", self.message),
        }
    }
}

/// Failure to execute an HTTP request at all.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// A response value does not fit the type it is being mapped into.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappingError {
    #[error("expected {expected}, found {found}")]
    Shape {
        expected: &'static str,
        found: &'static str,
    },

    #[error("missing required field `{0}`")]
    MissingField(String),

    #[error("field `{key}`: cannot coerce {found} into {expected}")]
    Coercion {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("response body was empty")]
    EmptyResponse,

    /// A batch reply whose item count differs from the request count.
    #[error("expected {expected} results, found {found}")]
    LengthMismatch { expected: usize, found: usize },
}

/// Human-readable name of a JSON value's shape, for error messages.
pub(crate) fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
