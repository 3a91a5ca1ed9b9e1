//! Blocking HTTP gateway to the shipping provider.
//!
//! # Design
//! `ApiClient` holds only immutable configuration and a `Transport`; it
//! carries no mutable state between calls. Each call is split into
//! `build_post`, which produces an `HttpRequest`, and `parse_response`,
//! which classifies an `HttpResponse` and maps it through the
//! `Instantiator`. `post` glues the two together around `Transport::send`.
//!
//! Response classification order:
//! 1. a JSON object with a non-empty `errors` array is a vendor error,
//!    whatever the HTTP status;
//! 2. any other non-2xx status is `ApiError::Http`;
//! 3. the body is decoded and instantiated with the declared descriptor.

use std::fmt;

use serde_json::Value;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::config::{ClientConfig, REDACTED};
use crate::endpoints::{Auth, Calculations, Marking, Orders, Printing};
use crate::entity::Body;
use crate::error::{ApiError, BadRequest, MappingError, Result};
use crate::http::{HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::instantiator::{Instantiator, TypeDescriptor};

pub const APP_KEY_FIELD: &str = "appKey";
pub const SESSION_HEADER: &str = "x-session-id";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Which variant of a vendor operation to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallMode {
    #[default]
    Sync,
    /// The provider's asynchronous variant (`<path>/async`). The provider
    /// computes server-side; this call still blocks until it answers.
    Async,
}

/// Synchronous client for the provider's JSON API.
#[derive(Clone)]
pub struct ApiClient<T = UreqTransport> {
    base_url: String,
    app_key: Option<String>,
    session_id: Option<String>,
    transport: T,
}

impl<T: fmt::Debug> fmt::Debug for ApiClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("app_key", &self.app_key.as_ref().map(|_| REDACTED))
            .field("session_id", &self.session_id.as_ref().map(|_| REDACTED))
            .field("transport", &self.transport)
            .finish()
    }
}

impl ApiClient<UreqTransport> {
    /// Client using the blocking `ureq` transport with the configured timeout.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = UreqTransport::new(config.timeout());
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            app_key: config.app_key,
            session_id: config.session_id,
            transport,
        }
    }

    /// Same client, authenticated with `session_id` for subsequent calls.
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn auth(&self) -> Auth<'_, T> {
        Auth::new(self)
    }

    pub fn calculations(&self) -> Calculations<'_, T> {
        Calculations::new(self)
    }

    pub fn orders(&self) -> Orders<'_, T> {
        Orders::new(self)
    }

    pub fn marking(&self) -> Marking<'_, T> {
        Marking::new(self)
    }

    pub fn printing(&self) -> Printing<'_, T> {
        Printing::new(self)
    }

    /// Serialize `body` and send it to `path`, mapping the answer with
    /// `descriptor`.
    #[instrument(skip(self, body, descriptor), fields(kind = ?descriptor.kind()))]
    pub fn post<'b, D: TypeDescriptor>(
        &self,
        path: &str,
        body: impl Into<Body<'b>>,
        descriptor: &D,
        mode: CallMode,
    ) -> Result<D::Output> {
        let request = self.build_post(path, body.into(), mode)?;
        let request_id = request.header(REQUEST_ID_HEADER).unwrap_or_default().to_string();
        debug!(url = %request.url, %request_id, "sending request");
        let response = self.transport.send(request)?;
        debug!(status = response.status, %request_id, "received response");
        self.parse_response(response, descriptor)
    }

    pub fn build_post(&self, path: &str, body: Body<'_>, mode: CallMode) -> Result<HttpRequest> {
        let mut maps = body.to_raw_maps();
        if let Some(app_key) = &self.app_key {
            for map in &mut maps {
                map.entry(APP_KEY_FIELD)
                    .or_insert_with(|| Value::String(app_key.clone()));
            }
        }
        let json = if body.is_batch() {
            Value::Array(maps.into_iter().map(Value::Object).collect())
        } else {
            maps.pop().map(Value::Object).unwrap_or(Value::Null)
        };
        let body = serde_json::to_string(&json).map_err(|e| ApiError::Serialization(e.to_string()))?;

        let suffix = match mode {
            CallMode::Sync => "",
            CallMode::Async => "/async",
        };
        let mut headers = vec![
            ("content-type".to_string(), "application/json".to_string()),
            ("accept".to_string(), "application/json".to_string()),
            (REQUEST_ID_HEADER.to_string(), Uuid::new_v4().to_string()),
        ];
        if let Some(session_id) = &self.session_id {
            headers.push((SESSION_HEADER.to_string(), session_id.clone()));
        }

        Ok(HttpRequest {
            url: format!("{}{}{suffix}", self.base_url, path),
            headers,
            body,
        })
    }

    pub fn parse_response<D: TypeDescriptor>(
        &self,
        response: HttpResponse,
        descriptor: &D,
    ) -> Result<D::Output> {
        let decoded = if response.body.trim().is_empty() {
            Ok(Value::Null)
        } else {
            serde_json::from_str::<Value>(&response.body)
        };

        if let Ok(value) = &decoded {
            if let Some(bad) = BadRequest::from_envelope(response.status, value) {
                warn!(status = response.status, errors = bad.errors.len(), "vendor rejected request");
                return Err(ApiError::BadRequest(bad));
            }
        }
        check_status(&response)?;

        let value = decoded.map_err(|e| ApiError::Deserialization(e.to_string()))?;
        let output = Instantiator::instantiate(descriptor, Some(value))?;
        output.ok_or(ApiError::Mapping(MappingError::EmptyResponse))
    }
}

/// Map non-2xx status codes to `ApiError::Http`.
fn check_status(response: &HttpResponse) -> Result<()> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}
