use std::fmt;

use serde_json::Value;

use crate::container::{GenericContainer, RawMap};
use crate::entity::{put, RequestEntity};
use crate::error::MappingError;
use crate::instantiator::ResponseEntity;

/// Login/password exchange for a session identifier.
#[derive(Clone)]
pub struct AuthRequest {
    extra: RawMap,
    login: String,
    password: String,
}

impl AuthRequest {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            extra: RawMap::new(),
            login: login.into(),
            password: password.into(),
        }
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn set_extra(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

impl fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthRequest")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl RequestEntity for AuthRequest {
    fn to_raw(&self) -> RawMap {
        let mut map = self.extra.clone();
        put(&mut map, "login", self.login.as_str());
        put(&mut map, "password", self.password.as_str());
        map
    }
}

#[derive(Debug, Clone)]
pub struct AuthResponse {
    session_id: String,
    expires_at: Option<String>,
    raw: GenericContainer,
}

impl AuthResponse {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// ISO 8601 expiry, when the provider reports one.
    pub fn expires_at(&self) -> Option<&str> {
        self.expires_at.as_deref()
    }

    pub fn raw(&self) -> &GenericContainer {
        &self.raw
    }
}

impl ResponseEntity for AuthResponse {
    fn from_raw(raw: RawMap) -> Result<Self, MappingError> {
        let raw = GenericContainer::new(raw);
        Ok(Self {
            session_id: raw.require("sessionId")?,
            expires_at: raw.get_as("expiresAt")?,
            raw,
        })
    }
}
