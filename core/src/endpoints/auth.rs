use tracing::instrument;

use super::AUTH_PATH;
use crate::client::{ApiClient, CallMode};
use crate::error::{ApiError, Endpoint, Result};
use crate::http::Transport;
use crate::instantiator::single;
use crate::types::{AuthRequest, AuthResponse};

pub struct Auth<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> Auth<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    /// Exchange credentials for a session identifier.
    #[instrument(skip_all, fields(login = request.login()))]
    pub fn authenticate(&self, request: &AuthRequest) -> Result<AuthResponse> {
        self.client
            .post(AUTH_PATH, request, &single::<AuthResponse>(), CallMode::Sync)
            .map_err(ApiError::for_endpoint(Endpoint::Auth))
    }

    pub fn login(&self, login: &str, password: &str) -> Result<AuthResponse> {
        self.authenticate(&AuthRequest::new(login, password))
    }
}

impl<T: Transport> ApiClient<T> {
    /// Log in and return this client bound to the new session.
    pub fn authenticate(self, login: &str, password: &str) -> Result<Self> {
        let session = self.auth().login(login, password)?;
        Ok(self.with_session(session.session_id()))
    }
}
