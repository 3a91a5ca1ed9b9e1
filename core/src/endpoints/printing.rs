use tracing::instrument;

use super::PRINT_PATH;
use crate::client::{ApiClient, CallMode};
use crate::error::{ApiError, Endpoint, Result};
use crate::http::Transport;
use crate::instantiator::single;
use crate::types::{PrintRequest, PrintResponse};

pub struct Printing<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> Printing<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    #[instrument(skip_all)]
    pub fn print_labels(&self, request: &PrintRequest) -> Result<PrintResponse> {
        self.client
            .post(PRINT_PATH, request, &single::<PrintResponse>(), CallMode::Sync)
            .map_err(ApiError::for_endpoint(Endpoint::Print))
    }
}
