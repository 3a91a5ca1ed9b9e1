use tracing::instrument;

use super::MARKING_PATH;
use crate::client::{ApiClient, CallMode};
use crate::error::{ApiError, Endpoint, Result};
use crate::http::Transport;
use crate::instantiator::single;
use crate::types::{MarkingRequest, MarkingResponse};

pub struct Marking<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> Marking<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    #[instrument(skip_all)]
    pub fn mark_cargo(&self, request: &MarkingRequest) -> Result<MarkingResponse> {
        self.client
            .post(MARKING_PATH, request, &single::<MarkingResponse>(), CallMode::Sync)
            .map_err(ApiError::for_endpoint(Endpoint::Marking))
    }
}
