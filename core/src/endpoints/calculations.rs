use tracing::{instrument, warn};

use super::CALCULATE_PATH;
use crate::client::{ApiClient, CallMode};
use crate::entity::Body;
use crate::error::{ApiError, Endpoint, MappingError, Result};
use crate::http::Transport;
use crate::instantiator::{array_of, single};
use crate::types::{CalculationRequest, CalculationResponse};

pub struct Calculations<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> Calculations<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    #[instrument(skip_all)]
    pub fn calculate(&self, request: &CalculationRequest) -> Result<CalculationResponse> {
        self.client
            .post(CALCULATE_PATH, request, &single::<CalculationResponse>(), CallMode::Sync)
            .map_err(ApiError::for_endpoint(Endpoint::Calculation))
    }

    /// Quote several shipments in one call through the provider's
    /// asynchronous calculator. Results come back in request order; a reply
    /// with a different item count is a `MappingError::LengthMismatch`.
    #[instrument(skip_all, fields(count = requests.len()))]
    pub fn calculate_batch(&self, requests: &[CalculationRequest]) -> Result<Vec<CalculationResponse>> {
        let results = self
            .client
            .post(
                CALCULATE_PATH,
                Body::batch(requests),
                &array_of::<CalculationResponse>(),
                CallMode::Async,
            )
            .map_err(ApiError::for_endpoint(Endpoint::Calculation))?;
        if results.len() != requests.len() {
            warn!(sent = requests.len(), received = results.len(), "batch size mismatch");
            return Err(ApiError::Mapping(MappingError::LengthMismatch {
                expected: requests.len(),
                found: results.len(),
            }));
        }
        Ok(results)
    }
}
