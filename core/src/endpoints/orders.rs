use tracing::instrument;

use super::{ORDER_CANCEL_PATH, ORDER_CREATE_PATH, ORDER_HISTORY_PATH, ORDER_SEARCH_PATH};
use crate::client::{ApiClient, CallMode};
use crate::error::{ApiError, Endpoint, Result};
use crate::http::Transport;
use crate::instantiator::{array_of, single};
use crate::types::{
    CancelRequest, CancelResponse, OrderCreated, OrderHistory, OrderHistoryRequest, OrderRequest,
    OrderSearchRequest, OrderSearchResponse,
};

pub struct Orders<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> Orders<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    #[instrument(skip_all, fields(number = request.number()))]
    pub fn create(&self, request: &OrderRequest) -> Result<OrderCreated> {
        self.client
            .post(ORDER_CREATE_PATH, request, &single::<OrderCreated>(), CallMode::Sync)
            .map_err(ApiError::for_endpoint(Endpoint::Order))
    }

    #[instrument(skip_all)]
    pub fn cancel(&self, request: &CancelRequest) -> Result<CancelResponse> {
        self.client
            .post(ORDER_CANCEL_PATH, request, &single::<CancelResponse>(), CallMode::Sync)
            .map_err(ApiError::for_endpoint(Endpoint::Order))
    }

    #[instrument(skip_all, fields(page = request.page(), limit = request.limit()))]
    pub fn search(&self, request: &OrderSearchRequest) -> Result<OrderSearchResponse> {
        self.client
            .post(ORDER_SEARCH_PATH, request, &single::<OrderSearchResponse>(), CallMode::Sync)
            .map_err(ApiError::for_endpoint(Endpoint::Order))
    }

    #[instrument(skip_all)]
    pub fn history(&self, request: &OrderHistoryRequest) -> Result<Vec<OrderHistory>> {
        self.client
            .post(ORDER_HISTORY_PATH, request, &array_of::<OrderHistory>(), CallMode::Sync)
            .map_err(ApiError::for_endpoint(Endpoint::Order))
    }
}
