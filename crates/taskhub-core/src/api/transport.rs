use thiserror::Error;

use super::request::{ApiRequest, ApiResponse};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request was cancelled by its abort signal.
    #[error("request aborted")]
    Aborted,
    #[error("{0}")]
    Failed(String),
}

/// Sends one request and hands back the raw response.
///
/// Any HTTP status is a successful send; only failures to get a response
/// at all are errors.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

impl<T: Transport> Transport for &T {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        (**self).send(request).await
    }
}
