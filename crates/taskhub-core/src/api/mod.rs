//! HTTP gateway to the task service.

mod client;
mod endpoint;
mod error;
mod request;
mod transport;

pub use client::ApiClient;
pub use endpoint::Endpoint;
pub use error::{ApiError, FieldErrors, FieldMessage, GENERIC_FAILURE, field_label};
pub use request::{ApiRequest, ApiResponse, Attachment, Body, FormPart, Method, TaskDraft};
pub use transport::{Transport, TransportError};
