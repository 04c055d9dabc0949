use std::time::Duration;

use anyhow::Context;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use taskhub_core::api::{
    ApiRequest, ApiResponse, Body, FormPart, Method, Transport, TransportError,
};
use tracing::{debug, warn};

/// Blocking-free HTTP transport for the terminal client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("taskhub/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed building HTTP client")?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut builder = self
            .client
            .request(reqwest_method(request.method), request.url.as_str())
            .header(ACCEPT, "application/json");

        if let Some(authorization) = &request.authorization {
            builder = builder.header(AUTHORIZATION, authorization.as_str());
        }

        builder = match request.body {
            Body::Empty => builder,
            Body::Json(value) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(value.to_string()),
            Body::Multipart(parts) => builder.multipart(multipart_form(parts)?),
        };

        let response = builder.send().await.map_err(|error| {
            warn!(url = %request.url, %error, "HTTP request failed");
            TransportError::Failed(error.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|error| TransportError::Failed(format!("failed reading response: {error}")))?;
        debug!(status, bytes = body.len(), "HTTP response");
        Ok(ApiResponse::new(status, body))
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn multipart_form(parts: Vec<FormPart>) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name, value),
            FormPart::File { name, file } => {
                let mut body = Part::bytes(file.bytes).file_name(file.file_name);
                if let Some(content_type) = file.content_type {
                    body = body.mime_str(&content_type).map_err(|error| {
                        TransportError::Failed(format!("invalid content type {content_type}: {error}"))
                    })?;
                }
                form.part(name, body)
            }
        };
    }
    Ok(form)
}
