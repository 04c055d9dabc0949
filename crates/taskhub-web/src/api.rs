use gloo::net::http::{
  Method as HttpMethod,
  RequestBuilder
};
use js_sys::{
  Array,
  Uint8Array
};
use taskhub_core::api::{
  ApiRequest,
  ApiResponse,
  Attachment,
  Body,
  FormPart,
  Method,
  Transport,
  TransportError
};
use wasm_bindgen::JsValue;
use web_sys::{
  AbortSignal,
  Blob,
  BlobPropertyBag,
  FormData,
  HtmlInputElement
};

/// `fetch` transport. Requests made with a signal fail as
/// [`TransportError::Aborted`] once it fires.
#[derive(Debug, Clone, Default)]
pub struct BrowserTransport {
  signal: Option<AbortSignal>
}

impl BrowserTransport {
  pub fn new(
    signal: Option<AbortSignal>
  ) -> Self {
    Self { signal }
  }

  fn was_aborted(&self) -> bool {
    self
      .signal
      .as_ref()
      .is_some_and(AbortSignal::aborted)
  }
}

impl Transport for BrowserTransport {
  async fn send(
    &self,
    request: ApiRequest
  ) -> Result<ApiResponse, TransportError>
  {
    let mut builder =
      RequestBuilder::new(&request.url)
        .method(http_method(
          request.method
        ))
        .header(
          "Accept",
          "application/json"
        )
        .abort_signal(
          self.signal.as_ref()
        );
    if let Some(authorization) =
      &request.authorization
    {
      builder = builder.header(
        "Authorization",
        authorization
      );
    }

    let built = match request.body {
      | Body::Empty => builder.build(),
      | Body::Json(value) => {
        builder
          .header(
            "Content-Type",
            "application/json"
          )
          .body(value.to_string())
      }
      | Body::Multipart(parts) => {
        builder.body(form_data(parts)?)
      }
    }
    .map_err(|error| {
      TransportError::Failed(
        error.to_string()
      )
    })?;

    let response = match built
      .send()
      .await
    {
      | Ok(response) => response,
      | Err(_) if self.was_aborted() => {
        tracing::debug!(
          url = %request.url,
          "request aborted"
        );
        return Err(
          TransportError::Aborted
        );
      }
      | Err(error) => {
        tracing::warn!(
          url = %request.url,
          error = %error,
          "fetch failed"
        );
        return Err(
          TransportError::Failed(
            error.to_string()
          )
        );
      }
    };

    let status = response.status();
    let body =
      response.text().await.map_err(
        |error| {
          if self.was_aborted() {
            TransportError::Aborted
          } else {
            TransportError::Failed(
              error.to_string()
            )
          }
        }
      )?;
    Ok(ApiResponse::new(status, body))
  }
}

fn http_method(
  method: Method
) -> HttpMethod {
  match method {
    | Method::Get => HttpMethod::GET,
    | Method::Post => HttpMethod::POST,
    | Method::Put => HttpMethod::PUT,
    | Method::Patch => {
      HttpMethod::PATCH
    }
    | Method::Delete => {
      HttpMethod::DELETE
    }
  }
}

fn js_failure(
  error: JsValue
) -> TransportError {
  TransportError::Failed(format!(
    "{error:?}"
  ))
}

fn form_data(
  parts: Vec<FormPart>
) -> Result<FormData, TransportError> {
  let form =
    FormData::new().map_err(js_failure)?;
  for part in parts {
    match part {
      | FormPart::Text {
        name,
        value
      } => {
        form
          .append_with_str(
            &name, &value
          )
          .map_err(js_failure)?
      }
      | FormPart::File {
        name,
        file
      } => {
        let blob = to_blob(&file)?;
        form
          .append_with_blob_and_filename(
            &name,
            &blob,
            &file.file_name
          )
          .map_err(js_failure)?
      }
    }
  }
  Ok(form)
}

fn to_blob(
  file: &Attachment
) -> Result<Blob, TransportError> {
  let bytes = Uint8Array::from(
    file.bytes.as_slice()
  );
  let parts = Array::of1(&bytes);
  let options = BlobPropertyBag::new();
  if let Some(content_type) =
    &file.content_type
  {
    options.set_type(content_type);
  }
  Blob::new_with_u8_array_sequence_and_options(
    &parts, &options
  )
  .map_err(js_failure)
}

/// Reads the first selected file of a file input.
pub async fn read_selected_file(
  input: Option<HtmlInputElement>
) -> Result<Option<Attachment>, String> {
  let Some(file) = input
    .and_then(|input| input.files())
    .and_then(|files| files.get(0))
  else {
    return Ok(None);
  };

  let file_name = file.name();
  let content_type = Some(file.type_())
    .filter(|value| !value.is_empty());
  let bytes =
    gloo::file::futures::read_as_bytes(
      &gloo::file::File::from(file)
    )
    .await
    .map_err(|error| {
      format!(
        "failed to read {file_name}: \
         {error}"
      )
    })?;

  Ok(Some(Attachment {
    file_name,
    content_type,
    bytes
  }))
}

/// Compile-time `TASKHUB_API_URL`, else `<page origin>/api`.
pub fn api_base_url() -> String {
  if let Some(url) =
    option_env!("TASKHUB_API_URL")
  {
    return url.to_string();
  }
  web_sys::window()
    .and_then(|window| {
      window.location().origin().ok()
    })
    .map(|origin| format!("{origin}/api"))
    .unwrap_or_else(|| {
      taskhub_core::config::DEFAULT_API_BASE_URL
        .to_string()
    })
}

/// IANA zone the browser reports through `Intl`.
pub fn browser_time_zone()
-> Option<String> {
  let options =
    js_sys::Intl::DateTimeFormat::new(
      &Array::new(),
      &js_sys::Object::new()
    )
    .resolved_options();
  js_sys::Reflect::get(
    &options,
    &JsValue::from_str("timeZone")
  )
  .ok()
  .and_then(|zone| zone.as_string())
}
