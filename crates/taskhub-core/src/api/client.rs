use serde::Serialize;
use serde::de::DeserializeOwned;
use taskhub_shared::{
    Credentials, LoginResponse, PasswordReset, ProfileDto, ProfileUpdate, Registration, TaskDto,
    TaskId, TaskPage,
};
use tracing::{debug, warn};

use super::endpoint::Endpoint;
use super::error::ApiError;
use super::request::{ApiRequest, Body, Method, TaskDraft};
use super::transport::Transport;
use crate::session::Session;
use crate::validate;

/// One async method per server operation.
///
/// Authenticated calls take the caller's [`Session`] and send its access
/// token as a bearer header. Nothing is retried.
#[derive(Debug, Clone)]
pub struct ApiClient<T> {
    base_url: String,
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(base_url: impl Into<String>, transport: T) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[tracing::instrument(skip_all, fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        validate::check_registration(registration)?;
        self.call(
            Method::Post,
            Endpoint::Register,
            None,
            json_body(registration)?,
        )
        .await?;
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let body = self
            .call(Method::Post, Endpoint::Login, None, json_body(credentials)?)
            .await?;
        decode(&body)
    }

    #[tracing::instrument(skip_all)]
    pub async fn load_profile(&self, session: &Session) -> Result<ProfileDto, ApiError> {
        let body = self
            .call(Method::Get, Endpoint::Profile, Some(session), Body::Empty)
            .await?;
        decode(&body)
    }

    #[tracing::instrument(skip_all)]
    pub async fn update_profile(
        &self,
        session: &Session,
        update: &ProfileUpdate,
    ) -> Result<ProfileDto, ApiError> {
        let body = self
            .call(
                Method::Put,
                Endpoint::Profile,
                Some(session),
                json_body(update)?,
            )
            .await?;
        decode(&body)
    }

    #[tracing::instrument(skip_all)]
    pub async fn reset_password(
        &self,
        session: &Session,
        reset: &PasswordReset,
    ) -> Result<(), ApiError> {
        validate::check_password_reset(reset)?;
        self.call(
            Method::Post,
            Endpoint::PasswordReset,
            Some(session),
            json_body(reset)?,
        )
        .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, session))]
    pub async fn list_tasks(
        &self,
        session: &Session,
        search: Option<&str>,
    ) -> Result<Vec<TaskDto>, ApiError> {
        let endpoint = Endpoint::Tasks {
            search: search.map(str::to_string),
        };
        let body = self
            .call(Method::Get, endpoint, Some(session), Body::Empty)
            .await?;
        let tasks = decode::<TaskPage>(&body)?.into_tasks();
        debug!(count = tasks.len(), "tasks listed");
        Ok(tasks)
    }

    #[tracing::instrument(skip_all, fields(title = %draft.title))]
    pub async fn create_task(
        &self,
        session: &Session,
        draft: TaskDraft,
    ) -> Result<TaskDto, ApiError> {
        let body = self
            .call(
                Method::Post,
                Endpoint::Tasks { search: None },
                Some(session),
                Body::Multipart(draft.into_parts()),
            )
            .await?;
        decode(&body)
    }

    #[tracing::instrument(skip(self, session))]
    pub async fn fetch_task(&self, session: &Session, id: TaskId) -> Result<TaskDto, ApiError> {
        let body = self
            .call(Method::Get, Endpoint::Task(id), Some(session), Body::Empty)
            .await?;
        decode(&body)
    }

    #[tracing::instrument(skip(self, session, draft))]
    pub async fn update_task(
        &self,
        session: &Session,
        id: TaskId,
        draft: TaskDraft,
    ) -> Result<TaskDto, ApiError> {
        let body = self
            .call(
                Method::Patch,
                Endpoint::Task(id),
                Some(session),
                Body::Multipart(draft.into_parts()),
            )
            .await?;
        decode(&body)
    }

    #[tracing::instrument(skip(self, session))]
    pub async fn delete_task(&self, session: &Session, id: TaskId) -> Result<(), ApiError> {
        self.call(Method::Delete, Endpoint::Task(id), Some(session), Body::Empty)
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    pub async fn delete_all_tasks(&self, session: &Session) -> Result<(), ApiError> {
        self.call(
            Method::Delete,
            Endpoint::DeleteAllTasks,
            Some(session),
            Body::Empty,
        )
        .await?;
        Ok(())
    }

    async fn call(
        &self,
        method: Method,
        endpoint: Endpoint,
        session: Option<&Session>,
        body: Body,
    ) -> Result<String, ApiError> {
        let request = ApiRequest {
            method,
            url: endpoint.url(&self.base_url),
            authorization: session.and_then(Session::bearer),
            body,
        };
        let path = endpoint.path();
        debug!(%method, %path, "sending request");

        let response = self.transport.send(request).await.map_err(|error| {
            warn!(%method, %path, %error, "request failed before a response");
            ApiError::from(error)
        })?;

        if response.is_success() {
            debug!(%method, %path, status = response.status, "request succeeded");
            return Ok(response.body);
        }

        let error = ApiError::from_response(response.status, &response.body);
        warn!(
            %method,
            %path,
            status = response.status,
            body = %response.body,
            "request rejected"
        );
        Err(error)
    }
}

fn json_body<B: Serialize>(body: &B) -> Result<Body, ApiError> {
    serde_json::to_value(body)
        .map(Body::Json)
        .map_err(|error| ApiError::Decode(format!("failed to encode request body: {error}")))
}

fn decode<R: DeserializeOwned>(body: &str) -> Result<R, ApiError> {
    serde_json::from_str(body).map_err(|error| {
        warn!(%error, "failed to decode response body");
        ApiError::Decode(error.to_string())
    })
}
