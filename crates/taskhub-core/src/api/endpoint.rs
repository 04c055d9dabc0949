use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use taskhub_shared::TaskId;

/// Characters `encodeURIComponent` leaves alone.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Register,
    Login,
    Profile,
    PasswordReset,
    Tasks { search: Option<String> },
    Task(TaskId),
    DeleteAllTasks,
}

impl Endpoint {
    /// Path below the API base, always with a trailing slash.
    pub fn path(&self) -> String {
        match self {
            Endpoint::Register => "/auth/register/".to_string(),
            Endpoint::Login => "/auth/login/".to_string(),
            Endpoint::Profile => "/auth/profile/".to_string(),
            Endpoint::PasswordReset => "/auth/password/reset/".to_string(),
            Endpoint::Tasks { search } => match search.as_deref().filter(|q| !q.is_empty()) {
                Some(query) => format!(
                    "/tasks/?search={}",
                    utf8_percent_encode(query, QUERY_VALUE)
                ),
                None => "/tasks/".to_string(),
            },
            Endpoint::Task(id) => format!("/tasks/{id}/"),
            Endpoint::DeleteAllTasks => "/tasks/delete-all/".to_string(),
        }
    }

    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path())
    }

    /// Whether the server expects a bearer token here.
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Endpoint::Register | Endpoint::Login)
    }
}
