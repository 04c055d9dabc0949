use chrono::{
  DateTime,
  NaiveDate,
  Utc
};
use serde::{
  Deserialize,
  Deserializer,
  Serialize
};

/// Server-assigned task identifier.
pub type TaskId = u64;

fn null_as_default<'de, D, T>(
  deserializer: D
) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>
{
  Ok(
    Option::<T>::deserialize(
      deserializer
    )?
    .unwrap_or_default()
  )
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct UserSummary {
  #[serde(default)]
  pub id:       Option<u64>,
  #[serde(
    default,
    deserialize_with = "null_as_default"
  )]
  pub username: String,
  #[serde(
    default,
    deserialize_with = "null_as_default"
  )]
  pub email:    String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct TokenPair {
  pub access:  String,
  pub refresh: String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct LoginResponse {
  pub access:  String,
  pub refresh: String,
  #[serde(default)]
  pub user:    Option<UserSummary>
}

impl LoginResponse {
  pub fn tokens(&self) -> TokenPair {
    TokenPair {
      access:  self.access.clone(),
      refresh: self.refresh.clone()
    }
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct Credentials {
  pub email:    String,
  pub password: String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct Registration {
  pub email:            String,
  pub password:         String,
  pub password_confirm: String,
  pub full_name:        String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct PasswordReset {
  pub old_password:         String,
  pub new_password:         String,
  pub new_password_confirm: String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct TaskDto {
  pub id:          TaskId,
  #[serde(
    default,
    deserialize_with = "null_as_default"
  )]
  pub title:       String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub attachment:  Option<String>,
  pub created_at:  DateTime<Utc>,
  #[serde(default)]
  pub updated_at:  Option<DateTime<Utc>>
}

impl TaskDto {
  /// Last path segment of the attachment URL, if any.
  pub fn attachment_file_name(
    &self
  ) -> Option<&str> {
    self
      .attachment
      .as_deref()
      .filter(|url| !url.is_empty())
      .map(|url| {
        let path = url
          .split(['?', '#'])
          .next()
          .unwrap_or(url);
        path
          .rsplit('/')
          .next()
          .unwrap_or(path)
      })
  }
}

/// Paginated list envelope; bare arrays are accepted too.
#[derive(
  Debug, Clone, Deserialize,
)]
#[serde(untagged)]
pub enum TaskPage {
  Paginated {
    #[serde(default)]
    count:    Option<u64>,
    #[serde(default)]
    next:     Option<String>,
    #[serde(default)]
    previous: Option<String>,
    results:  Vec<TaskDto>
  },
  Bare(Vec<TaskDto>)
}

impl TaskPage {
  pub fn into_tasks(
    self
  ) -> Vec<TaskDto> {
    match self {
      | TaskPage::Paginated {
        results,
        ..
      } => results,
      | TaskPage::Bare(tasks) => tasks
    }
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
pub struct ProfileDto {
  #[serde(
    default,
    deserialize_with = "null_as_default"
  )]
  pub username:      String,
  #[serde(
    default,
    deserialize_with = "null_as_default"
  )]
  pub email:         String,
  #[serde(
    default,
    deserialize_with = "null_as_default"
  )]
  pub full_name:     String,
  #[serde(default)]
  pub date_of_birth: Option<NaiveDate>,
  #[serde(default)]
  pub address:       Option<String>,
  #[serde(default)]
  pub gender:        Option<String>,
  #[serde(
    default,
    deserialize_with = "null_as_default"
  )]
  pub mobile_number: String,
  #[serde(default)]
  pub created_at:
    Option<DateTime<Utc>>,
  #[serde(default)]
  pub updated_at:
    Option<DateTime<Utc>>
}

/// Body of `PUT /auth/profile/`. An absent date of birth is sent as
/// `null`.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
pub struct ProfileUpdate {
  pub email:         String,
  pub full_name:     String,
  pub date_of_birth: Option<NaiveDate>,
  pub address:       String,
  pub gender:        String,
  pub mobile_number: String
}

impl From<&ProfileDto> for ProfileUpdate {
  fn from(profile: &ProfileDto) -> Self {
    Self {
      email:         profile
        .email
        .clone(),
      full_name:     profile
        .full_name
        .clone(),
      date_of_birth: profile
        .date_of_birth,
      address:       profile
        .address
        .clone()
        .unwrap_or_default(),
      gender:        profile
        .gender
        .clone()
        .unwrap_or_default(),
      mobile_number: profile
        .mobile_number
        .clone()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn paginated_task_page_yields_results_in_order() {
    let raw = r#"{
      "count": 2,
      "next": null,
      "previous": null,
      "results": [
        {"id": 7, "title": "Write report", "description": null,
         "attachment": null, "created_at": "2024-03-01T09:30:00Z",
         "updated_at": "2024-03-01T09:30:00Z"},
        {"id": 3, "title": "Call bank", "description": "before noon",
         "attachment": "http://127.0.0.1:8000/media/task_attachments/a/form.pdf",
         "created_at": "2024-02-28T17:00:00.123456Z"}
      ]
    }"#;

    let page: TaskPage =
      serde_json::from_str(raw)
        .expect("decode page");
    let tasks = page.into_tasks();
    assert_eq!(
      tasks
        .iter()
        .map(|task| task.id)
        .collect::<Vec<_>>(),
      vec![7, 3]
    );
    assert_eq!(
      tasks[1].description.as_deref(),
      Some("before noon")
    );
    assert!(tasks[1].updated_at.is_none());
  }

  #[test]
  fn bare_array_is_accepted_as_task_page() {
    let raw = r#"[{"id": 1, "title": "t", "created_at": "2024-01-01T00:00:00+02:00"}]"#;
    let page: TaskPage =
      serde_json::from_str(raw)
        .expect("decode bare list");
    assert_eq!(page.into_tasks().len(), 1);
  }

  #[test]
  fn attachment_file_name_is_last_path_segment() {
    let mut task = TaskDto {
      id:          1,
      title:       "t".to_string(),
      description: None,
      attachment:  Some(
        "http://h/media/task_attachments/bob/notes.txt?x=1"
          .to_string()
      ),
      created_at:  "2024-01-01T00:00:00Z"
        .parse()
        .expect("timestamp"),
      updated_at:  None
    };
    assert_eq!(
      task.attachment_file_name(),
      Some("notes.txt")
    );

    task.attachment = Some(String::new());
    assert_eq!(
      task.attachment_file_name(),
      None
    );
  }

  #[test]
  fn profile_tolerates_nulls_and_prefills_update() {
    let raw = r#"{
      "username": "a@b.com",
      "email": "a@b.com",
      "full_name": null,
      "date_of_birth": "1990-05-17",
      "address": null,
      "gender": "F",
      "mobile_number": "5550100",
      "created_at": "2024-01-01T00:00:00Z",
      "updated_at": "2024-01-02T00:00:00Z"
    }"#;
    let profile: ProfileDto =
      serde_json::from_str(raw)
        .expect("decode profile");
    assert_eq!(profile.full_name, "");

    let update =
      ProfileUpdate::from(&profile);
    assert_eq!(update.address, "");
    assert_eq!(update.gender, "F");

    let body = serde_json::to_value(
      ProfileUpdate {
        date_of_birth: None,
        ..update
      }
    )
    .expect("encode update");
    assert!(
      body["date_of_birth"].is_null()
    );
  }

  #[test]
  fn login_response_user_is_optional() {
    let response: LoginResponse =
      serde_json::from_str(
        r#"{"access":"T1","refresh":"T2"}"#
      )
      .expect("decode login");
    assert_eq!(
      response.tokens(),
      TokenPair {
        access:  "T1".to_string(),
        refresh: "T2".to_string()
      }
    );
    assert!(response.user.is_none());
  }
}
