use chrono_tz::Tz;
use taskhub_shared::{TaskDto, TaskId};

use crate::datetime::format_local_date;

pub const EMPTY_PLACEHOLDER: &str = "You have no tasks yet. Create one above!";
pub const NO_ATTACHMENT: &str = "None";
/// Shown in the edit dialog when the task carries no file.
pub const EDITOR_NO_ATTACHMENT: &str = "No attachment.";
pub const DELETE_TASK_PROMPT: &str = "Are you sure you want to delete this task?";
pub const DELETE_ALL_PROMPT: &str =
    "Are you sure you want to delete ALL of your tasks? This action cannot be undone.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentLink {
    pub url: String,
    pub file_name: String,
}

impl AttachmentLink {
    pub fn of(task: &TaskDto) -> Option<Self> {
        let url = task.attachment.as_ref()?;
        task.attachment_file_name().map(|file_name| Self {
            url: url.clone(),
            file_name: file_name.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub created: String,
    pub attachment: Option<AttachmentLink>,
}

/// Display model of the task list; rebuilt from scratch on every load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskTable {
    Empty { placeholder: &'static str },
    Rows(Vec<TaskRow>),
}

impl Default for TaskTable {
    fn default() -> Self {
        TaskTable::Empty {
            placeholder: EMPTY_PLACEHOLDER,
        }
    }
}

impl TaskTable {
    #[tracing::instrument(skip_all, fields(count = tasks.len()))]
    pub fn render(tasks: &[TaskDto], tz: &Tz) -> Self {
        if tasks.is_empty() {
            return Self::default();
        }

        let rows = tasks
            .iter()
            .map(|task| TaskRow {
                id: task.id,
                title: task.title.clone(),
                description: task.description.clone().unwrap_or_default(),
                created: format_local_date(task.created_at, tz),
                attachment: AttachmentLink::of(task),
            })
            .collect();

        TaskTable::Rows(rows)
    }

    pub fn rows(&self) -> &[TaskRow] {
        match self {
            TaskTable::Rows(rows) => rows,
            TaskTable::Empty { .. } => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            TaskTable::Empty { placeholder } => Some(placeholder),
            TaskTable::Rows(_) => None,
        }
    }

    /// The delete-all control is only offered when there is something to delete.
    pub fn bulk_actions_visible(&self) -> bool {
        !self.is_empty()
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.rows().iter().any(|row| row.id == id)
    }
}
