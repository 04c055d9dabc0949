use taskhub_core::api::TaskDraft;
use taskhub_core::table::{
  AttachmentLink,
  DELETE_ALL_PROMPT,
  DELETE_TASK_PROMPT,
  EDITOR_NO_ATTACHMENT,
  NO_ATTACHMENT,
  TaskRow,
  TaskTable
};
use taskhub_shared::{
  TaskDto,
  TaskId
};
use web_sys::HtmlInputElement;
use yew::{
  Callback,
  Html,
  MouseEvent,
  NodeRef,
  Properties,
  SubmitEvent,
  UseStateHandle,
  function_component,
  html,
  use_node_ref,
  use_state
};

use super::bind_input;
use crate::api::read_selected_file;

/// Reads the chosen file, then hands the draft to `emit`.
fn submit_draft(
  title: &UseStateHandle<String>,
  description: &UseStateHandle<String>,
  file_input: &NodeRef,
  emit: impl FnOnce(TaskDraft) + 'static
) {
  let mut draft = TaskDraft::new(
    (**title).clone(),
    (**description).clone()
  );
  let input =
    file_input.cast::<HtmlInputElement>();

  wasm_bindgen_futures::spawn_local(
    async move {
      match read_selected_file(input).await
      {
        | Ok(attachment) => {
          draft.attachment = attachment;
          emit(draft);
        }
        | Err(error) => {
          tracing::error!(
            %error,
            "attachment not submitted"
          );
        }
      }
    }
  );
}

#[derive(Properties, PartialEq)]
pub struct TaskFormProps {
  pub on_submit: Callback<TaskDraft>
}

#[function_component(TaskForm)]
pub fn task_form(
  props: &TaskFormProps
) -> Html {
  let title = use_state(String::new);
  let description =
    use_state(String::new);
  let file_input = use_node_ref();

  let onsubmit = {
    let title = title.clone();
    let description = description.clone();
    let file_input = file_input.clone();
    let on_submit =
      props.on_submit.clone();
    Callback::from(
      move |e: SubmitEvent| {
        e.prevent_default();
        let on_submit = on_submit.clone();
        submit_draft(
          &title,
          &description,
          &file_input,
          move |draft| on_submit.emit(draft)
        );
      }
    )
  };

  html! {
      <form id="task-form" class="task-form" {onsubmit}>
          <h2>{ "Create a New Task" }</h2>
          <input type="text" placeholder="Task title" required=true value={(*title).clone()} oninput={bind_input(&title)} />
          <textarea placeholder="Task description" value={(*description).clone()} oninput={bind_input(&description)} />
          <input type="file" ref={file_input} />
          <button type="submit" class="btn">{ "Add Task" }</button>
      </form>
  }
}

#[derive(Properties, PartialEq)]
pub struct SearchBarProps {
  pub value:     String,
  pub on_search: Callback<String>
}

/// Searches on submit only.
#[function_component(SearchBar)]
pub fn search_bar(
  props: &SearchBarProps
) -> Html {
  let initial = props.value.clone();
  let query = use_state(move || initial);

  let onsubmit = {
    let query = query.clone();
    let on_search =
      props.on_search.clone();
    Callback::from(
      move |e: SubmitEvent| {
        e.prevent_default();
        on_search
          .emit((*query).trim().to_string());
      }
    )
  };

  html! {
      <form id="search-form" class="search-form" {onsubmit}>
          <input type="search" placeholder="Search tasks..." value={(*query).clone()} oninput={bind_input(&query)} />
          <button type="submit" class="btn">{ "Search" }</button>
      </form>
  }
}

#[derive(Properties, PartialEq)]
pub struct TaskTableProps {
  pub table:         TaskTable,
  pub on_edit:       Callback<TaskId>,
  pub on_delete:     Callback<TaskId>,
  pub on_delete_all:
    Callback<MouseEvent>
}

fn confirmed(prompt: &str) -> bool {
  gloo::dialogs::confirm(prompt)
}

#[function_component(TaskTableView)]
pub fn task_table_view(
  props: &TaskTableProps
) -> Html {
  let delete_all = props
    .table
    .bulk_actions_visible()
    .then(|| {
      let on_delete_all =
        props.on_delete_all.clone();
      html! {
          <button
              id="delete-all-btn"
              class="btn danger"
              onclick={move |e| if confirmed(DELETE_ALL_PROMPT) { on_delete_all.emit(e) }}
          >
              { "Delete All Tasks" }
          </button>
      }
    })
    .unwrap_or_default();

  let body = match props.table.placeholder() {
    | Some(placeholder) => html! {
        <tr><td colspan="5" class="placeholder">{ placeholder }</td></tr>
    },
    | None => html! {
        { for props.table.rows().iter().map(|row| task_row(row, &props.on_edit, &props.on_delete)) }
    }
  };

  html! {
      <div class="task-list">
          <div class="task-list-header">
              <h2>{ "My Tasks" }</h2>
              { delete_all }
          </div>
          <table>
              <thead>
                  <tr>
                      <th>{ "Title" }</th>
                      <th>{ "Description" }</th>
                      <th>{ "Created" }</th>
                      <th>{ "Attachment" }</th>
                      <th>{ "Actions" }</th>
                  </tr>
              </thead>
              <tbody>{ body }</tbody>
          </table>
      </div>
  }
}

fn task_row(
  row: &TaskRow,
  on_edit: &Callback<TaskId>,
  on_delete: &Callback<TaskId>
) -> Html {
  let id = row.id;
  let on_edit = on_edit.clone();
  let on_delete = on_delete.clone();
  let attachment = match &row.attachment {
    | Some(link) => html! {
        <a href={link.url.clone()} target="_blank" rel="noopener">{ link.file_name.clone() }</a>
    },
    | None => html! { { NO_ATTACHMENT } }
  };

  html! {
      <tr key={id.to_string()}>
          <td>{ row.title.clone() }</td>
          <td>{ row.description.clone() }</td>
          <td>{ row.created.clone() }</td>
          <td>{ attachment }</td>
          <td class="actions">
              <button class="btn edit" onclick={move |_| on_edit.emit(id)}>{ "Edit" }</button>
              <button
                  class="btn danger"
                  onclick={move |_| if confirmed(DELETE_TASK_PROMPT) { on_delete.emit(id) }}
              >
                  { "Delete" }
              </button>
          </td>
      </tr>
  }
}

#[derive(Properties, PartialEq)]
pub struct EditTaskModalProps {
  pub task:      TaskDto,
  pub on_submit:
    Callback<(TaskId, TaskDraft)>,
  pub on_close:  Callback<MouseEvent>
}

#[function_component(EditTaskModal)]
pub fn edit_task_modal(
  props: &EditTaskModalProps
) -> Html {
  let initial_title =
    props.task.title.clone();
  let initial_description = props
    .task
    .description
    .clone()
    .unwrap_or_default();
  let title =
    use_state(move || initial_title);
  let description = use_state(move || {
    initial_description
  });
  let file_input = use_node_ref();

  let onsubmit = {
    let title = title.clone();
    let description = description.clone();
    let file_input = file_input.clone();
    let on_submit =
      props.on_submit.clone();
    let id = props.task.id;
    Callback::from(
      move |e: SubmitEvent| {
        e.prevent_default();
        let on_submit = on_submit.clone();
        submit_draft(
          &title,
          &description,
          &file_input,
          move |draft| {
            on_submit.emit((id, draft))
          }
        );
      }
    )
  };

  let current_file =
    match AttachmentLink::of(&props.task) {
      | Some(link) => html! {
          <p class="current-file">
              { "Current file: " }
              <a href={link.url} target="_blank" rel="noopener">{ link.file_name }</a>
          </p>
      },
      | None => html! {
          <p class="current-file">{ EDITOR_NO_ATTACHMENT }</p>
      }
    };

  // Clicks on the backdrop close the dialog; clicks inside it stay there.
  let keep_open =
    Callback::from(|e: MouseEvent| {
      e.stop_propagation()
    });

  html! {
      <div id="edit-modal" class="modal" onclick={props.on_close.clone()}>
          <div class="modal-content" onclick={keep_open}>
              <span class="close-btn" onclick={props.on_close.clone()}>{ "\u{00d7}" }</span>
              <h2>{ "Edit Task" }</h2>
              <form id="edit-task-form" {onsubmit}>
                  <input type="text" required=true value={(*title).clone()} oninput={bind_input(&title)} />
                  <textarea value={(*description).clone()} oninput={bind_input(&description)} />
                  { current_file }
                  <input type="file" ref={file_input} />
                  <button type="submit" class="btn">{ "Save Changes" }</button>
              </form>
          </div>
      </div>
  }
}
