mod auth;
mod nav;
mod profile;
mod tasks;
mod toasts;

pub use auth::{
  LoginForm,
  RegisterForm
};
pub use nav::NavBar;
pub use profile::{
  PasswordResetPanel,
  ProfileForm
};
pub use tasks::{
  EditTaskModal,
  SearchBar,
  TaskForm,
  TaskTableView
};
pub use toasts::ToastStack;
use taskhub_core::api::FieldMessage;
use yew::{
  Callback,
  Html,
  InputEvent,
  TargetCast,
  UseStateHandle,
  html
};

/// Keeps a text state in sync with an `<input>` or `<textarea>`.
fn bind_input(
  state: &UseStateHandle<String>
) -> Callback<InputEvent> {
  let state = state.clone();
  Callback::from(move |e: InputEvent| {
    let value = e
      .target_dyn_into::<web_sys::HtmlInputElement>()
      .map(|input| input.value())
      .or_else(|| {
        e.target_dyn_into::<web_sys::HtmlTextAreaElement>()
          .map(|area| area.value())
      })
      .unwrap_or_default();
    state.set(value);
  })
}

/// Error area shared by every form; one line per message.
fn error_list(
  errors: &[FieldMessage]
) -> Html {
  if errors.is_empty() {
    return html! {};
  }

  html! {
      <div class="error-message">
          { for errors.iter().map(|message| html! { <p>{ message.to_string() }</p> }) }
      </div>
  }
}
