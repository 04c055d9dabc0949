use std::cell::{
  Ref,
  RefCell
};
use std::rc::Rc;

use gloo::timers::future::TimeoutFuture;
use taskhub_core::api::{
  ApiClient,
  TaskDraft
};
use taskhub_core::app::{
  Call,
  Effect,
  Form,
  Msg
};
use taskhub_core::config::ClientConfig;
use taskhub_core::datetime::parse_timezone;
use taskhub_core::runtime::execute;
use taskhub_core::toast::ToastTimer;
use taskhub_core::view::{
  AuthForm,
  Screen,
  View
};
use taskhub_shared::TaskId;
use web_sys::AbortController;
use yew::{
  Callback,
  Html,
  MouseEvent,
  function_component,
  html,
  use_effect_with,
  use_force_update,
  use_memo
};

use crate::api::{
  BrowserTransport,
  api_base_url,
  browser_time_zone
};
use crate::components::{
  EditTaskModal,
  LoginForm,
  NavBar,
  PasswordResetPanel,
  ProfileForm,
  RegisterForm,
  SearchBar,
  TaskForm,
  TaskTableView,
  ToastStack
};
use crate::storage::LocalStore;

type Client = taskhub_core::App<LocalStore>;

/// Feeds messages into the client state machine and runs its effects
/// on the browser event loop.
#[derive(Clone)]
pub struct Dispatcher {
  inner: Rc<Inner>
}

struct Inner {
  client:   RefCell<Client>,
  base_url: String,
  abort:    RefCell<Option<(u64, AbortController)>>,
  redraw:   Callback<()>
}

impl PartialEq for Dispatcher {
  fn eq(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.inner, &other.inner)
  }
}

impl Dispatcher {
  fn new(redraw: Callback<()>) -> Self {
    let base_url = api_base_url();
    let mut config = ClientConfig::default();
    config.api.base_url = base_url.clone();

    let mut client =
      Client::new(LocalStore, &config);
    if let Some(tz) = browser_time_zone()
      .as_deref()
      .and_then(parse_timezone)
    {
      client = client.with_timezone(tz);
    }
    tracing::info!(
      base_url = %base_url,
      tz = %client.timezone(),
      "client configured"
    );

    Self {
      inner: Rc::new(Inner {
        client: RefCell::new(client),
        base_url: config
          .api_base_url()
          .to_string(),
        abort: RefCell::new(None),
        redraw
      })
    }
  }

  pub fn state(&self) -> Ref<'_, Client> {
    self.inner.client.borrow()
  }

  pub fn callback<T, F>(
    &self,
    make: F
  ) -> Callback<T>
  where
    F: Fn(T) -> Msg + 'static,
    T: 'static
  {
    let this = self.clone();
    Callback::from(move |value| {
      this.send(make(value))
    })
  }

  fn start(&self) {
    let effects = self
      .inner
      .client
      .borrow_mut()
      .start();
    self.after_update(effects);
  }

  pub fn send(&self, msg: Msg) {
    let effects = self
      .inner
      .client
      .borrow_mut()
      .update(msg);
    self.after_update(effects);
  }

  fn after_update(
    &self,
    effects: Vec<Effect>
  ) {
    self.abort_stale_loads();
    for effect in effects {
      match effect {
        | Effect::Call(call) => {
          self.spawn_call(call)
        }
        | Effect::Timer(timer) => {
          self.spawn_timer(timer)
        }
      }
    }
    self.inner.redraw.emit(());
  }

  /// Cancels view-scoped fetches issued under an older epoch.
  fn abort_stale_loads(&self) {
    let epoch =
      self.state().views().epoch();
    let mut abort =
      self.inner.abort.borrow_mut();
    match abort.as_ref() {
      | Some((current, _))
        if *current == epoch => {}
      | _ => {
        if let Some((old, controller)) =
          abort.take()
        {
          tracing::debug!(
            old,
            epoch,
            "aborting stale loads"
          );
          controller.abort();
        }
        match AbortController::new() {
          | Ok(controller) => {
            *abort =
              Some((epoch, controller))
          }
          | Err(error) => {
            tracing::warn!(
              ?error,
              "AbortController unavailable"
            )
          }
        }
      }
    }
  }

  fn spawn_call(&self, call: Call) {
    let signal = if call.is_view_scoped()
    {
      self
        .inner
        .abort
        .borrow()
        .as_ref()
        .map(|(_, controller)| {
          controller.signal()
        })
    } else {
      None
    };
    let session =
      self.state().session().clone();
    let api = ApiClient::new(
      self.inner.base_url.clone(),
      BrowserTransport::new(signal)
    );
    let this = self.clone();

    wasm_bindgen_futures::spawn_local(
      async move {
        let msg =
          execute(&api, &session, call)
            .await;
        this.send(msg);
      }
    );
  }

  fn spawn_timer(
    &self,
    timer: ToastTimer
  ) {
    let (msg, after) = match timer {
      | ToastTimer::Reveal {
        id,
        after
      } => (Msg::ToastRevealed(id), after),
      | ToastTimer::Expire {
        id,
        after
      } => (Msg::ToastExpired(id), after),
      | ToastTimer::Remove {
        id,
        after
      } => (Msg::ToastRemoved(id), after)
    };
    let millis =
      u32::try_from(after.as_millis())
        .unwrap_or(u32::MAX);
    let this = self.clone();

    wasm_bindgen_futures::spawn_local(
      async move {
        TimeoutFuture::new(millis).await;
        this.send(msg);
      }
    );
  }
}

#[function_component(App)]
pub fn app() -> Html {
  let trigger = use_force_update();
  let dispatcher = use_memo((), {
    let trigger = trigger.clone();
    move |_| {
      Dispatcher::new(Callback::from(
        move |_| trigger.force_update()
      ))
    }
  });

  {
    let dispatcher = dispatcher.clone();
    use_effect_with((), move |_| {
      dispatcher.start();
      || ()
    });
  }

  let dispatcher = (*dispatcher).clone();
  let state = dispatcher.state();
  let screen = state.screen();

  let body = match screen {
    | Screen::SignedOut {
      form: AuthForm::Login
    } => {
      let form = state.form(Form::Login);
      html! {
          <div class="auth-container">
              <LoginForm
                  key={form.generation.to_string()}
                  errors={form.errors.clone()}
                  on_submit={dispatcher.callback(Msg::SubmitLogin)}
                  on_show_register={dispatcher.callback(|_: MouseEvent| Msg::ShowRegisterForm)}
              />
          </div>
      }
    }
    | Screen::SignedOut {
      form: AuthForm::Register
    } => {
      let form =
        state.form(Form::Register);
      html! {
          <div class="auth-container">
              <RegisterForm
                  key={form.generation.to_string()}
                  errors={form.errors.clone()}
                  on_submit={dispatcher.callback(Msg::SubmitRegistration)}
                  on_show_login={dispatcher.callback(|_: MouseEvent| Msg::ShowLoginForm)}
              />
          </div>
      }
    }
    | Screen::SignedIn {
      view: View::Tasks
    } => {
      let new_task =
        state.form(Form::NewTask);
      let editor = state.editor().cloned();
      html! {
          <div class="task-manager-container">
              <TaskForm
                  key={new_task.generation.to_string()}
                  on_submit={dispatcher.callback(Msg::SubmitNewTask)}
              />
              <SearchBar
                  key={state.search_generation().to_string()}
                  value={state.search().to_string()}
                  on_search={dispatcher.callback(Msg::Search)}
              />
              <TaskTableView
                  table={state.table().clone()}
                  on_edit={dispatcher.callback(Msg::EditTask)}
                  on_delete={dispatcher.callback(Msg::DeleteTask)}
                  on_delete_all={dispatcher.callback(|_: MouseEvent| Msg::DeleteAllTasks)}
              />
              {
                  match editor {
                      Some(task) => html! {
                          <EditTaskModal
                              key={task.id.to_string()}
                              task={task}
                              on_submit={dispatcher.callback(|(id, draft): (TaskId, TaskDraft)| Msg::SubmitTaskEdit { id, draft })}
                              on_close={dispatcher.callback(|_: MouseEvent| Msg::CloseEditor)}
                          />
                      },
                      None => html! {}
                  }
              }
          </div>
      }
    }
    | Screen::SignedIn {
      view: View::Profile
    } => {
      let profile_form =
        state.form(Form::Profile);
      let reset_form =
        state.form(Form::PasswordReset);
      html! {
          <div class="profile-manager-container">
              <ProfileForm
                  key={profile_form.generation.to_string()}
                  profile={state.profile().cloned()}
                  errors={profile_form.errors.clone()}
                  on_submit={dispatcher.callback(Msg::SubmitProfile)}
              />
              <PasswordResetPanel
                  key={reset_form.generation.to_string()}
                  open={state.views().password_panel_open()}
                  errors={reset_form.errors.clone()}
                  on_toggle={dispatcher.callback(|_: MouseEvent| Msg::TogglePasswordPanel)}
                  on_submit={dispatcher.callback(Msg::SubmitPasswordReset)}
              />
          </div>
      }
    }
  };

  let active = state.views().active_view();
  let toasts = state.toasts().to_vec();
  drop(state);

  html! {
      <div class="container">
          <header>
              <h1>{ "TaskHub" }</h1>
              <NavBar
                  active={active}
                  on_tasks={dispatcher.callback(|_: MouseEvent| Msg::ShowTasks)}
                  on_profile={dispatcher.callback(|_: MouseEvent| Msg::ShowProfile)}
                  on_logout={dispatcher.callback(|_: MouseEvent| Msg::Logout)}
              />
          </header>
          <main>{ body }</main>
          <ToastStack
              toasts={toasts}
              on_hidden={dispatcher.callback(Msg::ToastRemoved)}
          />
      </div>
  }
}
