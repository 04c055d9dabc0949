//! Message/effect loop tying the client together.
//!
//! Front-ends turn user input into [`Msg`]s and feed them to
//! [`App::update`]. The returned [`Effect`]s are API calls to run (see
//! [`crate::runtime::execute`]) and toast timers to arm; each call
//! completes with another `Msg`.

use chrono_tz::Tz;
use taskhub_shared::{
    Credentials, LoginResponse, PasswordReset, ProfileDto, ProfileUpdate, Registration, TaskDto,
    TaskId,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::api::{ApiError, FieldMessage, TaskDraft};
use crate::config::ClientConfig;
use crate::session::{KeyValueStore, Session, SessionStore};
use crate::table::TaskTable;
use crate::toast::{Toast, ToastCenter, ToastKind, ToastTimer};
use crate::validate;
use crate::view::{Screen, View, ViewController, ViewLoad};

pub const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
pub const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    Login,
    Register,
    NewTask,
    Profile,
    PasswordReset,
}

/// Error lines and reset counter of one form.
///
/// Front-ends key the form on `generation`; a bump means "clear the inputs".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub errors: Vec<FieldMessage>,
    pub generation: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Forms {
    login: FormState,
    register: FormState,
    new_task: FormState,
    profile: FormState,
    password_reset: FormState,
}

impl Forms {
    fn get(&self, form: Form) -> &FormState {
        match form {
            Form::Login => &self.login,
            Form::Register => &self.register,
            Form::NewTask => &self.new_task,
            Form::Profile => &self.profile,
            Form::PasswordReset => &self.password_reset,
        }
    }

    fn get_mut(&mut self, form: Form) -> &mut FormState {
        match form {
            Form::Login => &mut self.login,
            Form::Register => &mut self.register,
            Form::NewTask => &mut self.new_task,
            Form::Profile => &mut self.profile,
            Form::PasswordReset => &mut self.password_reset,
        }
    }

    fn reset(&mut self, form: Form) {
        let state = self.get_mut(form);
        state.errors.clear();
        state.generation += 1;
    }
}

/// One gateway operation to run.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Register(Registration),
    Login(Credentials),
    ListTasks { generation: u64, search: Option<String> },
    CreateTask(TaskDraft),
    FetchTask { epoch: u64, id: TaskId },
    UpdateTask { id: TaskId, draft: TaskDraft },
    DeleteTask(TaskId),
    DeleteAllTasks,
    LoadProfile { epoch: u64 },
    UpdateProfile(ProfileUpdate),
    ResetPassword(PasswordReset),
}

impl Call {
    /// Loads that only matter to the view they were issued for. These
    /// may be aborted on the next transition; mutations never are.
    pub fn is_view_scoped(&self) -> bool {
        matches!(
            self,
            Call::ListTasks { .. } | Call::FetchTask { .. } | Call::LoadProfile { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Call::Register(_) => "register",
            Call::Login(_) => "login",
            Call::ListTasks { .. } => "list_tasks",
            Call::CreateTask(_) => "create_task",
            Call::FetchTask { .. } => "fetch_task",
            Call::UpdateTask { .. } => "update_task",
            Call::DeleteTask(_) => "delete_task",
            Call::DeleteAllTasks => "delete_all_tasks",
            Call::LoadProfile { .. } => "load_profile",
            Call::UpdateProfile(_) => "update_profile",
            Call::ResetPassword(_) => "reset_password",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Call(Call),
    Timer(ToastTimer),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    ShowRegisterForm,
    ShowLoginForm,
    SubmitRegistration(Registration),
    SubmitLogin(Credentials),
    Logout,
    ShowTasks,
    ShowProfile,
    Search(String),
    SubmitNewTask(TaskDraft),
    EditTask(TaskId),
    CloseEditor,
    SubmitTaskEdit { id: TaskId, draft: TaskDraft },
    DeleteTask(TaskId),
    DeleteAllTasks,
    SubmitProfile(ProfileUpdate),
    TogglePasswordPanel,
    SubmitPasswordReset(PasswordReset),
    ToastRevealed(Uuid),
    ToastExpired(Uuid),
    ToastRemoved(Uuid),

    Registered(Result<(), ApiError>),
    LoggedIn(Result<LoginResponse, ApiError>),
    TasksLoaded {
        generation: u64,
        result: Result<Vec<TaskDto>, ApiError>,
    },
    TaskCreated(Result<TaskDto, ApiError>),
    TaskFetched {
        epoch: u64,
        result: Result<TaskDto, ApiError>,
    },
    TaskUpdated(Result<TaskDto, ApiError>),
    TaskDeleted {
        id: TaskId,
        result: Result<(), ApiError>,
    },
    AllTasksDeleted(Result<(), ApiError>),
    ProfileLoaded {
        epoch: u64,
        result: Result<ProfileDto, ApiError>,
    },
    ProfileUpdated(Result<ProfileDto, ApiError>),
    PasswordChanged(Result<(), ApiError>),
}

#[derive(Debug)]
pub struct App<S> {
    sessions: SessionStore<S>,
    views: ViewController,
    tz: Tz,
    search: String,
    search_generation: u64,
    tasks: Option<Vec<TaskDto>>,
    table: TaskTable,
    profile: Option<ProfileDto>,
    editor: Option<TaskDto>,
    forms: Forms,
    toasts: ToastCenter,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(store: S, config: &ClientConfig) -> Self {
        Self {
            sessions: SessionStore::init(store),
            views: ViewController::new(),
            tz: config.timezone(),
            search: String::new(),
            search_generation: 0,
            tasks: None,
            table: TaskTable::default(),
            profile: None,
            editor: None,
            forms: Forms::default(),
            toasts: ToastCenter::new(config.toast_show_delay(), config.toast_display_duration()),
        }
    }

    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }

    /// Shows the shell matching the stored session.
    pub fn start(&mut self) -> Vec<Effect> {
        let authenticated = self.sessions.is_authenticated();
        info!(authenticated, "starting client");
        let load = self.views.sync(authenticated);
        self.load_effects(load)
    }

    pub fn session(&self) -> &Session {
        self.sessions.session()
    }

    pub fn is_authenticated(&self) -> bool {
        self.sessions.is_authenticated()
    }

    pub fn views(&self) -> &ViewController {
        &self.views
    }

    pub fn screen(&self) -> Screen {
        self.views.screen()
    }

    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Bumped whenever the search is reset, so a search box can drop
    /// whatever the user had typed.
    pub fn search_generation(&self) -> u64 {
        self.search_generation
    }

    /// `None` until the first list load of the task view completes.
    pub fn tasks(&self) -> Option<&[TaskDto]> {
        self.tasks.as_deref()
    }

    pub fn table(&self) -> &TaskTable {
        &self.table
    }

    pub fn profile(&self) -> Option<&ProfileDto> {
        self.profile.as_ref()
    }

    pub fn editor(&self) -> Option<&TaskDto> {
        self.editor.as_ref()
    }

    pub fn form(&self, form: Form) -> &FormState {
        self.forms.get(form)
    }

    pub fn toasts(&self) -> &[Toast] {
        self.toasts.toasts()
    }

    pub fn drain_toasts(&mut self) -> Vec<Toast> {
        self.toasts.drain()
    }

    pub fn sessions(&self) -> &SessionStore<S> {
        &self.sessions
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::ShowRegisterForm => {
                self.views.show_register_form();
                vec![]
            }
            Msg::ShowLoginForm => {
                self.views.show_login_form();
                vec![]
            }
            Msg::SubmitRegistration(registration) => {
                self.forms.register.errors.clear();
                if let Err(error) = validate::check_registration(&registration) {
                    self.forms.register.errors = error.messages();
                    return vec![];
                }
                vec![Effect::Call(Call::Register(registration))]
            }
            Msg::SubmitLogin(credentials) => {
                self.forms.login.errors.clear();
                vec![Effect::Call(Call::Login(credentials))]
            }
            Msg::Logout => self.logout(),
            Msg::ShowTasks => {
                self.clear_search();
                let load = self.views.show_task_view(self.is_authenticated());
                self.load_effects(load)
            }
            Msg::ShowProfile => {
                self.forms.reset(Form::PasswordReset);
                let load = self.views.show_profile_view(self.is_authenticated());
                self.load_effects(load)
            }
            Msg::Search(query) => {
                self.search = query.trim().to_string();
                let load = self.views.reload_tasks();
                self.load_effects(load)
            }
            Msg::SubmitNewTask(draft) => vec![Effect::Call(Call::CreateTask(draft))],
            Msg::EditTask(id) => vec![Effect::Call(Call::FetchTask {
                epoch: self.views.epoch(),
                id,
            })],
            Msg::CloseEditor => {
                self.editor = None;
                vec![]
            }
            Msg::SubmitTaskEdit { id, draft } => {
                vec![Effect::Call(Call::UpdateTask { id, draft })]
            }
            Msg::DeleteTask(id) => vec![Effect::Call(Call::DeleteTask(id))],
            Msg::DeleteAllTasks => vec![Effect::Call(Call::DeleteAllTasks)],
            Msg::SubmitProfile(update) => {
                self.forms.profile.errors.clear();
                vec![Effect::Call(Call::UpdateProfile(update))]
            }
            Msg::TogglePasswordPanel => {
                self.views.toggle_password_panel();
                vec![]
            }
            Msg::SubmitPasswordReset(reset) => {
                self.forms.password_reset.errors.clear();
                if let Err(error) = validate::check_password_reset(&reset) {
                    self.forms.password_reset.errors = error.messages();
                    return vec![];
                }
                vec![Effect::Call(Call::ResetPassword(reset))]
            }
            Msg::ToastRevealed(id) => {
                self.toasts.reveal(id);
                vec![]
            }
            Msg::ToastExpired(id) => self
                .toasts
                .expire(id)
                .map(Effect::Timer)
                .into_iter()
                .collect(),
            Msg::ToastRemoved(id) => {
                self.toasts.remove(id);
                vec![]
            }

            Msg::Registered(result) => self.on_registered(result),
            Msg::LoggedIn(result) => self.on_logged_in(result),
            Msg::TasksLoaded { generation, result } => self.on_tasks_loaded(generation, result),
            Msg::TaskCreated(result) => self.on_task_mutation(
                result.map(|_| ()),
                "Task created successfully!",
                "Error creating task.",
                Some(Form::NewTask),
            ),
            Msg::TaskFetched { epoch, result } => self.on_task_fetched(epoch, result),
            Msg::TaskUpdated(result) => {
                if result.is_ok() {
                    self.editor = None;
                }
                self.on_task_mutation(
                    result.map(|_| ()),
                    "Task updated successfully!",
                    "Error updating task.",
                    None,
                )
            }
            Msg::TaskDeleted { id, result } => {
                if result.is_ok() && self.editor.as_ref().is_some_and(|task| task.id == id) {
                    self.editor = None;
                }
                self.on_task_mutation(
                    result,
                    "Task deleted successfully!",
                    "Error deleting task.",
                    None,
                )
            }
            Msg::AllTasksDeleted(result) => {
                if result.is_ok() {
                    self.editor = None;
                }
                self.on_task_mutation(
                    result,
                    "All tasks have been deleted.",
                    "Error deleting all tasks.",
                    None,
                )
            }
            Msg::ProfileLoaded { epoch, result } => self.on_profile_loaded(epoch, result),
            Msg::ProfileUpdated(result) => self.on_profile_updated(result),
            Msg::PasswordChanged(result) => self.on_password_changed(result),
        }
    }

    fn on_registered(&mut self, result: Result<(), ApiError>) -> Vec<Effect> {
        if let Some(effects) = self.intercept_unauthorized(&result) {
            return effects;
        }

        match result {
            Ok(()) => {
                info!("registration accepted");
                self.forms.reset(Form::Register);
                self.views.show_login_form();
                self.notify("Registration successful! Please log in.", ToastKind::Success)
            }
            Err(error) => {
                warn!(%error, "registration rejected");
                self.forms.register.errors = error.messages();
                vec![]
            }
        }
    }

    fn on_logged_in(&mut self, result: Result<LoginResponse, ApiError>) -> Vec<Effect> {
        match result {
            Ok(response) => {
                if let Err(error) = self
                    .sessions
                    .set_session(response.tokens(), response.user.clone())
                {
                    error!(%error, "failed to persist session");
                }
                self.forms.login.errors.clear();
                self.clear_search();
                let load = self.views.show_authenticated_shell();
                self.load_effects(Some(load))
            }
            Err(error) => {
                warn!(%error, "login failed");
                self.forms.login.errors = vec![FieldMessage::plain(LOGIN_FAILED)];
                vec![]
            }
        }
    }

    fn on_tasks_loaded(
        &mut self,
        generation: u64,
        result: Result<Vec<TaskDto>, ApiError>,
    ) -> Vec<Effect> {
        if let Some(effects) = self.intercept_unauthorized(&result) {
            return effects;
        }
        if !self.views.is_current_list(generation) {
            debug!(
                generation,
                current = self.views.list_generation(),
                "discarding stale task list"
            );
            return vec![];
        }

        match result {
            Ok(tasks) => {
                self.table = TaskTable::render(&tasks, &self.tz);
                self.tasks = Some(tasks);
                vec![]
            }
            Err(ApiError::Aborted) => vec![],
            Err(error) => {
                error!(%error, "failed to load tasks");
                self.notify("Could not load tasks.", ToastKind::Error)
            }
        }
    }

    fn on_task_fetched(&mut self, epoch: u64, result: Result<TaskDto, ApiError>) -> Vec<Effect> {
        if let Some(effects) = self.intercept_unauthorized(&result) {
            return effects;
        }
        if !self.views.is_current(epoch) {
            debug!(epoch, "discarding stale task details");
            return vec![];
        }

        match result {
            Ok(task) => {
                self.editor = Some(task);
                vec![]
            }
            Err(ApiError::Aborted) => vec![],
            Err(error) => {
                error!(%error, "failed to fetch task details");
                self.notify("Could not load task details.", ToastKind::Error)
            }
        }
    }

    fn on_task_mutation(
        &mut self,
        result: Result<(), ApiError>,
        success: &str,
        failure: &str,
        reset: Option<Form>,
    ) -> Vec<Effect> {
        if let Some(effects) = self.intercept_unauthorized(&result) {
            return effects;
        }

        match result {
            Ok(()) => {
                if let Some(form) = reset {
                    self.forms.reset(form);
                }
                let load = self.views.reload_tasks();
                let mut effects = self.load_effects(load);
                effects.extend(self.notify(success, ToastKind::Success));
                effects
            }
            Err(error) => {
                error!(%error, failure, "task change failed");
                let message = failure_message(failure, &error);
                self.notify(message, ToastKind::Error)
            }
        }
    }

    fn on_profile_loaded(
        &mut self,
        epoch: u64,
        result: Result<ProfileDto, ApiError>,
    ) -> Vec<Effect> {
        if let Some(effects) = self.intercept_unauthorized(&result) {
            return effects;
        }
        if !self.views.is_current(epoch) || self.views.active_view() != Some(View::Profile) {
            debug!(epoch, current = self.views.epoch(), "discarding stale profile");
            return vec![];
        }

        match result {
            Ok(profile) => {
                self.profile = Some(profile);
                // remount the form so it shows the fresh values
                self.forms.profile.generation += 1;
                vec![]
            }
            Err(ApiError::Aborted) => vec![],
            Err(error) => {
                error!(%error, "failed to load profile");
                self.notify("Could not load profile.", ToastKind::Error)
            }
        }
    }

    fn on_profile_updated(&mut self, result: Result<ProfileDto, ApiError>) -> Vec<Effect> {
        if let Some(effects) = self.intercept_unauthorized(&result) {
            return effects;
        }

        match result {
            Ok(_) => {
                self.forms.profile.errors.clear();
                let mut effects = self.notify("Profile updated successfully!", ToastKind::Success);
                if self.views.active_view() == Some(View::Profile) {
                    effects.push(Effect::Call(Call::LoadProfile {
                        epoch: self.views.epoch(),
                    }));
                }
                effects
            }
            Err(error) => {
                warn!(%error, "profile update rejected");
                self.forms.profile.errors = error.messages();
                vec![]
            }
        }
    }

    fn on_password_changed(&mut self, result: Result<(), ApiError>) -> Vec<Effect> {
        if let Some(effects) = self.intercept_unauthorized(&result) {
            return effects;
        }

        match result {
            Ok(()) => {
                self.forms.reset(Form::PasswordReset);
                self.notify("Password reset successfully!", ToastKind::Success)
            }
            Err(error) => {
                warn!(%error, "password reset rejected");
                self.forms.password_reset.errors = error.messages();
                vec![]
            }
        }
    }

    fn logout(&mut self) -> Vec<Effect> {
        if !self.is_authenticated() {
            self.views.show_login_prompt();
            return vec![];
        }
        info!("logging out");
        self.sign_out();
        self.notify("You have been logged out.", ToastKind::Success)
    }

    /// A 401 from any call ends the session.
    fn intercept_unauthorized<T>(&mut self, result: &Result<T, ApiError>) -> Option<Vec<Effect>> {
        match result {
            Err(ApiError::Unauthorized) if self.is_authenticated() => {
                warn!("server rejected the access token; forcing logout");
                self.sign_out();
                Some(self.notify(SESSION_EXPIRED, ToastKind::Error))
            }
            Err(ApiError::Unauthorized) => {
                self.views.show_login_prompt();
                Some(vec![])
            }
            _ => None,
        }
    }

    fn clear_search(&mut self) {
        self.search.clear();
        self.search_generation += 1;
    }

    fn sign_out(&mut self) {
        if let Err(error) = self.sessions.clear_session() {
            error!(%error, "failed to clear stored session");
        }
        self.clear_search();
        self.tasks = None;
        self.table = TaskTable::default();
        self.profile = None;
        self.editor = None;
        self.forms.reset(Form::Login);
        self.forms.reset(Form::Register);
        self.views.show_login_prompt();
    }

    fn load_effects(&self, load: Option<ViewLoad>) -> Vec<Effect> {
        match load {
            Some(ViewLoad::Tasks { generation }) => vec![Effect::Call(Call::ListTasks {
                generation,
                search: Some(self.search.clone()).filter(|q| !q.is_empty()),
            })],
            Some(ViewLoad::Profile { epoch }) => {
                vec![Effect::Call(Call::LoadProfile { epoch })]
            }
            None => vec![],
        }
    }

    fn notify(&mut self, message: impl Into<String>, kind: ToastKind) -> Vec<Effect> {
        self.toasts
            .notify(message, kind)
            .into_iter()
            .map(Effect::Timer)
            .collect()
    }
}

/// Generic failure text, followed by the server's field messages if any.
fn failure_message(base: &str, error: &ApiError) -> String {
    match error.field_errors() {
        Some(errors) => {
            let details: Vec<String> = errors.messages().iter().map(ToString::to_string).collect();
            format!("{base} {}", details.join("; "))
        }
        None => base.to_string(),
    }
}
