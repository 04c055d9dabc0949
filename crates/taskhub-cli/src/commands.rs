use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, anyhow, bail};
use taskhub_core::api::{ApiClient, Attachment, TaskDraft, Transport};
use taskhub_core::app::{App, Effect, Form, Msg};
use taskhub_core::datetime::format_local_date;
use taskhub_core::runtime::run_until_idle;
use taskhub_core::session::KeyValueStore;
use taskhub_core::table::{DELETE_ALL_PROMPT, DELETE_TASK_PROMPT};
use taskhub_core::toast::ToastKind;
use taskhub_shared::{Credentials, PasswordReset, ProfileUpdate, Registration};
use tracing::{debug, info, instrument};

use crate::cli::{Command, PasswordCommand, ProfileCommand, TaskCommand, confirm, value_or_prompt};
use crate::render::Renderer;

/// One CLI invocation: the client state machine plus its I/O.
pub struct Shell<S, T, W> {
    app: App<S>,
    client: ApiClient<T>,
    renderer: Renderer<W>,
}

impl<S, T, W> Shell<S, T, W>
where
    S: KeyValueStore,
    T: Transport,
    W: Write,
{
    pub fn new(app: App<S>, client: ApiClient<T>, renderer: Renderer<W>) -> Self {
        Self {
            app,
            client,
            renderer,
        }
    }

    pub fn into_parts(self) -> (App<S>, Renderer<W>) {
        (self.app, self.renderer)
    }

    #[instrument(skip_all)]
    pub async fn dispatch(&mut self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Register {
                email,
                full_name,
                password,
                password_confirm,
            } => {
                let password = value_or_prompt(password, "Password")?;
                let password_confirm = value_or_prompt(password_confirm, "Confirm password")?;
                self.register(Registration {
                    email,
                    password,
                    password_confirm,
                    full_name,
                })
                .await
            }
            Command::Login { email, password } => {
                let password = value_or_prompt(password, "Password")?;
                self.login(Credentials { email, password }).await
            }
            Command::Logout => self.logout().await,
            Command::Whoami => self.whoami(),
            Command::Tasks(command) => self.tasks(command).await,
            Command::Profile(command) => self.profile(command).await,
            Command::Password(PasswordCommand::Reset {
                old,
                new,
                confirm: repeated,
            }) => {
                let reset = PasswordReset {
                    old_password: value_or_prompt(old, "Old password")?,
                    new_password: value_or_prompt(new, "New password")?,
                    new_password_confirm: value_or_prompt(repeated, "Confirm new password")?,
                };
                self.reset_password(reset).await
            }
        }
    }

    pub async fn register(&mut self, registration: Registration) -> anyhow::Result<()> {
        self.app.start();
        self.app.update(Msg::ShowRegisterForm);
        self.drive(Msg::SubmitRegistration(registration)).await?;
        self.check_form(Form::Register, "registration failed")?;
        self.finish()
    }

    pub async fn login(&mut self, credentials: Credentials) -> anyhow::Result<()> {
        self.app.start();
        self.drive(Msg::SubmitLogin(credentials)).await?;
        self.check_form(Form::Login, "login failed")?;

        let who = self
            .app
            .session()
            .user
            .as_ref()
            .map(|user| user.email.clone())
            .unwrap_or_else(|| "you".to_string());
        self.renderer.print_line(&format!("Logged in as {who}."))?;
        self.finish()?;
        self.renderer.print_task_table(self.app.table())
    }

    pub async fn logout(&mut self) -> anyhow::Result<()> {
        self.app.start();
        if !self.app.is_authenticated() {
            return self.renderer.print_line("Not logged in.");
        }
        self.drive(Msg::Logout).await?;
        self.finish()
    }

    pub fn whoami(&mut self) -> anyhow::Result<()> {
        let session = self.app.session();
        let line = match (&session.access_token, &session.user) {
            (None, _) => "Not logged in.".to_string(),
            (Some(_), Some(user)) if !user.username.is_empty() => {
                format!("{} <{}>", user.username, user.email)
            }
            (Some(_), Some(user)) => user.email.clone(),
            (Some(_), None) => "Logged in (user unknown).".to_string(),
        };
        self.renderer.print_line(&line)
    }

    async fn tasks(&mut self, command: TaskCommand) -> anyhow::Result<()> {
        let initial_load = self.enter()?;

        match command {
            TaskCommand::List { search } => {
                match search {
                    Some(query) => self.drive(Msg::Search(query)).await?,
                    None => self.settle(initial_load).await?,
                }
                self.finish()?;
                self.renderer.print_task_table(self.app.table())
            }
            TaskCommand::Add {
                title,
                description,
                file,
            } => {
                let mut draft = TaskDraft::new(title, description);
                if let Some(path) = file {
                    draft = draft.with_attachment(read_attachment(&path)?);
                }
                self.drive(Msg::SubmitNewTask(draft)).await?;
                self.finish()
            }
            TaskCommand::Show { id } => {
                self.drive(Msg::EditTask(id)).await?;
                self.finish()?;
                let task = self
                    .app
                    .editor()
                    .cloned()
                    .ok_or_else(|| anyhow!("task {id} not found"))?;
                let created = format_local_date(task.created_at, self.app.timezone());
                self.renderer.print_task_info(&task, &created)
            }
            TaskCommand::Edit {
                id,
                title,
                description,
                file,
            } => {
                self.drive(Msg::EditTask(id)).await?;
                self.finish()?;
                let current = self
                    .app
                    .editor()
                    .cloned()
                    .ok_or_else(|| anyhow!("task {id} not found"))?;

                let mut draft = TaskDraft::new(
                    title.unwrap_or(current.title),
                    description.unwrap_or_else(|| current.description.unwrap_or_default()),
                );
                if let Some(path) = file {
                    draft = draft.with_attachment(read_attachment(&path)?);
                }
                self.drive(Msg::SubmitTaskEdit { id, draft }).await?;
                self.finish()
            }
            TaskCommand::Rm { id, yes } => {
                if !confirm(DELETE_TASK_PROMPT, yes)? {
                    return self.renderer.print_line("Nothing deleted.");
                }
                self.drive(Msg::DeleteTask(id)).await?;
                self.finish()
            }
            TaskCommand::Clear { yes } => {
                if !confirm(DELETE_ALL_PROMPT, yes)? {
                    return self.renderer.print_line("Nothing deleted.");
                }
                self.drive(Msg::DeleteAllTasks).await?;
                self.finish()
            }
        }
    }

    async fn profile(&mut self, command: ProfileCommand) -> anyhow::Result<()> {
        self.enter()?;
        self.drive(Msg::ShowProfile).await?;
        self.finish()?;
        let profile = self
            .app
            .profile()
            .cloned()
            .ok_or_else(|| anyhow!("profile could not be loaded"))?;

        match command {
            ProfileCommand::Show => self.renderer.print_profile(&profile),
            ProfileCommand::Update {
                email,
                full_name,
                date_of_birth,
                address,
                gender,
                mobile_number,
            } => {
                let mut update = ProfileUpdate::from(&profile);
                if let Some(email) = email {
                    update.email = email;
                }
                if let Some(full_name) = full_name {
                    update.full_name = full_name;
                }
                if date_of_birth.is_some() {
                    update.date_of_birth = date_of_birth;
                }
                if let Some(address) = address {
                    update.address = address;
                }
                if let Some(gender) = gender {
                    update.gender = gender;
                }
                if let Some(mobile_number) = mobile_number {
                    update.mobile_number = mobile_number;
                }

                self.drive(Msg::SubmitProfile(update)).await?;
                self.check_form(Form::Profile, "profile update failed")?;
                self.finish()
            }
        }
    }

    pub async fn reset_password(&mut self, reset: PasswordReset) -> anyhow::Result<()> {
        self.enter()?;
        self.app.update(Msg::ShowProfile);
        self.app.update(Msg::TogglePasswordPanel);
        self.drive(Msg::SubmitPasswordReset(reset)).await?;
        self.check_form(Form::PasswordReset, "password reset failed")?;
        self.finish()
    }

    /// Restores the stored session; the returned effects load the task view.
    fn enter(&mut self) -> anyhow::Result<Vec<Effect>> {
        let effects = self.app.start();
        if !self.app.is_authenticated() {
            bail!("not logged in; run `taskhub login <email>` first");
        }
        Ok(effects)
    }

    async fn drive(&mut self, msg: Msg) -> anyhow::Result<()> {
        let effects = self.app.update(msg);
        self.settle(effects).await
    }

    async fn settle(&mut self, effects: Vec<Effect>) -> anyhow::Result<()> {
        let executed = run_until_idle(&mut self.app, &self.client, effects).await;
        debug!(executed, "calls settled");
        Ok(())
    }

    fn check_form(&mut self, form: Form, summary: &str) -> anyhow::Result<()> {
        let errors = self.app.form(form).errors.clone();
        if errors.is_empty() {
            return Ok(());
        }
        self.renderer.print_line(&format!("{summary}:"))?;
        self.renderer.print_messages(&errors)?;
        let joined: Vec<String> = errors.iter().map(ToString::to_string).collect();
        Err(anyhow!("{summary}: {}", joined.join("; ")))
    }

    /// Prints pending toasts; an error toast fails the command.
    fn finish(&mut self) -> anyhow::Result<()> {
        let toasts = self.app.drain_toasts();
        let mut failure = None;
        for toast in &toasts {
            self.renderer.print_toast(toast)?;
            if toast.kind == ToastKind::Error && failure.is_none() {
                failure = Some(toast.message.clone());
            }
        }
        match failure {
            Some(message) => {
                info!(%message, "command failed");
                Err(anyhow!(message))
            }
            None => Ok(()),
        }
    }
}

fn read_attachment(path: &Path) -> anyhow::Result<Attachment> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read attachment {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| anyhow!("attachment path has no file name: {}", path.display()))?;
    Ok(Attachment {
        file_name,
        content_type: None,
        bytes,
    })
}
