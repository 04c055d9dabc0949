use std::collections::VecDeque;

use tracing::debug;

use crate::api::{ApiClient, Transport};
use crate::app::{App, Call, Effect, Msg};
use crate::session::{KeyValueStore, Session};

/// Runs one call against the server and wraps the outcome as a message.
pub async fn execute<T: Transport>(client: &ApiClient<T>, session: &Session, call: Call) -> Msg {
    debug!(call = call.name(), "executing");
    match call {
        Call::Register(registration) => Msg::Registered(client.register(&registration).await),
        Call::Login(credentials) => Msg::LoggedIn(client.login(&credentials).await),
        Call::ListTasks { generation, search } => Msg::TasksLoaded {
            generation,
            result: client.list_tasks(session, search.as_deref()).await,
        },
        Call::CreateTask(draft) => Msg::TaskCreated(client.create_task(session, draft).await),
        Call::FetchTask { epoch, id } => Msg::TaskFetched {
            epoch,
            result: client.fetch_task(session, id).await,
        },
        Call::UpdateTask { id, draft } => {
            Msg::TaskUpdated(client.update_task(session, id, draft).await)
        }
        Call::DeleteTask(id) => Msg::TaskDeleted {
            id,
            result: client.delete_task(session, id).await,
        },
        Call::DeleteAllTasks => Msg::AllTasksDeleted(client.delete_all_tasks(session).await),
        Call::LoadProfile { epoch } => Msg::ProfileLoaded {
            epoch,
            result: client.load_profile(session).await,
        },
        Call::UpdateProfile(update) => {
            Msg::ProfileUpdated(client.update_profile(session, &update).await)
        }
        Call::ResetPassword(reset) => {
            Msg::PasswordChanged(client.reset_password(session, &reset).await)
        }
    }
}

/// Executes calls one at a time until none are left.
///
/// Toast timers are dropped; callers without a clock read toasts with
/// [`App::drain_toasts`] instead. Each call sees the session as it is
/// when the call starts.
pub async fn run_until_idle<S, T>(
    app: &mut App<S>,
    client: &ApiClient<T>,
    effects: Vec<Effect>,
) -> usize
where
    S: KeyValueStore,
    T: Transport,
{
    let mut queue: VecDeque<Effect> = effects.into();
    let mut executed = 0;

    while let Some(effect) = queue.pop_front() {
        let Effect::Call(call) = effect else {
            continue;
        };
        let session = app.session().clone();
        let msg = execute(client, &session, call).await;
        executed += 1;
        queue.extend(app.update(msg));
    }

    executed
}
