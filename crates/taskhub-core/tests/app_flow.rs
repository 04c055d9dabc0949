mod support;

use support::{BASE_URL, PROFILE_JSON, ScriptedTransport, task_json, task_list_json};
use taskhub_core::api::{ApiClient, ApiError, TaskDraft};
use taskhub_core::app::{Call, Effect, Form, Msg, SESSION_EXPIRED};
use taskhub_core::config::ClientConfig;
use taskhub_core::runtime::{execute, run_until_idle};
use taskhub_core::session::{ACCESS_TOKEN_KEY, KeyValueStore, MemoryStore, REFRESH_TOKEN_KEY};
use taskhub_core::toast::ToastKind;
use taskhub_core::view::{AuthForm, Screen, View};
use taskhub_core::App;
use taskhub_shared::{Credentials, PasswordReset, ProfileUpdate, Registration};

fn signed_in_app() -> App<MemoryStore> {
    App::new(
        MemoryStore::with_entries([(ACCESS_TOKEN_KEY, "T1"), (REFRESH_TOKEN_KEY, "R1")]),
        &ClientConfig::default(),
    )
}

fn credentials() -> Credentials {
    Credentials {
        email: "a@x.io".to_string(),
        password: "pw".to_string(),
    }
}

#[tokio::test]
async fn login_stores_tokens_and_uses_them_for_the_first_list() {
    let transport = ScriptedTransport::new();
    transport
        .respond(200, r#"{"access":"T1","refresh":"R1"}"#)
        .respond(200, "[]");
    let client = ApiClient::new(BASE_URL, &transport);
    let mut app = App::new(MemoryStore::new(), &ClientConfig::default());
    assert!(app.start().is_empty());

    let effects = app.update(Msg::SubmitLogin(credentials()));
    run_until_idle(&mut app, &client, effects).await;

    assert_eq!(app.sessions().store().get(ACCESS_TOKEN_KEY).as_deref(), Some("T1"));
    assert_eq!(app.sessions().store().get(REFRESH_TOKEN_KEY).as_deref(), Some("R1"));
    assert_eq!(app.screen(), Screen::SignedIn { view: View::Tasks });

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].url, "http://api.test/api/tasks/");
    assert_eq!(requests[1].authorization.as_deref(), Some("Bearer T1"));
    assert_eq!(app.table().placeholder(), Some(taskhub_core::table::EMPTY_PLACEHOLDER));
}

#[tokio::test]
async fn failed_login_leaves_session_and_screen_untouched() {
    let transport = ScriptedTransport::new();
    transport.respond(401, r#"{"detail":"No active account found"}"#);
    let client = ApiClient::new(BASE_URL, &transport);
    let mut app = App::new(MemoryStore::new(), &ClientConfig::default());
    app.start();

    let effects = app.update(Msg::SubmitLogin(credentials()));
    run_until_idle(&mut app, &client, effects).await;

    assert!(!app.is_authenticated());
    assert_eq!(app.sessions().store().get(ACCESS_TOKEN_KEY), None);
    assert_eq!(app.screen(), Screen::SignedOut { form: AuthForm::Login });
    let errors: Vec<String> = app
        .form(Form::Login)
        .errors
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(errors, vec![taskhub_core::app::LOGIN_FAILED]);
    assert!(app.toasts().is_empty());
}

#[tokio::test]
async fn registration_success_returns_to_login_with_toast() {
    let transport = ScriptedTransport::new();
    transport.respond(201, r#"{"email":"a@x.io","full_name":"A"}"#);
    let client = ApiClient::new(BASE_URL, &transport);
    let mut app = App::new(MemoryStore::new(), &ClientConfig::default());
    app.start();
    app.update(Msg::ShowRegisterForm);
    let generation = app.form(Form::Register).generation;

    let effects = app.update(Msg::SubmitRegistration(Registration {
        email: "a@x.io".to_string(),
        password: "pw".to_string(),
        password_confirm: "pw".to_string(),
        full_name: "A".to_string(),
    }));
    run_until_idle(&mut app, &client, effects).await;

    assert_eq!(app.views().auth_form(), Some(AuthForm::Login));
    assert!(app.form(Form::Register).generation > generation);
    assert!(!app.is_authenticated());
    let toasts = app.drain_toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].message, "Registration successful! Please log in.");
}

#[tokio::test]
async fn registration_mismatch_makes_no_request() {
    let transport = ScriptedTransport::new();
    let client = ApiClient::new(BASE_URL, &transport);
    let mut app = App::new(MemoryStore::new(), &ClientConfig::default());
    app.start();
    app.update(Msg::ShowRegisterForm);

    let effects = app.update(Msg::SubmitRegistration(Registration {
        email: "a@x.io".to_string(),
        password: "one".to_string(),
        password_confirm: "two".to_string(),
        full_name: "A".to_string(),
    }));
    assert!(effects.is_empty());
    run_until_idle(&mut app, &client, effects).await;

    assert_eq!(transport.request_count(), 0);
    assert_eq!(
        app.form(Form::Register).errors[0].text,
        taskhub_core::validate::REGISTRATION_PASSWORD_MISMATCH
    );
}

#[tokio::test]
async fn unauthorized_from_any_operation_forces_logout() {
    let calls = [
        Msg::ShowProfile,
        Msg::SubmitNewTask(TaskDraft::new("t", "")),
        Msg::EditTask(1),
        Msg::SubmitTaskEdit {
            id: 1,
            draft: TaskDraft::new("t", ""),
        },
        Msg::DeleteTask(1),
        Msg::DeleteAllTasks,
        Msg::SubmitProfile(ProfileUpdate::default()),
        Msg::Search("x".to_string()),
        Msg::SubmitPasswordReset(PasswordReset {
            old_password: "old".to_string(),
            new_password: "new".to_string(),
            new_password_confirm: "new".to_string(),
        }),
    ];

    for msg in calls {
        let transport = ScriptedTransport::new();
        transport.respond(200, "[]").respond(401, "");
        let client = ApiClient::new(BASE_URL, &transport);
        let mut app = signed_in_app();
        let effects = app.start();
        run_until_idle(&mut app, &client, effects).await;
        assert!(app.is_authenticated());

        let label = format!("{msg:?}");
        let effects = app.update(msg);
        run_until_idle(&mut app, &client, effects).await;

        assert!(!app.is_authenticated(), "{label} should end the session");
        assert_eq!(app.sessions().store().get(ACCESS_TOKEN_KEY), None, "{label}");
        assert_eq!(app.sessions().store().get(REFRESH_TOKEN_KEY), None, "{label}");
        assert_eq!(
            app.screen(),
            Screen::SignedOut { form: AuthForm::Login },
            "{label}"
        );
        let toasts = app.drain_toasts();
        assert_eq!(toasts.len(), 1, "{label}");
        assert_eq!(toasts[0].message, SESSION_EXPIRED);
        assert_eq!(toasts[0].kind, ToastKind::Error);
    }
}

#[tokio::test]
async fn deleted_task_is_absent_after_the_reload() {
    let transport = ScriptedTransport::new();
    transport
        .respond(200, &task_list_json(&[(1, "keep"), (2, "drop")]))
        .respond(204, "")
        .respond(200, &task_list_json(&[(1, "keep")]));
    let client = ApiClient::new(BASE_URL, &transport);
    let mut app = signed_in_app();
    let effects = app.start();
    run_until_idle(&mut app, &client, effects).await;
    assert!(app.table().contains(2));

    let effects = app.update(Msg::DeleteTask(2));
    let executed = run_until_idle(&mut app, &client, effects).await;

    assert_eq!(executed, 2);
    assert!(!app.table().contains(2));
    assert!(app.table().contains(1));
    assert_eq!(transport.requests()[1].url, "http://api.test/api/tasks/2/");
    let toasts = app.drain_toasts();
    assert_eq!(toasts[0].message, "Task deleted successfully!");
}

#[tokio::test]
async fn create_resets_the_form_and_reloads() {
    let transport = ScriptedTransport::new();
    transport
        .respond(200, "[]")
        .respond(201, &task_json(5, "new"))
        .respond(200, &task_list_json(&[(5, "new")]));
    let client = ApiClient::new(BASE_URL, &transport);
    let mut app = signed_in_app();
    let effects = app.start();
    run_until_idle(&mut app, &client, effects).await;
    let generation = app.form(Form::NewTask).generation;

    let effects = app.update(Msg::SubmitNewTask(TaskDraft::new("new", "")));
    run_until_idle(&mut app, &client, effects).await;

    assert!(app.form(Form::NewTask).generation > generation);
    assert_eq!(app.table().len(), 1);
    assert!(app.table().bulk_actions_visible());
}

#[tokio::test]
async fn failed_create_toasts_with_field_details() {
    let transport = ScriptedTransport::new();
    transport
        .respond(200, "[]")
        .respond(400, r#"{"title":["This field may not be blank."]}"#);
    let client = ApiClient::new(BASE_URL, &transport);
    let mut app = signed_in_app();
    let effects = app.start();
    run_until_idle(&mut app, &client, effects).await;

    let effects = app.update(Msg::SubmitNewTask(TaskDraft::new("", "")));
    run_until_idle(&mut app, &client, effects).await;

    let toasts = app.drain_toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Error);
    assert_eq!(
        toasts[0].message,
        "Error creating task. Title: This field may not be blank."
    );
    assert!(app.is_authenticated());
}

#[tokio::test]
async fn stale_task_list_is_ignored_after_switching_views() {
    let transport = ScriptedTransport::new();
    transport
        .respond(200, &task_list_json(&[(1, "late")]))
        .respond(200, PROFILE_JSON);
    let client = ApiClient::new(BASE_URL, &transport);
    let mut app = signed_in_app();

    let effects = app.start();
    let [Effect::Call(list_call)] = &effects[..] else {
        panic!("start should issue one list call");
    };

    // user navigates away before the list comes back
    let profile_effects = app.update(Msg::ShowProfile);

    let late = execute(&client, &app.session().clone(), list_call.clone()).await;
    assert!(app.update(late).is_empty());
    assert_eq!(app.tasks(), None);

    run_until_idle(&mut app, &client, profile_effects).await;
    assert_eq!(app.screen(), Screen::SignedIn { view: View::Profile });
    assert_eq!(app.profile().map(|p| p.full_name.as_str()), Some("Ada Lovelace"));
}

#[tokio::test]
async fn list_from_before_a_search_is_ignored() {
    let transport = ScriptedTransport::new();
    transport
        .respond(200, &task_list_json(&[(1, "unfiltered")]))
        .respond(200, &task_list_json(&[(2, "milk")]));
    let client = ApiClient::new(BASE_URL, &transport);
    let mut app = signed_in_app();

    let effects = app.start();
    let [Effect::Call(first_list)] = &effects[..] else {
        panic!("start should issue one list call");
    };
    let search_effects = app.update(Msg::Search("milk".to_string()));

    let late = execute(&client, &app.session().clone(), first_list.clone()).await;
    run_until_idle(&mut app, &client, search_effects).await;
    assert!(app.update(late).is_empty());

    assert!(app.table().contains(2));
    assert!(!app.table().contains(1));
}

#[tokio::test]
async fn edit_survives_a_reload_finishing_first() {
    let transport = ScriptedTransport::new();
    transport
        .respond(200, &task_list_json(&[(1, "drop"), (4, "edit me")]))
        .respond(204, "")
        .respond(200, &task_list_json(&[(4, "edit me")]))
        .respond(200, &task_json(4, "edit me"));
    let client = ApiClient::new(BASE_URL, &transport);
    let mut app = signed_in_app();
    let effects = app.start();
    run_until_idle(&mut app, &client, effects).await;

    // edit fetch still in flight while a delete and its reload complete
    let edit_effects = app.update(Msg::EditTask(4));
    let effects = app.update(Msg::DeleteTask(1));
    run_until_idle(&mut app, &client, effects).await;
    run_until_idle(&mut app, &client, edit_effects).await;

    assert_eq!(app.editor().map(|task| task.id), Some(4));
    assert!(!app.table().contains(1));
    let messages: Vec<String> = app.drain_toasts().into_iter().map(|t| t.message).collect();
    assert_eq!(messages, vec!["Task deleted successfully!"]);
}

#[tokio::test]
async fn edit_fetch_is_dropped_after_leaving_the_task_view() {
    let transport = ScriptedTransport::new();
    transport
        .respond(200, "[]")
        .respond(200, &task_json(4, "edit me"));
    let client = ApiClient::new(BASE_URL, &transport);
    let mut app = signed_in_app();
    let effects = app.start();
    run_until_idle(&mut app, &client, effects).await;

    let edit_effects = app.update(Msg::EditTask(4));
    app.update(Msg::ShowProfile);
    run_until_idle(&mut app, &client, edit_effects).await;

    assert_eq!(app.editor(), None);
    assert!(app.toasts().is_empty());
}

#[tokio::test]
async fn unauthorized_registration_returns_to_login_form() {
    let transport = ScriptedTransport::new();
    transport.respond(401, "");
    let client = ApiClient::new(BASE_URL, &transport);
    let mut app = App::new(MemoryStore::new(), &ClientConfig::default());
    app.start();
    app.update(Msg::ShowRegisterForm);

    let effects = app.update(Msg::SubmitRegistration(Registration {
        email: "a@x.io".to_string(),
        password: "pw".to_string(),
        password_confirm: "pw".to_string(),
        full_name: "A".to_string(),
    }));
    run_until_idle(&mut app, &client, effects).await;

    assert_eq!(app.screen(), Screen::SignedOut { form: AuthForm::Login });
    assert!(app.form(Form::Register).errors.is_empty());
}

#[tokio::test]
async fn stale_unauthorized_still_forces_logout() {
    let transport = ScriptedTransport::new();
    transport.respond(401, "");
    let client = ApiClient::new(BASE_URL, &transport);
    let mut app = signed_in_app();

    let effects = app.start();
    let [Effect::Call(list_call)] = &effects[..] else {
        panic!("start should issue one list call");
    };
    app.update(Msg::ShowProfile);

    let late = execute(&client, &app.session().clone(), list_call.clone()).await;
    app.update(late);
    assert!(!app.is_authenticated());
}

#[tokio::test]
async fn aborted_loads_are_silent() {
    let mut app = signed_in_app();
    let effects = app.start();
    let [Effect::Call(Call::ListTasks { generation, .. })] = &effects[..] else {
        panic!("start should issue one list call");
    };

    let follow_up = app.update(Msg::TasksLoaded {
        generation: *generation,
        result: Err(ApiError::Aborted),
    });
    assert!(follow_up.is_empty());
    assert!(app.toasts().is_empty());
}

#[tokio::test]
async fn edit_opens_the_modal_and_update_closes_it() {
    let transport = ScriptedTransport::new();
    transport
        .respond(200, &task_list_json(&[(4, "old")]))
        .respond(200, &task_json(4, "old"))
        .respond(200, &task_json(4, "renamed"))
        .respond(200, &task_list_json(&[(4, "renamed")]));
    let client = ApiClient::new(BASE_URL, &transport);
    let mut app = signed_in_app();
    let effects = app.start();
    run_until_idle(&mut app, &client, effects).await;

    let effects = app.update(Msg::EditTask(4));
    run_until_idle(&mut app, &client, effects).await;
    assert_eq!(app.editor().map(|task| task.id), Some(4));

    let effects = app.update(Msg::SubmitTaskEdit {
        id: 4,
        draft: TaskDraft::new("renamed", ""),
    });
    run_until_idle(&mut app, &client, effects).await;

    assert_eq!(app.editor(), None);
    assert_eq!(app.table().rows()[0].title, "renamed");
    assert_eq!(transport.pending(), 0);
}

#[tokio::test]
async fn profile_update_rejection_shows_field_errors() {
    let transport = ScriptedTransport::new();
    transport
        .respond(200, "[]")
        .respond(200, PROFILE_JSON)
        .respond(400, r#"{"mobile_number":["Enter a valid phone number."]}"#);
    let client = ApiClient::new(BASE_URL, &transport);
    let mut app = signed_in_app();
    let effects = app.start();
    run_until_idle(&mut app, &client, effects).await;
    let effects = app.update(Msg::ShowProfile);
    run_until_idle(&mut app, &client, effects).await;

    let update = ProfileUpdate::from(app.profile().expect("profile loaded"));
    let effects = app.update(Msg::SubmitProfile(update));
    run_until_idle(&mut app, &client, effects).await;

    let errors: Vec<String> = app
        .form(Form::Profile)
        .errors
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(errors, vec!["Mobile number: Enter a valid phone number."]);
    assert!(app.toasts().is_empty());
}

#[tokio::test]
async fn logout_clears_storage_and_toasts() {
    let mut app = signed_in_app();
    app.start();

    let effects = app.update(Msg::Logout);

    assert!(effects.iter().all(|effect| matches!(effect, Effect::Timer(_))));
    assert!(!app.is_authenticated());
    assert_eq!(app.sessions().store().get(ACCESS_TOKEN_KEY), None);
    assert_eq!(app.toasts()[0].message, "You have been logged out.");
}
