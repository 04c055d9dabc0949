use taskhub_core::api::FieldMessage;
use taskhub_shared::{
  Credentials,
  Registration
};
use yew::{
  Callback,
  Html,
  MouseEvent,
  Properties,
  SubmitEvent,
  function_component,
  html,
  use_state
};

use super::{
  bind_input,
  error_list
};

#[derive(Properties, PartialEq)]
pub struct LoginFormProps {
  pub errors:           Vec<FieldMessage>,
  pub on_submit:        Callback<Credentials>,
  pub on_show_register:
    Callback<MouseEvent>
}

#[function_component(LoginForm)]
pub fn login_form(
  props: &LoginFormProps
) -> Html {
  let email = use_state(String::new);
  let password = use_state(String::new);

  let onsubmit = {
    let email = email.clone();
    let password = password.clone();
    let on_submit =
      props.on_submit.clone();
    Callback::from(
      move |e: SubmitEvent| {
        e.prevent_default();
        on_submit.emit(Credentials {
          email:    (*email).clone(),
          password: (*password).clone()
        });
      }
    )
  };

  let on_show_register =
    props.on_show_register.clone();

  html! {
      <form id="login-form" class="auth-form" {onsubmit}>
          <h2>{ "Login" }</h2>
          <input type="email" placeholder="Email" required=true value={(*email).clone()} oninput={bind_input(&email)} />
          <input type="password" placeholder="Password" required=true value={(*password).clone()} oninput={bind_input(&password)} />
          { error_list(&props.errors) }
          <button type="submit" class="btn">{ "Login" }</button>
          <p class="switch-form">
              { "Don't have an account? " }
              <a href="#" onclick={move |e: MouseEvent| { e.prevent_default(); on_show_register.emit(e); }}>{ "Register" }</a>
          </p>
      </form>
  }
}

#[derive(Properties, PartialEq)]
pub struct RegisterFormProps {
  pub errors:        Vec<FieldMessage>,
  pub on_submit:
    Callback<Registration>,
  pub on_show_login:
    Callback<MouseEvent>
}

#[function_component(RegisterForm)]
pub fn register_form(
  props: &RegisterFormProps
) -> Html {
  let full_name = use_state(String::new);
  let email = use_state(String::new);
  let password = use_state(String::new);
  let password_confirm =
    use_state(String::new);

  let onsubmit = {
    let full_name = full_name.clone();
    let email = email.clone();
    let password = password.clone();
    let password_confirm =
      password_confirm.clone();
    let on_submit =
      props.on_submit.clone();
    Callback::from(
      move |e: SubmitEvent| {
        e.prevent_default();
        on_submit.emit(Registration {
          email:            (*email)
            .clone(),
          password:         (*password)
            .clone(),
          password_confirm:
            (*password_confirm).clone(),
          full_name:        (*full_name)
            .clone()
        });
      }
    )
  };

  let on_show_login =
    props.on_show_login.clone();

  html! {
      <form id="register-form" class="auth-form" {onsubmit}>
          <h2>{ "Register" }</h2>
          <input type="text" placeholder="Full Name" required=true value={(*full_name).clone()} oninput={bind_input(&full_name)} />
          <input type="email" placeholder="Email" required=true value={(*email).clone()} oninput={bind_input(&email)} />
          <input type="password" placeholder="Password" required=true value={(*password).clone()} oninput={bind_input(&password)} />
          <input type="password" placeholder="Confirm Password" required=true value={(*password_confirm).clone()} oninput={bind_input(&password_confirm)} />
          { error_list(&props.errors) }
          <button type="submit" class="btn">{ "Register" }</button>
          <p class="switch-form">
              { "Already have an account? " }
              <a href="#" onclick={move |e: MouseEvent| { e.prevent_default(); on_show_login.emit(e); }}>{ "Login" }</a>
          </p>
      </form>
  }
}
