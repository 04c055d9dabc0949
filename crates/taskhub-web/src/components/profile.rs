use chrono::NaiveDate;
use taskhub_core::api::FieldMessage;
use taskhub_shared::{
  PasswordReset,
  ProfileDto,
  ProfileUpdate
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

const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

#[derive(Properties, PartialEq)]
pub struct ProfileFormProps {
  pub profile:   Option<ProfileDto>,
  pub errors:    Vec<FieldMessage>,
  pub on_submit: Callback<ProfileUpdate>
}

/// Seeded from the loaded profile; remounted on every load.
#[function_component(ProfileForm)]
pub fn profile_form(
  props: &ProfileFormProps
) -> Html {
  let seed = props
    .profile
    .as_ref()
    .map(ProfileUpdate::from)
    .unwrap_or_default();
  let username = props
    .profile
    .as_ref()
    .map(|profile| profile.username.clone())
    .unwrap_or_default();

  let ProfileUpdate {
    email: seed_email,
    full_name: seed_full_name,
    date_of_birth: seed_date_of_birth,
    address: seed_address,
    gender: seed_gender,
    mobile_number: seed_mobile_number
  } = seed;

  let email = use_state(move || seed_email);
  let full_name =
    use_state(move || seed_full_name);
  let date_of_birth = use_state(move || {
    seed_date_of_birth
      .map(|date| {
        date
          .format(DATE_INPUT_FORMAT)
          .to_string()
      })
      .unwrap_or_default()
  });
  let address =
    use_state(move || seed_address);
  let gender = use_state(move || seed_gender);
  let mobile_number =
    use_state(move || seed_mobile_number);

  let onsubmit = {
    let email = email.clone();
    let full_name = full_name.clone();
    let date_of_birth =
      date_of_birth.clone();
    let address = address.clone();
    let gender = gender.clone();
    let mobile_number =
      mobile_number.clone();
    let on_submit =
      props.on_submit.clone();
    Callback::from(
      move |e: SubmitEvent| {
        e.prevent_default();
        on_submit.emit(ProfileUpdate {
          email:         (*email).clone(),
          full_name:     (*full_name)
            .clone(),
          date_of_birth: NaiveDate::parse_from_str(
            date_of_birth.trim(),
            DATE_INPUT_FORMAT
          )
          .ok(),
          address:       (*address).clone(),
          gender:        (*gender).clone(),
          mobile_number: (*mobile_number)
            .clone()
        });
      }
    )
  };

  html! {
      <form id="profile-form" class="profile-form" {onsubmit}>
          <h2>{ "My Profile" }</h2>
          <label>{ "Username" }</label>
          <input type="text" value={username} readonly=true />
          <label>{ "Email" }</label>
          <input type="email" value={(*email).clone()} oninput={bind_input(&email)} />
          <label>{ "Full Name" }</label>
          <input type="text" value={(*full_name).clone()} oninput={bind_input(&full_name)} />
          <label>{ "Date of Birth" }</label>
          <input type="date" value={(*date_of_birth).clone()} oninput={bind_input(&date_of_birth)} />
          <label>{ "Address" }</label>
          <textarea value={(*address).clone()} oninput={bind_input(&address)} />
          <label>{ "Gender" }</label>
          <input type="text" value={(*gender).clone()} oninput={bind_input(&gender)} />
          <label>{ "Mobile Number" }</label>
          <input type="tel" value={(*mobile_number).clone()} oninput={bind_input(&mobile_number)} />
          { error_list(&props.errors) }
          <button type="submit" class="btn">{ "Update Profile" }</button>
      </form>
  }
}

#[derive(Properties, PartialEq)]
pub struct PasswordResetPanelProps {
  pub open:      bool,
  pub errors:    Vec<FieldMessage>,
  pub on_toggle: Callback<MouseEvent>,
  pub on_submit: Callback<PasswordReset>
}

#[function_component(PasswordResetPanel)]
pub fn password_reset_panel(
  props: &PasswordResetPanelProps
) -> Html {
  let old_password =
    use_state(String::new);
  let new_password =
    use_state(String::new);
  let new_password_confirm =
    use_state(String::new);

  let onsubmit = {
    let old_password =
      old_password.clone();
    let new_password =
      new_password.clone();
    let new_password_confirm =
      new_password_confirm.clone();
    let on_submit =
      props.on_submit.clone();
    Callback::from(
      move |e: SubmitEvent| {
        e.prevent_default();
        on_submit.emit(PasswordReset {
          old_password:
            (*old_password).clone(),
          new_password:
            (*new_password).clone(),
          new_password_confirm:
            (*new_password_confirm)
              .clone()
        });
      }
    )
  };

  let form = if props.open {
    html! {
        <form id="password-reset-form" class="password-form" {onsubmit}>
            <input type="password" placeholder="Current Password" required=true value={(*old_password).clone()} oninput={bind_input(&old_password)} />
            <input type="password" placeholder="New Password" required=true value={(*new_password).clone()} oninput={bind_input(&new_password)} />
            <input type="password" placeholder="Confirm New Password" required=true value={(*new_password_confirm).clone()} oninput={bind_input(&new_password_confirm)} />
            { error_list(&props.errors) }
            <button type="submit" class="btn">{ "Reset Password" }</button>
        </form>
    }
  } else {
    html! {}
  };

  html! {
      <div class="password-reset">
          <button id="toggle-password-reset" class="btn secondary" onclick={props.on_toggle.clone()}>
              { "Change Password" }
          </button>
          { form }
      </div>
  }
}
