use taskhub_core::view::View;
use yew::{
  Callback,
  Html,
  MouseEvent,
  Properties,
  classes,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct NavBarProps {
  pub active:     Option<View>,
  pub on_tasks:   Callback<MouseEvent>,
  pub on_profile: Callback<MouseEvent>,
  pub on_logout:  Callback<MouseEvent>
}

/// Hidden while signed out.
#[function_component(NavBar)]
pub fn nav_bar(
  props: &NavBarProps
) -> Html {
  let Some(active) = props.active else {
    return html! {};
  };

  let item = |view: View,
              label: &str,
              on_click: &Callback<MouseEvent>| {
    let on_click = on_click.clone();
    html! {
        <button
            class={classes!("nav-btn", (active == view).then_some("active"))}
            onclick={move |e| on_click.emit(e)}
        >
            { label }
        </button>
    }
  };

  html! {
      <nav id="main-nav">
          { item(View::Tasks, "My Tasks", &props.on_tasks) }
          { item(View::Profile, "My Profile", &props.on_profile) }
          <button id="logout-btn" class="btn logout" onclick={props.on_logout.clone()}>{ "Logout" }</button>
      </nav>
  }
}
