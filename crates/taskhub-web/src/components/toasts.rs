use taskhub_core::toast::{
  Toast,
  ToastPhase
};
use uuid::Uuid;
use yew::{
  Callback,
  Html,
  Properties,
  classes,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct ToastStackProps {
  pub toasts:    Vec<Toast>,
  pub on_hidden: Callback<Uuid>
}

/// Reports a leaving toast once its hide transition ends.
#[function_component(ToastStack)]
pub fn toast_stack(
  props: &ToastStackProps
) -> Html {
  html! {
      <div id="toast-container">
          {
              for props.toasts.iter().map(|toast| {
                  let id = toast.id;
                  let leaving = toast.phase == ToastPhase::Leaving;
                  let on_hidden = props.on_hidden.clone();
                  html! {
                      <div
                          key={id.to_string()}
                          class={classes!(
                              "toast",
                              toast.kind.css_class(),
                              (toast.phase == ToastPhase::Shown).then_some("show")
                          )}
                          ontransitionend={move |_| if leaving { on_hidden.emit(id) }}
                      >
                          { toast.message.clone() }
                      </div>
                  }
              })
          }
      </div>
  }
}
