use taskhub_core::session::{
  KeyValueStore,
  StorageError
};
use web_sys::Storage;

/// `window.localStorage`, looked up on every access.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

fn local_storage() -> Option<Storage> {
  web_sys::window().and_then(
    |window| {
      window
        .local_storage()
        .ok()
        .flatten()
    }
  )
}

fn js_error(
  error: wasm_bindgen::JsValue
) -> StorageError {
  StorageError::Write(format!(
    "{error:?}"
  ))
}

impl KeyValueStore for LocalStore {
  fn get(
    &self,
    key: &str
  ) -> Option<String> {
    local_storage().and_then(
      |storage| {
        storage
          .get_item(key)
          .ok()
          .flatten()
      }
    )
  }

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> Result<(), StorageError> {
    let storage = local_storage()
      .ok_or_else(|| {
        StorageError::Unavailable(
          "localStorage is not \
           available"
            .to_string()
        )
      })?;
    storage
      .set_item(key, value)
      .map_err(js_error)
  }

  fn remove(
    &mut self,
    key: &str
  ) -> Result<(), StorageError> {
    let Some(storage) =
      local_storage()
    else {
      return Ok(());
    };
    storage
      .remove_item(key)
      .map_err(js_error)
  }
}
