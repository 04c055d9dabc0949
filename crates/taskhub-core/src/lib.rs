//! Client core for the TaskHub task manager.
//!
//! Everything here is front-end agnostic and compiles for both native
//! targets and `wasm32`: the HTTP transport and the key-value store are
//! supplied by the caller.

pub mod api;
pub mod app;
pub mod config;
pub mod datetime;
pub mod runtime;
pub mod session;
pub mod table;
pub mod toast;
pub mod validate;
pub mod view;

pub use api::{ApiClient, ApiError};
pub use app::{App, Call, Effect, Msg};
pub use config::ClientConfig;
pub use session::{KeyValueStore, Session, SessionStore};
