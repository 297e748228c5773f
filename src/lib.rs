//! gofinances keeps track of who is signed in and summarizes their transactions.
//!
//! The `session` module signs users in with Google or Apple and persists the identity in a
//! key-value `store`. The `dashboard` module turns the stored transactions of that identity into
//! the highlight cards and the display list. The `commands` module wires both into the CLI.

pub mod api;
pub mod args;
pub mod commands;
mod config;
pub mod dashboard;
mod error;
pub mod model;
pub mod session;
pub mod store;
mod utils;

pub use api::Mode;
pub use config::{Config, GoogleClient};
pub use dashboard::Dashboard;
pub use error::{Error, ErrorType, IntoResult, Result};
pub use session::SessionManager;
