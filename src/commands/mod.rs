//! Command handlers for the gofinances CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod auth;
mod dashboard;
mod import;
mod init;

use crate::api::{self, Mode};
use crate::error::{ErrorType, IntoResult};
use crate::model::Identity;
use crate::session::SessionManager;
use crate::store::Storage;
use crate::{Config, Result};
use anyhow::anyhow;
use serde::Serialize;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, info};

pub use auth::{sign_in, sign_out, whoami};
pub use dashboard::dashboard;
pub use import::{import, ImportSummary};
pub use init::init;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// A session over the configured storage, with providers chosen by `mode`.
fn session(config: &Config, mode: Mode) -> (Arc<dyn Storage>, SessionManager) {
    let storage: Arc<dyn Storage> = Arc::new(config.storage());
    let session = SessionManager::new(
        storage.clone(),
        api::google_auth(config, mode),
        api::credential_dialog(mode),
    );
    (storage, session)
}

/// Restores the session and returns the signed-in identity.
async fn signed_in(session: &mut SessionManager) -> Result<Identity> {
    session
        .restore()
        .await?
        .identity()
        .cloned()
        .ok_or_else(|| anyhow!("Nobody is signed in, run 'gofinances sign-in' first"))
        .pub_result(ErrorType::NotSignedIn)
}
