//! The identity providers a user can sign in with.
//!
//! Each provider sits behind a trait so that the session does not care whether it is talking to
//! Google, to the platform's native credential dialog, or to an in-process fake.

mod apple;
mod google;
mod redirect;
mod test_client;

use crate::Config;
use serde::{Deserialize, Serialize};

pub use apple::{AppleCredential, CredentialScope, FullName};
pub use google::GoogleUserInfo;
pub use test_client::{TestCredentialDialog, TestGoogleAuth, TestOutcome};

pub(crate) use apple::UnavailableDialog;
pub(crate) use google::GoogleOAuth;

const MODE_ENV: &str = "GOFINANCES_IN_TEST_MODE";

/// Whether the providers talk to the real world or are replaced with fakes.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Live,
    Test,
}

serde_plain::derive_display_from_serialize!(Mode);
serde_plain::derive_fromstr_from_deserialize!(Mode);

impl Mode {
    /// `Mode::Test` when `GOFINANCES_IN_TEST_MODE` is set and non-empty, otherwise `Mode::Live`.
    pub fn from_env() -> Self {
        match std::env::var(MODE_ENV) {
            Ok(s) if !s.is_empty() => Mode::Test,
            _ => Mode::Live,
        }
    }
}

/// Runs the Google OAuth consent flow and returns the profile of the user who completed it.
#[async_trait::async_trait]
pub trait GoogleAuth: Send {
    /// Returns `Ok(None)` when the user declined or did not finish the flow.
    async fn authorize(&mut self) -> anyhow::Result<Option<GoogleUserInfo>>;
}

/// The platform's native "Sign in with Apple" dialog.
#[async_trait::async_trait]
pub trait CredentialDialog: Send {
    /// Returns `Ok(None)` when the user dismissed the dialog.
    async fn request(
        &mut self,
        scopes: &[CredentialScope],
    ) -> anyhow::Result<Option<AppleCredential>>;
}

/// Creates the Google provider for `mode`.
pub fn google_auth(config: &Config, mode: Mode) -> Box<dyn GoogleAuth> {
    match mode {
        Mode::Live => Box::new(GoogleOAuth::new(config.google())),
        Mode::Test => Box::new(TestGoogleAuth::default()),
    }
}

/// Creates the Apple credential dialog for `mode`.
pub fn credential_dialog(mode: Mode) -> Box<dyn CredentialDialog> {
    match mode {
        Mode::Live => Box::new(UnavailableDialog),
        Mode::Test => Box::new(TestCredentialDialog::default()),
    }
}
