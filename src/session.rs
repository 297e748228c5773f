//! The session: who is signed in, and how they got there.
//!
//! A `SessionManager` starts out `Loading`. Calling `restore` reads the identity persisted by an
//! earlier sign-in; from then on the state is either `Unauthenticated` or `Authenticated`. Sign-in
//! persists the new identity before making it current, and sign-out removes it.

use crate::api::{CredentialDialog, CredentialScope, GoogleAuth};
use crate::error::{ErrorType, IntoResult, Res};
use crate::model::{Identity, SessionState};
use crate::store::{self, Storage};
use crate::Result;
use anyhow::Context;
use std::sync::Arc;
use tracing::{debug, info, warn};

const APPLE_SCOPES: &[CredentialScope] = &[CredentialScope::FullName, CredentialScope::Email];

/// Owns the current identity and the providers used to establish it.
pub struct SessionManager {
    storage: Arc<dyn Storage>,
    google: Box<dyn GoogleAuth>,
    apple: Box<dyn CredentialDialog>,
    state: SessionState,
    restored: bool,
}

impl SessionManager {
    pub fn new(
        storage: Arc<dyn Storage>,
        google: Box<dyn GoogleAuth>,
        apple: Box<dyn CredentialDialog>,
    ) -> Self {
        Self {
            storage,
            google,
            apple,
            state: SessionState::Loading,
            restored: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The signed-in identity. Always `None` while loading.
    pub fn identity(&self) -> Option<&Identity> {
        self.state.identity()
    }

    /// True until `restore` has completed. Do not rely on `identity` before this is false.
    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Reads the persisted identity, once. Later calls return the current state untouched.
    ///
    /// A missing record, or one that cannot be parsed, leaves the session unauthenticated.
    ///
    /// # Errors
    /// Returns a `StorageRead` error if storage cannot be read. The session stays `Loading` so
    /// that the caller may try again.
    pub async fn restore(&mut self) -> Result<&SessionState> {
        if self.restored {
            return Ok(&self.state);
        }
        let data = self
            .storage
            .get_item(&store::user_key())
            .await
            .context("Unable to read the persisted identity")
            .pub_result(ErrorType::StorageRead)?;

        self.state = match data.map(|s| serde_json::from_str::<Identity>(&s)) {
            None => {
                debug!("No persisted identity");
                SessionState::Unauthenticated
            }
            Some(Ok(identity)) => {
                debug!("Restored identity {}", identity.id);
                SessionState::Authenticated(identity)
            }
            Some(Err(e)) => {
                warn!("Ignoring the persisted identity because it cannot be parsed: {e}");
                SessionState::Unauthenticated
            }
        };
        self.restored = true;
        Ok(&self.state)
    }

    /// Signs in through Google's OAuth consent flow.
    ///
    /// Returns the new identity, or `None` if the user did not complete the flow, in which case
    /// the session is unchanged.
    ///
    /// # Errors
    /// - `AuthProvider` if the OAuth round trip or the userinfo request fails
    /// - `StorageWrite` if the identity cannot be persisted
    pub async fn sign_in_with_google(&mut self) -> Result<Option<&Identity>> {
        let info = self
            .google
            .authorize()
            .await
            .context("Google sign-in failed")
            .pub_result(ErrorType::AuthProvider)?;
        match info {
            Some(info) => self.establish(info.into()).await,
            None => {
                info!("Google sign-in was cancelled");
                Ok(None)
            }
        }
    }

    /// Signs in through the platform's native Apple credential dialog, asking for the user's
    /// name and email.
    ///
    /// Returns the new identity, or `None` if the user dismissed the dialog, in which case the
    /// session is unchanged.
    ///
    /// # Errors
    /// - `AuthProvider` if the dialog fails
    /// - `StorageWrite` if the identity cannot be persisted
    pub async fn sign_in_with_apple(&mut self) -> Result<Option<&Identity>> {
        let credential = self
            .apple
            .request(APPLE_SCOPES)
            .await
            .context("Apple sign-in failed")
            .pub_result(ErrorType::AuthProvider)?;
        match credential {
            Some(credential) => self.establish(credential.into()).await,
            None => {
                info!("Apple sign-in was cancelled");
                Ok(None)
            }
        }
    }

    /// Signs out. The in-memory identity is always cleared; failing to remove the persisted one
    /// is only logged.
    pub async fn sign_out(&mut self) {
        self.state = SessionState::Unauthenticated;
        self.restored = true;
        if let Err(e) = self.storage.remove_item(&store::user_key()).await {
            warn!("Unable to remove the persisted identity: {e:#}");
        }
    }

    async fn establish(&mut self, identity: Identity) -> Result<Option<&Identity>> {
        persist(self.storage.as_ref(), &identity)
            .await
            .pub_result(ErrorType::StorageWrite)?;
        info!("Signed in as {} <{}>", identity.name, identity.email);
        self.state = SessionState::Authenticated(identity);
        self.restored = true;
        Ok(self.identity())
    }
}

async fn persist(storage: &dyn Storage, identity: &Identity) -> Res<()> {
    store::set_json(storage, &store::user_key(), identity)
        .await
        .context("Unable to persist the identity")
}
