//! In-process fakes for the identity providers.
//!
//! Note: these are compiled even in the "production" version of this app so that the whole app
//! can run, top-to-bottom, without a browser or a native credential dialog.

use crate::api::{
    AppleCredential, CredentialDialog, CredentialScope, FullName, GoogleAuth, GoogleUserInfo,
};
use anyhow::bail;
use tracing::debug;

/// How a fake provider answers.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum TestOutcome<T> {
    /// The user completed the flow.
    Success(T),
    /// The user dismissed the flow.
    Cancelled,
    /// The provider failed with this message.
    Fail(String),
}

impl<T: Clone> TestOutcome<T> {
    fn resolve(&self) -> anyhow::Result<Option<T>> {
        match self {
            TestOutcome::Success(value) => Ok(Some(value.clone())),
            TestOutcome::Cancelled => Ok(None),
            TestOutcome::Fail(message) => bail!("{message}"),
        }
    }
}

/// A `GoogleAuth` that answers without a network.
#[derive(Debug, Clone)]
pub struct TestGoogleAuth {
    outcome: TestOutcome<GoogleUserInfo>,
}

impl TestGoogleAuth {
    pub fn new(outcome: TestOutcome<GoogleUserInfo>) -> Self {
        Self { outcome }
    }
}

impl Default for TestGoogleAuth {
    fn default() -> Self {
        Self::new(TestOutcome::Success(GoogleUserInfo {
            id: "test-google-user".to_string(),
            email: "test.user@gmail.com".to_string(),
            given_name: "Test".to_string(),
            picture: Some("https://example.com/test-user.png".to_string()),
        }))
    }
}

#[async_trait::async_trait]
impl GoogleAuth for TestGoogleAuth {
    async fn authorize(&mut self) -> anyhow::Result<Option<GoogleUserInfo>> {
        debug!("Test Google sign-in answering with {:?}", self.outcome);
        self.outcome.resolve()
    }
}

/// A `CredentialDialog` that answers without a user.
#[derive(Debug, Clone)]
pub struct TestCredentialDialog {
    outcome: TestOutcome<AppleCredential>,
}

impl TestCredentialDialog {
    pub fn new(outcome: TestOutcome<AppleCredential>) -> Self {
        Self { outcome }
    }
}

impl Default for TestCredentialDialog {
    fn default() -> Self {
        Self::new(TestOutcome::Success(AppleCredential {
            user: "000123.test.apple.user".to_string(),
            full_name: Some(FullName {
                given_name: Some("Tester".to_string()),
                family_name: None,
            }),
            email: Some("tester@privaterelay.appleid.com".to_string()),
        }))
    }
}

#[async_trait::async_trait]
impl CredentialDialog for TestCredentialDialog {
    async fn request(
        &mut self,
        scopes: &[CredentialScope],
    ) -> anyhow::Result<Option<AppleCredential>> {
        debug!(
            "Test credential dialog asked for {scopes:?}, answering with {:?}",
            self.outcome
        );
        self.outcome.resolve()
    }
}
