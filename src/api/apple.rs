//! Sign in with Apple through the platform's native credential dialog.

use crate::api::CredentialDialog;
use crate::model::Identity;
use anyhow::bail;
use serde::{Deserialize, Serialize};
use url::Url;

const AVATAR_URL: &str = "https://ui-avatars.com/api/";

/// What the dialog is asked to share.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialScope {
    FullName,
    Email,
}

/// The name parts Apple shares. Apple only returns them the first time a user signs in.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct FullName {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

/// The credential returned by a completed dialog.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct AppleCredential {
    /// The stable identifier of the user.
    pub user: String,
    pub full_name: Option<FullName>,
    pub email: Option<String>,
}

impl AppleCredential {
    fn given_name(&self) -> &str {
        self.full_name
            .as_ref()
            .and_then(|n| n.given_name.as_deref())
            .unwrap_or_default()
    }
}

/// Builds a placeholder avatar showing the first letter of `name`.
pub(crate) fn avatar_url(name: &str) -> String {
    match Url::parse_with_params(AVATAR_URL, &[("name", name), ("length", "1")]) {
        Ok(url) => url.to_string(),
        // AVATAR_URL always parses.
        Err(_) => AVATAR_URL.to_string(),
    }
}

impl From<AppleCredential> for Identity {
    fn from(credential: AppleCredential) -> Self {
        let name = credential.given_name().to_string();
        let photo = avatar_url(&name);
        Identity {
            id: credential.user,
            email: credential.email.unwrap_or_default(),
            name,
            photo: Some(photo),
        }
    }
}

/// The live dialog used by the command line, where no native credential dialog exists. Apps that
/// embed this crate on an Apple platform provide their own `CredentialDialog`.
pub(crate) struct UnavailableDialog;

#[async_trait::async_trait]
impl CredentialDialog for UnavailableDialog {
    async fn request(
        &mut self,
        _scopes: &[CredentialScope],
    ) -> anyhow::Result<Option<AppleCredential>> {
        bail!(
            "Sign in with Apple needs the native credential dialog, which is not available on {}",
            std::env::consts::OS
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_to_identity() {
        let credential = AppleCredential {
            user: "001234.abcd".to_string(),
            full_name: Some(FullName {
                given_name: Some("João".to_string()),
                family_name: Some("Silva".to_string()),
            }),
            email: Some("joao@privaterelay.appleid.com".to_string()),
        };
        let identity = Identity::from(credential);
        assert_eq!(identity.id, "001234.abcd");
        assert_eq!(identity.name, "João");
        assert_eq!(identity.email, "joao@privaterelay.appleid.com");
        assert_eq!(
            identity.photo.as_deref(),
            Some("https://ui-avatars.com/api/?name=Jo%C3%A3o&length=1")
        );
    }

    #[test]
    fn test_credential_without_name_or_email() {
        let identity = Identity::from(AppleCredential {
            user: "u".to_string(),
            ..Default::default()
        });
        assert_eq!(identity.name, "");
        assert_eq!(identity.email, "");
        assert_eq!(
            identity.photo.as_deref(),
            Some("https://ui-avatars.com/api/?name=&length=1")
        );
    }

    #[tokio::test]
    async fn test_unavailable_dialog_fails() {
        let err = UnavailableDialog
            .request(&[CredentialScope::Email])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Sign in with Apple"));
    }
}
