//! Session command handlers.
//!
//! This module implements the CLI commands for:
//! - `gofinances sign-in google|apple` - Sign in and persist the identity
//! - `gofinances sign-out` - Forget the persisted identity
//! - `gofinances whoami` - Show the persisted identity

use crate::api::Mode;
use crate::args::Provider;
use crate::commands::{session, signed_in, Out};
use crate::model::Identity;
use crate::{Config, Result};

/// Handles `gofinances sign-in`. With `Provider::Google` this prints a URL to open in the browser
/// and waits for the redirect.
///
/// # Errors
/// Returns an `AuthProvider` error if the provider fails and a `StorageWrite` error if the identity
/// cannot be saved.
pub async fn sign_in(config: &Config, mode: Mode, provider: Provider) -> Result<Out<Identity>> {
    let (_, mut session) = session(config, mode);
    session.restore().await?;
    let identity = match provider {
        Provider::Google => session.sign_in_with_google().await?,
        Provider::Apple => session.sign_in_with_apple().await?,
    };
    Ok(match identity {
        Some(identity) => Out::new(
            format!("Signed in as {} <{}>", identity.name, identity.email),
            identity.clone(),
        ),
        None => format!("Sign-in with {provider} was not completed").into(),
    })
}

/// Handles `gofinances sign-out`.
pub async fn sign_out(config: &Config, mode: Mode) -> Result<Out<()>> {
    let (_, mut session) = session(config, mode);
    session.sign_out().await;
    Ok("Signed out".into())
}

/// Handles `gofinances whoami`.
///
/// # Errors
/// Returns a `NotSignedIn` error if there is no persisted identity.
pub async fn whoami(config: &Config, mode: Mode) -> Result<Out<Identity>> {
    let (_, mut session) = session(config, mode);
    let identity = signed_in(&mut session).await?;
    Ok(Out::new(
        format!(
            "Signed in as {} <{}> (id {})",
            identity.name, identity.email, identity.id
        ),
        identity,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_sign_in_whoami_sign_out() {
        let env = TestEnv::new().await;
        let config = env.config();

        let err = whoami(&config, Mode::Test).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::NotSignedIn);

        let out = sign_in(&config, Mode::Test, Provider::Google).await.unwrap();
        let signed_in = out.structure().cloned().unwrap();
        assert_eq!(signed_in.id, "test-google-user");

        let out = whoami(&config, Mode::Test).await.unwrap();
        assert_eq!(out.structure(), Some(&signed_in));

        sign_out(&config, Mode::Test).await.unwrap();
        assert!(whoami(&config, Mode::Test).await.is_err());
    }

    #[tokio::test]
    async fn test_sign_in_with_apple() {
        let env = TestEnv::new().await;
        let out = sign_in(&env.config(), Mode::Test, Provider::Apple)
            .await
            .unwrap();
        assert_eq!(out.message(), "Signed in as Tester <tester@privaterelay.appleid.com>");
    }

    #[tokio::test]
    async fn test_live_apple_sign_in_is_unavailable() {
        let env = TestEnv::new().await;
        let err = sign_in(&env.config(), Mode::Live, Provider::Apple)
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::AuthProvider);
    }
}
