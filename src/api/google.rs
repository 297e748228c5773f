//! Google sign-in using the OAuth 2.0 authorization code flow with PKCE.
//!
//! The flow:
//! 1. Listens on `http://localhost:<port>` for the redirect
//! 2. Logs the consent URL for the user to open in a browser
//! 3. Waits for the redirect and checks its CSRF state
//! 4. Exchanges the authorization code for an access token
//! 5. Fetches the user's profile from the userinfo endpoint

use crate::api::redirect::{Redirect, RedirectListener};
use crate::api::GoogleAuth;
use crate::config::GoogleClient;
use crate::error::Res;
use crate::model::Identity;
use anyhow::{anyhow, ensure, Context};
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge, RedirectUrl,
    Scope, TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USER_INFO_URL: &str = "https://www.googleapis.com/oauth2/v1/userinfo";
const SCOPES: &[&str] = &["profile", "email"];

/// The subset of Google's userinfo response that makes up an `Identity`.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct GoogleUserInfo {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub picture: Option<String>,
}

impl From<GoogleUserInfo> for Identity {
    fn from(info: GoogleUserInfo) -> Self {
        Identity {
            id: info.id,
            name: info.given_name,
            email: info.email,
            photo: info.picture,
        }
    }
}

/// Implements `GoogleAuth` against Google's OAuth and userinfo endpoints.
pub(crate) struct GoogleOAuth {
    client_id: String,
    client_secret: Option<String>,
    redirect_port: u16,
    timeout: Duration,
    http: reqwest::Client,
}

impl GoogleOAuth {
    pub(crate) fn new(client: &GoogleClient) -> Self {
        Self {
            client_id: client.client_id().to_string(),
            client_secret: client.client_secret().map(str::to_string),
            redirect_port: client.redirect_port(),
            timeout: client.timeout(),
            http: reqwest::Client::new(),
        }
    }

    async fn user_info(&self, access_token: &str) -> Res<GoogleUserInfo> {
        self.http
            .get(USER_INFO_URL)
            .query(&[("alt", "json")])
            .bearer_auth(access_token)
            .send()
            .await
            .context("Failed to reach the Google userinfo endpoint")?
            .error_for_status()
            .context("Google refused the userinfo request")?
            .json()
            .await
            .context("Failed to parse the Google userinfo response")
    }
}

#[async_trait::async_trait]
impl GoogleAuth for GoogleOAuth {
    async fn authorize(&mut self) -> anyhow::Result<Option<GoogleUserInfo>> {
        info!("Starting Google sign-in");
        let listener = RedirectListener::bind(self.redirect_port).await?;

        let mut client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_auth_uri(AuthUrl::new(AUTH_URL.to_string())?)
            .set_token_uri(TokenUrl::new(TOKEN_URL.to_string())?)
            .set_redirect_uri(RedirectUrl::new(listener.redirect_uri())?);
        if let Some(secret) = &self.client_secret {
            client = client.set_client_secret(ClientSecret::new(secret.clone()));
        }

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (auth_url, csrf) = client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(SCOPES.iter().map(|s| Scope::new(s.to_string())))
            .set_pkce_challenge(pkce_challenge)
            .url();

        info!("Open this URL in your browser to sign in with Google:\n\n{auth_url}\n");
        debug!("Waiting for the redirect on {}", listener.redirect_uri());

        let code = match listener.wait(self.timeout).await? {
            None => return Ok(None),
            Some(Redirect::Denied { error }) => {
                info!("Google sign-in was not completed: {error}");
                return Ok(None);
            }
            Some(Redirect::Code { code, state }) => {
                ensure!(
                    &state == csrf.secret(),
                    "The OAuth redirect carried an unexpected state parameter"
                );
                code
            }
        };

        // Token requests must not follow redirects.
        let token_http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("Unable to build the HTTP client")?;
        let token = client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(&token_http)
            .await
            .map_err(|e| anyhow!("Failed to exchange the authorization code: {e}"))?;

        let info = self.user_info(token.access_token().secret()).await?;
        debug!("Signed in to Google as user {}", info.id);
        Ok(Some(info))
    }
}
