//! OAuth2 installed-app flow against Google's endpoints.
//!
//! A persisted token is reused when present. Otherwise the consent URL is
//! handed to a [`CodePrompt`], the code it returns is exchanged for a token
//! and the token is persisted for later runs.

use std::{io, path::Path};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::{
    types::{Credentials, Token, TokenResponse},
    HTTP,
};
use crate::error::{Error, Result};

pub const AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Source of the authorization code for a consent URL.
#[async_trait]
pub trait CodePrompt: Send + Sync {
    async fn authorization_code(&self, url: &str) -> io::Result<String>;
}

/// Prints the URL and reads one line from the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

#[async_trait]
impl CodePrompt for StdinPrompt {
    async fn authorization_code(&self, url: &str) -> io::Result<String> {
        let mut out = tokio::io::stdout();
        out.write_all(
            format!(
                "Authorize this app by visiting this url: {url}\nEnter the code from that page here: "
            )
            .as_bytes(),
        )
        .await?;
        out.flush().await?;

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await?;

        Ok(line.trim().to_string())
    }
}

#[derive(Debug, Clone)]
pub struct OAuthClient {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    auth_uri: Url,
    token_uri: Url,
}

impl OAuthClient {
    pub async fn from_file(path: &Path) -> Result<Self> {
        let fail = |reason: String| Error::Credentials {
            path: path.to_path_buf(),
            reason,
        };

        let content = tokio::fs::read(path)
            .await
            .map_err(|e| fail(e.to_string()))?;
        let credentials =
            serde_json::from_slice::<Credentials>(&content).map_err(|e| fail(e.to_string()))?;

        Self::from_credentials(credentials).map_err(fail)
    }

    /// Builds a client from the `installed` section, using its first redirect uri.
    pub fn from_credentials(credentials: Credentials) -> std::result::Result<Self, String> {
        let app = credentials.installed;

        let redirect_uri = app
            .redirect_uris
            .into_iter()
            .next()
            .ok_or_else(|| "no redirect uri in credentials".to_string())?;

        let parse = |uri: Option<String>, default: &str| {
            let uri = uri.unwrap_or_else(|| default.to_string());
            Url::parse(&uri).map_err(|e| format!("invalid endpoint `{uri}`: {e}"))
        };

        Ok(Self {
            client_id: app.client_id,
            client_secret: app.client_secret,
            redirect_uri,
            auth_uri: parse(app.auth_uri, AUTH_URI)?,
            token_uri: parse(app.token_uri, TOKEN_URI)?,
        })
    }

    /// Consent URL asking for offline access to `scopes`.
    pub fn auth_url(&self, scopes: &[String]) -> String {
        let mut url = self.auth_uri.clone();
        url.query_pairs_mut()
            .append_pair("access_type", "offline")
            .append_pair("scope", &scopes.join(" "))
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri);

        url.into()
    }

    #[instrument(skip_all)]
    pub async fn exchange_code(&self, code: &str) -> Result<Token> {
        info!("Exchanging authorization code for a token");

        let token = self
            .request_token(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .await?;

        Ok(token.into())
    }

    /// Trades the refresh token for a new access token, keeping the refresh token
    /// when the endpoint does not rotate it.
    #[instrument(skip_all)]
    pub async fn refresh(&self, token: &Token) -> Result<Token> {
        let refresh_token = token.refresh_token.as_deref().ok_or(Error::TokenExchange {
            status: 0,
            message: "token has no refresh_token".into(),
        })?;

        debug!("Refreshing expired access token");

        let res = self
            .request_token(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .await?;

        let mut fresh = Token::from(res);
        if fresh.refresh_token.is_none() {
            fresh.refresh_token = token.refresh_token.clone();
        }
        if fresh.scope.is_none() {
            fresh.scope = token.scope.clone();
        }

        Ok(fresh)
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let res = HTTP.post(self.token_uri.clone()).form(form).send().await?;
        let status = res.status();

        if !status.is_success() {
            let message = res.text().await.unwrap_or_default();
            return Err(Error::TokenExchange {
                status: status.as_u16(),
                message,
            });
        }

        Ok(res.json::<TokenResponse>().await?)
    }
}

/// Reads a persisted token; `Ok(None)` when the file does not exist.
pub async fn load_token(path: &Path) -> Result<Option<Token>> {
    let fail = |reason: String| Error::Token {
        path: path.to_path_buf(),
        reason,
    };

    let content = match tokio::fs::read(path).await {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(fail(e.to_string())),
    };

    serde_json::from_slice::<Token>(&content)
        .map(Some)
        .map_err(|e| fail(e.to_string()))
}

pub async fn save_token(path: &Path, token: &Token) -> io::Result<()> {
    let json = serde_json::to_vec(token)?;
    tokio::fs::write(path, json).await
}

/// Runs the consent flow and returns the exchanged token without persisting it.
pub async fn consent(
    client: &OAuthClient,
    scopes: &[String],
    prompt: &dyn CodePrompt,
) -> Result<Token> {
    let url = client.auth_url(scopes);
    let code = prompt
        .authorization_code(&url)
        .await
        .map_err(Error::Prompt)?;

    client.exchange_code(code.trim()).await
}

/// Produces a usable token, asking for consent only when none was persisted.
///
/// A token obtained through consent is written to `token_path`; a failed
/// write is logged and does not fail the call. A refreshed token is kept in
/// memory only.
#[instrument(skip(client, scopes, prompt))]
pub async fn authorize(
    client: &OAuthClient,
    scopes: &[String],
    token_path: &Path,
    prompt: &dyn CodePrompt,
) -> Result<Token> {
    if let Some(token) = load_token(token_path).await? {
        debug!("Using persisted token");

        if !token.is_valid() && token.refresh_token.is_some() {
            return client.refresh(&token).await;
        }
        return Ok(token);
    }

    info!("No persisted token, starting consent flow");
    let token = consent(client, scopes, prompt).await?;

    match save_token(token_path, &token).await {
        Ok(()) => info!(path = %token_path.display(), "Token stored"),
        Err(e) => warn!(path = %token_path.display(), "Could not store token: {}", e),
    }

    Ok(token)
}
