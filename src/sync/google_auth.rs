use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use chrono::{DateTime, Utc};
use crate::storage::config::GoogleConfig;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const REDIRECT_URI: &str = "http://localhost:8080";
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar.events";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to read token file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse token: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Token has expired")]
    TokenExpired,
    #[error("No refresh token available")]
    NoRefreshToken,
    #[error("Missing OAuth client credentials")]
    MissingCredentials,
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("OAuth error: {0}")]
    OAuthError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenInfo {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub token_type: String,
}

impl TokenInfo {
    pub fn new(access_token: String, expires_in_seconds: i64) -> Self {
        Self {
            access_token,
            refresh_token: None,
            expires_at: Utc::now() + chrono::Duration::seconds(expires_in_seconds),
            token_type: "Bearer".to_string(),
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: String) -> Self {
        self.refresh_token = Some(refresh_token);
        self
    }

    /// Tokens are refreshed five minutes before they expire.
    pub fn needs_refresh(&self) -> bool {
        self.expires_at <= Utc::now() + chrono::Duration::minutes(5)
    }
}

/// Token cache on disk.
pub struct TokenStorage {
    path: PathBuf,
}

impl TokenStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn save_token(&self, token: &TokenInfo) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(token)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn load_token(&self) -> Result<TokenInfo, AuthError> {
        let content = std::fs::read_to_string(&self.path)?;
        let token: TokenInfo = serde_json::from_str(&content)?;
        Ok(token)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    refresh_token: Option<String>,
}

pub struct GoogleAuthenticator {
    client_id: String,
    client_secret: String,
    token_url: String,
    storage: TokenStorage,
    client: reqwest::Client,
}

impl GoogleAuthenticator {
    pub fn new(google: &GoogleConfig) -> Self {
        Self {
            client_id: google.client_id.clone(),
            client_secret: google.client_secret.clone(),
            token_url: TOKEN_URL.to_string(),
            storage: TokenStorage::new(google.token_cache.clone()),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_token_url(mut self, token_url: String) -> Self {
        self.token_url = token_url;
        self
    }

    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    /// Cached token, refreshed first if it is about to expire.
    pub async fn get_valid_token(&mut self) -> Result<TokenInfo, AuthError> {
        let token = self.storage.load_token().map_err(|e| {
            tracing::debug!("No usable cached token: {}", e);
            AuthError::TokenExpired
        })?;

        if token.needs_refresh() {
            tracing::info!("Access token expiring at {}, refreshing", token.expires_at);
            return self.refresh_token(&token).await;
        }

        Ok(token)
    }

    pub async fn refresh_token(&mut self, token: &TokenInfo) -> Result<TokenInfo, AuthError> {
        let refresh_token = token.refresh_token.as_ref()
            .ok_or(AuthError::NoRefreshToken)?;

        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let token_response = self.request_token(&params).await?;

        // Google omits the refresh token on refresh; keep the one we have.
        let new_token = TokenInfo::new(token_response.access_token, token_response.expires_in)
            .with_refresh_token(token_response.refresh_token.unwrap_or_else(|| refresh_token.clone()));

        self.storage.save_token(&new_token)?;

        Ok(new_token)
    }

    pub fn get_auth_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            AUTH_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(REDIRECT_URI),
            urlencoding::encode(CALENDAR_SCOPE)
        )
    }

    pub async fn exchange_code_for_token(&mut self, code: &str) -> Result<TokenInfo, AuthError> {
        if !self.has_credentials() {
            return Err(AuthError::MissingCredentials);
        }

        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", REDIRECT_URI),
            ("grant_type", "authorization_code"),
        ];

        let token_response = self.request_token(&params).await?;

        let new_token = TokenInfo::new(token_response.access_token, token_response.expires_in)
            .with_refresh_token(
                token_response.refresh_token
                    .ok_or(AuthError::NoRefreshToken)?
            );

        self.storage.save_token(&new_token)?;
        tracing::info!("Stored new Google Calendar token");

        Ok(new_token)
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let response = self.client
            .post(&self.token_url)
            .form(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            tracing::error!("Token endpoint rejected request: {}", error_text);
            return Err(AuthError::OAuthError(error_text));
        }

        Ok(response.json().await?)
    }

    pub fn print_auth_instructions(&self) {
        println!("\n=== Google Calendar Authentication ===\n");
        println!("To let gcal-mirror read and write your calendars:");
        println!("1. Visit this URL in your browser:\n");
        println!("{}\n", self.get_auth_url());
        println!("2. Sign in with the account owning the destination calendar");
        println!("3. After authorizing, you'll be redirected to localhost:8080");
        println!("4. Copy the 'code' parameter from the URL");
        println!("5. Paste it when prompted\n");
    }
}
