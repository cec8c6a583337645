// src/session/client.rs
//! Signin, signup, profile and token calls that feed the session store

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::LOCATION;
use reqwest::Method;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::auth::is_token_expired;
use crate::core::ServiceClient;
use crate::error::ClientError;
use crate::guards::ProfileSource;
use crate::session::store::SessionStore;
use crate::types::response::{
    RefreshRequest, RefreshResponse, SigninRequest, SigninResponse, SignupRequest, SignupResponse,
};
use crate::types::{AccountProfile, Role};

const LOGIN_ENDPOINT: &str = "/login/";
const SIGNUP_ENDPOINT: &str = "/sign-up/";
const ME_ENDPOINT: &str = "/me/";
const TOKEN_REFRESH_ENDPOINT: &str = "/token/refresh/";
const VERIFY_ENDPOINT: &str = "/verify";

/// Path fragment of the page the API redirects to when a code is wrong
const VERIFY_ERROR_MARKER: &str = "verify-error";

pub struct SessionClient {
    api: Arc<ServiceClient>,
    store: Arc<SessionStore>,
}

impl SessionClient {
    pub fn new(api: Arc<ServiceClient>, store: Arc<SessionStore>) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub async fn signin(&self, email: &str, password: &str) -> Result<SigninResponse, ClientError> {
        info!("Attempting to sign in: {}", email);

        let response: SigninResponse = self
            .api
            .post_json(LOGIN_ENDPOINT, &SigninRequest { email, password })
            .await
            .map_err(|e| {
                warn!("Signin failed for {}: {}", email, e);
                e
            })?;

        // Nothing from a previous account may outlive a new signin
        self.store.set_logged_in(false);
        self.store
            .store_tokens(&response.access, Some(response.refresh.as_str()));
        if let Some(role) = response.role {
            self.store.set_role(role);
        }
        self.store.set_logged_in(true);
        info!("Signed in; role: {:?}", response.role);

        self.refresh_profile_quietly().await;
        Ok(response)
    }

    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<SignupResponse, ClientError> {
        info!("Attempting to sign up {} as {}", email, role);

        let response: SignupResponse = self
            .api
            .post_json(SIGNUP_ENDPOINT, &SignupRequest { email, password, role })
            .await?;

        self.store.set_role(response.user.role.unwrap_or(role));

        if let Some(access) = &response.access {
            self.store.store_tokens(access, response.refresh.as_deref());
            self.store.set_logged_in(true);
            self.refresh_profile_quietly().await;
        }

        Ok(response)
    }

    /// Fetch the account behind the current token.
    ///
    /// Resolves to `None` without touching the network when no token is stored.
    pub async fn get_my_profile(&self) -> Result<Option<AccountProfile>, ClientError> {
        if self.store.get_token().is_none() {
            info!("get_my_profile called without token");
            self.store.set_logged_in(false);
            return Ok(None);
        }

        if is_token_expired(self.store.get_token().as_deref(), Utc::now()) {
            if self.store.get_refresh_token().is_some() {
                self.refresh_access_token().await?;
            } else {
                warn!("Access token expired and no refresh token stored");
                self.store.set_logged_in(false);
                return Err(ClientError::NotAuthenticated);
            }
        }

        match self.api.get::<AccountProfile>(ME_ENDPOINT).await {
            Ok(profile) => {
                info!("Profile retrieved for {}", profile.email);
                self.store.set_profile(profile.clone());
                self.store.set_logged_in(true);
                Ok(Some(profile))
            }
            Err(e) => {
                if e.is_unauthorized() {
                    warn!("Profile fetch rejected, clearing session: {}", e);
                    self.store.set_logged_in(false);
                }
                Err(e)
            }
        }
    }

    /// Exchange the refresh token for a new access token
    pub async fn refresh_access_token(&self) -> Result<(), ClientError> {
        let Some(refresh) = self.store.get_refresh_token() else {
            return Err(ClientError::NotAuthenticated);
        };

        let result: Result<RefreshResponse, ClientError> = self
            .api
            .post_json(TOKEN_REFRESH_ENDPOINT, &RefreshRequest { refresh: &refresh })
            .await;

        match result {
            Ok(tokens) => {
                self.store
                    .store_tokens(&tokens.access, tokens.refresh.as_deref());
                self.store.set_logged_in(true);
                info!("Access token refreshed");
                Ok(())
            }
            Err(e) => {
                error!("Token refresh failed, clearing session: {}", e);
                self.store.set_logged_in(false);
                Err(e)
            }
        }
    }

    /// Confirm an email address with the code sent at signup
    pub async fn verify_email(&self, user_id: &str, code: &str) -> Result<(), ClientError> {
        let endpoint = format!("{}/{}/{}/", VERIFY_ENDPOINT, user_id, code);
        let response = self
            .api
            .execute(self.api.request(Method::GET, &endpoint))
            .await?;
        let status = response.status();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            return if location.contains(VERIFY_ERROR_MARKER) {
                warn!("Verification rejected for user {}", user_id);
                Err(ClientError::VerificationRejected)
            } else {
                info!("Email verified for user {}", user_id);
                Ok(())
            };
        }

        if status.is_success() {
            info!("Email verified for user {}", user_id);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClientError::from_status(status, &body))
    }

    pub fn signout(&self) -> crate::navigation::Route {
        self.store.signout()
    }

    async fn refresh_profile_quietly(&self) {
        if let Err(e) = self.get_my_profile().await {
            warn!("Profile re-fetch after authentication failed: {}", e);
        }
    }
}

#[async_trait]
impl ProfileSource for SessionClient {
    async fn fetch_profile(&self) -> Result<Option<AccountProfile>, ClientError> {
        self.get_my_profile().await
    }
}
