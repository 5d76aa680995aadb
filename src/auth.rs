//! Authentication state
//!
//! Owns the logged-in flag, the current user record, and the bearer token.
//! All three are persisted and cleared together; the session is
//! authenticated iff both token and user are present. Logout is
//! client-side only — the backend token is not invalidated remotely.

use crate::api::{ApiClient, AuthUser, TokenResponse};
use crate::error::Result;
use crate::storage::{keys, KvStore};
use std::collections::HashMap;

/// Minimum password length accepted at registration
const MIN_PASSWORD_LEN: usize = 6;

/// Authentication session backed by the key-value store
pub struct AuthSession {
    store: KvStore,
    token: Option<String>,
    user: Option<AuthUser>,
}

impl AuthSession {
    /// Hydrate authentication state from the store
    pub fn load(store: KvStore) -> Result<Self> {
        let token = store.get(keys::AUTH_TOKEN)?;
        let user = store.get_json::<AuthUser>(keys::CURRENT_USER)?;

        // A token without a user (or the reverse) is treated as logged out.
        Ok(Self { store, token, user })
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub fn current_user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    /// The bearer token, present only when authenticated
    pub fn token(&self) -> Option<&str> {
        if self.is_authenticated() {
            self.token.as_deref()
        } else {
            None
        }
    }

    /// Authorization headers for protected calls
    ///
    /// Empty when not authenticated.
    pub fn auth_headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        if let Some(token) = self.token() {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        headers
    }

    /// Log in against the backend and persist the session
    ///
    /// A rejected login surfaces the server-supplied message; nothing is
    /// persisted in that case.
    pub async fn login(
        &mut self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<TokenResponse> {
        let response = api.login(email, password).await?;
        self.adopt(&response)?;
        tracing::info!("Logged in as {}", response.user.email);
        Ok(response)
    }

    /// Register a new account, logging in with the returned credentials
    pub async fn register(
        &mut self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<TokenResponse> {
        let response = api.register(email, password).await?;
        self.adopt(&response)?;
        tracing::info!("Registered and logged in as {}", response.user.email);
        Ok(response)
    }

    fn adopt(&mut self, response: &TokenResponse) -> Result<()> {
        self.store.put(keys::AUTH_TOKEN, &response.access_token)?;
        self.store.put_json(keys::CURRENT_USER, &response.user)?;
        self.token = Some(response.access_token.clone());
        self.user = Some(response.user.clone());
        Ok(())
    }

    /// Clear the session in memory and in the store
    pub fn logout(&mut self) -> Result<()> {
        self.token = None;
        self.user = None;
        self.store.remove(keys::AUTH_TOKEN)?;
        self.store.remove(keys::CURRENT_USER)?;
        tracing::debug!("Logged out");
        Ok(())
    }
}

/// Validate login fields before any network call
pub fn validate_login(email: &str, password: &str) -> std::result::Result<(), String> {
    if email.trim().is_empty() || password.is_empty() {
        return Err("Please fill in all fields".to_string());
    }
    Ok(())
}

/// Validate registration fields before any network call
pub fn validate_registration(
    email: &str,
    password: &str,
    confirm: &str,
) -> std::result::Result<(), String> {
    if email.trim().is_empty() || password.is_empty() || confirm.is_empty() {
        return Err("Please fill in all fields".to_string());
    }
    if password != confirm {
        return Err("Passwords do not match".to_string());
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        ));
    }
    Ok(())
}
