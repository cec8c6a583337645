// src/session/store.rs
//! Process-wide session state: token, role and cached account profile

use chrono::Utc;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::auth::is_token_expired;
use crate::navigation::Route;
use crate::storage::{LocalStorage, REFRESH_TOKEN_KEY, SELECTED_ROLE_KEY, TOKEN_KEY};
use crate::types::{AccountProfile, Role};

#[derive(Debug, Default)]
struct SessionState {
    role: Option<Role>,
    profile: Option<AccountProfile>,
}

/// Point-in-time view of the session handed to guards
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub token: Option<String>,
    pub role: Option<Role>,
    pub profile: Option<AccountProfile>,
    pub is_logged_in: bool,
}

pub struct SessionStore {
    storage: Arc<dyn LocalStorage>,
    state: RwLock<SessionState>,
    logged_in: watch::Sender<bool>,
}

impl SessionStore {
    /// Build the store over `storage`; the memory cache always starts empty
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        let token = storage.get_item(TOKEN_KEY);
        let logged_in = !is_token_expired(token.as_deref(), Utc::now());

        info!(
            "Session store initialized. Token exists: {}, logged in: {}",
            token.is_some(),
            logged_in
        );

        let (sender, _) = watch::channel(logged_in);

        Self {
            storage,
            state: RwLock::new(SessionState::default()),
            logged_in: sender,
        }
    }

    pub fn get_token(&self) -> Option<String> {
        self.storage.get_item(TOKEN_KEY)
    }

    pub fn get_refresh_token(&self) -> Option<String> {
        self.storage.get_item(REFRESH_TOKEN_KEY)
    }

    /// Persist a freshly issued token pair
    pub fn store_tokens(&self, access: &str, refresh: Option<&str>) {
        self.storage.set_item(TOKEN_KEY, access);
        if let Some(refresh) = refresh {
            self.storage.set_item(REFRESH_TOKEN_KEY, refresh);
        }
        debug!("Stored new access token");
    }

    pub fn set_role(&self, role: Role) {
        self.write().role = Some(role);
        self.storage.set_item(SELECTED_ROLE_KEY, role.as_str());
        info!("Role set in storage: {}", role);
    }

    /// Role from memory, falling back to durable storage
    pub fn get_role(&self) -> Option<Role> {
        if let Some(role) = self.read().role {
            return Some(role);
        }

        let stored = self.storage.get_item(SELECTED_ROLE_KEY)?;
        match stored.parse::<Role>() {
            Ok(role) => {
                self.write().role = Some(role);
                Some(role)
            }
            Err(e) => {
                warn!("Ignoring stored role: {}", e);
                None
            }
        }
    }

    pub fn set_logged_in(&self, value: bool) {
        if !value {
            self.storage.remove_item(TOKEN_KEY);
            self.storage.remove_item(REFRESH_TOKEN_KEY);
            self.storage.remove_item(SELECTED_ROLE_KEY);

            let mut state = self.write();
            state.role = None;
            state.profile = None;
        }

        let changed = self.logged_in.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });

        if changed {
            info!("Logged-in state changed to: {}", value);
        }
    }

    pub fn is_logged_in(&self) -> bool {
        *self.logged_in.borrow()
    }

    /// Clear the session and return where the user should be sent
    pub fn signout(&self) -> Route {
        info!("Signing out user");
        self.set_logged_in(false);
        Route::Signin
    }

    pub fn profile(&self) -> Option<AccountProfile> {
        self.read().profile.clone()
    }

    /// Cache the live profile; its role becomes the session role
    pub fn set_profile(&self, profile: AccountProfile) {
        if let Some(role) = profile.role {
            self.set_role(role);
        }
        self.write().profile = Some(profile);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            token: self.get_token(),
            role: self.get_role(),
            profile: self.profile(),
            is_logged_in: self.is_logged_in(),
        }
    }

    pub fn subscribe(&self) -> LoggedInSubscription {
        LoggedInSubscription {
            receiver: self.logged_in.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.logged_in.receiver_count()
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Handle on the logged-in signal. Dropping it unsubscribes.
pub struct LoggedInSubscription {
    receiver: watch::Receiver<bool>,
}

impl LoggedInSubscription {
    pub fn current(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Wait for the next change; `None` once the store is gone
    pub async fn changed(&mut self) -> Option<bool> {
        self.receiver.changed().await.ok()?;
        Some(*self.receiver.borrow_and_update())
    }

    pub fn unsubscribe(self) {}
}
