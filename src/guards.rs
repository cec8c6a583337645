// src/guards.rs
//! Navigation guards: each decides whether a route may be entered.
//!
//! The authenticated and signin-only guards look only at the session store.
//! The role-aware guards fetch the live profile through a [`ProfileSource`],
//! and any failure there closes the route: an unauthorized answer sends the
//! user to signin, everything else denies the navigation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::auth::is_token_expired;
use crate::error::ClientError;
use crate::navigation::Route;
use crate::session::SessionStore;
use crate::types::{AccountProfile, Role};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    Redirect(Route),
    Deny,
}

/// Where guards get the live account profile from
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_profile(&self) -> Result<Option<AccountProfile>, ClientError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Authenticated,
    SigninOnly,
    RoleMatch(Role),
    ProfileDetails(Role),
    UnsetRole,
}

impl Guard {
    pub async fn check(
        &self,
        store: &SessionStore,
        profiles: &dyn ProfileSource,
        now: DateTime<Utc>,
    ) -> GuardOutcome {
        match *self {
            Guard::Authenticated => authenticated_guard(store, now),
            Guard::SigninOnly => signin_only_guard(store, now),
            Guard::RoleMatch(expected) => role_match_guard(profiles, expected).await,
            Guard::ProfileDetails(expected) => profile_details_guard(profiles, expected).await,
            Guard::UnsetRole => unset_role_guard(profiles).await,
        }
    }
}

pub fn authenticated_guard(store: &SessionStore, now: DateTime<Utc>) -> GuardOutcome {
    if is_token_expired(store.get_token().as_deref(), now) {
        debug!("No valid token, redirecting to signin");
        store.set_logged_in(false);
        return GuardOutcome::Redirect(Route::Signin);
    }
    GuardOutcome::Allow
}

pub fn signin_only_guard(store: &SessionStore, now: DateTime<Utc>) -> GuardOutcome {
    if store.is_logged_in() && !is_token_expired(store.get_token().as_deref(), now) {
        return GuardOutcome::Redirect(Route::Home);
    }
    GuardOutcome::Allow
}

pub async fn role_match_guard(profiles: &dyn ProfileSource, expected: Role) -> GuardOutcome {
    let profile = match fetch(profiles).await {
        Ok(profile) => profile,
        Err(outcome) => return outcome,
    };

    let Some(profile) = profile else {
        return GuardOutcome::Redirect(Route::Signin);
    };

    match profile.role {
        Some(role) if role == expected => GuardOutcome::Allow,
        Some(role) => GuardOutcome::Redirect(Route::profile_update(role, &profile.id)),
        None => GuardOutcome::Redirect(Route::RoleSelection),
    }
}

pub async fn profile_details_guard(profiles: &dyn ProfileSource, expected: Role) -> GuardOutcome {
    let profile = match fetch(profiles).await {
        Ok(profile) => profile,
        Err(outcome) => return outcome,
    };

    match profile.and_then(|p| p.role) {
        Some(Role::Recruiter) => GuardOutcome::Allow,
        Some(role) if role == expected => GuardOutcome::Allow,
        _ => GuardOutcome::Redirect(Route::Home),
    }
}

pub async fn unset_role_guard(profiles: &dyn ProfileSource) -> GuardOutcome {
    let profile = match fetch(profiles).await {
        Ok(profile) => profile,
        Err(outcome) => return outcome,
    };

    match profile.and_then(|p| p.role) {
        None => GuardOutcome::Allow,
        Some(role) => GuardOutcome::Redirect(Route::profile_form(role)),
    }
}

async fn fetch(profiles: &dyn ProfileSource) -> Result<Option<AccountProfile>, GuardOutcome> {
    profiles.fetch_profile().await.map_err(|e| {
        if e.is_unauthorized() {
            warn!("Profile fetch unauthorized, redirecting to signin: {}", e);
            GuardOutcome::Redirect(Route::Signin)
        } else {
            warn!("Profile fetch failed, denying navigation: {}", e);
            GuardOutcome::Deny
        }
    })
}
