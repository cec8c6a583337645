// src/navigation.rs
//! Route table and a router that runs each route's guard chain

use anyhow::{bail, Result};
use chrono::Utc;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::guards::{Guard, GuardOutcome, ProfileSource};
use crate::session::SessionStore;
use crate::types::Role;

/// Redirect chains longer than this are treated as a loop
pub const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Signin,
    Signup,
    RoleSelection,
    EmailVerify,
    Verify { user_id: String, code: String },
    Engineers,
    EngineerDetails { id: String },
    EngineerForm,
    EngineerUpdate { id: String },
    BusinessForm,
    BusinessUpdate { id: String },
    NotFound,
}

impl Route {
    /// Match a path against the route table; unknown paths map to `NotFound`
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["signin"] => Route::Signin,
            ["signup"] => Route::Signup,
            ["role"] => Route::RoleSelection,
            ["email-verify"] => Route::EmailVerify,
            ["verify", user_id, code] => Route::Verify {
                user_id: user_id.to_string(),
                code: code.to_string(),
            },
            ["engineers"] => Route::Engineers,
            ["engineers", "details", id] => Route::EngineerDetails { id: id.to_string() },
            ["engineers", "form"] => Route::EngineerForm,
            ["engineers", "update", id] => Route::EngineerUpdate { id: id.to_string() },
            ["business", "form"] => Route::BusinessForm,
            ["business", "update", id] => Route::BusinessUpdate { id: id.to_string() },
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Signin => "/signin".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::RoleSelection => "/role".to_string(),
            Route::EmailVerify => "/email-verify".to_string(),
            Route::Verify { user_id, code } => format!("/verify/{}/{}", user_id, code),
            Route::Engineers => "/engineers".to_string(),
            Route::EngineerDetails { id } => format!("/engineers/details/{}", id),
            Route::EngineerForm => "/engineers/form".to_string(),
            Route::EngineerUpdate { id } => format!("/engineers/update/{}", id),
            Route::BusinessForm => "/business/form".to_string(),
            Route::BusinessUpdate { id } => format!("/business/update/{}", id),
            Route::NotFound => "/404".to_string(),
        }
    }

    /// Guards evaluated, in order, before the route is entered
    pub fn guards(&self) -> Vec<Guard> {
        match self {
            Route::Signin | Route::Signup => vec![Guard::SigninOnly],
            Route::RoleSelection => vec![Guard::UnsetRole],
            Route::EngineerDetails { .. } => {
                vec![Guard::Authenticated, Guard::ProfileDetails(Role::Engineer)]
            }
            Route::EngineerForm | Route::BusinessForm => vec![Guard::Authenticated],
            Route::EngineerUpdate { .. } => {
                vec![Guard::Authenticated, Guard::RoleMatch(Role::Engineer)]
            }
            Route::BusinessUpdate { .. } => {
                vec![Guard::Authenticated, Guard::RoleMatch(Role::Recruiter)]
            }
            _ => Vec::new(),
        }
    }

    /// Profile form for a role
    pub fn profile_form(role: Role) -> Route {
        match role {
            Role::Engineer => Route::EngineerForm,
            Role::Recruiter => Route::BusinessForm,
        }
    }

    /// Profile update page for a role
    pub fn profile_update(role: Role, id: &str) -> Route {
        match role {
            Role::Engineer => Route::EngineerUpdate { id: id.to_string() },
            Role::Recruiter => Route::BusinessUpdate { id: id.to_string() },
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Result of a navigation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Landed on the route (possibly after redirects)
    Arrived(Route),
    /// A guard refused; the router stays where it was
    Denied { attempted: Route, current: Route },
}

pub struct Router {
    store: Arc<SessionStore>,
    profiles: Arc<dyn ProfileSource>,
    current: Mutex<Route>,
}

impl Router {
    pub fn new(store: Arc<SessionStore>, profiles: Arc<dyn ProfileSource>) -> Self {
        Self {
            store,
            profiles,
            current: Mutex::new(Route::Home),
        }
    }

    pub fn current(&self) -> Route {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub async fn navigate(&self, path: &str) -> Result<Navigation> {
        self.navigate_to(Route::parse(path)).await
    }

    pub async fn navigate_to(&self, route: Route) -> Result<Navigation> {
        let mut target = route;
        let mut hops = 0;

        'resolve: loop {
            debug!("Resolving navigation to {}", target);

            for guard in target.guards() {
                match guard
                    .check(&self.store, self.profiles.as_ref(), Utc::now())
                    .await
                {
                    GuardOutcome::Allow => continue,
                    GuardOutcome::Redirect(next) => {
                        hops += 1;
                        if hops > MAX_REDIRECTS {
                            bail!(
                                "Too many redirects while navigating to {} (last hop: {})",
                                target,
                                next
                            );
                        }
                        info!("{:?} redirected {} -> {}", guard, target, next);
                        target = next;
                        continue 'resolve;
                    }
                    GuardOutcome::Deny => {
                        warn!("{:?} denied navigation to {}", guard, target);
                        return Ok(Navigation::Denied {
                            attempted: target,
                            current: self.current(),
                        });
                    }
                }
            }

            break;
        }

        *self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = target.clone();
        info!("Navigated to {}", target);
        Ok(Navigation::Arrived(target))
    }

    /// Sign out and move to the page the store points at
    pub async fn signout(&self) -> Result<Navigation> {
        let target = self.store.signout();
        self.navigate_to(target).await
    }
}
