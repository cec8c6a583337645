// src/session/mod.rs
pub mod client;
pub mod store;

pub use client::SessionClient;
pub use store::{LoggedInSubscription, SessionSnapshot, SessionStore};
