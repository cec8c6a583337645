// src/lib.rs
//! Client library for the recruiting platform: session handling, navigation
//! guards, authenticated API access, engineer profiles and avatar uploads.

pub mod auth;
pub mod authenticator;
pub mod cli;
pub mod context;
pub mod core;
pub mod engineers;
pub mod error;
pub mod forms;
pub mod guards;
pub mod media;
pub mod navigation;
pub mod session;
pub mod storage;
pub mod types;
pub mod utils;

pub use context::SessionContext;
pub use error::ClientError;
pub use guards::{Guard, GuardOutcome, ProfileSource};
pub use navigation::{Navigation, Route, Router};
pub use session::{LoggedInSubscription, SessionClient, SessionSnapshot, SessionStore};
pub use storage::{FileStorage, LocalStorage, MemoryStorage};
