// src/core/mod.rs
//! Shared configuration and HTTP plumbing

pub mod config_manager;
pub mod service_client;
#[cfg(test)]
pub(crate) mod test_server;

pub use config_manager::ConfigManager;
pub use service_client::ServiceClient;
