// src/types/mod.rs
pub mod profile;
pub mod response;

pub use profile::{AccountProfile, Engineer, EngineerSubmission, Role, RoleLevel, RoleType};
