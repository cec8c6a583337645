use serde::{Deserialize, Serialize};

use crate::types::profile::{Engineer, Role};

// ===== Session Request/Response Types =====

#[derive(Debug, Clone, Serialize)]
pub struct SigninRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigninResponse {
    pub access: String,
    pub refresh: String,
    pub role: Option<Role>,
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupUser {
    pub email: String,
    #[serde(default)]
    pub is_verified: bool,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupResponse {
    pub user: SignupUser,
    pub access: Option<String>,
    pub refresh: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    // Only present when the server rotates refresh tokens
    pub refresh: Option<String>,
}

// ===== Engineer Service Response Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineerPage {
    #[serde(default)]
    pub engineers: Vec<Engineer>,
    #[serde(default)]
    pub total: u64,
}

impl EngineerPage {
    /// The first page is shown without pagination when it came back short
    pub fn needs_pagination(&self, page: u32, limit: u32) -> bool {
        !(page == 1 && self.engineers.len() < limit as usize)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineerCount {
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineerCreated {
    #[serde(rename = "engineerId")]
    pub engineer_id: String,
    pub message: Option<String>,
}

// ===== Media Host Response Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedImage {
    pub secure_url: String,
    pub url: Option<String>,
    pub public_id: Option<String>,
    pub format: Option<String>,
    pub bytes: Option<u64>,
}
