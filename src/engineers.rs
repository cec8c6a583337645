// src/engineers.rs
//! Engineer profile listing and management

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::ServiceClient;
use crate::error::ClientError;
use crate::media::optimize_avatar_url;
use crate::types::response::{EngineerCount, EngineerCreated, EngineerPage};
use crate::types::{Engineer, EngineerSubmission, RoleLevel, RoleType};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Filters for the engineers listing. Empty filters are sent as empty strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineerQuery {
    pub page: u32,
    pub limit: u32,
    pub country: String,
    #[serde(rename = "roleType", serialize_with = "role_type_param")]
    pub role_type: Option<RoleType>,
    #[serde(rename = "roleLevel", serialize_with = "role_level_param")]
    pub role_level: Option<RoleLevel>,
}

impl Default for EngineerQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            country: String::new(),
            role_type: None,
            role_level: None,
        }
    }
}

fn role_type_param<S: serde::Serializer>(
    value: &Option<RoleType>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.map(|v| v.as_str()).unwrap_or_default())
}

fn role_level_param<S: serde::Serializer>(
    value: &Option<RoleLevel>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.map(|v| v.as_str()).unwrap_or_default())
}

pub struct EngineerService {
    api: Arc<ServiceClient>,
    cloud_name: String,
}

impl EngineerService {
    pub fn new(api: Arc<ServiceClient>, cloud_name: &str) -> Self {
        Self {
            api,
            cloud_name: cloud_name.to_string(),
        }
    }

    pub async fn list(&self, query: &EngineerQuery) -> Result<EngineerPage, ClientError> {
        debug!("Listing engineers: {:?}", query);
        let mut page: EngineerPage = self.api.get_with_query("/engineers/", query).await?;

        for engineer in &mut page.engineers {
            self.rewrite_avatar(engineer);
        }

        info!(
            "Fetched {} engineers (total {})",
            page.engineers.len(),
            page.total
        );
        Ok(page)
    }

    pub async fn count(&self) -> Result<u64, ClientError> {
        let count: EngineerCount = self.api.get("/engineers/count/").await?;
        Ok(count.count)
    }

    pub async fn get(&self, id: &str) -> Result<Engineer, ClientError> {
        let mut engineer: Engineer = self.api.get(&format!("/engineers/{}/", id)).await?;
        self.rewrite_avatar(&mut engineer);
        Ok(engineer)
    }

    /// Engineer profile of the signed-in user
    pub async fn get_mine(&self) -> Result<Engineer, ClientError> {
        self.api.get("/engineers/me/").await
    }

    pub async fn create(&self, submission: &EngineerSubmission) -> Result<String, ClientError> {
        let created: EngineerCreated = self.api.post_json("/engineers/", submission).await?;
        info!("Engineer profile created: {}", created.engineer_id);
        Ok(created.engineer_id)
    }

    pub async fn update_mine(
        &self,
        submission: &EngineerSubmission,
    ) -> Result<Engineer, ClientError> {
        let engineer: Engineer = self.api.put_json("/engineers/me/", submission).await?;
        info!("Engineer profile updated: {}", engineer.id);
        Ok(engineer)
    }

    fn rewrite_avatar(&self, engineer: &mut Engineer) {
        let current = engineer.avatar.as_deref().unwrap_or_default();
        engineer.avatar = Some(optimize_avatar_url(current, &self.cloud_name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authenticator::RequestAuthenticator;
    use crate::storage::MemoryStorage;
    use reqwest::Method;

    fn service() -> (Arc<ServiceClient>, EngineerService) {
        let storage = Arc::new(MemoryStorage::new());
        let authenticator = Arc::new(RequestAuthenticator::new(storage, "api.cloudinary.com"));
        let api = Arc::new(
            ServiceClient::new("http://127.0.0.1:9/api", 2, authenticator).unwrap(),
        );
        (api.clone(), EngineerService::new(api, "rmsmms"))
    }

    #[test]
    fn test_query_serializes_every_filter() {
        let (api, _) = service();
        let query = EngineerQuery {
            page: 2,
            role_type: Some(RoleType::ContractFullTime),
            ..EngineerQuery::default()
        };

        let request = api
            .request(Method::GET, "/engineers/")
            .query(&query)
            .build()
            .unwrap();

        assert_eq!(
            request.url().query(),
            Some("page=2&limit=10&country=&roleType=contract_full_time&roleLevel=")
        );
    }

    #[tokio::test]
    async fn test_list_surfaces_transport_errors() {
        let (_, service) = service();
        let result = service.list(&EngineerQuery::default()).await;
        assert!(matches!(result, Err(ClientError::Transport(_))));
    }

    #[test]
    fn test_rewrite_avatar_fills_placeholder() {
        let (_, service) = service();
        let mut engineer: Engineer = serde_json::from_value(serde_json::json!({
            "id": "6f1c1b9e-3c1a-4a51-9f5e-0d7f5b0a9c11",
            "first_name": "Ada",
            "last_name": "Lovelace"
        }))
        .unwrap();

        service.rewrite_avatar(&mut engineer);
        assert_eq!(engineer.avatar.as_deref(), Some("assets/empty-avatar.png"));
    }
}
