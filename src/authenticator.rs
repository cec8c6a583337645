// src/authenticator.rs
//! Single point through which every outgoing request gets its credentials

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::Request;
use std::sync::Arc;
use tracing::{trace, warn};

use crate::auth::bearer;
use crate::storage::{LocalStorage, TOKEN_KEY};

pub struct RequestAuthenticator {
    storage: Arc<dyn LocalStorage>,
    media_host: String,
}

impl RequestAuthenticator {
    /// `media_host` is the host name of the media upload endpoint, which must
    /// never see the API token
    pub fn new(storage: Arc<dyn LocalStorage>, media_host: impl Into<String>) -> Self {
        Self {
            storage,
            media_host: media_host.into().to_lowercase(),
        }
    }

    pub fn media_host(&self) -> &str {
        &self.media_host
    }

    pub fn is_media_request(&self, request: &Request) -> bool {
        request
            .url()
            .host_str()
            .map(|host| host.eq_ignore_ascii_case(&self.media_host))
            .unwrap_or(false)
    }

    /// Attach the bearer token unless the request targets the media host
    pub fn authenticate(&self, mut request: Request) -> Request {
        if self.is_media_request(&request) {
            trace!("Skipping authorization for media request: {}", request.url());
            request.headers_mut().remove(AUTHORIZATION);
            return request;
        }

        let Some(token) = self.storage.get_item(TOKEN_KEY) else {
            return request;
        };

        match HeaderValue::from_str(&bearer(&token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers_mut().insert(AUTHORIZATION, value);
            }
            Err(e) => warn!("Stored token is not a valid header value: {}", e),
        }

        request
    }
}
