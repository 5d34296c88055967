//! HTTP wrappers for every REST endpoint.
//!
//! [`ApiClient`] keeps the session cookie in reqwest's cookie store, so a
//! successful `signup` or `login` authenticates every later call.

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::api::error::ErrorBody;
use crate::types::bookmark::{Bookmark, BookmarkPatch, LayoutResult, LayoutUpdate, NewBookmark};
use crate::types::errors::ClientError;
use crate::types::settings::DisplaySettings;
use crate::types::user::{LoginRequest, SignupRequest, UserProfile};

/// Operations the cache and layout buffer depend on.
///
/// Implemented by [`ApiClient`]; tests substitute in-memory fakes.
#[allow(async_fn_in_trait)]
pub trait BookmarkApi {
    async fn list_bookmarks(&self) -> Result<Vec<Bookmark>, ClientError>;
    async fn delete_bookmark(&self, id: &str) -> Result<(), ClientError>;
    async fn save_layout(&self, batch: &[LayoutUpdate]) -> Result<LayoutResult, ClientError>;
}

/// Client for the Orbitmarks REST API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client for a server root such as `http://127.0.0.1:8080`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ─── Auth ───

    pub async fn signup(&self, request: &SignupRequest) -> Result<UserProfile, ClientError> {
        let resp = self
            .http
            .post(self.url("/api/auth/signup"))
            .json(request)
            .send()
            .await
            .map_err(network)?;
        decode(resp).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ClientError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&request)
            .send()
            .await
            .map_err(network)?;
        decode(resp).await
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(self.url("/api/auth/logout"))
            .send()
            .await
            .map_err(network)?;
        expect_empty(resp).await
    }

    pub async fn me(&self) -> Result<UserProfile, ClientError> {
        let resp = self
            .http
            .get(self.url("/api/auth/me"))
            .send()
            .await
            .map_err(network)?;
        decode(resp).await
    }

    // ─── Bookmarks ───

    pub async fn search_bookmarks(&self, query: &str) -> Result<Vec<Bookmark>, ClientError> {
        let resp = self
            .http
            .get(self.url("/api/bookmarks"))
            .query(&[("q", query)])
            .send()
            .await
            .map_err(network)?;
        decode(resp).await
    }

    pub async fn get_bookmark(&self, id: &str) -> Result<Bookmark, ClientError> {
        let resp = self
            .http
            .get(self.url(&format!("/api/bookmarks/{}", id)))
            .send()
            .await
            .map_err(network)?;
        decode(resp).await
    }

    pub async fn create_bookmark(&self, input: &NewBookmark) -> Result<Bookmark, ClientError> {
        let resp = self
            .http
            .post(self.url("/api/bookmarks"))
            .json(input)
            .send()
            .await
            .map_err(network)?;
        decode(resp).await
    }

    pub async fn update_bookmark(&self, id: &str, patch: &BookmarkPatch) -> Result<Bookmark, ClientError> {
        let resp = self
            .http
            .patch(self.url(&format!("/api/bookmarks/{}", id)))
            .json(patch)
            .send()
            .await
            .map_err(network)?;
        decode(resp).await
    }

    // ─── Settings ───

    pub async fn get_settings(&self) -> Result<DisplaySettings, ClientError> {
        let resp = self
            .http
            .get(self.url("/api/settings"))
            .send()
            .await
            .map_err(network)?;
        decode(resp).await
    }

    pub async fn put_settings(&self, settings: &DisplaySettings) -> Result<DisplaySettings, ClientError> {
        let resp = self
            .http
            .put(self.url("/api/settings"))
            .json(settings)
            .send()
            .await
            .map_err(network)?;
        decode(resp).await
    }
}

impl BookmarkApi for ApiClient {
    async fn list_bookmarks(&self) -> Result<Vec<Bookmark>, ClientError> {
        let resp = self
            .http
            .get(self.url("/api/bookmarks"))
            .send()
            .await
            .map_err(network)?;
        decode(resp).await
    }

    async fn delete_bookmark(&self, id: &str) -> Result<(), ClientError> {
        let resp = self
            .http
            .delete(self.url(&format!("/api/bookmarks/{}", id)))
            .send()
            .await
            .map_err(network)?;
        expect_empty(resp).await
    }

    async fn save_layout(&self, batch: &[LayoutUpdate]) -> Result<LayoutResult, ClientError> {
        let resp = self
            .http
            .put(self.url("/api/bookmarks/layout"))
            .json(batch)
            .send()
            .await
            .map_err(network)?;
        decode(resp).await
    }
}

fn network(err: reqwest::Error) -> ClientError {
    ClientError::Network(err.to_string())
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    if !resp.status().is_success() {
        return Err(error_from(resp).await);
    }
    resp.json::<T>()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}

async fn expect_empty(resp: Response) -> Result<(), ClientError> {
    if !resp.status().is_success() {
        return Err(error_from(resp).await);
    }
    Ok(())
}

/// Maps a failed response onto the error kinds the UI distinguishes.
async fn error_from(resp: Response) -> ClientError {
    let status = resp.status();
    let message = match resp.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };
    match status {
        StatusCode::BAD_REQUEST => ClientError::Validation(message),
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::CONFLICT => ClientError::Conflict(message),
        other => ClientError::Server(other.as_u16(), message),
    }
}
