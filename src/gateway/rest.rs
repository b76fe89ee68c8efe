//! HTTP client for the backend's REST surface.
//!
//! Implements every collaborator trait so the forms and the site editor can
//! run against a remote server. The bearer token is picked up from sign-in /
//! sign-up responses, or set explicitly from a cached session.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use super::{
    ClientGateway, DishGateway, GatewayError, GatewayResult, IdentityProvider, ObjectStorage, SiteGateway,
    StoredObject,
};
use crate::models::{ClientProfile, CuisineCatalogEntry, DishItem, SiteDocument, WebsiteRecord};
use crate::session::{Session, SessionUser};

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    field_errors: Option<HashMap<String, String>>,
}

#[derive(Serialize)]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
}

pub struct RestClient {
    base_url: String,
    http: reqwest::Client,
    token: RwLock<Option<String>>,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>) -> GatewayResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = token;
    }

    fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        let builder = self.http.request(method, url);
        match self.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_raw(&self, builder: RequestBuilder) -> GatewayResult<reqwest::Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body: ErrorBody = response.json().await.unwrap_or_default();
        let message = if body.message.is_empty() {
            status.to_string()
        } else {
            body.message
        };

        Err(match status {
            StatusCode::UNAUTHORIZED => GatewayError::Unauthorized(message),
            StatusCode::FORBIDDEN => GatewayError::Forbidden(message),
            StatusCode::NOT_FOUND => GatewayError::NotFound(message),
            StatusCode::CONFLICT => GatewayError::Conflict(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY | StatusCode::PAYLOAD_TOO_LARGE => {
                GatewayError::Rejected {
                    message,
                    field_errors: body.field_errors.unwrap_or_default(),
                }
            }
            _ => GatewayError::Backend(message),
        })
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> GatewayResult<T> {
        let response = self.send_raw(builder).await?;
        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| GatewayError::Backend(format!("unexpected response body: {}", e)))?;
        Ok(envelope.data)
    }

    /// Like `send`, but a 404 means "absent" rather than an error
    async fn send_optional<T: DeserializeOwned>(&self, builder: RequestBuilder) -> GatewayResult<Option<T>> {
        match self.send(builder).await {
            Ok(value) => Ok(Some(value)),
            Err(GatewayError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn health(&self) -> GatewayResult<Value> {
        self.send(self.request(Method::GET, "/health")).await
    }

    pub async fn whoami(&self) -> GatewayResult<SessionUser> {
        self.send(self.request(Method::GET, "/api/auth/whoami")).await
    }

    pub async fn cuisines(&self) -> GatewayResult<Vec<CuisineCatalogEntry>> {
        self.send(self.request(Method::GET, "/api/cuisines")).await
    }

    async fn authenticate(&self, path: &str, email: &str, password: &str) -> GatewayResult<Session> {
        let session: Session = self
            .send(self.request(Method::POST, path).json(&CredentialsBody { email, password }))
            .await?;
        self.set_token(Some(session.access_token.clone()));
        Ok(session)
    }
}

#[async_trait]
impl IdentityProvider for RestClient {
    async fn sign_up(&self, email: &str, password: &str) -> GatewayResult<Session> {
        self.authenticate("/auth/signup", email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> GatewayResult<Session> {
        self.authenticate("/auth/signin", email, password).await
    }

    async fn sign_out(&self, session: &Session) -> GatewayResult<()> {
        let builder = self
            .http
            .delete(format!("{}/api/auth/session", self.base_url))
            .bearer_auth(&session.access_token);
        let result = self.send_raw(builder).await.map(|_| ());
        self.set_token(None);
        result
    }
}

#[async_trait]
impl DishGateway for RestClient {
    async fn insert(&self, dish: &DishItem) -> GatewayResult<DishItem> {
        self.send(self.request(Method::POST, "/api/dish").json(dish)).await
    }

    async fn update(&self, id: Uuid, dish: &DishItem) -> GatewayResult<DishItem> {
        self.send(self.request(Method::PUT, &format!("/api/dish/{}", id)).json(dish))
            .await
    }

    async fn fetch_all(&self, owner: Uuid) -> GatewayResult<Vec<DishItem>> {
        self.send(self.request(Method::GET, &format!("/api/dishes/{}", owner)))
            .await
    }

    async fn delete(&self, id: Uuid, _owner: Uuid) -> GatewayResult<()> {
        self.send_raw(self.request(Method::DELETE, &format!("/api/dish/{}", id)))
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl ClientGateway for RestClient {
    async fn insert(&self, profile: &ClientProfile) -> GatewayResult<ClientProfile> {
        self.send(self.request(Method::POST, "/api/client").json(profile)).await
    }

    async fn update(&self, profile: &ClientProfile) -> GatewayResult<ClientProfile> {
        self.send(self.request(Method::PUT, "/api/client").json(profile)).await
    }

    async fn fetch(&self, owner: Uuid) -> GatewayResult<Option<ClientProfile>> {
        self.send_optional(self.request(Method::GET, &format!("/api/client/{}", owner)))
            .await
    }

    async fn link_website(&self, _owner: Uuid, website_id: Uuid) -> GatewayResult<()> {
        self.send_raw(
            self.request(Method::POST, "/api/client/website")
                .json(&json!({ "website_id": website_id })),
        )
        .await
        .map(|_| ())
    }
}

#[async_trait]
impl SiteGateway for RestClient {
    async fn insert(&self, record: &WebsiteRecord) -> GatewayResult<WebsiteRecord> {
        self.send(self.request(Method::POST, "/api/website").json(record)).await
    }

    async fn fetch(&self, owner: Uuid) -> GatewayResult<Option<WebsiteRecord>> {
        self.send_optional(self.request(Method::GET, &format!("/api/website/{}", owner)))
            .await
    }

    async fn replace_document(&self, _owner: Uuid, document: &SiteDocument) -> GatewayResult<WebsiteRecord> {
        self.send(self.request(Method::PUT, "/api/website").json(document)).await
    }
}

/// Splits `folder/name.ext` into its folder and file name
fn split_object_path(path: &str) -> (&str, &str) {
    match path.rsplit_once('/') {
        Some((folder, name)) if !folder.is_empty() => (folder, name),
        Some((_, name)) => ("uploads", name),
        None => ("uploads", path),
    }
}

#[async_trait]
impl ObjectStorage for RestClient {
    async fn upload(&self, bytes: Vec<u8>, path: &str, content_type: &str) -> GatewayResult<StoredObject> {
        let (folder, filename) = split_object_path(path);
        let builder = self
            .request(Method::POST, &format!("/api/upload/{}", folder))
            .query(&[("filename", filename)])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        self.send(builder).await
    }

    async fn delete(&self, path: &str) -> GatewayResult<()> {
        self.send_raw(
            self.request(Method::POST, "/api/file/delete")
                .json(&json!({ "path": path })),
        )
        .await
        .map(|_| ())
    }
}
