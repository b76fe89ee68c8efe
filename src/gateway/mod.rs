//! Collaborator seams: persistence, object storage and identity.
//!
//! The same traits are implemented by the backend (`database::PgStore`,
//! `memory::MemoryBackend`, `assets::local::LocalObjectStorage`) and by the
//! operator client (`rest::RestClient`), so forms and the site editor run
//! unchanged on either side of the wire.

pub mod memory;
pub mod rest;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ClientProfile, DishItem, SiteDocument, WebsiteRecord};
use crate::session::Session;

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Not authenticated: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rejected: {message}")]
    Rejected {
        message: String,
        field_errors: HashMap<String, String>,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl GatewayError {
    pub fn rejected(message: impl Into<String>) -> Self {
        GatewayError::Rejected {
            message: message.into(),
            field_errors: HashMap::new(),
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// A durable object in storage: public URL plus the path used to delete it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub url: String,
    pub path: String,
}

#[async_trait]
pub trait DishGateway: Send + Sync {
    async fn insert(&self, dish: &DishItem) -> GatewayResult<DishItem>;

    /// Replaces the record; the owner is `dish.user_id`
    async fn update(&self, id: Uuid, dish: &DishItem) -> GatewayResult<DishItem>;

    /// All dishes of one owner in insertion order
    async fn fetch_all(&self, owner: Uuid) -> GatewayResult<Vec<DishItem>>;

    async fn delete(&self, id: Uuid, owner: Uuid) -> GatewayResult<()>;
}

#[async_trait]
pub trait ClientGateway: Send + Sync {
    async fn insert(&self, profile: &ClientProfile) -> GatewayResult<ClientProfile>;

    async fn update(&self, profile: &ClientProfile) -> GatewayResult<ClientProfile>;

    async fn fetch(&self, owner: Uuid) -> GatewayResult<Option<ClientProfile>>;

    async fn link_website(&self, owner: Uuid, website_id: Uuid) -> GatewayResult<()>;
}

#[async_trait]
pub trait SiteGateway: Send + Sync {
    async fn insert(&self, record: &WebsiteRecord) -> GatewayResult<WebsiteRecord>;

    async fn fetch(&self, owner: Uuid) -> GatewayResult<Option<WebsiteRecord>>;

    /// Overwrites the whole document (last write wins)
    async fn replace_document(&self, owner: Uuid, document: &SiteDocument) -> GatewayResult<WebsiteRecord>;
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, path: &str, content_type: &str) -> GatewayResult<StoredObject>;

    async fn delete(&self, path: &str) -> GatewayResult<()>;
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> GatewayResult<Session>;

    async fn sign_in(&self, email: &str, password: &str) -> GatewayResult<Session>;

    async fn sign_out(&self, session: &Session) -> GatewayResult<()>;
}
