//! In-process store used by the development server and by tests.
//!
//! Implements every collaborator trait over `tokio::sync::RwLock` maps and
//! counts the calls it receives so callers can assert on network writes.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{
    ClientGateway, DishGateway, GatewayError, GatewayResult, ObjectStorage, SiteGateway, StoredObject,
};
use crate::auth::{UserAccount, UserStore};
use crate::models::{ClientProfile, DishItem, SiteDocument, WebsiteRecord};

/// Base of the URLs handed out for objects held in memory
pub const MEMORY_OBJECT_BASE: &str = "memory://objects";

/// Calls received so far, by kind
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallStats {
    pub dish_writes: usize,
    pub dish_fetches: usize,
    pub client_writes: usize,
    pub site_writes: usize,
    pub document_replaces: usize,
    pub uploads: usize,
    pub storage_deletes: usize,
}

#[derive(Default)]
pub struct MemoryBackend {
    users: RwLock<Vec<UserAccount>>,
    clients: RwLock<HashMap<Uuid, ClientProfile>>,
    // Vec keeps insertion order for fetch_all
    dishes: RwLock<Vec<DishItem>>,
    websites: RwLock<HashMap<Uuid, WebsiteRecord>>,
    objects: RwLock<HashMap<String, (String, Vec<u8>)>>,
    stats: Mutex<CallStats>,
    failing_uploads: Mutex<Vec<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> CallStats {
        *self.stats.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, f: impl FnOnce(&mut CallStats)) {
        f(&mut self.stats.lock().unwrap_or_else(|e| e.into_inner()));
    }

    /// Makes every upload whose path contains `needle` fail with a storage error
    pub fn fail_uploads_containing(&self, needle: impl Into<String>) {
        self.failing_uploads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(needle.into());
    }

    fn upload_should_fail(&self, path: &str) -> bool {
        self.failing_uploads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|needle| path.contains(needle.as_str()))
    }

    /// Bytes and content type of a stored object
    pub async fn object(&self, path: &str) -> Option<(String, Vec<u8>)> {
        self.objects.read().await.get(path).cloned()
    }

    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn dish_count(&self, owner: Uuid) -> usize {
        self.dishes.read().await.iter().filter(|d| d.user_id == owner).count()
    }
}

#[async_trait]
impl DishGateway for MemoryBackend {
    async fn insert(&self, dish: &DishItem) -> GatewayResult<DishItem> {
        self.record(|s| s.dish_writes += 1);
        let mut stored = dish.clone();
        stored.id = Some(Uuid::new_v4());
        self.dishes.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: Uuid, dish: &DishItem) -> GatewayResult<DishItem> {
        self.record(|s| s.dish_writes += 1);
        let mut dishes = self.dishes.write().await;
        let existing = dishes
            .iter_mut()
            .find(|d| d.id == Some(id) && d.user_id == dish.user_id)
            .ok_or_else(|| GatewayError::NotFound(format!("dish {}", id)))?;

        let mut stored = dish.clone();
        stored.id = Some(id);
        *existing = stored.clone();
        Ok(stored)
    }

    async fn fetch_all(&self, owner: Uuid) -> GatewayResult<Vec<DishItem>> {
        self.record(|s| s.dish_fetches += 1);
        Ok(self
            .dishes
            .read()
            .await
            .iter()
            .filter(|d| d.user_id == owner)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> GatewayResult<()> {
        self.record(|s| s.dish_writes += 1);
        let mut dishes = self.dishes.write().await;
        let before = dishes.len();
        dishes.retain(|d| !(d.id == Some(id) && d.user_id == owner));
        if dishes.len() == before {
            return Err(GatewayError::NotFound(format!("dish {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl ClientGateway for MemoryBackend {
    async fn insert(&self, profile: &ClientProfile) -> GatewayResult<ClientProfile> {
        self.record(|s| s.client_writes += 1);
        let mut clients = self.clients.write().await;
        if clients.contains_key(&profile.user_id) {
            return Err(GatewayError::Conflict(format!("client {} already exists", profile.user_id)));
        }
        clients.insert(profile.user_id, profile.clone());
        Ok(profile.clone())
    }

    async fn update(&self, profile: &ClientProfile) -> GatewayResult<ClientProfile> {
        self.record(|s| s.client_writes += 1);
        let mut clients = self.clients.write().await;
        let existing = clients
            .get_mut(&profile.user_id)
            .ok_or_else(|| GatewayError::NotFound(format!("client {}", profile.user_id)))?;

        // The website link and creation time are owned by the backend
        let mut stored = profile.clone();
        stored.cloud_kitchen_website_id = existing.cloud_kitchen_website_id;
        stored.created_at = existing.created_at;
        *existing = stored.clone();
        Ok(stored)
    }

    async fn fetch(&self, owner: Uuid) -> GatewayResult<Option<ClientProfile>> {
        Ok(self.clients.read().await.get(&owner).cloned())
    }

    async fn link_website(&self, owner: Uuid, website_id: Uuid) -> GatewayResult<()> {
        self.record(|s| s.client_writes += 1);
        let mut clients = self.clients.write().await;
        let profile = clients
            .get_mut(&owner)
            .ok_or_else(|| GatewayError::NotFound(format!("client {}", owner)))?;
        profile.cloud_kitchen_website_id = Some(website_id);
        Ok(())
    }
}

#[async_trait]
impl SiteGateway for MemoryBackend {
    async fn insert(&self, record: &WebsiteRecord) -> GatewayResult<WebsiteRecord> {
        self.record(|s| s.site_writes += 1);
        let mut websites = self.websites.write().await;
        if websites.contains_key(&record.user_id) {
            return Err(GatewayError::Conflict(format!("website for {} already exists", record.user_id)));
        }
        websites.insert(record.user_id, record.clone());
        Ok(record.clone())
    }

    async fn fetch(&self, owner: Uuid) -> GatewayResult<Option<WebsiteRecord>> {
        Ok(self.websites.read().await.get(&owner).cloned())
    }

    async fn replace_document(&self, owner: Uuid, document: &SiteDocument) -> GatewayResult<WebsiteRecord> {
        self.record(|s| s.document_replaces += 1);
        let mut websites = self.websites.write().await;
        let record = websites
            .get_mut(&owner)
            .ok_or_else(|| GatewayError::NotFound(format!("website for {}", owner)))?;
        record.website_data = document.clone();
        Ok(record.clone())
    }
}

#[async_trait]
impl ObjectStorage for MemoryBackend {
    async fn upload(&self, bytes: Vec<u8>, path: &str, content_type: &str) -> GatewayResult<StoredObject> {
        self.record(|s| s.uploads += 1);
        if self.upload_should_fail(path) {
            return Err(GatewayError::Storage(format!("upload rejected: {}", path)));
        }

        debug!("Storing {} bytes at {}", bytes.len(), path);
        self.objects
            .write()
            .await
            .insert(path.to_string(), (content_type.to_string(), bytes));

        Ok(StoredObject {
            url: format!("{}/{}", MEMORY_OBJECT_BASE, path),
            path: path.to_string(),
        })
    }

    async fn delete(&self, path: &str) -> GatewayResult<()> {
        self.record(|s| s.storage_deletes += 1);
        self.objects.write().await.remove(path);
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryBackend {
    async fn create_user(&self, email: &str, password_hash: &str) -> GatewayResult<UserAccount> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == email) {
            return Err(GatewayError::Conflict(format!("user {} already registered", email)));
        }
        let account = UserAccount {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        users.push(account.clone());
        Ok(account)
    }

    async fn find_user_by_email(&self, email: &str) -> GatewayResult<Option<UserAccount>> {
        Ok(self.users.read().await.iter().find(|u| u.email == email).cloned())
    }
}
