//! Postgres implementation of the persistence gateways.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::{debug, error};
use uuid::Uuid;

use super::manager::{DatabaseError, DatabaseManager};
use crate::auth::{UserAccount, UserStore};
use crate::gateway::{ClientGateway, DishGateway, GatewayError, GatewayResult, SiteGateway};
use crate::models::{ClientProfile, DishItem, SiteDocument, WebsiteRecord};

const UNIQUE_VIOLATION: &str = "23505";

impl DatabaseError {
    /// Turns unique-key violations into `Conflict`
    fn classify(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return DatabaseError::Conflict(format!("{} already exists", what));
            }
        }
        DatabaseError::Sqlx(err)
    }
}

impl From<DatabaseError> for GatewayError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => GatewayError::NotFound(msg),
            DatabaseError::Conflict(msg) => GatewayError::Conflict(msg),
            other => {
                error!("Database error: {}", other);
                GatewayError::Backend(other.to_string())
            }
        }
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(db: &DatabaseManager) -> Self {
        Self { pool: db.pool().clone() }
    }

    fn website_from_row(row: &sqlx::postgres::PgRow) -> Result<WebsiteRecord, DatabaseError> {
        let Json(website_data): Json<SiteDocument> = row.try_get("website_data")?;
        Ok(WebsiteRecord {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            website_name: row.try_get("website_name")?,
            website_subtitle: row.try_get("website_subtitle")?,
            description: row.try_get("description")?,
            about_us: row.try_get("about_us")?,
            website_logo: row.try_get("website_logo")?,
            website_data,
            created_at: row.try_get("created_at")?,
        })
    }

    fn client_from_row(row: &sqlx::postgres::PgRow) -> Result<ClientProfile, DatabaseError> {
        let Json(mut profile): Json<ClientProfile> = row.try_get("profile")?;
        profile.user_id = row.try_get("user_id")?;
        profile.cloud_kitchen_website_id = row.try_get("cloud_kitchen_website_id")?;
        profile.created_at = row.try_get::<DateTime<Utc>, _>("created_at")?;
        Ok(profile)
    }
}

#[async_trait]
impl DishGateway for PgStore {
    async fn insert(&self, dish: &DishItem) -> GatewayResult<DishItem> {
        let mut stored = dish.clone();
        let id = Uuid::new_v4();
        stored.id = Some(id);

        sqlx::query("INSERT INTO dishes (id, user_id, data) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(stored.user_id)
            .bind(Json(&stored))
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::classify(e, "dish"))?;

        debug!("Inserted dish {}", id);
        Ok(stored)
    }

    async fn update(&self, id: Uuid, dish: &DishItem) -> GatewayResult<DishItem> {
        let mut stored = dish.clone();
        stored.id = Some(id);

        let result = sqlx::query("UPDATE dishes SET data = $3 WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(stored.user_id)
            .bind(Json(&stored))
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("dish {}", id)).into());
        }
        Ok(stored)
    }

    async fn fetch_all(&self, owner: Uuid) -> GatewayResult<Vec<DishItem>> {
        let rows = sqlx::query("SELECT id, data FROM dishes WHERE user_id = $1 ORDER BY seq")
            .bind(owner)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        rows.iter()
            .map(|row| {
                let Json(mut dish): Json<DishItem> = row.try_get("data")?;
                dish.id = Some(row.try_get("id")?);
                Ok(dish)
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(|e| DatabaseError::from(e).into())
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> GatewayResult<()> {
        let result = sqlx::query("DELETE FROM dishes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("dish {}", id)).into());
        }
        Ok(())
    }
}

#[async_trait]
impl ClientGateway for PgStore {
    async fn insert(&self, profile: &ClientProfile) -> GatewayResult<ClientProfile> {
        let row = sqlx::query(
            "INSERT INTO clients (user_id, profile, cloud_kitchen_website_id) VALUES ($1, $2, $3) \
             RETURNING user_id, profile, cloud_kitchen_website_id, created_at",
        )
        .bind(profile.user_id)
        .bind(Json(profile))
        .bind(profile.cloud_kitchen_website_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::classify(e, "client profile"))?;

        Ok(Self::client_from_row(&row)?)
    }

    async fn update(&self, profile: &ClientProfile) -> GatewayResult<ClientProfile> {
        // The website link and creation time stay as stored
        let row = sqlx::query(
            "UPDATE clients SET profile = $2 WHERE user_id = $1 \
             RETURNING user_id, profile, cloud_kitchen_website_id, created_at",
        )
        .bind(profile.user_id)
        .bind(Json(profile))
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?
        .ok_or_else(|| DatabaseError::NotFound(format!("client {}", profile.user_id)))?;

        Ok(Self::client_from_row(&row)?)
    }

    async fn fetch(&self, owner: Uuid) -> GatewayResult<Option<ClientProfile>> {
        let row = sqlx::query(
            "SELECT user_id, profile, cloud_kitchen_website_id, created_at FROM clients WHERE user_id = $1",
        )
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        match row {
            Some(row) => Ok(Some(Self::client_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn link_website(&self, owner: Uuid, website_id: Uuid) -> GatewayResult<()> {
        let result = sqlx::query("UPDATE clients SET cloud_kitchen_website_id = $2 WHERE user_id = $1")
            .bind(owner)
            .bind(website_id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("client {}", owner)).into());
        }
        Ok(())
    }
}

const WEBSITE_COLUMNS: &str =
    "id, user_id, website_name, website_subtitle, description, about_us, website_logo, website_data, created_at";

#[async_trait]
impl SiteGateway for PgStore {
    async fn insert(&self, record: &WebsiteRecord) -> GatewayResult<WebsiteRecord> {
        let sql = format!(
            "INSERT INTO websites ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            WEBSITE_COLUMNS, WEBSITE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(record.id)
            .bind(record.user_id)
            .bind(&record.website_name)
            .bind(&record.website_subtitle)
            .bind(&record.description)
            .bind(&record.about_us)
            .bind(&record.website_logo)
            .bind(Json(&record.website_data))
            .bind(record.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::classify(e, "website"))?;

        Ok(Self::website_from_row(&row)?)
    }

    async fn fetch(&self, owner: Uuid) -> GatewayResult<Option<WebsiteRecord>> {
        let sql = format!("SELECT {} FROM websites WHERE user_id = $1", WEBSITE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        match row {
            Some(row) => Ok(Some(Self::website_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn replace_document(&self, owner: Uuid, document: &SiteDocument) -> GatewayResult<WebsiteRecord> {
        let sql = format!(
            "UPDATE websites SET website_data = $2 WHERE user_id = $1 RETURNING {}",
            WEBSITE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(owner)
            .bind(Json(document))
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(|| DatabaseError::NotFound(format!("website for {}", owner)))?;

        Ok(Self::website_from_row(&row)?)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> GatewayResult<UserAccount> {
        let row = sqlx::query(
            "INSERT INTO users (id, email, password_hash) VALUES ($1, $2, $3) RETURNING id, email, password_hash, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::classify(e, "user"))?;

        Ok(account_from_row(&row).map_err(DatabaseError::from)?)
    }

    async fn find_user_by_email(&self, email: &str) -> GatewayResult<Option<UserAccount>> {
        let row = sqlx::query("SELECT id, email, password_hash, created_at FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        match row {
            Some(row) => Ok(Some(account_from_row(&row).map_err(DatabaseError::from)?)),
            None => Ok(None),
        }
    }
}

fn account_from_row(row: &sqlx::postgres::PgRow) -> Result<UserAccount, sqlx::Error> {
    Ok(UserAccount {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
    })
}
