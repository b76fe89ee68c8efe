//! Router assembly and shared application state for the backend service.

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;

use crate::assets::local::LocalObjectStorage;
use crate::auth::{AuthService, TokenSettings};
use crate::config::{AppConfig, StoreBackend};
use crate::database::{DatabaseManager, PgStore};
use crate::gateway::memory::MemoryBackend;
use crate::gateway::{ClientGateway, DishGateway, ObjectStorage, SiteGateway};
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;

/// Mount point of the public file service
pub const FILES_ROUTE: &str = "/files";

/// Collaborators shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub dishes: Arc<dyn DishGateway>,
    pub clients: Arc<dyn ClientGateway>,
    pub sites: Arc<dyn SiteGateway>,
    pub storage: Arc<dyn ObjectStorage>,
    pub auth: AuthService,
    pub database: Option<DatabaseManager>,
    pub storage_root: PathBuf,
    pub max_upload_bytes: usize,
    pub cors_origins: Vec<String>,
}

impl AppState {
    /// Builds the state for the configured store backend
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let tokens = TokenSettings::from_config(config);
        if tokens.secret.is_empty() {
            anyhow::bail!("JWT_SECRET must be set outside development");
        }

        let storage_root = config.storage.root_dir.clone();
        let storage = Arc::new(LocalObjectStorage::new(
            &storage_root,
            format!("{}{}", config.server.public_url, FILES_ROUTE),
        ));

        let mut state = match config.database.backend {
            StoreBackend::Memory => {
                info!("Using in-memory store");
                let backend = Arc::new(MemoryBackend::new());
                let auth = AuthService::new(backend.clone(), tokens, config.security.bcrypt_cost);
                Self {
                    dishes: backend.clone(),
                    clients: backend.clone(),
                    sites: backend,
                    storage,
                    auth,
                    database: None,
                    storage_root,
                    max_upload_bytes: config.storage.max_upload_bytes,
                    cors_origins: Vec::new(),
                }
            }
            StoreBackend::Postgres => {
                let db = DatabaseManager::connect(&config.database).await?;
                if config.database.bootstrap_schema {
                    db.bootstrap_schema().await?;
                }
                let store = Arc::new(PgStore::new(&db));
                let auth = AuthService::new(store.clone(), tokens, config.security.bcrypt_cost);
                Self {
                    dishes: store.clone(),
                    clients: store.clone(),
                    sites: store,
                    storage,
                    auth,
                    database: Some(db),
                    storage_root,
                    max_upload_bytes: config.storage.max_upload_bytes,
                    cors_origins: Vec::new(),
                }
            }
        };

        state.cors_origins = config.security.cors_origins.clone();
        Ok(state)
    }

    /// Memory store plus filesystem objects under `storage_root`
    pub fn in_memory(
        backend: Arc<MemoryBackend>,
        storage_root: impl Into<PathBuf>,
        public_url: &str,
        tokens: TokenSettings,
    ) -> Self {
        let storage_root = storage_root.into();
        let storage = Arc::new(LocalObjectStorage::new(
            &storage_root,
            format!("{}{}", public_url.trim_end_matches('/'), FILES_ROUTE),
        ));

        Self {
            dishes: backend.clone(),
            clients: backend.clone(),
            sites: backend.clone(),
            storage,
            auth: AuthService::new(backend, tokens, 4),
            database: None,
            storage_root,
            max_upload_bytes: 10 * 1024 * 1024,
            cors_origins: Vec::new(),
        }
    }

    fn cors_layer(&self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .cors_origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok())
            .collect();

        if origins.is_empty() {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = state.cors_layer();
    let files = ServeDir::new(&state.storage_root);

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected API
        .merge(protected_routes(state.clone()))
        .nest_service(FILES_ROUTE, files)
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/signup", post(auth::signup_post))
        .route("/auth/signin", post(auth::signin_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{auth, client, cuisine, dish, file, website};

    let body_limit = state.max_upload_bytes;

    Router::new()
        // Session
        .route("/api/auth/whoami", get(auth::session_whoami))
        .route("/api/auth/session", axum::routing::delete(auth::session_logout))
        // Client profile
        .route("/api/client", post(client::profile_post).put(client::profile_put))
        .route("/api/client/website", post(client::website_link_post))
        .route("/api/client/:user_id", get(client::profile_get))
        // Dishes
        .route("/api/dish", post(dish::collection_post))
        .route("/api/dish/:id", axum::routing::put(dish::record_put).delete(dish::record_delete))
        .route("/api/dishes/:user_id", get(dish::collection_get))
        .route("/api/cuisines", get(cuisine::list))
        // Storefront document
        .route("/api/website", post(website::document_post).put(website::document_put))
        .route("/api/website/:user_id", get(website::document_get))
        // Objects
        .route(
            "/api/upload/:folder",
            post(file::upload_post).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/file/delete", post(file::delete_post))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Cloud Kitchen API",
            "version": version,
            "description": "Menu items, onboarding and storefront documents for cloud kitchens",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "public_auth": "/auth/signup, /auth/signin (public - token acquisition)",
                "auth": "/api/auth/whoami, /api/auth/session (protected)",
                "client": "/api/client[/:user_id], /api/client/website (protected)",
                "dish": "/api/dish[/:id], /api/dishes/:user_id, /api/cuisines (protected)",
                "website": "/api/website[/:user_id] (protected)",
                "file": "/api/upload/:folder, /api/file/delete (protected), /files/* (public)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    let Some(db) = &state.database else {
        return (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "memory" }
            })),
        );
    };

    match db.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
