#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use image::{ImageBuffer, ImageOutputFormat, Rgb};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use cloud_kitchen::auth::TokenSettings;
use cloud_kitchen::gateway::memory::MemoryBackend;
use cloud_kitchen::gateway::rest::RestClient;
use cloud_kitchen::models::{
    ClientProfile, CookingMethod, Cuisine, DishCategory, DishDietary, DishItem, DishOccasion, DishType, Gender,
    MaritalStatus,
};
use cloud_kitchen::server::{app, AppState};

pub const PASSWORD: &str = "secret-pass";

fn tokens() -> TokenSettings {
    TokenSettings {
        secret: "test-secret".to_string(),
        expiry_hours: 1,
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Router over the memory backend, driven in-process with `oneshot`
pub struct TestApp {
    pub router: Router,
    pub backend: Arc<MemoryBackend>,
    pub storage: TempDir,
}

pub fn test_app() -> TestApp {
    init_tracing();
    let storage = tempfile::tempdir().expect("storage tempdir");
    let backend = Arc::new(MemoryBackend::new());
    let state = AppState::in_memory(backend.clone(), storage.path(), "http://test.local", tokens());
    TestApp {
        router: app(state),
        backend,
        storage,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Ok((status, body))
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(request(Method::GET, uri, token, None)).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.send(request(Method::POST, uri, token, Some(body))).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.send(request(Method::PUT, uri, token, Some(body))).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(request(Method::DELETE, uri, token, None)).await
    }

    /// Registers an identity and returns its token and user id
    pub async fn sign_up(&self, email: &str) -> Result<(String, Uuid)> {
        let (status, body) = self
            .post("/auth/signup", None, json!({ "email": email, "password": PASSWORD }))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "sign-up failed: {} {}", status, body);

        let token = body["data"]["access_token"].as_str().context("access_token")?.to_string();
        let id = body["data"]["user"]["id"].as_str().context("user id")?.parse()?;
        Ok((token, id))
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

/// A real listener on an ephemeral port, for the REST client
pub struct Spawned {
    pub base_url: String,
    pub backend: Arc<MemoryBackend>,
    pub storage: TempDir,
}

pub async fn spawn() -> Result<Spawned> {
    init_tracing();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://{}", listener.local_addr()?);

    let storage = tempfile::tempdir()?;
    let backend = Arc::new(MemoryBackend::new());
    let state = AppState::in_memory(backend.clone(), storage.path(), &base_url, tokens());

    tokio::spawn(async move {
        let _ = axum::serve(listener, app(state)).await;
    });

    Ok(Spawned {
        base_url,
        backend,
        storage,
    })
}

impl Spawned {
    pub fn client(&self) -> Result<Arc<RestClient>> {
        Ok(Arc::new(RestClient::new(self.base_url.clone())?))
    }
}

pub fn sample_dish(owner: Uuid) -> DishItem {
    DishItem {
        id: None,
        user_id: owner,
        dish_name: "Butter Chicken".to_string(),
        dish_recipe: "Chicken simmered in a tomato and butter gravy".to_string(),
        dish_calorie_count: "650".to_string(),
        dish_count: Some(2),
        dish_price: "250".to_string(),
        dish_category: DishCategory::MainCourse,
        dish_type: DishType::NonVegetarian,
        dish_occasion: DishOccasion::CasualDining,
        dish_dietary: DishDietary::HighProtein,
        dish_cooking_methods: CookingMethod::PanFried,
        cuisine: Cuisine::Indian,
        cuisine_type: "Punjabi".to_string(),
        dish_tags: vec!["spicy".to_string()],
        dish_image: None,
        dish_image_path: None,
    }
}

pub fn sample_profile(owner: Uuid, email: &str) -> ClientProfile {
    ClientProfile {
        user_id: owner,
        name: "Asha Rao".to_string(),
        email: email.to_string(),
        age: 34,
        phone_number: "9876543210".to_string(),
        dob: "1990-04-12".to_string(),
        nationality: "Indian".to_string(),
        gender: Some(Gender::Female),
        marital_status: Some(MaritalStatus::Single),
        cloud_kitchen_website_id: None,
        created_at: chrono::Utc::now(),
    }
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(width, height, Rgb([40, 120, 200]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageOutputFormat::Jpeg(90)).expect("encode jpeg fixture");
    out.into_inner()
}
