mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use cloud_kitchen::forms::account::ProfileValues;
use cloud_kitchen::forms::auth::{sign_out, submit_sign_in, submit_sign_up, SignInForm, SignInValues, SignUpForm, SignUpValues};
use cloud_kitchen::forms::SubmitError;
use cloud_kitchen::gateway::{ClientGateway, GatewayError};
use cloud_kitchen::session::{FileStore, GateDecision, SessionContext, SessionGate, SIGN_IN_ROUTE};

#[tokio::test]
async fn signup_then_signin_issue_tokens() -> Result<()> {
    let app = common::test_app();
    let (token, id) = app.sign_up("chef@example.com").await?;

    let (status, body) = app.get("/api/auth/whoami", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "chef@example.com");
    assert_eq!(body["data"]["id"], id.to_string());

    let (status, body) = app
        .post("/auth/signin", None, json!({ "email": "chef@example.com", "password": common::PASSWORD }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["access_token"].as_str().is_some());
    Ok(())
}

#[tokio::test]
async fn duplicate_signup_conflicts() -> Result<()> {
    let app = common::test_app();
    app.sign_up("twice@example.com").await?;

    let (status, body) = app
        .post("/auth/signup", None, json!({ "email": "twice@example.com", "password": common::PASSWORD }))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], true);
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> Result<()> {
    let app = common::test_app();
    app.sign_up("locked@example.com").await?;

    let (status, _) = app
        .post("/auth/signin", None, json!({ "email": "locked@example.com", "password": "wrong-pass" }))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn short_password_is_rejected() -> Result<()> {
    let app = common::test_app();
    let (status, _) = app
        .post("/auth/signup", None, json!({ "email": "short@example.com", "password": "abc" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn profile_routes_are_owner_scoped() -> Result<()> {
    let app = common::test_app();
    let (token, id) = app.sign_up("owner@example.com").await?;
    let (_, other) = app.sign_up("other@example.com").await?;

    let profile = serde_json::to_value(common::sample_profile(id, "owner@example.com"))?;
    let (status, _) = app.post("/api/client", Some(&token), profile).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.get(&format!("/api/client/{}", id), Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Asha Rao");

    let (status, _) = app.get(&format!("/api/client/{}", other), Some(&token)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let mut bad = common::sample_profile(id, "owner@example.com");
    bad.phone_number = "123".to_string();
    let (status, body) = app.put("/api/client", Some(&token), serde_json::to_value(bad)?).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["field_errors"]["phone_number"].is_string());
    Ok(())
}

fn sign_up_form(email: &str) -> SignUpForm {
    SignUpForm::create(SignUpValues {
        password: common::PASSWORD.to_string(),
        re_enter_password: common::PASSWORD.to_string(),
        profile: ProfileValues {
            email: email.to_string(),
            name: "Ravi Kumar".to_string(),
            age: "41".to_string(),
            phone_number: "9123456780".to_string(),
            dob: "1983-02-01".to_string(),
            nationality: "Indian".to_string(),
            gender: String::new(),
            marital_status: String::new(),
        },
    })
}

#[tokio::test]
async fn rest_client_session_lifecycle() -> Result<()> {
    let server = common::spawn().await?;
    let api = server.client()?;
    let dir = tempfile::tempdir()?;
    let store_path = dir.path().join("session.json");

    let mut ctx = SessionContext::load(FileStore::new(&store_path))?;
    assert_eq!(SessionGate::check(&ctx), GateDecision::Redirect(SIGN_IN_ROUTE));

    let mut form = sign_up_form("ravi@example.com");
    let session = submit_sign_up(&mut form, api.as_ref(), api.as_ref(), &mut ctx).await?;
    assert_eq!(SessionGate::check(&ctx), GateDecision::Admit(session.user.id));

    let profile = ClientGateway::fetch(api.as_ref(), session.user.id).await?.expect("profile stored");
    assert_eq!(profile.name, "Ravi Kumar");
    assert!(profile.gender.is_none());

    // A fresh process sees the cached identity
    let reloaded = SessionContext::load(FileStore::new(&store_path))?;
    assert_eq!(reloaded.client().map(|c| c.email.as_str()), Some("ravi@example.com"));

    sign_out(api.as_ref(), &mut ctx).await?;
    assert!(ctx.session().is_none());

    let mut form = SignInForm::create(SignInValues {
        email: "ravi@example.com".to_string(),
        password: common::PASSWORD.to_string(),
    });
    let again = submit_sign_in(&mut form, api.as_ref(), api.as_ref(), &mut ctx).await?;
    assert_eq!(again.user.id, session.user.id);
    assert!(ctx.client().is_some());
    Ok(())
}

#[tokio::test]
async fn rest_client_reports_bad_credentials() -> Result<()> {
    let server = common::spawn().await?;
    let api = server.client()?;
    let dir = tempfile::tempdir()?;
    let mut ctx = SessionContext::load(FileStore::new(dir.path().join("session.json")))?;

    let mut form = SignInForm::create(SignInValues {
        email: "nobody@example.com".to_string(),
        password: common::PASSWORD.to_string(),
    });
    let err = submit_sign_in(&mut form, api.as_ref(), api.as_ref(), &mut ctx)
        .await
        .unwrap_err();

    assert!(matches!(err, SubmitError::Gateway(GatewayError::Unauthorized(_))));
    assert!(ctx.session().is_none());
    Ok(())
}
