use chrono::Utc;
use tracing::{info, warn};

use super::account::{validate_profile, ProfileDetails, ProfileValues};
use super::{is_valid_email, FieldErrors, Form, Schema, SubmitError, Submission};
use crate::auth::MIN_PASSWORD_LENGTH;
use crate::gateway::{ClientGateway, IdentityProvider};
use crate::models::ClientProfile;
use crate::session::{Session, SessionContext, SessionError};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignInValues {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

fn check_password(errors: &mut FieldErrors, field: &str, password: &str, message: &str) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(field, message);
    }
}

pub struct SignInSchema;

impl Schema for SignInSchema {
    type Values = SignInValues;
    type Output = Credentials;

    fn validate(values: &SignInValues) -> Result<Credentials, FieldErrors> {
        let mut errors = FieldErrors::new();
        if !is_valid_email(&values.email) {
            errors.add("email", "Invalid email address");
        }
        check_password(&mut errors, "password", &values.password, "Password must be at least 6 characters long");
        errors.finish(|| Credentials {
            email: values.email.trim().to_string(),
            password: values.password.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignUpValues {
    pub password: String,
    pub re_enter_password: String,
    pub profile: ProfileValues,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpDetails {
    pub credentials: Credentials,
    pub profile: ProfileDetails,
}

pub struct SignUpSchema;

impl Schema for SignUpSchema {
    type Values = SignUpValues;
    type Output = SignUpDetails;

    fn validate(values: &SignUpValues) -> Result<SignUpDetails, FieldErrors> {
        let mut errors = FieldErrors::new();
        let profile = validate_profile(&values.profile, false, &mut errors);

        check_password(&mut errors, "password", &values.password, "Password must be at least 6 characters long");
        check_password(&mut errors, "re_enter_password", &values.re_enter_password, "Re-enter password is required");
        if values.password != values.re_enter_password {
            errors.add("re_enter_password", "Passwords must match");
        }

        match profile {
            Some(profile) if errors.is_empty() => Ok(SignUpDetails {
                credentials: Credentials {
                    email: profile.email.clone(),
                    password: values.password.clone(),
                },
                profile,
            }),
            _ => Err(errors),
        }
    }
}

pub type SignInForm = Form<SignInSchema>;
pub type SignUpForm = Form<SignUpSchema>;

fn created_details<T>(submission: Submission<T>) -> Option<T> {
    match submission {
        Submission::Insert(details) | Submission::Update(_, details) => Some(details),
        Submission::Unchanged => None,
    }
}

/// Registers the identity, creates its client profile and caches both
pub async fn submit_sign_up(
    form: &mut SignUpForm,
    identity: &dyn IdentityProvider,
    clients: &dyn ClientGateway,
    ctx: &mut SessionContext,
) -> Result<Session, SubmitError> {
    let Some(details) = created_details(form.submit()?) else {
        return Err(FieldErrors::new().into());
    };

    let result = async {
        let session = identity
            .sign_up(&details.credentials.email, &details.credentials.password)
            .await?;

        let mut profile = ClientProfile {
            user_id: session.user.id,
            name: String::new(),
            email: String::new(),
            age: 0,
            phone_number: String::new(),
            dob: String::new(),
            nationality: String::new(),
            gender: None,
            marital_status: None,
            cloud_kitchen_website_id: None,
            created_at: Utc::now(),
        };
        details.profile.apply_to(&mut profile);
        let profile = clients.insert(&profile).await?;
        Ok::<_, SubmitError>((session, profile))
    }
    .await;

    let (session, profile) = match result {
        Ok(pair) => pair,
        Err(e) => {
            form.reopen();
            return Err(e);
        }
    };

    ctx.persist(session.clone(), Some(profile))?;
    form.complete();
    info!("Signed up {}", session.user.email);
    Ok(session)
}

/// Authenticates and caches the session together with the client profile
pub async fn submit_sign_in(
    form: &mut SignInForm,
    identity: &dyn IdentityProvider,
    clients: &dyn ClientGateway,
    ctx: &mut SessionContext,
) -> Result<Session, SubmitError> {
    let Some(credentials) = created_details(form.submit()?) else {
        return Err(FieldErrors::new().into());
    };

    let session = match identity.sign_in(&credentials.email, &credentials.password).await {
        Ok(session) => session,
        Err(e) => {
            form.reopen();
            return Err(e.into());
        }
    };

    let client = match clients.fetch(session.user.id).await {
        Ok(client) => client,
        Err(e) => {
            warn!("Signed in but could not load client profile: {}", e);
            None
        }
    };

    ctx.persist(session.clone(), client)?;
    form.complete();
    Ok(session)
}

/// Ends the session. The local cache is cleared even if the backend call fails.
pub async fn sign_out(identity: &dyn IdentityProvider, ctx: &mut SessionContext) -> Result<(), SessionError> {
    if let Some(session) = ctx.session().cloned() {
        if let Err(e) = identity.sign_out(&session).await {
            warn!("Backend sign-out failed, clearing local session anyway: {}", e);
        }
    }
    ctx.clear()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthService, TokenSettings};
    use crate::gateway::memory::MemoryBackend;
    use crate::gateway::{GatewayError, GatewayResult};
    use crate::session::{FileStore, GateDecision, SessionGate};
    use async_trait::async_trait;
    use std::sync::Arc;

    fn sign_up_values() -> SignUpValues {
        SignUpValues {
            password: "secret1".to_string(),
            re_enter_password: "secret1".to_string(),
            profile: ProfileValues {
                email: "asha@example.com".to_string(),
                name: "Asha".to_string(),
                age: "34".to_string(),
                phone_number: "9876543210".to_string(),
                dob: "1990-04-12".to_string(),
                nationality: "Indian".to_string(),
                gender: String::new(),
                marital_status: String::new(),
            },
        }
    }

    #[test]
    fn mismatched_passwords_flag_confirmation_field() {
        let mut values = sign_up_values();
        values.re_enter_password = "secret2".to_string();
        let errors = SignUpSchema::validate(&values).unwrap_err();
        assert_eq!(errors.get("re_enter_password"), Some("Passwords must match"));
        assert!(!errors.contains("password"));
    }

    #[test]
    fn sign_up_allows_blank_choices_but_not_unknown_ones() {
        let details = SignUpSchema::validate(&sign_up_values()).unwrap();
        assert_eq!(details.profile.gender, None);

        let mut values = sign_up_values();
        values.profile.gender = "other".to_string();
        assert!(SignUpSchema::validate(&values).unwrap_err().contains("gender"));
    }

    #[test]
    fn sign_in_rejects_short_password() {
        let values = SignInValues {
            email: "asha@example.com".to_string(),
            password: "12345".to_string(),
        };
        let errors = SignInSchema::validate(&values).unwrap_err();
        assert_eq!(errors.get("password"), Some("Password must be at least 6 characters long"));
    }

    fn services() -> (Arc<MemoryBackend>, AuthService) {
        let backend = Arc::new(MemoryBackend::new());
        let auth = AuthService::new(
            backend.clone(),
            TokenSettings {
                secret: "test".to_string(),
                expiry_hours: 1,
            },
            4,
        );
        (backend, auth)
    }

    #[tokio::test]
    async fn sign_up_creates_profile_and_admits() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = SessionContext::load(FileStore::new(dir.path().join("s.json"))).unwrap();
        let (backend, auth) = services();

        let mut form = SignUpForm::create(sign_up_values());
        let session = submit_sign_up(&mut form, &auth, backend.as_ref(), &mut ctx).await.unwrap();

        assert_eq!(SessionGate::check(&ctx), GateDecision::Admit(session.user.id));
        assert_eq!(ctx.client().unwrap().name, "Asha");
        assert!(ClientGateway::fetch(backend.as_ref(), session.user.id).await.unwrap().is_some());
    }

    struct FailingSignOut;

    #[async_trait]
    impl IdentityProvider for FailingSignOut {
        async fn sign_up(&self, _: &str, _: &str) -> GatewayResult<Session> {
            Err(GatewayError::Transport("offline".to_string()))
        }

        async fn sign_in(&self, _: &str, _: &str) -> GatewayResult<Session> {
            Err(GatewayError::Transport("offline".to_string()))
        }

        async fn sign_out(&self, _: &Session) -> GatewayResult<()> {
            Err(GatewayError::Transport("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn sign_out_clears_cache_even_when_backend_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = SessionContext::load(FileStore::new(dir.path().join("s.json"))).unwrap();
        let (backend, auth) = services();
        let mut form = SignUpForm::create(sign_up_values());
        submit_sign_up(&mut form, &auth, backend.as_ref(), &mut ctx).await.unwrap();

        sign_out(&FailingSignOut, &mut ctx).await.unwrap();
        assert!(matches!(SessionGate::check(&ctx), GateDecision::Redirect(_)));
    }
}
