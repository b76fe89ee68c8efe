use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::{FieldErrors, Form, Schema, SubmitError, Submission};
use crate::assets::{AssetPipeline, PendingFile, LOGO_FOLDER};
use crate::gateway::{ClientGateway, SiteGateway};
use crate::models::{SiteDocument, StorefrontSeed, WebsiteRecord, DEFAULT_LOGO_URL};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OnboardingValues {
    pub website_name: String,
    pub website_subtitle: String,
    pub description: String,
    pub about_us: String,
    pub logo: Option<PendingFile>,
    pub location: String,
    pub instagram: String,
    pub facebook: String,
}

#[derive(Debug, Clone)]
pub struct OnboardingDetails {
    pub seed: StorefrontSeed,
    pub logo: Option<PendingFile>,
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

pub struct OnboardingSchema;

impl Schema for OnboardingSchema {
    type Values = OnboardingValues;
    type Output = OnboardingDetails;

    fn validate(values: &OnboardingValues) -> Result<OnboardingDetails, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.require("website_name", &values.website_name, "Website name is required");
        errors.require("description", &values.description, "Description is required");

        errors.finish(|| OnboardingDetails {
            seed: StorefrontSeed {
                website_name: values.website_name.trim().to_string(),
                website_subtitle: values.website_subtitle.trim().to_string(),
                description: values.description.trim().to_string(),
                about_us: values.about_us.trim().to_string(),
                logo_url: None,
                location: optional(&values.location),
                instagram: optional(&values.instagram),
                facebook: optional(&values.facebook),
            },
            logo: values.logo.clone(),
        })
    }
}

pub type OnboardingForm = Form<OnboardingSchema>;

#[derive(Debug)]
pub enum OnboardingOutcome {
    Created(WebsiteRecord),
    /// The owner already had a storefront; nothing was written
    AlreadyOnboarded(WebsiteRecord),
}

/// Creates the owner's storefront with stock content, once
pub async fn submit_onboarding(
    form: &mut OnboardingForm,
    owner: Uuid,
    sites: &dyn SiteGateway,
    clients: &dyn ClientGateway,
    pipeline: &AssetPipeline,
) -> Result<OnboardingOutcome, SubmitError> {
    let details = match form.submit()? {
        Submission::Insert(details) | Submission::Update(_, details) => details,
        Submission::Unchanged => return Err(FieldErrors::new().into()),
    };

    let result = create_storefront(owner, details, sites, clients, pipeline).await;
    match &result {
        Ok(_) => form.complete(),
        Err(_) => form.reopen(),
    }
    result
}

async fn create_storefront(
    owner: Uuid,
    mut details: OnboardingDetails,
    sites: &dyn SiteGateway,
    clients: &dyn ClientGateway,
    pipeline: &AssetPipeline,
) -> Result<OnboardingOutcome, SubmitError> {
    if let Some(existing) = sites.fetch(owner).await? {
        info!("Owner {} already has storefront {}", owner, existing.id);
        // An earlier attempt may have stored the site but failed to link it
        let linked = clients.fetch(owner).await?.and_then(|p| p.cloud_kitchen_website_id);
        if linked != Some(existing.id) {
            clients.link_website(owner, existing.id).await?;
            info!("Linked storefront {} to profile {}", existing.id, owner);
        }
        return Ok(OnboardingOutcome::AlreadyOnboarded(existing));
    }

    let logo_url = match &details.logo {
        Some(file) => pipeline.upload(file, LOGO_FOLDER).await?.url,
        None => DEFAULT_LOGO_URL.to_string(),
    };
    details.seed.logo_url = Some(logo_url.clone());

    let seed = &details.seed;
    let record = WebsiteRecord {
        id: Uuid::new_v4(),
        user_id: owner,
        website_name: seed.website_name.clone(),
        website_subtitle: seed.website_subtitle.clone(),
        description: seed.description.clone(),
        about_us: seed.about_us.clone(),
        website_logo: logo_url,
        website_data: SiteDocument::placeholder(seed),
        created_at: Utc::now(),
    };

    let record = sites.insert(&record).await?;
    clients.link_website(owner, record.id).await?;

    info!("Created storefront {} for {}", record.id, owner);
    Ok(OnboardingOutcome::Created(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::MemoryBackend;
    use crate::gateway::GatewayError;
    use crate::testing::{png_bytes, sample_profile};
    use std::sync::Arc;

    async fn setup() -> (Arc<MemoryBackend>, AssetPipeline, Uuid) {
        let backend = Arc::new(MemoryBackend::new());
        let owner = Uuid::new_v4();
        ClientGateway::insert(backend.as_ref(), &sample_profile(owner)).await.unwrap();
        (backend.clone(), AssetPipeline::new(backend), owner)
    }

    fn values() -> OnboardingValues {
        OnboardingValues {
            website_name: "Spice Hub".to_string(),
            description: "Fast healthy meals".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn onboarding_without_logo_uses_placeholder_content() {
        let (backend, pipeline, owner) = setup().await;
        let mut form = OnboardingForm::create(values());

        let outcome = submit_onboarding(&mut form, owner, backend.as_ref(), backend.as_ref(), &pipeline)
            .await
            .unwrap();
        let OnboardingOutcome::Created(record) = outcome else {
            panic!("expected a new storefront");
        };

        assert_eq!(record.website_data.header_section.title, "Welcome to Spice Hub Cloud Kitchen");
        assert_eq!(record.website_data.header_section.company_logo, DEFAULT_LOGO_URL);
        assert_eq!(record.website_logo, DEFAULT_LOGO_URL);
        let profile = ClientGateway::fetch(backend.as_ref(), owner).await.unwrap().unwrap();
        assert_eq!(profile.cloud_kitchen_website_id, Some(record.id));
        assert_eq!(backend.stats().uploads, 0);
    }

    #[tokio::test]
    async fn second_onboarding_leaves_existing_site() {
        let (backend, pipeline, owner) = setup().await;
        let mut first = OnboardingForm::create(values());
        submit_onboarding(&mut first, owner, backend.as_ref(), backend.as_ref(), &pipeline).await.unwrap();

        let mut again = values();
        again.website_name = "Other".to_string();
        let mut second = OnboardingForm::create(again);
        let outcome = submit_onboarding(&mut second, owner, backend.as_ref(), backend.as_ref(), &pipeline)
            .await
            .unwrap();
        let OnboardingOutcome::AlreadyOnboarded(record) = outcome else {
            panic!("expected the existing storefront");
        };
        assert_eq!(record.website_name, "Spice Hub");
    }

    #[tokio::test]
    async fn uploaded_logo_lands_in_icon_folder() {
        let (backend, pipeline, owner) = setup().await;
        let mut v = values();
        v.logo = Some(PendingFile::new(png_bytes(32, 32), "image/png", "logo.png"));
        let mut form = OnboardingForm::create(v);

        let OnboardingOutcome::Created(record) =
            submit_onboarding(&mut form, owner, backend.as_ref(), backend.as_ref(), &pipeline)
                .await
                .unwrap()
        else {
            panic!("expected a new storefront");
        };
        assert!(record.website_logo.contains("/website-icons/"));
        assert_eq!(record.website_data.header_section.company_logo, record.website_logo);
    }

    #[tokio::test]
    async fn retry_links_a_storefront_left_unlinked() {
        let backend = Arc::new(MemoryBackend::new());
        let pipeline = AssetPipeline::new(backend.clone());
        let owner = Uuid::new_v4();

        let mut first = OnboardingForm::create(values());
        let err = submit_onboarding(&mut first, owner, backend.as_ref(), backend.as_ref(), &pipeline)
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Gateway(GatewayError::NotFound(_))));

        ClientGateway::insert(backend.as_ref(), &sample_profile(owner)).await.unwrap();
        let mut retry = OnboardingForm::create(values());
        let OnboardingOutcome::AlreadyOnboarded(record) =
            submit_onboarding(&mut retry, owner, backend.as_ref(), backend.as_ref(), &pipeline)
                .await
                .unwrap()
        else {
            panic!("expected the stored storefront");
        };

        let profile = ClientGateway::fetch(backend.as_ref(), owner).await.unwrap().unwrap();
        assert_eq!(profile.cloud_kitchen_website_id, Some(record.id));
    }

    #[test]
    fn name_and_description_are_required() {
        let errors = OnboardingSchema::validate(&OnboardingValues::default()).unwrap_err();
        assert_eq!(errors.get("website_name"), Some("Website name is required"));
        assert_eq!(errors.get("description"), Some("Description is required"));
    }
}
