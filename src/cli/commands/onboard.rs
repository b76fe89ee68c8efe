use clap::Args;
use serde_json::json;
use std::path::PathBuf;

use crate::assets::PendingFile;
use crate::cli::utils::output_success;
use crate::cli::{report_submit_error, Dashboard, OutputFormat};
use crate::config::config;
use crate::forms::onboarding::{submit_onboarding, OnboardingForm, OnboardingOutcome, OnboardingValues};

#[derive(Args)]
pub struct OnboardArgs {
    #[arg(long, help = "Website name")]
    pub name: String,
    #[arg(long, help = "Short description shown in the header")]
    pub description: String,
    #[arg(long, default_value = "")]
    pub subtitle: String,
    #[arg(long, default_value = "", help = "About-us text")]
    pub about: String,
    #[arg(long, help = "Logo image file; a stock logo is used otherwise")]
    pub logo: Option<PathBuf>,
    #[arg(long, default_value = "")]
    pub location: String,
    #[arg(long, default_value = "")]
    pub instagram: String,
    #[arg(long, default_value = "")]
    pub facebook: String,
}

pub async fn handle(args: OnboardArgs, dash: Dashboard, output_format: OutputFormat) -> anyhow::Result<()> {
    let owner = dash.owner()?;

    let logo = match &args.logo {
        Some(path) => Some(PendingFile::from_path(path).await?),
        None => None,
    };

    let mut form = OnboardingForm::create(OnboardingValues {
        website_name: args.name,
        website_subtitle: args.subtitle,
        description: args.description,
        about_us: args.about,
        logo,
        location: args.location,
        instagram: args.instagram,
        facebook: args.facebook,
    });

    let outcome = submit_onboarding(&mut form, owner, dash.sites(), dash.clients(), &dash.pipeline)
        .await
        .map_err(|e| report_submit_error(&output_format, e))?;

    let url = config().storefront_url(&owner);
    match outcome {
        OnboardingOutcome::Created(record) => output_success(
            &output_format,
            &format!("Created storefront '{}' at {}", record.website_name, url),
            Some(json!({ "website": record, "url": url })),
        ),
        OnboardingOutcome::AlreadyOnboarded(record) => output_success(
            &output_format,
            &format!("Storefront '{}' already exists at {}", record.website_name, url),
            Some(json!({ "website": record, "url": url })),
        ),
    }
}
