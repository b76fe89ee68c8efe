use clap::Subcommand;
use serde_json::json;
use std::path::PathBuf;

use crate::assets::PendingFile;
use crate::cli::utils::{output_field_errors, output_notices, output_success, output_value, parse_assignment};
use crate::cli::{Dashboard, OutputFormat};
use crate::config::config;
use crate::editor::{EditorError, SiteEditor, ViewMode};
use crate::models::{ImageSlot, SiteDocument, StorefrontSeed};

#[derive(Subcommand)]
pub enum SiteCommands {
    #[command(about = "Show the storefront draft next to its preview")]
    Show {
        #[arg(long, help = "Show only the preview")]
        full_screen: bool,
    },

    #[command(about = "Change storefront fields and images, then save & publish")]
    Edit {
        #[arg(
            long = "set",
            value_name = "KEY=VALUE",
            help = "Text field by dotted key, e.g. headerSection.title=Welcome (repeatable)"
        )]
        fields: Vec<String>,

        #[arg(
            long = "image",
            value_name = "SLOT=PATH",
            help = "Image file for a slot, e.g. headerSection.companyLogo=logo.png (repeatable)"
        )]
        images: Vec<String>,
    },

    #[command(about = "Print the public storefront URL")]
    Url,
}

async fn open_editor(dash: &Dashboard) -> anyhow::Result<SiteEditor> {
    let owner = dash.owner()?;
    let fallback = SiteDocument::placeholder(&StorefrontSeed::default());
    Ok(SiteEditor::load(owner, dash.sites(), fallback).await?)
}

fn split_view(editor: &SiteEditor) -> String {
    let mut out = String::from("FIELDS\n");
    for (key, value) in editor.draft().text_fields() {
        out.push_str(&format!("  {:<48} {}\n", key, value));
    }
    out.push_str("\nPREVIEW\n");
    out.push_str(&editor.preview().to_string());
    out
}

pub async fn handle(cmd: SiteCommands, dash: Dashboard, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SiteCommands::Show { full_screen } => {
            let mut editor = open_editor(&dash).await?;
            if full_screen {
                editor.toggle_preview();
            }

            let text = match editor.view_mode() {
                ViewMode::FullScreen => editor.preview().to_string(),
                ViewMode::Split => split_view(&editor),
            };
            let record = dash.sites().fetch(editor.owner()).await?;
            output_value(&output_format, &json!({ "website": record }), &text)
        }
        SiteCommands::Edit { fields, images } => {
            let mut editor = open_editor(&dash).await?;

            for raw in &fields {
                let (key, value) = parse_assignment(raw)?;
                editor.set_text(&key, value)?;
            }
            for raw in &images {
                let (key, path) = parse_assignment(raw)?;
                let slot = ImageSlot::from_key(&key).ok_or_else(|| anyhow::anyhow!("unknown image slot '{}'", key))?;
                editor.select_file(slot, PendingFile::from_path(PathBuf::from(path)).await?);
            }

            match editor.save(dash.sites(), &dash.pipeline).await {
                Ok(record) => output_success(
                    &output_format,
                    "Storefront published",
                    Some(json!({
                        "website": record,
                        "url": config().storefront_url(&record.user_id),
                    })),
                ),
                Err(EditorError::Invalid(errors)) => {
                    output_field_errors(&output_format, &errors)?;
                    Err(anyhow::anyhow!("validation failed"))
                }
                Err(EditorError::Uploads { notices }) => {
                    output_notices(&output_format, &notices)?;
                    Err(anyhow::anyhow!("{} image upload(s) failed; nothing was saved", notices.len()))
                }
                Err(EditorError::NotOnboarded) => Err(anyhow::anyhow!(
                    "no storefront exists for this account yet; run `kitchen onboard` first"
                )),
                Err(e) => Err(e.into()),
            }
        }
        SiteCommands::Url => {
            let url = config().storefront_url(&dash.owner()?);
            output_value(&output_format, &json!({ "url": url }), &url)
        }
    }
}
