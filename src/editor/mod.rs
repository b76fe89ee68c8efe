//! Storefront builder: one in-memory draft shared by the form and the preview.
//!
//! Saving resolves every pending image concurrently and then replaces the
//! persisted document in a single call. If any upload fails the replace is
//! not issued; the uploads that did succeed stay written back in the draft so
//! a retry only re-sends what is still pending.

pub mod preview;

use futures::future::join_all;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::assets::{AssetError, AssetField, AssetPipeline, Notice, PendingFile, SITE_FOLDER};
use crate::forms::FieldErrors;
use crate::gateway::{GatewayError, SiteGateway};
use crate::models::{ImageSlot, SiteDocument, WebsiteRecord};
pub use preview::Preview;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Invalid(#[from] FieldErrors),

    #[error("{} image upload(s) failed; nothing was saved", .notices.len())]
    Uploads { notices: Vec<Notice> },

    #[error("no storefront exists for this account yet")]
    NotOnboarded,

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Split,
    FullScreen,
}

const TEXT_MESSAGES: &[(&str, &str)] = &[
    ("headerSection.title", "Title is required"),
    ("headerSection.subtitle", "Subtitle is required"),
    ("headerSection.description", "Description is required"),
    ("headerSection.titleColor", "Title color is required"),
    ("headerSection.subtitleColor", "Subtitle color is required"),
    ("headerSection.descriptionColor", "Description color is required"),
    ("introSection.introTitle", "Intro title is required"),
    ("introSection.introDescription", "Intro description is required"),
    ("introSection.introTitleColor", "Intro title color is required"),
    ("introSection.introDescriptionColor", "Intro description color is required"),
    ("featuredMenuSection.featuredTitle", "Featured title is required"),
    ("featuredMenuSection.featuredDescription", "Featured description is required"),
    ("featuredMenuSection.featuredTitleColor", "Featured title color is required"),
    ("featuredMenuSection.featuredDescriptionColor", "Featured description color is required"),
    ("footerSection.location", "Location is required"),
    ("footerSection.instagram", "Instagram is required"),
    ("footerSection.facebook", "Facebook is required"),
];

fn image_message(slot: ImageSlot) -> &'static str {
    match slot {
        ImageSlot::CompanyLogo => "Company logo is required",
        ImageSlot::HeaderBackground => "Header background is required",
        ImageSlot::IntroMedia => "Intro media is required",
        ImageSlot::IntroImage => "Intro image is required",
        ImageSlot::FeaturedImage => "Featured image is required",
    }
}

pub struct SiteEditor {
    owner: Uuid,
    draft: SiteDocument<AssetField>,
    view: ViewMode,
}

impl SiteEditor {
    pub fn new(owner: Uuid, mut document: SiteDocument) -> Self {
        document.fill_blank_colors();
        Self {
            owner,
            draft: document.map_images(|_, url| AssetField::Resolved(url)),
            view: ViewMode::Split,
        }
    }

    /// Opens the owner's persisted document, or `fallback` when there is none
    pub async fn load(owner: Uuid, sites: &dyn SiteGateway, fallback: SiteDocument) -> Result<Self, EditorError> {
        let document = match sites.fetch(owner).await? {
            Some(record) => record.website_data,
            None => {
                info!("No storefront stored for {}, editing defaults", owner);
                fallback
            }
        };
        Ok(Self::new(owner, document))
    }

    pub fn owner(&self) -> Uuid {
        self.owner
    }

    pub fn draft(&self) -> &SiteDocument<AssetField> {
        &self.draft
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view
    }

    /// Flips between split and full-screen preview; the draft is untouched
    pub fn toggle_preview(&mut self) -> ViewMode {
        self.view = match self.view {
            ViewMode::Split => ViewMode::FullScreen,
            ViewMode::FullScreen => ViewMode::Split,
        };
        self.view
    }

    pub fn preview(&self) -> Preview<'_> {
        Preview::new(&self.draft)
    }

    pub fn set_text(&mut self, key: &str, value: impl Into<String>) -> Result<(), EditorError> {
        let field = self
            .draft
            .text_field_mut(key)
            .ok_or_else(|| EditorError::UnknownField(key.to_string()))?;
        *field = value.into();
        Ok(())
    }

    pub fn set_image(&mut self, slot: ImageSlot, value: AssetField) {
        *self.draft.image_mut(slot) = value;
    }

    pub fn select_file(&mut self, slot: ImageSlot, file: PendingFile) {
        self.set_image(slot, AssetField::Pending(file));
    }

    pub fn pending_slots(&self) -> Vec<ImageSlot> {
        ImageSlot::ALL
            .into_iter()
            .filter(|slot| self.draft.image(*slot).is_pending())
            .collect()
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        for (key, value) in self.draft.text_fields() {
            if value.trim().is_empty() {
                let message = TEXT_MESSAGES
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, m)| *m)
                    .unwrap_or("This field is required");
                errors.add(key, message);
            }
        }
        for slot in ImageSlot::ALL {
            if self.draft.image(slot).is_blank() {
                errors.add(slot.key(), image_message(slot));
            }
        }
        errors.finish(|| ())
    }

    /// The draft with every image durable, if it is
    fn durable(&self) -> Option<SiteDocument> {
        let doc = self.draft.clone().map_images(|_, field| field.url().map(str::to_string));
        if ImageSlot::ALL.iter().any(|slot| doc.image(*slot).is_none()) {
            return None;
        }
        Some(doc.map_images(|_, url| url.unwrap_or_default()))
    }

    /// Validates, uploads pending images concurrently, then replaces the
    /// stored document once.
    pub async fn save(&mut self, sites: &dyn SiteGateway, pipeline: &AssetPipeline) -> Result<WebsiteRecord, EditorError> {
        self.validate()?;

        let pending: Vec<(ImageSlot, PendingFile)> = ImageSlot::ALL
            .into_iter()
            .filter_map(|slot| match self.draft.image(slot) {
                AssetField::Pending(file) => Some((slot, file.clone())),
                AssetField::Resolved(_) => None,
            })
            .collect();

        let uploads = pending.into_iter().map(|(slot, file)| async move {
            let result: Result<_, AssetError> = pipeline.upload(&file, SITE_FOLDER).await;
            (slot, result)
        });
        let results = join_all(uploads).await;

        let mut notices = Vec::new();
        for (slot, result) in results {
            match result {
                Ok(stored) => self.set_image(slot, AssetField::Resolved(stored.url)),
                Err(e) => {
                    warn!("Upload for {} failed: {}", slot.key(), e);
                    notices.push(Notice {
                        subject: slot.key().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }
        if !notices.is_empty() {
            return Err(EditorError::Uploads { notices });
        }

        let document = self.durable().ok_or(EditorError::Uploads { notices: Vec::new() })?;
        let record = sites.replace_document(self.owner, &document).await.map_err(|e| match e {
            GatewayError::NotFound(_) => EditorError::NotOnboarded,
            other => EditorError::Gateway(other),
        })?;

        info!("Published storefront {} for {}", record.id, self.owner);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::MemoryBackend;
    use crate::models::{StorefrontSeed, DEFAULT_COLOR};
    use crate::testing::png_bytes;
    use chrono::Utc;
    use std::sync::Arc;

    fn placeholder() -> SiteDocument {
        SiteDocument::placeholder(&StorefrontSeed {
            website_name: "Spice Hub".to_string(),
            website_subtitle: "Since 2020".to_string(),
            description: "Fast healthy meals".to_string(),
            about_us: "Family run".to_string(),
            ..Default::default()
        })
    }

    async fn onboarded(backend: &MemoryBackend, owner: Uuid) {
        let record = WebsiteRecord {
            id: Uuid::new_v4(),
            user_id: owner,
            website_name: "Spice Hub".to_string(),
            website_subtitle: String::new(),
            description: String::new(),
            about_us: String::new(),
            website_logo: String::new(),
            website_data: placeholder(),
            created_at: Utc::now(),
        };
        SiteGateway::insert(backend, &record).await.unwrap();
    }

    fn png(name: &str) -> PendingFile {
        PendingFile::new(png_bytes(20, 10), "image/png", name)
    }

    #[tokio::test]
    async fn save_uploads_all_pending_images_then_replaces_once() {
        let backend = Arc::new(MemoryBackend::new());
        let owner = Uuid::new_v4();
        onboarded(&backend, owner).await;
        let pipeline = AssetPipeline::new(backend.clone());

        let mut editor = SiteEditor::load(owner, backend.as_ref(), placeholder()).await.unwrap();
        editor.select_file(ImageSlot::CompanyLogo, png("logo.png"));
        editor.select_file(ImageSlot::FeaturedImage, png("menu.png"));
        editor.set_text("headerSection.titleColor", "#ff5733").unwrap();

        let record = editor.save(backend.as_ref(), &pipeline).await.unwrap();
        assert_eq!(backend.stats().uploads, 2);
        assert_eq!(backend.stats().document_replaces, 1);
        assert!(record.website_data.header_section.company_logo.starts_with("memory://"));
        assert_eq!(record.website_data.header_section.title_color, "#ff5733");
        assert!(editor.pending_slots().is_empty());
    }

    #[tokio::test]
    async fn failed_upload_skips_replace_but_keeps_successes() {
        let backend = Arc::new(MemoryBackend::new());
        let owner = Uuid::new_v4();
        onboarded(&backend, owner).await;
        let pipeline = AssetPipeline::new(backend.clone());
        backend.fail_uploads_containing(".png");

        let mut editor = SiteEditor::load(owner, backend.as_ref(), placeholder()).await.unwrap();
        editor.select_file(ImageSlot::IntroImage, png("intro.png"));
        editor.select_file(
            ImageSlot::HeaderBackground,
            PendingFile::new(b"plain".to_vec(), "text/plain", "bg.txt"),
        );

        let err = editor.save(backend.as_ref(), &pipeline).await.unwrap_err();
        let EditorError::Uploads { notices } = err else {
            panic!("expected upload failure");
        };
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].subject, "introMediaSection.introImage");
        assert_eq!(backend.stats().document_replaces, 0);
        assert_eq!(editor.pending_slots(), vec![ImageSlot::IntroImage]);
        assert!(editor.draft().image(ImageSlot::HeaderBackground).url().is_some());
    }

    #[tokio::test]
    async fn blank_fields_block_save() {
        let backend = Arc::new(MemoryBackend::new());
        let pipeline = AssetPipeline::new(backend.clone());
        let mut editor = SiteEditor::new(Uuid::new_v4(), placeholder());
        editor.set_text("footerSection.instagram", " ").unwrap();
        editor.set_image(ImageSlot::IntroMedia, AssetField::Resolved(String::new()));

        let Err(EditorError::Invalid(errors)) = editor.save(backend.as_ref(), &pipeline).await else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.get("footerSection.instagram"), Some("Instagram is required"));
        assert_eq!(errors.get("introSection.introMedia"), Some("Intro media is required"));
        assert_eq!(backend.stats().document_replaces, 0);
    }

    #[tokio::test]
    async fn load_without_stored_document_keeps_fallback() {
        let backend = MemoryBackend::new();
        let editor = SiteEditor::load(Uuid::new_v4(), &backend, placeholder()).await.unwrap();
        assert_eq!(editor.draft().header_section.title, "Welcome to Spice Hub Cloud Kitchen");
        assert_eq!(editor.draft().header_section.title_color, DEFAULT_COLOR);
    }

    #[tokio::test]
    async fn blank_stored_colours_load_as_black_and_save() {
        let backend = Arc::new(MemoryBackend::new());
        let owner = Uuid::new_v4();
        onboarded(&backend, owner).await;
        let mut stored = placeholder();
        stored.header_section.title_color = String::new();
        stored.featured_menu_section.featured_description_color = " ".to_string();
        SiteGateway::replace_document(backend.as_ref(), owner, &stored).await.unwrap();
        let pipeline = AssetPipeline::new(backend.clone());

        let mut editor = SiteEditor::load(owner, backend.as_ref(), placeholder()).await.unwrap();
        assert_eq!(editor.draft().header_section.title_color, DEFAULT_COLOR);
        assert_eq!(editor.draft().featured_menu_section.featured_description_color, DEFAULT_COLOR);
        assert!(editor.validate().is_ok());

        let record = editor.save(backend.as_ref(), &pipeline).await.unwrap();
        assert_eq!(record.website_data.header_section.title_color, DEFAULT_COLOR);
    }

    #[test]
    fn toggle_preview_only_changes_view_mode() {
        let mut editor = SiteEditor::new(Uuid::new_v4(), placeholder());
        let before = editor.draft().clone();
        assert_eq!(editor.toggle_preview(), ViewMode::FullScreen);
        assert_eq!(editor.toggle_preview(), ViewMode::Split);
        assert_eq!(editor.draft(), &before);
    }

    #[tokio::test]
    async fn save_without_storefront_reports_not_onboarded() {
        let backend = Arc::new(MemoryBackend::new());
        let pipeline = AssetPipeline::new(backend.clone());
        let mut editor = SiteEditor::new(Uuid::new_v4(), placeholder());
        let err = editor.save(backend.as_ref(), &pipeline).await.unwrap_err();
        assert!(matches!(err, EditorError::NotOnboarded));
    }
}
