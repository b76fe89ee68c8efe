//! Storefront document backing the generated public website.
//!
//! The document is generic over the value held by its image fields. The
//! persisted form is `SiteDocument<String>` (durable URLs only); the editor
//! works on `SiteDocument<AssetField>` where an image may still be a pending
//! local file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

pub const DEFAULT_COLOR: &str = "#000000";

pub const DEFAULT_LOGO_URL: &str =
    "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcRzkXYnylTXs-ouy5nPX4UZMmPgkYfkMS7ZoQ&usqp=CAU";
pub const DEFAULT_HEADER_BACKGROUND_URL: &str = "https://media.istockphoto.com/id/1316145932/photo/table-top-view-of-spicy-food.jpg?s=612x612&w=0&k=20&c=eaKRSIAoRGHMibSfahMyQS6iFADyVy1pnPdy1O5rZ98=";
pub const DEFAULT_INTRO_MEDIA_URL: &str = "https://upload.wikimedia.org/wikipedia/commons/thumb/6/6d/Good_Food_Display_-_NCI_Visuals_Online.jpg/800px-Good_Food_Display_-_NCI_Visuals_Online.jpg";
pub const DEFAULT_INTRO_IMAGE_URL: &str =
    "https://www.livofy.com/health/wp-content/uploads/2023/05/Add-a-heading-6.png";
pub const DEFAULT_FEATURED_IMAGE_URL: &str =
    "https://img.freepik.com/free-vector/burgers-restaurant-menu-template_23-2149005028.jpg";
pub const DEFAULT_FEATURED_DESCRIPTION: &str = "Discover our range of healthy and delicious meals, designed to satisfy your cravings and keep you energized throughout the day.";
pub const DEFAULT_LOCATION: &str = "123 Healthy Street, Wellness City";
pub const DEFAULT_INSTAGRAM: &str = "https://instagram.com/butthicloudkitchen";
pub const DEFAULT_FACEBOOK: &str = "https://facebook.com/butthicloudkitchen";

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// Null or blank colours read back as [`DEFAULT_COLOR`]
fn color_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|c| !c.trim().is_empty()).unwrap_or_else(default_color))
}

fn fill_color(color: &mut String) {
    if color.trim().is_empty() {
        *color = default_color();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderSection<I = String> {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub header_background: I,
    pub company_logo: I,
    #[serde(default = "default_color", deserialize_with = "color_or_default")]
    pub title_color: String,
    #[serde(default = "default_color", deserialize_with = "color_or_default")]
    pub subtitle_color: String,
    #[serde(default = "default_color", deserialize_with = "color_or_default")]
    pub description_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntroSection<I = String> {
    pub intro_title: String,
    pub intro_description: String,
    pub intro_media: I,
    #[serde(default = "default_color", deserialize_with = "color_or_default")]
    pub intro_title_color: String,
    #[serde(default = "default_color", deserialize_with = "color_or_default")]
    pub intro_description_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntroMediaSection<I = String> {
    pub intro_image: I,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedMenuSection<I = String> {
    pub featured_title: String,
    pub featured_description: String,
    pub featured_image: I,
    #[serde(default = "default_color", deserialize_with = "color_or_default")]
    pub featured_title_color: String,
    #[serde(default = "default_color", deserialize_with = "color_or_default")]
    pub featured_description_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterSection {
    pub location: String,
    pub instagram: String,
    pub facebook: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteDocument<I = String> {
    pub header_section: HeaderSection<I>,
    pub intro_section: IntroSection<I>,
    pub intro_media_section: IntroMediaSection<I>,
    pub featured_menu_section: FeaturedMenuSection<I>,
    pub footer_section: FooterSection,
}

/// Identifies one image-valued field of the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageSlot {
    CompanyLogo,
    HeaderBackground,
    IntroMedia,
    IntroImage,
    FeaturedImage,
}

impl ImageSlot {
    pub const ALL: [ImageSlot; 5] = [
        ImageSlot::CompanyLogo,
        ImageSlot::HeaderBackground,
        ImageSlot::IntroMedia,
        ImageSlot::IntroImage,
        ImageSlot::FeaturedImage,
    ];

    /// Dotted path of the field in the persisted JSON
    pub fn key(&self) -> &'static str {
        match self {
            ImageSlot::CompanyLogo => "headerSection.companyLogo",
            ImageSlot::HeaderBackground => "headerSection.headerBackground",
            ImageSlot::IntroMedia => "introSection.introMedia",
            ImageSlot::IntroImage => "introMediaSection.introImage",
            ImageSlot::FeaturedImage => "featuredMenuSection.featuredImage",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.key() == key)
    }
}

impl<I> SiteDocument<I> {
    pub fn image(&self, slot: ImageSlot) -> &I {
        match slot {
            ImageSlot::CompanyLogo => &self.header_section.company_logo,
            ImageSlot::HeaderBackground => &self.header_section.header_background,
            ImageSlot::IntroMedia => &self.intro_section.intro_media,
            ImageSlot::IntroImage => &self.intro_media_section.intro_image,
            ImageSlot::FeaturedImage => &self.featured_menu_section.featured_image,
        }
    }

    pub fn image_mut(&mut self, slot: ImageSlot) -> &mut I {
        match slot {
            ImageSlot::CompanyLogo => &mut self.header_section.company_logo,
            ImageSlot::HeaderBackground => &mut self.header_section.header_background,
            ImageSlot::IntroMedia => &mut self.intro_section.intro_media,
            ImageSlot::IntroImage => &mut self.intro_media_section.intro_image,
            ImageSlot::FeaturedImage => &mut self.featured_menu_section.featured_image,
        }
    }

    /// Converts every image field, keeping all text and colour fields as-is
    pub fn map_images<J>(self, mut f: impl FnMut(ImageSlot, I) -> J) -> SiteDocument<J> {
        let SiteDocument {
            header_section: h,
            intro_section: i,
            intro_media_section: m,
            featured_menu_section: fm,
            footer_section,
        } = self;

        SiteDocument {
            header_section: HeaderSection {
                title: h.title,
                subtitle: h.subtitle,
                description: h.description,
                header_background: f(ImageSlot::HeaderBackground, h.header_background),
                company_logo: f(ImageSlot::CompanyLogo, h.company_logo),
                title_color: h.title_color,
                subtitle_color: h.subtitle_color,
                description_color: h.description_color,
            },
            intro_section: IntroSection {
                intro_title: i.intro_title,
                intro_description: i.intro_description,
                intro_media: f(ImageSlot::IntroMedia, i.intro_media),
                intro_title_color: i.intro_title_color,
                intro_description_color: i.intro_description_color,
            },
            intro_media_section: IntroMediaSection {
                intro_image: f(ImageSlot::IntroImage, m.intro_image),
            },
            featured_menu_section: FeaturedMenuSection {
                featured_title: fm.featured_title,
                featured_description: fm.featured_description,
                featured_image: f(ImageSlot::FeaturedImage, fm.featured_image),
                featured_title_color: fm.featured_title_color,
                featured_description_color: fm.featured_description_color,
            },
            footer_section,
        }
    }

    /// Resets blank colour fields to [`DEFAULT_COLOR`]
    pub fn fill_blank_colors(&mut self) {
        let h = &mut self.header_section;
        fill_color(&mut h.title_color);
        fill_color(&mut h.subtitle_color);
        fill_color(&mut h.description_color);
        fill_color(&mut self.intro_section.intro_title_color);
        fill_color(&mut self.intro_section.intro_description_color);
        fill_color(&mut self.featured_menu_section.featured_title_color);
        fill_color(&mut self.featured_menu_section.featured_description_color);
    }

    /// Every text and colour field with its dotted key, in display order
    pub fn text_fields(&self) -> Vec<(&'static str, &str)> {
        let h = &self.header_section;
        let i = &self.intro_section;
        let fm = &self.featured_menu_section;
        let ft = &self.footer_section;
        vec![
            ("headerSection.title", h.title.as_str()),
            ("headerSection.subtitle", h.subtitle.as_str()),
            ("headerSection.description", h.description.as_str()),
            ("headerSection.titleColor", h.title_color.as_str()),
            ("headerSection.subtitleColor", h.subtitle_color.as_str()),
            ("headerSection.descriptionColor", h.description_color.as_str()),
            ("introSection.introTitle", i.intro_title.as_str()),
            ("introSection.introDescription", i.intro_description.as_str()),
            ("introSection.introTitleColor", i.intro_title_color.as_str()),
            ("introSection.introDescriptionColor", i.intro_description_color.as_str()),
            ("featuredMenuSection.featuredTitle", fm.featured_title.as_str()),
            ("featuredMenuSection.featuredDescription", fm.featured_description.as_str()),
            ("featuredMenuSection.featuredTitleColor", fm.featured_title_color.as_str()),
            ("featuredMenuSection.featuredDescriptionColor", fm.featured_description_color.as_str()),
            ("footerSection.location", ft.location.as_str()),
            ("footerSection.instagram", ft.instagram.as_str()),
            ("footerSection.facebook", ft.facebook.as_str()),
        ]
    }

    /// Mutable access to a text or colour field by dotted key
    pub fn text_field_mut(&mut self, key: &str) -> Option<&mut String> {
        let h = &mut self.header_section;
        let i = &mut self.intro_section;
        let fm = &mut self.featured_menu_section;
        let ft = &mut self.footer_section;
        let field = match key {
            "headerSection.title" => &mut h.title,
            "headerSection.subtitle" => &mut h.subtitle,
            "headerSection.description" => &mut h.description,
            "headerSection.titleColor" => &mut h.title_color,
            "headerSection.subtitleColor" => &mut h.subtitle_color,
            "headerSection.descriptionColor" => &mut h.description_color,
            "introSection.introTitle" => &mut i.intro_title,
            "introSection.introDescription" => &mut i.intro_description,
            "introSection.introTitleColor" => &mut i.intro_title_color,
            "introSection.introDescriptionColor" => &mut i.intro_description_color,
            "featuredMenuSection.featuredTitle" => &mut fm.featured_title,
            "featuredMenuSection.featuredDescription" => &mut fm.featured_description,
            "featuredMenuSection.featuredTitleColor" => &mut fm.featured_title_color,
            "featuredMenuSection.featuredDescriptionColor" => &mut fm.featured_description_color,
            "footerSection.location" => &mut ft.location,
            "footerSection.instagram" => &mut ft.instagram,
            "footerSection.facebook" => &mut ft.facebook,
            _ => return None,
        };
        Some(field)
    }
}

/// Operator-supplied details used to seed the stock storefront at onboarding
#[derive(Debug, Clone, Default)]
pub struct StorefrontSeed {
    pub website_name: String,
    pub website_subtitle: String,
    pub description: String,
    pub about_us: String,
    pub logo_url: Option<String>,
    pub location: Option<String>,
    pub instagram: Option<String>,
    pub facebook: Option<String>,
}

impl SiteDocument<String> {
    /// Stock content shown until the operator edits the site
    pub fn placeholder(seed: &StorefrontSeed) -> Self {
        fn or_default(value: &Option<String>, default: &str) -> String {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(default)
                .to_string()
        }

        SiteDocument {
            header_section: HeaderSection {
                title: format!("Welcome to {} Cloud Kitchen", seed.website_name),
                subtitle: seed.website_subtitle.clone(),
                description: seed.description.clone(),
                header_background: DEFAULT_HEADER_BACKGROUND_URL.to_string(),
                company_logo: or_default(&seed.logo_url, DEFAULT_LOGO_URL),
                title_color: default_color(),
                subtitle_color: default_color(),
                description_color: default_color(),
            },
            intro_section: IntroSection {
                intro_title: "ABOUT US".to_string(),
                intro_description: seed.about_us.clone(),
                intro_media: DEFAULT_INTRO_MEDIA_URL.to_string(),
                intro_title_color: default_color(),
                intro_description_color: default_color(),
            },
            intro_media_section: IntroMediaSection {
                intro_image: DEFAULT_INTRO_IMAGE_URL.to_string(),
            },
            featured_menu_section: FeaturedMenuSection {
                featured_title: "OUR MENU".to_string(),
                featured_description: DEFAULT_FEATURED_DESCRIPTION.to_string(),
                featured_image: DEFAULT_FEATURED_IMAGE_URL.to_string(),
                featured_title_color: default_color(),
                featured_description_color: default_color(),
            },
            footer_section: FooterSection {
                location: or_default(&seed.location, DEFAULT_LOCATION),
                instagram: or_default(&seed.instagram, DEFAULT_INSTAGRAM),
                facebook: or_default(&seed.facebook, DEFAULT_FACEBOOK),
            },
        }
    }
}

/// Persisted row wrapping a storefront document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebsiteRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub website_name: String,
    pub website_subtitle: String,
    pub description: String,
    pub about_us: String,
    pub website_logo: String,
    pub website_data: SiteDocument,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> StorefrontSeed {
        StorefrontSeed {
            website_name: "Spice Hub".to_string(),
            description: "Fast healthy meals".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn placeholder_uses_stock_content() {
        let doc = SiteDocument::placeholder(&seed());
        assert_eq!(doc.header_section.title, "Welcome to Spice Hub Cloud Kitchen");
        assert_eq!(doc.header_section.company_logo, DEFAULT_LOGO_URL);
        assert_eq!(doc.intro_section.intro_title, "ABOUT US");
        assert_eq!(doc.footer_section.location, DEFAULT_LOCATION);
    }

    #[test]
    fn persisted_keys_are_camel_case() {
        let doc = SiteDocument::placeholder(&seed());
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["headerSection"]["companyLogo"], DEFAULT_LOGO_URL);
        assert_eq!(value["introMediaSection"]["introImage"], DEFAULT_INTRO_IMAGE_URL);
        assert_eq!(value["featuredMenuSection"]["featuredTitleColor"], "#000000");
    }

    #[test]
    fn missing_colours_default_to_black() {
        let mut value = serde_json::to_value(SiteDocument::placeholder(&seed())).unwrap();
        value["headerSection"].as_object_mut().unwrap().remove("titleColor");
        let doc: SiteDocument = serde_json::from_value(value).unwrap();
        assert_eq!(doc.header_section.title_color, DEFAULT_COLOR);
    }

    #[test]
    fn null_and_blank_colours_default_to_black() {
        let mut value = serde_json::to_value(SiteDocument::placeholder(&seed())).unwrap();
        value["headerSection"]["titleColor"] = serde_json::Value::Null;
        value["introSection"]["introTitleColor"] = serde_json::json!("");
        value["featuredMenuSection"]["featuredTitleColor"] = serde_json::json!("   ");
        value["headerSection"]["subtitleColor"] = serde_json::json!("#abcdef");

        let doc: SiteDocument = serde_json::from_value(value).unwrap();
        assert_eq!(doc.header_section.title_color, DEFAULT_COLOR);
        assert_eq!(doc.intro_section.intro_title_color, DEFAULT_COLOR);
        assert_eq!(doc.featured_menu_section.featured_title_color, DEFAULT_COLOR);
        assert_eq!(doc.header_section.subtitle_color, "#abcdef");
    }

    #[test]
    fn populated_document_survives_json() {
        let mut doc = SiteDocument::placeholder(&seed());
        doc.header_section.title_color = "#FF6600".to_string();
        doc.intro_section.intro_description_color = "#1a2b3c".to_string();
        doc.featured_menu_section.featured_title_color = "teal".to_string();
        doc.footer_section.instagram = "https://instagram.com/spicehub".to_string();
        for slot in ImageSlot::ALL {
            *doc.image_mut(slot) = format!("https://cdn.example.com/{}.jpg", slot.key());
        }

        let json = serde_json::to_string(&doc).unwrap();
        let back: SiteDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
        assert_eq!(back.header_section.title_color, "#FF6600");
    }

    #[test]
    fn image_slots_address_distinct_fields() {
        let mut doc = SiteDocument::placeholder(&seed());
        for slot in ImageSlot::ALL {
            *doc.image_mut(slot) = slot.key().to_string();
        }
        for slot in ImageSlot::ALL {
            assert_eq!(doc.image(slot), slot.key());
            assert_eq!(ImageSlot::from_key(slot.key()), Some(slot));
        }
    }

    #[test]
    fn text_field_keys_are_all_addressable() {
        let mut doc = SiteDocument::placeholder(&seed());
        let keys: Vec<&str> = doc.text_fields().into_iter().map(|(k, _)| k).collect();
        for key in keys {
            assert!(doc.text_field_mut(key).is_some(), "{key} not addressable");
        }
        assert!(doc.text_field_mut("headerSection.companyLogo").is_none());
    }
}
