use std::fmt;

use crate::assets::AssetField;
use crate::models::SiteDocument;

/// Read-only rendering of the editor draft, borrowed from the same state the
/// form writes to.
pub struct Preview<'a> {
    doc: &'a SiteDocument<AssetField>,
}

impl<'a> Preview<'a> {
    pub fn new(doc: &'a SiteDocument<AssetField>) -> Self {
        Self { doc }
    }
}

struct Image<'a>(&'a AssetField);

impl fmt::Display for Image<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            AssetField::Resolved(url) if url.is_empty() => f.write_str("(none)"),
            AssetField::Resolved(url) => f.write_str(url),
            AssetField::Pending(file) => write!(f, "(pending upload: {})", file.name),
        }
    }
}

impl fmt::Display for Preview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = &self.doc.header_section;
        writeln!(f, "[logo] {}", Image(&h.company_logo))?;
        writeln!(f, "[background] {}", Image(&h.header_background))?;
        writeln!(f, "# {}  ({})", h.title, h.title_color)?;
        writeln!(f, "## {}  ({})", h.subtitle, h.subtitle_color)?;
        writeln!(f, "{}  ({})", h.description, h.description_color)?;
        writeln!(f)?;

        let i = &self.doc.intro_section;
        writeln!(f, "# {}  ({})", i.intro_title, i.intro_title_color)?;
        writeln!(f, "{}  ({})", i.intro_description, i.intro_description_color)?;
        writeln!(f, "[media] {}", Image(&i.intro_media))?;
        writeln!(f, "[image] {}", Image(&self.doc.intro_media_section.intro_image))?;
        writeln!(f)?;

        let m = &self.doc.featured_menu_section;
        writeln!(f, "# {}  ({})", m.featured_title, m.featured_title_color)?;
        writeln!(f, "{}  ({})", m.featured_description, m.featured_description_color)?;
        writeln!(f, "[image] {}", Image(&m.featured_image))?;
        writeln!(f)?;

        let footer = &self.doc.footer_section;
        writeln!(f, "{}", footer.location)?;
        writeln!(f, "Instagram: {}", footer.instagram)?;
        write!(f, "Facebook: {}", footer.facebook)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::PendingFile;
    use crate::editor::SiteEditor;
    use crate::models::{ImageSlot, StorefrontSeed};
    use uuid::Uuid;

    #[test]
    fn preview_reflects_draft_edits_immediately() {
        let doc = SiteDocument::placeholder(&StorefrontSeed {
            website_name: "Spice Hub".to_string(),
            ..Default::default()
        });
        let mut editor = SiteEditor::new(Uuid::new_v4(), doc);
        editor.set_text("headerSection.title", "Fresh Bowls").unwrap();
        editor.select_file(ImageSlot::CompanyLogo, PendingFile::new(vec![1], "image/png", "logo.png"));

        let rendered = editor.preview().to_string();
        assert!(rendered.contains("# Fresh Bowls  (#000000)"));
        assert!(rendered.contains("[logo] (pending upload: logo.png)"));
    }
}
