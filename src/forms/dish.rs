use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{info, warn};
use uuid::Uuid;

use super::{non_negative_number, FieldErrors, Form, FormMode, FormState, Schema, SubmitError, Submission};
use crate::assets::{AssetField, AssetPipeline, DeferredDeletions, Notice, PendingFile, DISH_FOLDER};
use crate::gateway::DishGateway;
use crate::models::{
    subtypes_for_label, CookingMethod, Cuisine, DishCategory, DishDietary, DishItem, DishOccasion, DishType,
};

/// Raw dish input as the operator typed or picked it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DishFormValues {
    pub dish_name: String,
    pub dish_recipe: String,
    pub dish_calorie_count: String,
    pub dish_count: String,
    pub dish_price: String,
    pub dish_category: String,
    pub dish_type: String,
    pub dish_occasion: String,
    pub dish_dietary: String,
    pub dish_cooking_methods: String,
    pub cuisine: String,
    pub cuisine_type: String,
    pub dish_tags: Vec<String>,
    pub image: Option<AssetField>,
}

impl From<&DishItem> for DishFormValues {
    fn from(item: &DishItem) -> Self {
        Self {
            dish_name: item.dish_name.clone(),
            dish_recipe: item.dish_recipe.clone(),
            dish_calorie_count: item.dish_calorie_count.clone(),
            dish_count: item.dish_count.map(|c| c.to_string()).unwrap_or_default(),
            dish_price: item.dish_price.clone(),
            dish_category: item.dish_category.label().to_string(),
            dish_type: item.dish_type.label().to_string(),
            dish_occasion: item.dish_occasion.label().to_string(),
            dish_dietary: item.dish_dietary.label().to_string(),
            dish_cooking_methods: item.dish_cooking_methods.label().to_string(),
            cuisine: item.cuisine.label().to_string(),
            cuisine_type: item.cuisine_type.clone(),
            dish_tags: item.dish_tags.clone(),
            image: item.dish_image.clone().filter(|url| !url.is_empty()).map(AssetField::Resolved),
        }
    }
}

/// Every field of a dish after validation, image still unresolved
#[derive(Debug, Clone, PartialEq)]
pub struct ValidDish {
    pub dish_name: String,
    pub dish_recipe: String,
    pub dish_calorie_count: String,
    pub dish_count: u32,
    pub dish_price: String,
    pub dish_category: DishCategory,
    pub dish_type: DishType,
    pub dish_occasion: DishOccasion,
    pub dish_dietary: DishDietary,
    pub dish_cooking_methods: CookingMethod,
    pub cuisine: Cuisine,
    pub cuisine_type: String,
    pub dish_tags: Vec<String>,
    pub image: Option<AssetField>,
}

impl ValidDish {
    fn into_item(self, owner: Uuid, id: Option<Uuid>, image_url: Option<String>, image_path: Option<String>) -> DishItem {
        DishItem {
            id,
            user_id: owner,
            dish_name: self.dish_name,
            dish_recipe: self.dish_recipe,
            dish_calorie_count: self.dish_calorie_count,
            dish_count: Some(self.dish_count),
            dish_price: self.dish_price,
            dish_category: self.dish_category,
            dish_type: self.dish_type,
            dish_occasion: self.dish_occasion,
            dish_dietary: self.dish_dietary,
            dish_cooking_methods: self.dish_cooking_methods,
            cuisine: self.cuisine,
            cuisine_type: self.cuisine_type,
            dish_tags: self.dish_tags,
            dish_image: image_url,
            dish_image_path: image_path,
        }
    }
}

/// Trims tags, drops empty ones and keeps the first of any duplicates
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !out.iter().any(|seen| seen == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

fn choice<T: FromStr>(errors: &mut FieldErrors, field: &str, raw: &str, required: &str, invalid: &str) -> Option<T> {
    if !errors.require(field, raw, required) {
        return None;
    }
    let parsed = raw.trim().parse::<T>().ok();
    if parsed.is_none() {
        errors.add(field, invalid);
    }
    parsed
}

fn number(errors: &mut FieldErrors, field: &str, raw: &str, required: &str, invalid: &str) -> Option<Decimal> {
    if !errors.require(field, raw, required) {
        return None;
    }
    let parsed = non_negative_number(raw);
    if parsed.is_none() {
        errors.add(field, invalid);
    }
    parsed
}

pub struct DishSchema;

impl Schema for DishSchema {
    type Values = DishFormValues;
    type Output = ValidDish;

    fn validate(v: &DishFormValues) -> Result<ValidDish, FieldErrors> {
        let mut errors = FieldErrors::new();

        errors.require("dish_name", &v.dish_name, "Dish name is required.");
        errors.require("dish_recipe", &v.dish_recipe, "Dish recipe is required.");
        number(&mut errors, "dish_calorie_count", &v.dish_calorie_count, "Calories is required.", "Calories must be a non-negative number.");
        number(&mut errors, "dish_price", &v.dish_price, "Price is required.", "Price must be a non-negative number.");

        let dish_count = if errors.require("dish_count", &v.dish_count, "Dish count is required.") {
            let parsed = v.dish_count.trim().parse::<u32>().ok().filter(|c| *c >= 1);
            if parsed.is_none() {
                errors.add("dish_count", "Dish count must be a whole number of at least 1.");
            }
            parsed
        } else {
            None
        };

        let category = choice::<DishCategory>(&mut errors, "dish_category", &v.dish_category, "Dish category is required.", "Dish category is not a listed option.");
        let dish_type = choice::<DishType>(&mut errors, "dish_type", &v.dish_type, "Dish type is required.", "Dish type is not a listed option.");
        let occasion = choice::<DishOccasion>(&mut errors, "dish_occasion", &v.dish_occasion, "Dish occasion is required.", "Dish occasion is not a listed option.");
        let dietary = choice::<DishDietary>(&mut errors, "dish_dietary", &v.dish_dietary, "Dish dietary is required.", "Dish dietary is not a listed option.");
        let method = choice::<CookingMethod>(&mut errors, "dish_cooking_methods", &v.dish_cooking_methods, "Dish cooking methods are required.", "Dish cooking method is not a listed option.");
        let cuisine = choice::<Cuisine>(&mut errors, "cuisine", &v.cuisine, "Cuisine is required.", "Cuisine is not a listed option.");

        if errors.require("cuisine_type", &v.cuisine_type, "Cuisine type is required.") {
            if let Some(cuisine) = cuisine {
                if !cuisine.has_subtype(v.cuisine_type.trim()) {
                    errors.add("cuisine_type", "Cuisine type does not belong to the selected cuisine.");
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        match (dish_count, category, dish_type, occasion, dietary, method, cuisine) {
            (Some(dish_count), Some(dish_category), Some(dish_type), Some(dish_occasion), Some(dish_dietary), Some(dish_cooking_methods), Some(cuisine)) => {
                Ok(ValidDish {
                    dish_name: v.dish_name.trim().to_string(),
                    dish_recipe: v.dish_recipe.trim().to_string(),
                    dish_calorie_count: v.dish_calorie_count.trim().to_string(),
                    dish_count,
                    dish_price: v.dish_price.trim().to_string(),
                    dish_category,
                    dish_type,
                    dish_occasion,
                    dish_dietary,
                    dish_cooking_methods,
                    cuisine,
                    cuisine_type: v.cuisine_type.trim().to_string(),
                    dish_tags: normalize_tags(&v.dish_tags),
                    image: v.image.clone(),
                })
            }
            _ => Err(errors),
        }
    }
}

#[derive(Debug)]
pub enum DishOutcome {
    Saved { item: DishItem, notices: Vec<Notice> },
    Unchanged,
}

fn stored_image_of(item: &DishItem) -> Option<(String, Option<String>)> {
    item.dish_image
        .clone()
        .filter(|url| !url.is_empty())
        .map(|url| (url, item.dish_image_path.clone()))
}

/// The add/edit dish drawer: form state plus the image it owns
pub struct DishForm {
    form: Form<DishSchema>,
    owner: Uuid,
    stored_image: Option<(String, Option<String>)>,
    deletions: DeferredDeletions,
}

impl DishForm {
    pub fn create(owner: Uuid) -> Self {
        Self {
            form: Form::create(DishFormValues::default()),
            owner,
            stored_image: None,
            deletions: DeferredDeletions::new(),
        }
    }

    /// Seeds the form from a stored dish; `None` when the record has no id
    pub fn edit(item: &DishItem) -> Option<Self> {
        let id = item.id?;
        Some(Self {
            form: Form::edit(id, DishFormValues::from(item)),
            owner: item.user_id,
            stored_image: stored_image_of(item),
            deletions: DeferredDeletions::new(),
        })
    }

    pub fn mode(&self) -> FormMode {
        self.form.mode()
    }

    pub fn state(&self) -> FormState {
        self.form.state()
    }

    pub fn values(&self) -> &DishFormValues {
        self.form.values()
    }

    pub fn errors(&self) -> &FieldErrors {
        self.form.errors()
    }

    pub fn pending_deletions(&self) -> &[String] {
        self.deletions.pending()
    }

    pub fn update(&mut self, f: impl FnOnce(&mut DishFormValues)) {
        self.form.update(f)
    }

    /// Sets a text field by name; returns false for an unknown name
    pub fn set_field(&mut self, name: &str, value: &str) -> bool {
        if name == "cuisine" {
            self.set_cuisine(value);
            return true;
        }
        let mut known = true;
        let value = value.to_string();
        self.form.update(|v| match name {
            "dish_name" => v.dish_name = value,
            "dish_recipe" => v.dish_recipe = value,
            "dish_calorie_count" => v.dish_calorie_count = value,
            "dish_count" => v.dish_count = value,
            "dish_price" => v.dish_price = value,
            "dish_category" => v.dish_category = value,
            "dish_type" => v.dish_type = value,
            "dish_occasion" => v.dish_occasion = value,
            "dish_dietary" => v.dish_dietary = value,
            "dish_cooking_methods" => v.dish_cooking_methods = value,
            "cuisine_type" => v.cuisine_type = value,
            "dish_tags" => v.dish_tags = value.split(',').map(str::to_string).collect(),
            _ => known = false,
        });
        known
    }

    /// Picking a cuisine always clears the subtype
    pub fn set_cuisine(&mut self, cuisine: &str) {
        let cuisine = cuisine.to_string();
        self.form.update(|v| {
            v.cuisine = cuisine;
            v.cuisine_type.clear();
        });
    }

    pub fn subtype_options(&self) -> &'static [&'static str] {
        subtypes_for_label(self.form.values().cuisine.trim())
    }

    pub fn subtype_enabled(&self) -> bool {
        !self.subtype_options().is_empty()
    }

    fn schedule_stored_image_delete(&mut self) {
        if let Some((_, Some(path))) = &self.stored_image {
            let is_current = matches!(
                &self.form.values().image,
                Some(AssetField::Resolved(url)) if Some(url) == self.stored_image.as_ref().map(|(u, _)| u)
            );
            if is_current {
                self.deletions.schedule(path.clone());
            }
        }
    }

    /// Replaces the image with a local file; the stored one is deleted on submit
    pub fn select_image(&mut self, file: PendingFile) {
        self.schedule_stored_image_delete();
        self.form.update(|v| v.image = Some(AssetField::Pending(file)));
    }

    /// Clears the image; the stored one is deleted on submit
    pub fn remove_image(&mut self) {
        self.schedule_stored_image_delete();
        self.form.update(|v| v.image = None);
    }

    /// Closes without writing; scheduled deletions are dropped
    pub fn cancel(&mut self) {
        self.deletions.discard();
        self.form.cancel();
    }

    /// Validates, uploads a newly picked image, writes the record, then
    /// removes any image it replaced.
    pub async fn submit(&mut self, dishes: &dyn DishGateway, pipeline: &AssetPipeline) -> Result<DishOutcome, SubmitError> {
        let (id, valid) = match self.form.submit()? {
            Submission::Unchanged => return Ok(DishOutcome::Unchanged),
            Submission::Insert(valid) => (None, valid),
            Submission::Update(id, valid) => (Some(id), valid),
        };

        let (image_url, image_path) = match &valid.image {
            None => (None, None),
            Some(AssetField::Resolved(url)) => {
                // Only the stored image keeps its known path
                let path = self
                    .stored_image
                    .as_ref()
                    .filter(|(stored, _)| stored == url)
                    .and_then(|(_, path)| path.clone());
                (Some(url.clone()), path)
            }
            Some(field @ AssetField::Pending(_)) => match pipeline.resolve(field, DISH_FOLDER).await {
                Ok(resolved) => (Some(resolved.url), resolved.path),
                Err(e) => {
                    self.form.reopen();
                    return Err(e.into());
                }
            },
        };

        let item = valid.into_item(self.owner, id, image_url, image_path);
        let written = match id {
            Some(id) => dishes.update(id, &item).await,
            None => dishes.insert(&item).await,
        };
        let saved = match written {
            Ok(saved) => saved,
            Err(e) => {
                warn!("Dish write failed: {}", e);
                self.form.reopen();
                return Err(e.into());
            }
        };

        let notices = self.deletions.flush(pipeline).await;
        // Further edits through this form start from what was stored
        self.stored_image = stored_image_of(&saved);
        if let Some(id) = saved.id {
            self.form = Form::edit(id, DishFormValues::from(&saved));
        }
        self.form.complete();
        info!("Saved dish {:?} ({})", saved.id, saved.dish_name);
        Ok(DishOutcome::Saved { item: saved, notices })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::MemoryBackend;
    use crate::testing::{jpeg_bytes, sample_dish};
    use std::sync::Arc;

    fn filled(form: &mut DishForm) {
        for (k, v) in [
            ("dish_name", "Green Curry"),
            ("dish_recipe", "Coconut milk, basil, chicken"),
            ("dish_calorie_count", "540"),
            ("dish_count", "3"),
            ("dish_price", "250"),
            ("dish_category", "Main Course"),
            ("dish_type", "Non-Vegetarian"),
            ("dish_occasion", "Casual Dining"),
            ("dish_dietary", "Mid Fat"),
            ("dish_cooking_methods", "Roasted"),
            ("cuisine", "Thai"),
            ("cuisine_type", "Green Curry"),
            ("dish_tags", " spicy, ,spicy,coconut "),
        ] {
            assert!(form.set_field(k, v), "{k}");
        }
    }

    fn setup() -> (Arc<MemoryBackend>, AssetPipeline) {
        let backend = Arc::new(MemoryBackend::new());
        (backend.clone(), AssetPipeline::new(backend))
    }

    #[tokio::test]
    async fn new_dish_is_inserted_with_normalized_tags() {
        let (backend, pipeline) = setup();
        let owner = Uuid::new_v4();
        let mut form = DishForm::create(owner);
        filled(&mut form);

        let DishOutcome::Saved { item, notices } = form.submit(backend.as_ref(), &pipeline).await.unwrap() else {
            panic!("expected a write");
        };
        assert!(notices.is_empty());
        assert_eq!(item.dish_count, Some(3));
        assert_eq!(item.dish_tags, vec!["spicy", "coconut"]);
        assert_eq!(backend.dish_count(owner).await, 1);
    }

    #[tokio::test]
    async fn unchanged_edit_performs_no_write() {
        let (backend, pipeline) = setup();
        let stored = DishGateway::insert(backend.as_ref(), &sample_dish(Uuid::new_v4())).await.unwrap();
        let writes = backend.stats().dish_writes;

        let mut form = DishForm::edit(&stored).unwrap();
        let outcome = form.submit(backend.as_ref(), &pipeline).await.unwrap();
        assert!(matches!(outcome, DishOutcome::Unchanged));
        assert_eq!(backend.stats().dish_writes, writes);
    }

    #[test]
    fn changing_cuisine_clears_and_gates_subtype() {
        let mut form = DishForm::create(Uuid::new_v4());
        form.set_cuisine("Thai");
        form.set_field("cuisine_type", "Pad Thai");
        assert!(form.subtype_enabled());

        form.set_cuisine("Martian");
        assert_eq!(form.values().cuisine_type, "");
        assert!(!form.subtype_enabled());
    }

    #[test]
    fn invalid_dish_reports_each_field() {
        let mut form = DishForm::create(Uuid::new_v4());
        filled(&mut form);
        form.set_field("dish_price", "-5");
        form.set_field("dish_count", "0");
        form.set_field("dish_category", "Brunch");
        form.set_field("cuisine_type", "Pizza");

        let errors = DishSchema::validate(form.values()).unwrap_err();
        assert!(errors.contains("dish_price"));
        assert!(errors.contains("dish_count"));
        assert!(errors.contains("dish_category"));
        assert!(errors.contains("cuisine_type"));
    }

    #[tokio::test]
    async fn replacing_image_deletes_old_one_only_after_write() {
        let (backend, pipeline) = setup();
        let owner = Uuid::new_v4();
        let old = pipeline
            .upload(&PendingFile::new(jpeg_bytes(8, 8), "image/jpeg", "old.jpg"), DISH_FOLDER)
            .await
            .unwrap();
        let mut dish = sample_dish(owner);
        dish.dish_image = Some(old.url.clone());
        dish.dish_image_path = Some(old.path.clone());
        let stored = DishGateway::insert(backend.as_ref(), &dish).await.unwrap();

        let mut form = DishForm::edit(&stored).unwrap();
        form.select_image(PendingFile::new(jpeg_bytes(16, 16), "image/jpeg", "new.jpg"));
        assert_eq!(form.pending_deletions(), &[old.path.clone()]);

        let DishOutcome::Saved { item, .. } = form.submit(backend.as_ref(), &pipeline).await.unwrap() else {
            panic!("expected a write");
        };
        assert_ne!(item.dish_image.as_deref(), Some(old.url.as_str()));
        assert!(backend.object(&old.path).await.is_none());
        assert!(backend.object(item.dish_image_path.as_deref().unwrap()).await.is_some());
    }

    #[tokio::test]
    async fn second_replacement_in_same_form_deletes_previous_upload() {
        let (backend, pipeline) = setup();
        let owner = Uuid::new_v4();
        let mut form = DishForm::create(owner);
        filled(&mut form);
        form.select_image(PendingFile::new(jpeg_bytes(8, 8), "image/jpeg", "first.jpg"));
        let DishOutcome::Saved { item: first, .. } = form.submit(backend.as_ref(), &pipeline).await.unwrap() else {
            panic!("expected a write");
        };
        let first_path = first.dish_image_path.clone().unwrap();
        assert_eq!(form.mode(), FormMode::Edit(first.id.unwrap()));

        form.select_image(PendingFile::new(jpeg_bytes(12, 12), "image/jpeg", "second.jpg"));
        assert_eq!(form.pending_deletions(), &[first_path.clone()]);

        let DishOutcome::Saved { item: second, .. } = form.submit(backend.as_ref(), &pipeline).await.unwrap() else {
            panic!("expected a write");
        };
        assert_eq!(second.id, first.id);
        assert_eq!(backend.dish_count(owner).await, 1);
        assert!(backend.object(&first_path).await.is_none());
        assert!(backend.object(second.dish_image_path.as_deref().unwrap()).await.is_some());
    }

    #[tokio::test]
    async fn cancelled_removal_keeps_stored_image() {
        let (backend, pipeline) = setup();
        let old = pipeline
            .upload(&PendingFile::new(jpeg_bytes(8, 8), "image/jpeg", "old.jpg"), DISH_FOLDER)
            .await
            .unwrap();
        let mut dish = sample_dish(Uuid::new_v4());
        dish.id = Some(Uuid::new_v4());
        dish.dish_image = Some(old.url.clone());
        dish.dish_image_path = Some(old.path.clone());

        let mut form = DishForm::edit(&dish).unwrap();
        form.remove_image();
        form.cancel();
        assert!(form.pending_deletions().is_empty());
        assert!(backend.object(&old.path).await.is_some());
    }

    #[tokio::test]
    async fn failed_upload_blocks_the_write() {
        let (backend, pipeline) = setup();
        backend.fail_uploads_containing(DISH_FOLDER);
        let owner = Uuid::new_v4();
        let mut form = DishForm::create(owner);
        filled(&mut form);
        form.select_image(PendingFile::new(jpeg_bytes(8, 8), "image/jpeg", "dish.jpg"));

        let err = form.submit(backend.as_ref(), &pipeline).await.unwrap_err();
        assert!(matches!(err, SubmitError::Asset(_)));
        assert_eq!(backend.dish_count(owner).await, 0);
        assert_eq!(form.state(), FormState::Editing);
    }
}
