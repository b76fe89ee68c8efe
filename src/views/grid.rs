use std::fmt;
use tracing::{info, warn};
use uuid::Uuid;

use super::board::format_price;
use crate::assets::{AssetPipeline, Notice};
use crate::forms::dish::DishForm;
use crate::gateway::{DishGateway, GatewayError, GatewayResult};
use crate::models::DishItem;

/// The operator's dish list with edit and confirm-before-delete affordances.
///
/// Every write is followed by a full re-fetch; rows are never removed locally.
pub struct MenuGrid {
    owner: Uuid,
    items: Vec<DishItem>,
    pending_delete: Option<Uuid>,
}

impl MenuGrid {
    pub async fn load(owner: Uuid, dishes: &dyn DishGateway) -> GatewayResult<Self> {
        let items = dishes.fetch_all(owner).await?;
        Ok(Self {
            owner,
            items,
            pending_delete: None,
        })
    }

    pub fn items(&self) -> &[DishItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, id: Uuid) -> Option<&DishItem> {
        self.items.iter().find(|d| d.id == Some(id))
    }

    pub async fn refresh(&mut self, dishes: &dyn DishGateway) -> GatewayResult<()> {
        self.items = dishes.fetch_all(self.owner).await?;
        Ok(())
    }

    pub fn open_creator(&self) -> DishForm {
        DishForm::create(self.owner)
    }

    /// The dish form seeded in edit mode
    pub fn open_editor(&self, id: Uuid) -> Option<DishForm> {
        self.find(id).and_then(DishForm::edit)
    }

    /// Marks a row for deletion; nothing is sent until confirmation
    pub fn request_delete(&mut self, id: Uuid) -> Option<&DishItem> {
        let exists = self.find(id).is_some();
        self.pending_delete = exists.then_some(id);
        self.pending_delete.and_then(|id| self.find(id))
    }

    pub fn pending_delete(&self) -> Option<&DishItem> {
        self.pending_delete.and_then(|id| self.find(id))
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Deletes the marked dish and its stored image, then re-fetches
    pub async fn confirm_delete(&mut self, dishes: &dyn DishGateway, pipeline: &AssetPipeline) -> GatewayResult<Vec<Notice>> {
        let Some(id) = self.pending_delete.take() else {
            return Err(GatewayError::rejected("no dish is awaiting delete confirmation"));
        };
        let image_path = self.find(id).and_then(|d| d.dish_image_path.clone());

        dishes.delete(id, self.owner).await?;
        info!("Deleted dish {}", id);

        let mut notices = Vec::new();
        if let Some(path) = image_path {
            if let Err(e) = pipeline.delete(&path).await {
                warn!("Dish {} deleted but its image was not: {}", id, e);
                notices.push(Notice::from(&e));
            }
        }

        self.refresh(dishes).await?;
        Ok(notices)
    }
}

impl fmt::Display for MenuGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.items.is_empty() {
            return write!(f, "No data");
        }
        for (n, item) in self.items.iter().enumerate() {
            if n > 0 {
                writeln!(f)?;
            }
            let id = item.id.map(|id| id.to_string()).unwrap_or_default();
            writeln!(f, "{} [{}]  {}", item.dish_name, item.dish_category, id)?;
            if !item.dish_tags.is_empty() {
                writeln!(f, "  tags: {}", item.dish_tags.join(", "))?;
            }
            writeln!(f, "  {}", item.dish_recipe)?;
            write!(
                f,
                "  price: {}  calories: {}  count: {}",
                format_price(&item.dish_price),
                item.dish_calorie_count,
                item.display_count()
            )?;
        }
        Ok(())
    }
}
