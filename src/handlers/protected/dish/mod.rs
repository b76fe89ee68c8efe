pub mod collection;
pub mod record;

pub use collection::get as collection_get;
pub use collection::post as collection_post;
pub use record::delete as record_delete;
pub use record::put as record_put;

use crate::error::ApiError;
use crate::forms::dish::{DishFormValues, DishSchema};
use crate::forms::Schema;
use crate::models::DishItem;

/// Applies the dish form rules to a record arriving over the wire
pub(crate) fn check_dish(dish: &DishItem) -> Result<(), ApiError> {
    DishSchema::validate(&DishFormValues::from(dish))
        .map(|_| ())
        .map_err(ApiError::from)
}
