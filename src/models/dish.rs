use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::cuisine::Cuisine;
use crate::labeled_enum;

labeled_enum! {
    pub enum DishCategory {
        Buffets => "Buffets",
        Appetizers => "Appetizers",
        Starters => "Starters",
        MainCourse => "Main Course",
        SideDishes => "Side Dishes",
        Desserts => "Desserts",
        Beverages => "Beverages",
        Soups => "Soups",
        Salads => "Salads",
        StreetDish => "Street dish",
        Snacks => "Snacks",
        Breakfast => "Breakfast",
        Lunch => "Lunch",
        Dinner => "Dinner",
    }
}

labeled_enum! {
    pub enum DishType {
        Vegetarian => "Vegetarian",
        NonVegetarian => "Non-Vegetarian",
        Vegan => "Vegan",
        GlutenFree => "Gluten-Free",
        DairyFree => "Dairy-Free",
    }
}

labeled_enum! {
    pub enum DishOccasion {
        SpecialOccasions => "Special Occasions",
        CasualDining => "Casual Dining",
        FormalDining => "Formal Dining",
        RegionalStreetDishes => "Regional Street dishs",
        LocalDesserts => "Local Desserts",
        TraditionalBeverages => "Traditional Beverages",
    }
}

labeled_enum! {
    pub enum DishDietary {
        LowCarb => "Low Carb",
        MidCarb => "Mid Carb",
        HighCarb => "High Carb",
        LowFat => "Low Fat",
        MidFat => "Mid Fat",
        HighFat => "High Fat",
        LowProtein => "Low Protein",
        MidProtein => "Mid Protein",
        HighProtein => "High Protein",
    }
}

labeled_enum! {
    pub enum CookingMethod {
        Grilled => "Grilled",
        Roasted => "Roasted",
        Steamed => "Steamed",
        TawaFried => "Tawa Fried",
        DeepFried => "Deep Fried",
        PanFried => "Pan Fried",
        Baked => "Baked",
    }
}

/// A menu item owned by exactly one client profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishItem {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub user_id: Uuid,
    pub dish_name: String,
    pub dish_recipe: String,
    pub dish_calorie_count: String,
    /// Units per serving; records written before the field existed have none
    #[serde(default)]
    pub dish_count: Option<u32>,
    /// Price exactly as entered; see [`DishItem::price_value`]
    pub dish_price: String,
    pub dish_category: DishCategory,
    pub dish_type: DishType,
    pub dish_occasion: DishOccasion,
    pub dish_dietary: DishDietary,
    pub dish_cooking_methods: CookingMethod,
    pub cuisine: Cuisine,
    pub cuisine_type: String,
    #[serde(default)]
    pub dish_tags: Vec<String>,
    #[serde(default)]
    pub dish_image: Option<String>,
    /// Storage path of `dish_image`, kept so the object can be deleted later
    #[serde(default)]
    pub dish_image_path: Option<String>,
}

impl DishItem {
    /// Numeric price; `None` when the stored string is not a number
    pub fn price_value(&self) -> Option<Decimal> {
        Decimal::from_str(self.dish_price.trim()).ok()
    }

    /// Count shown to customers; absent counts display as one unit
    pub fn display_count(&self) -> u32 {
        self.dish_count.unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_round_trip_through_serde() {
        let json = serde_json::to_string(&DishCategory::MainCourse).unwrap();
        assert_eq!(json, "\"Main Course\"");
        let back: DishCategory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DishCategory::MainCourse);
        assert!(serde_json::from_str::<DishCategory>("\"Brunch\"").is_err());
    }

    #[test]
    fn legacy_record_without_count_displays_one() {
        let raw = serde_json::json!({
            "user_id": Uuid::nil(),
            "dish_name": "Pho",
            "dish_recipe": "Broth, noodles, herbs",
            "dish_calorie_count": "450",
            "dish_price": "12.50",
            "dish_category": "Soups",
            "dish_type": "Non-Vegetarian",
            "dish_occasion": "Casual Dining",
            "dish_dietary": "Mid Carb",
            "dish_cooking_methods": "Steamed",
            "cuisine": "Vietnamese",
            "cuisine_type": "Pho"
        });
        let dish: DishItem = serde_json::from_value(raw).unwrap();
        assert_eq!(dish.display_count(), 1);
        assert_eq!(dish.price_value(), Some(Decimal::new(1250, 2)));
        assert!(dish.dish_tags.is_empty());
    }
}
