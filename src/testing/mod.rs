//! Fixtures shared by unit tests.

use chrono::Utc;
use image::{ImageBuffer, ImageOutputFormat, Rgb};
use std::io::Cursor;
use uuid::Uuid;

use crate::models::{
    ClientProfile, CookingMethod, Cuisine, DishCategory, DishDietary, DishItem, DishOccasion, DishType,
    Gender, MaritalStatus,
};

pub fn sample_dish(owner: Uuid) -> DishItem {
    DishItem {
        id: None,
        user_id: owner,
        dish_name: "Butter Chicken".to_string(),
        dish_recipe: "Chicken simmered in a tomato and butter gravy".to_string(),
        dish_calorie_count: "650".to_string(),
        dish_count: Some(2),
        dish_price: "250".to_string(),
        dish_category: DishCategory::MainCourse,
        dish_type: DishType::NonVegetarian,
        dish_occasion: DishOccasion::CasualDining,
        dish_dietary: DishDietary::HighProtein,
        dish_cooking_methods: CookingMethod::PanFried,
        cuisine: Cuisine::Indian,
        cuisine_type: "Punjabi".to_string(),
        dish_tags: vec!["spicy".to_string()],
        dish_image: None,
        dish_image_path: None,
    }
}

pub fn sample_profile(owner: Uuid) -> ClientProfile {
    ClientProfile {
        user_id: owner,
        name: "Asha Rao".to_string(),
        email: "asha@example.com".to_string(),
        age: 34,
        phone_number: "9876543210".to_string(),
        dob: "1990-04-12".to_string(),
        nationality: "Indian".to_string(),
        gender: Some(Gender::Female),
        marital_status: Some(MaritalStatus::Single),
        cloud_kitchen_website_id: None,
        created_at: Utc::now(),
    }
}

/// A solid-colour PNG of the given size
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(width, height, Rgb([200, 80, 40]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageOutputFormat::Png)
        .expect("encode png fixture");
    out.into_inner()
}

/// A solid-colour JPEG of the given size
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(width, height, Rgb([30, 120, 60]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageOutputFormat::Jpeg(90))
        .expect("encode jpeg fixture");
    out.into_inner()
}
