use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

use crate::models::{DishCategory, DishItem};

/// `$` followed by the numeric price; text that is not a number is shown as typed
pub fn format_price(raw: &str) -> String {
    match Decimal::from_str(raw.trim()) {
        Ok(price) => format!("${}", price.normalize()),
        Err(_) => format!("${}", raw.trim()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardEntry {
    pub name: String,
    pub description: String,
    pub price: String,
    pub count: u32,
    pub image: Option<String>,
}

impl From<&DishItem> for BoardEntry {
    fn from(dish: &DishItem) -> Self {
        Self {
            name: dish.dish_name.clone(),
            description: dish.dish_recipe.clone(),
            price: format_price(&dish.dish_price),
            count: dish.display_count(),
            image: dish.dish_image.clone().filter(|url| !url.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: DishCategory,
    pub entries: Vec<BoardEntry>,
}

/// The generated customer-facing menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuBoard {
    Empty,
    Groups(Vec<CategoryGroup>),
}

impl MenuBoard {
    /// Groups by category in order of first appearance, keeping fetch order inside a group
    pub fn build(dishes: &[DishItem]) -> Self {
        if dishes.is_empty() {
            return MenuBoard::Empty;
        }

        let mut groups: Vec<CategoryGroup> = Vec::new();
        for dish in dishes {
            let entry = BoardEntry::from(dish);
            match groups.iter_mut().find(|g| g.category == dish.dish_category) {
                Some(group) => group.entries.push(entry),
                None => groups.push(CategoryGroup {
                    category: dish.dish_category,
                    entries: vec![entry],
                }),
            }
        }
        MenuBoard::Groups(groups)
    }

    pub fn groups(&self) -> &[CategoryGroup] {
        match self {
            MenuBoard::Empty => &[],
            MenuBoard::Groups(groups) => groups,
        }
    }
}

impl fmt::Display for MenuBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MENU")?;
        match self {
            MenuBoard::Empty => write!(f, "No dishes on the menu yet."),
            MenuBoard::Groups(groups) => {
                for group in groups {
                    writeln!(f)?;
                    writeln!(f, "{}", group.category)?;
                    for entry in &group.entries {
                        writeln!(f, "  {:<40} {:>10}  x{}", entry.name.to_uppercase(), entry.price, entry.count)?;
                        if !entry.description.is_empty() {
                            writeln!(f, "    {}", entry.description)?;
                        }
                    }
                }
                Ok(())
            }
        }
    }
}
