pub mod board;
pub mod grid;

pub use board::{format_price, BoardEntry, CategoryGroup, MenuBoard};
pub use grid::MenuGrid;
