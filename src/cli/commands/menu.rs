use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::utils::output_value;
use crate::cli::{Dashboard, OutputFormat};
use crate::views::MenuBoard;

#[derive(Subcommand)]
pub enum MenuCommands {
    #[command(about = "Render the menu board grouped by category")]
    Show,
}

fn board_json(board: &MenuBoard) -> Value {
    let groups: Vec<Value> = board
        .groups()
        .iter()
        .map(|group| {
            json!({
                "category": group.category.label(),
                "items": group.entries.iter().map(|e| json!({
                    "name": e.name,
                    "description": e.description,
                    "price": e.price,
                    "count": e.count,
                    "image": e.image,
                })).collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({ "menu": groups })
}

pub async fn handle(cmd: MenuCommands, dash: Dashboard, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        MenuCommands::Show => {
            let dishes = dash.dishes().fetch_all(dash.owner()?).await?;
            let board = MenuBoard::build(&dishes);
            output_value(&output_format, &board_json(&board), &board.to_string())
        }
    }
}
