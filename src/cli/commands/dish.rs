use clap::{Args, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use uuid::Uuid;

use crate::assets::PendingFile;
use crate::cli::utils::{
    confirm, output_empty_collection, output_notices, output_success, output_value, parse_assignment,
};
use crate::cli::{report_submit_error, Dashboard, OutputFormat};
use crate::forms::dish::{DishForm, DishOutcome};
use crate::views::MenuGrid;

#[derive(Args)]
pub struct DishFields {
    #[arg(
        long = "set",
        value_name = "FIELD=VALUE",
        help = "Field to set, e.g. dish_name=Green Curry (repeatable; dish_tags is comma separated)"
    )]
    pub fields: Vec<String>,

    #[arg(long, help = "Image file to upload for the dish")]
    pub image: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum DishCommands {
    #[command(about = "List the menu items")]
    List,

    #[command(about = "Add a menu item")]
    Add(DishFields),

    #[command(about = "Edit a menu item; only the given fields change")]
    Edit {
        #[arg(help = "Dish id")]
        id: Uuid,
        #[command(flatten)]
        fields: DishFields,
        #[arg(long, conflicts_with = "image", help = "Remove the dish image")]
        remove_image: bool,
    },

    #[command(about = "Delete a menu item after confirmation")]
    Delete {
        #[arg(help = "Dish id")]
        id: Uuid,
        #[arg(long, short = 'y', help = "Skip the confirmation prompt")]
        yes: bool,
    },

    #[command(about = "List cuisines, or the subtypes of one cuisine")]
    Cuisines {
        #[arg(help = "Cuisine name")]
        cuisine: Option<String>,
    },
}

async fn fill(form: &mut DishForm, fields: DishFields) -> anyhow::Result<()> {
    for raw in &fields.fields {
        let (name, value) = parse_assignment(raw)?;
        if !form.set_field(&name, &value) {
            anyhow::bail!("unknown dish field '{}'", name);
        }
    }
    if let Some(path) = fields.image {
        form.select_image(PendingFile::from_path(&path).await?);
    }
    Ok(())
}

async fn save(form: &mut DishForm, dash: &Dashboard, output_format: &OutputFormat) -> anyhow::Result<()> {
    let outcome = form
        .submit(dash.dishes(), &dash.pipeline)
        .await
        .map_err(|e| report_submit_error(output_format, e))?;

    match outcome {
        DishOutcome::Saved { item, notices } => {
            output_success(
                output_format,
                &format!("Saved {}", item.dish_name),
                Some(json!({ "dish": item })),
            )?;
            output_notices(output_format, &notices)
        }
        DishOutcome::Unchanged => output_success(output_format, "No changes to save", None),
    }
}

pub async fn handle(cmd: DishCommands, dash: Dashboard, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        DishCommands::List => {
            let grid = MenuGrid::load(dash.owner()?, dash.dishes()).await?;
            if grid.is_empty() {
                return output_empty_collection(&output_format, "dishes", "No data");
            }
            output_value(&output_format, &json!({ "dishes": grid.items() }), &grid.to_string())
        }
        DishCommands::Add(fields) => {
            let grid = MenuGrid::load(dash.owner()?, dash.dishes()).await?;
            let mut form = grid.open_creator();
            fill(&mut form, fields).await?;
            save(&mut form, &dash, &output_format).await
        }
        DishCommands::Edit { id, fields, remove_image } => {
            let grid = MenuGrid::load(dash.owner()?, dash.dishes()).await?;
            let mut form = grid
                .open_editor(id)
                .ok_or_else(|| anyhow::anyhow!("no dish with id {}", id))?;
            fill(&mut form, fields).await?;
            if remove_image {
                form.remove_image();
            }
            save(&mut form, &dash, &output_format).await
        }
        DishCommands::Delete { id, yes } => {
            let mut grid = MenuGrid::load(dash.owner()?, dash.dishes()).await?;
            let name = match grid.request_delete(id) {
                Some(dish) => dish.dish_name.clone(),
                None => anyhow::bail!("no dish with id {}", id),
            };

            if !yes && !confirm(&format!("Delete '{}'?", name))? {
                grid.cancel_delete();
                return output_success(&output_format, "Delete cancelled", None);
            }

            let notices = grid.confirm_delete(dash.dishes(), &dash.pipeline).await?;
            output_success(
                &output_format,
                &format!("Deleted {} ({} remaining)", name, grid.items().len()),
                Some(json!({ "deleted": id, "remaining": grid.items().len() })),
            )?;
            output_notices(&output_format, &notices)
        }
        DishCommands::Cuisines { cuisine } => {
            let catalog = dash.api.cuisines().await?;
            match cuisine {
                Some(name) => {
                    let entry = catalog
                        .into_iter()
                        .find(|e| e.cuisine.eq_ignore_ascii_case(name.trim()))
                        .ok_or_else(|| anyhow::anyhow!("unknown cuisine '{}'", name))?;
                    let text = if entry.subtypes.is_empty() {
                        format!("{} has no subtypes", entry.cuisine)
                    } else {
                        entry.subtypes.join("\n")
                    };
                    output_value(&output_format, &serde_json::to_value(&entry)?, &text)
                }
                None => {
                    let text = catalog
                        .iter()
                        .map(|e| format!("{} ({})", e.cuisine, e.subtypes.len()))
                        .collect::<Vec<_>>()
                        .join("\n");
                    output_value(&output_format, &serde_json::to_value(&catalog)?, &text)
                }
            }
        }
    }
}
