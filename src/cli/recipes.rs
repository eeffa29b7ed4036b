//! Recipe commands.

use serde_json::Value;

use crate::api::{BatchUpdateItem, ItemOperation};
use crate::core::recipe;

use super::{authenticated_client, resolve_list, CliError, Result};

pub async fn add_recipe(
    id: String,
    servings: Option<u32>,
    include_pantry: bool,
    list: Option<String>,
) -> Result<()> {
    let (client, config) = authenticated_client()?;
    let content = client.get_inspiration_details(&id).await?;
    let title = recipe::title(&content);
    let (list_uuid, list_name) = resolve_list(&client, list, &config).await?;

    let null = Value::Null;
    let recipe_servings = recipe::parse_servings(&[
        content.get("yield").unwrap_or(&null),
        content.get("baseQuantity").unwrap_or(&null),
        content.get("servings").unwrap_or(&null),
    ]);
    let target_servings = servings.or(config.defaults.servings);
    let scale = match (recipe_servings, target_servings) {
        (Some(from), Some(to)) if to > 0 => f64::from(to) / f64::from(from),
        _ => 1.0,
    };

    let all_ingredients = recipe::ingredients(&content, scale);
    if all_ingredients.is_empty() {
        return Err(CliError::Usage("Recipe has no ingredients".to_string()));
    }

    let batch: Vec<BatchUpdateItem> = all_ingredients
        .iter()
        .filter(|ingredient| include_pantry || !ingredient.pantry)
        .map(|ingredient| BatchUpdateItem {
            item_id: ingredient.name.clone(),
            spec: (!ingredient.spec.is_empty()).then(|| ingredient.spec.clone()),
            uuid: None,
        })
        .collect();

    if batch.is_empty() {
        println!("All ingredients are pantry items. Use --all to add them anyway.");
        return Ok(());
    }

    client
        .batch_update_items(&list_uuid, &batch, ItemOperation::ToPurchase)
        .await?;

    println!();
    println!(
        "Added {} ingredients from \"{}\" to {}",
        batch.len(),
        title,
        list_name
    );
    if scale != 1.0 {
        if let (Some(from), Some(to)) = (recipe_servings, target_servings) {
            println!("(Scaled from {from} to {to} servings)");
        }
    }

    println!();
    println!("Items added:");
    for item in &batch {
        match &item.spec {
            Some(spec) => println!("  - {} ({})", item.item_id, spec),
            None => println!("  - {}", item.item_id),
        }
    }

    let skipped = all_ingredients.len() - batch.len();
    if !include_pantry && skipped > 0 {
        println!();
        println!("{skipped} pantry item(s) skipped. Use --all to include them.");
    }
    Ok(())
}
