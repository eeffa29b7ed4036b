//! Shopping list commands: lists, items, add, remove, complete.

use super::{authenticated_client, resolve_list, Result};

pub async fn lists() -> Result<()> {
    let (client, _config) = authenticated_client()?;
    let lists = client.load_lists().await?;

    println!("Shopping Lists:");
    println!();
    for list in lists.lists {
        println!("  {} ({})", list.name, list.list_uuid);
    }
    Ok(())
}

pub async fn items(list: Option<String>, all: bool) -> Result<()> {
    let (client, config) = authenticated_client()?;
    let resolved_implicitly = list.is_none();
    let (list_uuid, list_name) = resolve_list(&client, list, &config).await?;
    if resolved_implicitly {
        println!("List: {list_name}");
        println!();
    }

    let items = client.get_items(&list_uuid).await?;
    if items.purchase.is_empty() && items.recently.is_empty() {
        println!("Shopping list is empty");
        return Ok(());
    }

    if !items.purchase.is_empty() {
        println!("To Purchase:");
        for item in &items.purchase {
            if item.specification.is_empty() {
                println!("  - {}", item.name);
            } else {
                println!("  - {} ({})", item.name, item.specification);
            }
        }
    }

    if all && !items.recently.is_empty() {
        println!();
        println!("Recent Items:");
        for item in &items.recently {
            println!("  - {}", item.name);
        }
    }
    Ok(())
}

pub async fn add(item: String, spec: Option<String>, list: Option<String>) -> Result<()> {
    let (client, config) = authenticated_client()?;
    let (list_uuid, list_name) = resolve_list(&client, list, &config).await?;

    let spec = spec.unwrap_or_default();
    client.save_item(&list_uuid, &item, &spec).await?;

    if spec.is_empty() {
        println!("Added \"{item}\" to {list_name}");
    } else {
        println!("Added \"{item}\" ({spec}) to {list_name}");
    }
    Ok(())
}

pub async fn remove(item: String, list: Option<String>) -> Result<()> {
    let (client, config) = authenticated_client()?;
    let (list_uuid, list_name) = resolve_list(&client, list, &config).await?;

    client.remove_item(&list_uuid, &item).await?;
    println!("Removed \"{item}\" from {list_name}");
    Ok(())
}

pub async fn complete(item: String, list: Option<String>) -> Result<()> {
    let (client, config) = authenticated_client()?;
    let (list_uuid, list_name) = resolve_list(&client, list, &config).await?;

    client.complete_item(&list_uuid, &item).await?;
    println!("Completed \"{item}\" in {list_name}");
    Ok(())
}
