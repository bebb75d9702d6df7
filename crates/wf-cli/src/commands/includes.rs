use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use crate::demo;

pub async fn run(name: &str) -> Result<(), String> {
    let (engine, adventure) = demo::engine().await?;
    let scripts = engine
        .stores()
        .scripts
        .list_for_adventure(adventure)
        .await
        .map_err(|e| e.to_string())?;
    let script = scripts
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| format!("no script named '{name}'"))?;

    let flat = engine
        .includes()
        .flatten(script.id)
        .await
        .map_err(|e| e.to_string())?;

    if flat.is_empty() {
        println!("  '{name}' includes nothing.");
    } else {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["#", "Script", "Id"]);
        for (i, include) in flat.scripts.iter().enumerate() {
            table.add_row(vec![
                (i + 1).to_string(),
                include.name.clone(),
                include.id.to_string(),
            ]);
        }
        println!("{table}");
        println!();
        println!("  {} include(s), then '{name}' itself", flat.scripts.len());
    }

    for warning in &flat.warnings {
        println!("  {} {warning}", "warning:".yellow());
    }
    Ok(())
}
