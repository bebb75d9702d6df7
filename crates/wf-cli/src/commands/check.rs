use crate::demo;

pub async fn run() -> Result<(), String> {
    let (engine, adventure) = demo::engine().await?;
    let issues = engine
        .validate_adventure(adventure)
        .await
        .map_err(|e| e.to_string())?;

    for issue in &issues {
        eprintln!("  {issue}");
    }
    let errors = issues.iter().filter(|i| i.is_error).count();
    if errors > 0 {
        return Err(format!(
            "{errors} error{} found",
            if errors == 1 { "" } else { "s" }
        ));
    }

    let stores = engine.stores();
    let name = stores
        .adventures
        .get(adventure)
        .await
        .map_err(|e| e.to_string())?
        .map(|a| a.name)
        .unwrap_or_default();
    let locations = stores
        .locations
        .list_for_adventure(adventure)
        .await
        .map_err(|e| e.to_string())?;
    let scripts = stores
        .scripts
        .list_for_adventure(adventure)
        .await
        .map_err(|e| e.to_string())?;
    let languages = stores.languages.list().await.map_err(|e| e.to_string())?;

    println!("  All checks passed for '{name}'.");
    println!(
        "  {} locations, {} scripts, {} languages",
        locations.len(),
        scripts.len(),
        languages.len()
    );
    Ok(())
}
