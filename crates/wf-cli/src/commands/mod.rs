pub mod check;
pub mod includes;
pub mod play;
pub mod walk;

use colored::Colorize;
use tracing::info;
use wf_engine::{Engine, GameStart, LocationView, LogLine};

use crate::demo;

/// Start a game of the demo adventure.
async fn start(lang: Option<&str>) -> Result<(Engine, GameStart), String> {
    let (engine, adventure) = demo::engine().await?;
    let start = engine
        .start_game(adventure, lang)
        .await
        .map_err(|e| e.to_string())?;
    info!(game = %start.game.id, language = %start.game.language, "demo game started");
    Ok((engine, start))
}

fn print_lines(lines: &[LogLine]) {
    for line in lines {
        println!("  {}", line.text);
    }
}

fn print_location(view: &LocationView) {
    println!();
    println!("  {}", view.name.bold());
    println!("  {}", view.description.dimmed());
    for (i, exit) in view.exits.iter().enumerate() {
        println!("    {}. {} ({})", i + 1, exit.label, exit.name);
    }
    println!();
}
